//! Error types for sheet-sampler

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`SamplerError`]
pub type SamplerResult<T> = std::result::Result<T, SamplerError>;

/// Boxed lower-level error carried as a source
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The two files written by an export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// The output spreadsheet
    Workbook,
    /// The explanation text file
    Report,
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Workbook => write!(f, "workbook"),
            Artifact::Report => write!(f, "report"),
        }
    }
}

/// Failures of one sampling run
///
/// Each variant maps to exactly one user-facing message.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// No row of the worksheet has a non-empty cell
    #[error("No header row found: the worksheet has no non-empty cell")]
    HeaderNotFound,

    /// The header is followed by zero data rows
    #[error("No data rows follow the header at row {}", .header_row + 1)]
    EmptyDataRegion {
        /// 0-based index of the header row
        header_row: u32,
    },

    /// Writing one of the output files failed
    #[error("Failed to write {artifact} {}: {source}", .path.display())]
    ExportFailure {
        artifact: Artifact,
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// Anything else: unreadable input, unsupported format, missing worksheet
    #[error("{context}")]
    Unclassified {
        context: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl SamplerError {
    /// Create an unclassified error without a source
    pub fn unclassified<S: Into<String>>(context: S) -> Self {
        SamplerError::Unclassified {
            context: context.into(),
            source: None,
        }
    }

    /// Create an unclassified error wrapping a lower-level error
    pub fn unclassified_with<S, E>(context: S, source: E) -> Self
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        SamplerError::Unclassified {
            context: context.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn export<P, E>(artifact: Artifact, path: P, source: E) -> Self
    where
        P: Into<PathBuf>,
        E: Into<BoxError>,
    {
        SamplerError::ExportFailure {
            artifact,
            path: path.into(),
            source: source.into(),
        }
    }
}

impl From<std::io::Error> for SamplerError {
    fn from(e: std::io::Error) -> Self {
        SamplerError::unclassified_with(format!("I/O error: {e}"), e)
    }
}
