//! # sheet-sampler
//!
//! Randomly sample the data rows of a spreadsheet table.
//!
//! The pipeline finds the header row (the first row with a non-empty cell),
//! the contiguous data rows under it, draws a sample without replacement,
//! and produces:
//!
//! - an [`OutputTable`] with the header and the sampled rows as text
//! - a [`Report`] mapping every sampled row to its row in the output
//!
//! [`process_file`] runs the whole pipeline on a file and hands the result
//! to an [`Exporter`].
//!
//! ## Features
//!
//! - `xls` (default): read legacy BIFF8 `.xls` files
//! - `serde`: `Serialize` for the report and the sampling results
//!
//! ## Example
//!
//! ```rust
//! use sheet_sampler::prelude::*;
//!
//! let mut sheet = Worksheet::new("Data");
//! sheet.push_row(["Name", "Age", "City"]).unwrap();
//! for i in 0..10 {
//!     sheet.push_row([format!("Person {i}"), format!("{}", 20 + i), "Vilnius".into()]).unwrap();
//! }
//!
//! let options = ExtractOptions::new("people.xlsx").with_seed(1);
//! let extraction = extract(&sheet, SampleSpec::Count(3), &options).unwrap();
//!
//! assert_eq!(extraction.table.row_count(), 4);
//! println!("{}", extraction.report.render(ReportLanguage::English.labels()));
//! ```

pub mod coerce;
pub mod error;
pub mod export;
pub mod extract;
pub mod prelude;
pub mod region;
pub mod report;
pub mod sampler;

pub use coerce::coerce;
pub use error::{Artifact, SamplerError, SamplerResult};
pub use export::{ExportOptions, ExportedFiles, Exporter, FileExporter};
pub use extract::{extract, extract_with_rng, ExtractOptions, Extraction, OutputTable};
pub use region::{locate_data_region, locate_header, DataRegion, HeaderRow};
pub use report::{Report, ReportLabels, ReportLanguage};
pub use sampler::{sample, SampleEntry, SampleResult, SampleSpec};

pub use sheet_sampler_core::{CellValue, Row, Workbook, Worksheet};

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Spreadsheet container formats that can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Office Open XML (`.xlsx`, `.xlsm`)
    Xlsx,
    /// Legacy BIFF8 (`.xls`)
    Xls,
}

impl FileFormat {
    /// Format implied by the file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Some(FileFormat::Xlsx),
            Some("xls") => Some(FileFormat::Xls),
            _ => None,
        }
    }

    /// Format implied by the leading bytes: a ZIP local header or a CFB
    /// signature
    pub fn from_signature(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"PK\x03\x04") {
            Some(FileFormat::Xlsx)
        } else if bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
            Some(FileFormat::Xls)
        } else {
            None
        }
    }

    /// Detect the format of a file, by extension first, then by signature
    pub fn detect(path: &Path) -> SamplerResult<Self> {
        if let Some(format) = Self::from_extension(path) {
            return Ok(format);
        }

        let mut signature = Vec::with_capacity(4);
        File::open(path)
            .and_then(|f| f.take(4).read_to_end(&mut signature))
            .map_err(|e| {
                SamplerError::unclassified_with(format!("Cannot read {}", path.display()), e)
            })?;

        Self::from_signature(&signature).ok_or_else(|| {
            SamplerError::unclassified(format!("Unsupported file format: {}", path.display()))
        })
    }
}

/// Extension trait for Workbook to add file input
pub trait WorkbookExt {
    /// Open a workbook from an `.xlsx`, `.xlsm` or `.xls` file
    fn open<P: AsRef<Path>>(path: P) -> SamplerResult<Workbook>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> SamplerResult<Workbook> {
        let path = path.as_ref();
        let read_err = |e: error::BoxError| {
            SamplerError::unclassified_with(format!("Cannot read workbook {}", path.display()), e)
        };

        match FileFormat::detect(path)? {
            FileFormat::Xlsx => {
                sheet_sampler_xlsx::XlsxReader::read_file(path).map_err(|e| read_err(e.into()))
            }
            #[cfg(feature = "xls")]
            FileFormat::Xls => {
                sheet_sampler_xls::XlsReader::read_file(path).map_err(|e| read_err(e.into()))
            }
            #[cfg(not(feature = "xls"))]
            FileFormat::Xls => Err(SamplerError::unclassified(format!(
                "XLS support is not enabled: {}",
                path.display()
            ))),
        }
    }
}

/// Result of a successful [`process_file`] run
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub extraction: Extraction,
    pub files: ExportedFiles,
}

/// Open `input`, sample its first worksheet and export the result.
///
/// When `options.source_name` is empty the report names the input file.
///
/// # Errors
///
/// Reading problems and a workbook without worksheets become
/// [`SamplerError::Unclassified`]; the rest come from [`extract`] and the
/// exporter.
pub fn process_file<P: AsRef<Path>>(
    input: P,
    spec: SampleSpec,
    options: &ExtractOptions,
    exporter: &dyn Exporter,
) -> SamplerResult<ProcessOutcome> {
    let input = input.as_ref();
    let workbook = Workbook::open(input)?;
    let sheet = workbook
        .worksheet(0)
        .ok_or_else(|| SamplerError::unclassified("The workbook has no worksheets"))?;
    log::info!(
        "read {}: sheet \"{}\" with {} rows",
        input.display(),
        sheet.name(),
        sheet.row_count()
    );

    let extraction = if options.source_name.is_empty() {
        let named = ExtractOptions {
            source_name: input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..options.clone()
        };
        extract(sheet, spec, &named)?
    } else {
        extract(sheet, spec, options)?
    };

    let files = exporter.export(&extraction.table, &extraction.report)?;
    Ok(ProcessOutcome { extraction, files })
}
