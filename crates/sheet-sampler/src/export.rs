//! Persisting the output table and the report.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sheet_sampler_core::Workbook;
use sheet_sampler_xlsx::XlsxWriter;

use crate::error::{Artifact, BoxError, SamplerError, SamplerResult};
use crate::extract::OutputTable;
use crate::report::{Report, ReportLanguage};

/// Default output workbook file name
pub const DEFAULT_WORKBOOK_NAME: &str = "rezultatas.xlsx";

/// Default report file name
pub const DEFAULT_REPORT_NAME: &str = "paaiskinimas.txt";

/// Default name of the output worksheet
pub const DEFAULT_SHEET_NAME: &str = "Parinkti duomenys";

/// Paths of the written files
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExportedFiles {
    pub workbook: PathBuf,
    pub report: PathBuf,
}

/// Destination of a sampling run's output
pub trait Exporter {
    /// Write the table and the report; nothing after the first failure is
    /// written.
    fn export(&self, table: &OutputTable, report: &Report) -> SamplerResult<ExportedFiles>;
}

/// Where and under which names [`FileExporter`] writes
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving both files
    pub directory: PathBuf,
    pub workbook_name: String,
    pub report_name: String,
    /// Name of the single worksheet in the output workbook
    pub sheet_name: String,
    /// Wording of the report file
    pub language: ReportLanguage,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            workbook_name: DEFAULT_WORKBOOK_NAME.to_string(),
            report_name: DEFAULT_REPORT_NAME.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            language: ReportLanguage::default(),
        }
    }
}

impl ExportOptions {
    /// Default names in `directory`
    pub fn in_directory<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.directory.join(&self.workbook_name)
    }

    pub fn report_path(&self) -> PathBuf {
        self.directory.join(&self.report_name)
    }
}

/// Writes an XLSX workbook, then a UTF-8 text report, into one directory
#[derive(Debug, Clone, Default)]
pub struct FileExporter {
    options: ExportOptions,
}

impl FileExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    fn write_workbook(&self, table: &OutputTable, path: &Path) -> SamplerResult<()> {
        let export_err =
            |e: sheet_sampler_core::Error| SamplerError::export(Artifact::Workbook, path, e);

        let mut workbook = Workbook::empty();
        let sheet = table.to_worksheet(&self.options.sheet_name).map_err(export_err)?;
        workbook.add_existing_worksheet(sheet).map_err(export_err)?;

        write_replacing(path, Artifact::Workbook, |file| {
            XlsxWriter::write(&workbook, file)
        })
    }
}

/// Write through a temporary file in the destination directory, then move it
/// into place; a failed write leaves no file at `path`.
fn write_replacing<F, E>(path: &Path, artifact: Artifact, write: F) -> SamplerResult<()>
where
    F: FnOnce(&mut File) -> Result<(), E>,
    E: Into<BoxError>,
{
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".sheet-sampler-")
        .tempfile_in(directory)
        .map_err(|e| SamplerError::export(artifact, path, e))?;
    write(temp.as_file_mut()).map_err(|e| SamplerError::export(artifact, path, e))?;
    temp.persist(path)
        .map_err(|e| SamplerError::export(artifact, path, e.error))?;
    Ok(())
}

impl Exporter for FileExporter {
    fn export(&self, table: &OutputTable, report: &Report) -> SamplerResult<ExportedFiles> {
        let workbook = self.options.workbook_path();
        self.write_workbook(table, &workbook)?;
        log::info!("wrote {} rows to {}", table.row_count(), workbook.display());

        let report_path = self.options.report_path();
        let text = report.render(self.options.language.labels());
        write_replacing(&report_path, Artifact::Report, |file| {
            file.write_all(text.as_bytes())
        })?;
        log::info!("wrote report to {}", report_path.display());

        Ok(ExportedFiles {
            workbook,
            report: report_path,
        })
    }
}
