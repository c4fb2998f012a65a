//! Prelude module - common imports for sheet-sampler users
//!
//! ```rust
//! use sheet_sampler::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    extract,
    extract_with_rng,
    process_file,
    // Errors
    Artifact,
    // Model
    CellValue,
    // Export
    ExportOptions,
    ExportedFiles,
    Exporter,
    ExtractOptions,
    Extraction,
    FileExporter,
    FileFormat,
    OutputTable,
    ProcessOutcome,
    // Report
    Report,
    ReportLanguage,
    SampleEntry,
    // Sampling
    SampleSpec,
    SamplerError,
    SamplerResult,
    Workbook,
    WorkbookExt,
    Worksheet,
};
