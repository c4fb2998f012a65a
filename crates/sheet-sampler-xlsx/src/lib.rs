//! # sheet-sampler-xlsx
//!
//! XLSX (Office Open XML) reader and writer for sheet-sampler.
//!
//! The reader keeps what row sampling needs: cell values, physically present
//! rows and blank cells, and the number formats that mark a number as a date.
//! Visual styling, comments and other sheet parts are skipped.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
