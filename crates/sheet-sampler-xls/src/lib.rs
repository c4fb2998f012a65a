//! # sheet-sampler-xls
//!
//! XLS (BIFF8) reader for sheet-sampler.
//!
//! This crate handles the legacy Excel binary format (.xls). Only cell
//! values, present rows and number formats are decoded.

pub mod biff;
pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
