//! # sheet-sampler-core
//!
//! Spreadsheet data model shared by the sheet-sampler readers, writer and
//! sampling engine.
//!
//! This crate provides:
//! - [`CellValue`] - A typed cell value (text, number, boolean, date, blank, error, formula)
//! - [`Row`] - A sparse row that keeps physically present cells, including blank ones
//! - [`Worksheet`], [`Workbook`] - The document structures
//! - [`NumberFormat`] - Number format codes with date/time detection
//!
//! Rows and cells are stored sparsely. A row that exists in the file but has
//! no cells is still present, and a blank cell that exists in the file still
//! counts toward its row's physical span.
//!
//! ## Example
//!
//! ```rust
//! use sheet_sampler_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_value_at(0, 0, "Name").unwrap();
//! sheet.set_value_at(0, 2, CellValue::Blank).unwrap();
//!
//! assert_eq!(sheet.row(0).unwrap().physical_span(), 3);
//! assert!(sheet.row(1).is_none());
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod number_format;
pub mod row;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellError, CellValue, SharedString};
pub use error::{Error, Result};
pub use number_format::NumberFormat;
pub use row::Row;
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
