//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellError`] - Excel error literals such as `#DIV/0!`

mod address;
mod value;

pub use address::CellAddress;
pub use value::{CellError, CellValue, SharedString};
