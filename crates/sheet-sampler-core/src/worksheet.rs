//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
///
/// Rows are sparse: indices with no entry are absent, which is distinct from
/// a present row with no cells.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Present rows keyed by index
    rows: BTreeMap<u32, Row>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Row Access ===

    /// Get a present row by index
    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Mark a row as present, creating it with no cells if needed
    pub fn ensure_row(&mut self, index: u32) -> Result<&mut Row> {
        if index >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(index, MAX_ROWS - 1));
        }
        Ok(self.rows.entry(index).or_insert_with(|| Row::new(index)))
    }

    /// Iterate over present rows in index order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Index of the last present row
    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Number of present rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the sheet has no rows at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn value_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|r| r.cell(col))
    }

    /// Get a cell by address string (e.g., "A1")
    pub fn value(&self, address: &str) -> Result<Option<&CellValue>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr.row, addr.col))
    }

    /// Set a cell by row and column indices; the row becomes present
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: u32, col: u16, value: V) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        self.ensure_row(row)?.set(col, value.into());
        Ok(())
    }

    /// Set a cell by address string (e.g., "A1")
    pub fn set_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_value_at(addr.row, addr.col, value)
    }

    /// Append a row of values at the next index after the last present row
    pub fn push_row<I, V>(&mut self, values: I) -> Result<u32>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let index = self.last_row_index().map_or(0, |last| last + 1);
        self.ensure_row(index)?;
        for (col, value) in values.into_iter().enumerate() {
            let col = u16::try_from(col)
                .map_err(|_| Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1))?;
            self.set_value_at(index, col, value)?;
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_and_empty_rows() {
        let mut ws = Worksheet::new("Data");
        ws.ensure_row(2).unwrap();
        ws.set_value_at(4, 1, "x").unwrap();

        assert!(ws.row(0).is_none());
        assert!(ws.row(2).unwrap().is_empty());
        assert_eq!(ws.row(4).unwrap().physical_span(), 2);
        assert_eq!(ws.last_row_index(), Some(4));
        assert_eq!(ws.row_count(), 2);
    }

    #[test]
    fn test_address_access() {
        let mut ws = Worksheet::new("Data");
        ws.set_value("B2", 42.0).unwrap();

        assert_eq!(ws.value("B2").unwrap(), Some(&CellValue::Number(42.0)));
        assert_eq!(ws.value_at(1, 1), Some(&CellValue::Number(42.0)));
        assert_eq!(ws.value("A1").unwrap(), None);
        assert!(ws.value("1A").is_err());
    }

    #[test]
    fn test_bounds() {
        let mut ws = Worksheet::new("Data");
        assert!(ws.set_value_at(MAX_ROWS, 0, 1.0).is_err());
        assert!(ws.set_value_at(0, MAX_COLS, 1.0).is_err());
        assert!(ws.is_empty());
    }

    #[test]
    fn test_push_row() {
        let mut ws = Worksheet::new("Data");
        assert_eq!(ws.push_row(["a", "b"]).unwrap(), 0);
        ws.ensure_row(3).unwrap();
        assert_eq!(ws.push_row(vec![CellValue::Blank]).unwrap(), 4);
        assert_eq!(ws.row(4).unwrap().physical_span(), 1);
    }
}
