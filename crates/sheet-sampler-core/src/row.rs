//! Row type

use std::collections::BTreeMap;

use crate::cell::CellValue;

/// A worksheet row holding its physically present cells
///
/// A cell is "physically present" when the source file declares it, even if
/// it holds no value ([`CellValue::Blank`]). Present-but-blank cells count
/// toward [`Row::physical_span`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Row index (0-based)
    index: u32,
    /// Cells keyed by column index
    cells: BTreeMap<u16, CellValue>,
}

impl Row {
    /// Create a new row with no cells
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    /// Row index (0-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get a cell by column index
    pub fn cell(&self, col: u16) -> Option<&CellValue> {
        self.cells.get(&col)
    }

    /// Set a cell value, replacing any existing one
    pub fn set(&mut self, col: u16, value: CellValue) {
        self.cells.insert(col, value);
    }

    /// Iterate over present cells in column order
    pub fn cells(&self) -> impl Iterator<Item = (u16, &CellValue)> {
        self.cells.iter().map(|(col, value)| (*col, value))
    }

    /// Highest present column index + 1, or 0 when the row has no cells
    pub fn physical_span(&self) -> u32 {
        self.cells
            .keys()
            .next_back()
            .map_or(0, |last| *last as u32 + 1)
    }

    /// Check if row has any cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_span_counts_gaps() {
        let mut row = Row::new(3);
        assert_eq!(row.physical_span(), 0);

        row.set(0, CellValue::from("a"));
        row.set(4, CellValue::Blank);
        assert_eq!(row.physical_span(), 5);
        assert_eq!(row.cells().count(), 2);
        assert!(row.cell(2).is_none());
    }

    #[test]
    fn test_cells_in_column_order() {
        let mut row = Row::new(0);
        row.set(2, CellValue::from(3.0));
        row.set(0, CellValue::from(1.0));
        row.set(1, CellValue::from(2.0));

        let cols: Vec<u16> = row.cells().map(|(c, _)| c).collect();
        assert_eq!(cols, vec![0, 1, 2]);
        assert_eq!(row.physical_span(), 3);
    }
}
