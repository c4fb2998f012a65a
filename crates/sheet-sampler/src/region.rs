//! Header row and data region detection.

use std::ops::Range;

use sheet_sampler_core::{Row, Worksheet};

use crate::coerce::is_empty_value;

/// The first row with a non-empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeaderRow {
    /// 0-based row index
    pub index: u32,
    /// Physical span of the header row; the number of cells copied from
    /// every row
    pub column_count: u32,
}

/// Contiguous run of data rows following the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataRegion {
    /// 0-based index of the first data row
    pub first: u32,
    /// Number of data rows, possibly zero
    pub row_count: u32,
}

impl DataRegion {
    /// A region with no rows starting at `first`
    pub fn empty(first: u32) -> Self {
        Self {
            first,
            row_count: 0,
        }
    }

    /// 0-based index of the last data row, `None` when empty
    pub fn last(&self) -> Option<u32> {
        self.row_count.checked_sub(1).map(|n| self.first + n)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Check if a row index lies in the region
    pub fn contains(&self, index: u32) -> bool {
        self.indices().contains(&index)
    }

    /// Row indices of the region
    pub fn indices(&self) -> Range<u32> {
        self.first..self.first + self.row_count
    }
}

/// Find the header: the first present row with a cell that coerces to
/// non-empty text.
///
/// Returns `None` for a sheet without rows or with blank cells only.
pub fn locate_header(sheet: &Worksheet) -> Option<HeaderRow> {
    sheet
        .rows()
        .find(|row| has_content(row))
        .map(|row| HeaderRow {
            index: row.index(),
            column_count: row.physical_span(),
        })
}

fn has_content(row: &Row) -> bool {
    row.cells().any(|(_, value)| !is_empty_value(Some(value)))
}

/// Walk forward from `first` and return the data region.
///
/// Row `i > first` ends the region when it is absent or when its physical
/// span is strictly less than the span of row `i - 1`. Cell contents are not
/// inspected. An absent `first` row gives an empty region.
pub fn locate_data_region(sheet: &Worksheet, first: u32) -> DataRegion {
    let Some(mut previous) = sheet.row(first) else {
        log::debug!("data region: row {} absent", first + 1);
        return DataRegion::empty(first);
    };

    let mut row_count = 1u32;
    while let Some(index) = first.checked_add(row_count) {
        match sheet.row(index) {
            Some(row) if row.physical_span() >= previous.physical_span() => {
                previous = row;
                row_count += 1;
            }
            Some(row) => {
                log::debug!(
                    "data region ends before row {}: span {} < {}",
                    index + 1,
                    row.physical_span(),
                    previous.physical_span()
                );
                break;
            }
            None => {
                log::debug!("data region ends before row {}: row absent", index + 1);
                break;
            }
        }
    }

    DataRegion { first, row_count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheet_sampler_core::CellValue;

    fn sheet_with_spans(spans: &[(u32, u16)]) -> Worksheet {
        let mut ws = Worksheet::new("Data");
        for &(row, span) in spans {
            ws.ensure_row(row).unwrap();
            for col in 0..span {
                ws.set_value_at(row, col, format!("r{row}c{col}")).unwrap();
            }
        }
        ws
    }

    #[test]
    fn test_header_skips_blank_rows() {
        let mut ws = Worksheet::new("Data");
        ws.ensure_row(0).unwrap();
        ws.set_value_at(1, 0, CellValue::Blank).unwrap();
        ws.set_value_at(1, 1, "").unwrap();
        ws.set_value_at(1, 2, CellValue::Formula("=1".into())).unwrap();
        ws.set_value_at(3, 1, "Name").unwrap();
        ws.set_value_at(3, 4, CellValue::Blank).unwrap();

        assert_eq!(
            locate_header(&ws),
            Some(HeaderRow {
                index: 3,
                column_count: 5
            })
        );
    }

    #[test]
    fn test_header_not_found() {
        assert_eq!(locate_header(&Worksheet::new("Empty")), None);

        let mut ws = Worksheet::new("Blank");
        ws.set_value_at(0, 0, CellValue::Blank).unwrap();
        ws.set_value_at(2, 3, "").unwrap();
        assert_eq!(locate_header(&ws), None);
    }

    #[test]
    fn test_region_stops_at_narrower_row() {
        let ws = sheet_with_spans(&[(0, 3), (1, 3), (2, 2), (3, 1)]);
        let region = locate_data_region(&ws, 1);
        assert_eq!(region, DataRegion { first: 1, row_count: 1 });
        assert_eq!(region.last(), Some(1));
    }

    #[test]
    fn test_region_follows_previous_row_not_header() {
        // Narrower than the header but never narrower than its predecessor
        let ws = sheet_with_spans(&[(0, 4), (1, 2), (2, 2), (3, 5), (4, 5), (5, 3)]);
        let region = locate_data_region(&ws, 1);
        assert_eq!(region.indices(), 1..5);
    }

    #[test]
    fn test_region_stops_at_absent_row() {
        let ws = sheet_with_spans(&[(0, 2), (1, 2), (2, 2), (4, 2)]);
        assert_eq!(locate_data_region(&ws, 1).last(), Some(2));
    }

    #[test]
    fn test_region_empty_when_first_row_absent() {
        let ws = sheet_with_spans(&[(0, 2), (2, 2)]);
        let region = locate_data_region(&ws, 1);
        assert!(region.is_empty());
        assert_eq!(region.last(), None);
        assert!(!region.contains(1));
    }

    #[test]
    fn test_region_ignores_content() {
        let mut ws = Worksheet::new("Data");
        ws.set_value_at(0, 0, "H").unwrap();
        ws.set_value_at(1, 0, CellValue::Blank).unwrap();
        ws.ensure_row(2).unwrap();
        // Row 2 has span 0 < 1
        assert_eq!(locate_data_region(&ws, 1).row_count, 1);

        ws.set_value_at(2, 0, CellValue::Blank).unwrap();
        assert_eq!(locate_data_region(&ws, 1).row_count, 2);
    }
}
