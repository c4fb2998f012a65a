//! Header lookup, sampling and output table construction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sheet_sampler_core::{Row, Worksheet};

use crate::coerce::coerce;
use crate::error::{SamplerError, SamplerResult};
use crate::region::{locate_data_region, locate_header, DataRegion, HeaderRow};
use crate::report::Report;
use crate::sampler::{sample, SampleResult, SampleSpec};

/// Options for [`extract`]
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Source file name shown in the report
    pub source_name: String,
    /// Seed for a reproducible draw; `None` draws from the thread RNG
    pub seed: Option<u64>,
}

impl ExtractOptions {
    pub fn new<S: Into<String>>(source_name: S) -> Self {
        Self {
            source_name: source_name.into(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Header plus sampled rows, all cells as canonical text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl OutputTable {
    /// Copy the header and the sampled rows, `header.column_count` cells each
    pub fn build(sheet: &Worksheet, header: &HeaderRow, sample: &SampleResult) -> Self {
        let width = header.column_count;
        Self {
            header: coerce_row(sheet.row(header.index), width),
            rows: sample
                .original_indices()
                .map(|index| coerce_row(sheet.row(index), width))
                .collect(),
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Sampled rows in draw order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of rows including the header
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    /// Lay the table out as a worksheet starting at row 0, every cell text
    pub fn to_worksheet(&self, name: &str) -> sheet_sampler_core::Result<Worksheet> {
        let mut sheet = Worksheet::new(name);
        sheet.push_row(self.header.iter().map(String::as_str))?;
        for row in &self.rows {
            sheet.push_row(row.iter().map(String::as_str))?;
        }
        Ok(sheet)
    }
}

fn coerce_row(row: Option<&Row>, width: u32) -> Vec<String> {
    (0..width)
        .map(|col| coerce(row.zip(u16::try_from(col).ok()).and_then(|(r, c)| r.cell(c))))
        .collect()
}

/// Everything one sampling run produced
#[derive(Debug, Clone)]
pub struct Extraction {
    pub header: HeaderRow,
    pub region: DataRegion,
    pub sample: SampleResult,
    pub table: OutputTable,
    pub report: Report,
}

/// Locate the table in `sheet`, sample its rows and build the output.
///
/// Draws from a [`StdRng`] seeded with `options.seed`, or from the thread
/// RNG when no seed is set.
pub fn extract(
    sheet: &Worksheet,
    spec: SampleSpec,
    options: &ExtractOptions,
) -> SamplerResult<Extraction> {
    match options.seed {
        Some(seed) => extract_with_rng(sheet, spec, options, &mut StdRng::seed_from_u64(seed)),
        None => extract_with_rng(sheet, spec, options, &mut rand::thread_rng()),
    }
}

/// [`extract`] with a caller-supplied RNG; `options.seed` is ignored.
///
/// # Errors
///
/// - [`SamplerError::HeaderNotFound`] when no row has a non-empty cell
/// - [`SamplerError::EmptyDataRegion`] when no data row follows the header
pub fn extract_with_rng<R: Rng + ?Sized>(
    sheet: &Worksheet,
    spec: SampleSpec,
    options: &ExtractOptions,
    rng: &mut R,
) -> SamplerResult<Extraction> {
    let header = locate_header(sheet).ok_or(SamplerError::HeaderNotFound)?;
    log::info!(
        "header at row {} with {} columns",
        header.index + 1,
        header.column_count
    );

    let region = locate_data_region(sheet, header.index + 1);
    let Some(last) = region.last() else {
        return Err(SamplerError::EmptyDataRegion {
            header_row: header.index,
        });
    };
    log::info!(
        "data rows {}..={} ({} rows)",
        region.first + 1,
        last + 1,
        region.row_count
    );

    let target = spec.target_count(region.row_count);
    log::info!("sampling {} of {} rows ({})", target, region.row_count, spec);

    let sample = sample(&region, target, rng);
    let table = OutputTable::build(sheet, &header, &sample);
    let report = Report::new(options.source_name.as_str(), &header, &region, spec, &sample);

    Ok(Extraction {
        header,
        region,
        sample,
        table,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use sheet_sampler_core::CellValue;

    #[test]
    fn test_rows_copied_at_header_width() {
        let mut ws = Worksheet::new("Data");
        ws.push_row(["Name", "Age", "City"]).unwrap();
        // Wider than the header; the extra cell is dropped
        ws.set_value_at(1, 0, "Ona").unwrap();
        ws.set_value_at(1, 1, 31.0).unwrap();
        ws.set_value_at(1, 2, CellValue::Blank).unwrap();
        ws.set_value_at(1, 3, "extra").unwrap();
        ws.set_value_at(2, 0, true).unwrap();
        ws.set_value_at(2, 1, CellValue::Formula("=B2".into())).unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        ws.set_value_at(2, 2, date).unwrap();
        ws.set_value_at(2, 3, "x").unwrap();

        let options = ExtractOptions::new("data.xlsx").with_seed(3);
        let extraction = extract(&ws, SampleSpec::Percentage(100.0), &options).unwrap();
        assert_eq!(extraction.region, DataRegion { first: 1, row_count: 2 });

        let table = &extraction.table;
        assert_eq!(table.header(), ["Name", "Age", "City"]);
        assert_eq!(table.row_count(), 3);
        let mut rows = table.rows().to_vec();
        rows.sort();
        assert_eq!(
            rows,
            vec![
                vec!["Ona".to_string(), "31".into(), "".into()],
                vec!["true".to_string(), "".into(), "2020-01-02 03:04:05".into()],
            ]
        );
    }

    #[test]
    fn test_missing_cells_become_empty_text() {
        let mut ws = Worksheet::new("Data");
        ws.set_value_at(0, 0, "A").unwrap();
        ws.set_value_at(0, 3, "D").unwrap();
        ws.set_value_at(1, 3, 1.0).unwrap();

        let extraction = extract(&ws, SampleSpec::Count(1), &ExtractOptions::default()).unwrap();
        assert_eq!(extraction.table.header(), ["A", "", "", "D"]);
        assert_eq!(extraction.table.rows(), [vec!["", "", "", "1"]]);
    }

    #[test]
    fn test_header_on_last_possible_row() {
        let mut ws = Worksheet::new("Data");
        ws.set_value_at(sheet_sampler_core::MAX_ROWS - 1, 0, "H").unwrap();
        let result = extract(&ws, SampleSpec::Count(1), &ExtractOptions::default());
        assert!(matches!(result, Err(SamplerError::EmptyDataRegion { .. })));
    }

    #[test]
    fn test_to_worksheet() {
        let table = OutputTable {
            header: vec!["H1".into(), "H2".into()],
            rows: vec![vec!["a".into(), "".into()]],
        };
        let ws = table.to_worksheet("Parinkti duomenys").unwrap();
        assert_eq!(ws.name(), "Parinkti duomenys");
        assert_eq!(ws.value("A1").unwrap(), Some(&CellValue::text("H1")));
        assert_eq!(ws.value("B2").unwrap(), Some(&CellValue::text("")));
        assert_eq!(ws.row_count(), 2);
    }
}
