//! The explanation of a sampling run.
//!
//! [`Report`] holds the facts; [`ReportLabels`] holds the wording. The
//! rendered text looks like this (Lithuanian labels):
//!
//! ```text
//! Atrenkami duomenys iš failo: people.xlsx
//! Bendras duomenų eilučių skaičius: 10
//! Pirmos duomenų eilutės numeris: 2
//! Paskutinės duomenų eilutės numeris: 11
//! Nustatyta atsitiktinės atrankos būdu atrinkti 3 duomenų eilutes.
//! Bendras atriktų eilučių skaičius: 3
//! Atriktų eilučių numeriai:
//! (Sename faile ---> naujame faile)
//!
//! 7 ---> 2
//! 3 ---> 3
//! 10 ---> 4
//! ```

use std::fmt::Write as _;

use crate::region::{DataRegion, HeaderRow};
use crate::sampler::{SampleEntry, SampleResult, SampleSpec};

/// Separator between the old and new row numbers of a mapping line
pub const MAPPING_ARROW: &str = " ---> ";

/// Facts about one sampling run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// Name of the source file
    pub source_name: String,
    /// 1-based row number of the header
    pub header_row: u32,
    /// Number of data rows
    pub row_count: u32,
    /// 1-based row number of the first data row
    pub first_row: u32,
    /// 1-based row number of the last data row
    pub last_row: u32,
    /// The sampling instruction as given
    pub spec: SampleSpec,
    /// Number of rows actually taken
    pub selected_count: u32,
    /// Sampled rows in draw order
    pub entries: Vec<SampleEntry>,
}

impl Report {
    pub fn new(
        source_name: impl Into<String>,
        header: &HeaderRow,
        region: &DataRegion,
        spec: SampleSpec,
        sample: &SampleResult,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            header_row: header.index + 1,
            row_count: region.row_count,
            first_row: region.first + 1,
            last_row: region.last().map_or(region.first, |last| last + 1),
            spec,
            selected_count: sample.len() as u32,
            entries: sample.entries().to_vec(),
        }
    }

    /// Render the report text; every line ends with `\n`
    pub fn render(&self, labels: &ReportLabels) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_to(&mut out, labels);
        out
    }

    fn write_to(&self, out: &mut String, labels: &ReportLabels) -> std::fmt::Result {
        writeln!(out, "{}{}", labels.source, self.source_name)?;
        writeln!(out, "{}{}", labels.total_rows, self.row_count)?;
        writeln!(out, "{}{}", labels.first_row, self.first_row)?;
        writeln!(out, "{}{}", labels.last_row, self.last_row)?;
        match self.spec {
            SampleSpec::Percentage(p) => {
                writeln!(out, "{}{}{}", labels.instruction, p, labels.percentage_suffix)?
            }
            SampleSpec::Count(n) => {
                writeln!(out, "{}{}{}", labels.instruction, n, labels.count_suffix)?
            }
        }
        writeln!(out, "{}{}", labels.selected_rows, self.selected_count)?;
        writeln!(out, "{}", labels.heading)?;
        writeln!(out, "{}", labels.legend)?;
        writeln!(out)?;
        for entry in &self.entries {
            writeln!(out, "{}{}{}", entry.original + 1, MAPPING_ARROW, entry.new)?;
        }
        Ok(())
    }
}

/// Language of the report and of user-facing messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportLanguage {
    #[default]
    Lithuanian,
    English,
}

impl ReportLanguage {
    pub fn labels(self) -> &'static ReportLabels {
        match self {
            ReportLanguage::Lithuanian => &LITHUANIAN,
            ReportLanguage::English => &ENGLISH,
        }
    }
}

/// Wording of the report lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLabels {
    pub source: &'static str,
    pub total_rows: &'static str,
    pub first_row: &'static str,
    pub last_row: &'static str,
    /// Precedes the percentage or count
    pub instruction: &'static str,
    pub percentage_suffix: &'static str,
    pub count_suffix: &'static str,
    pub selected_rows: &'static str,
    pub heading: &'static str,
    pub legend: &'static str,
}

pub const LITHUANIAN: ReportLabels = ReportLabels {
    source: "Atrenkami duomenys iš failo: ",
    total_rows: "Bendras duomenų eilučių skaičius: ",
    first_row: "Pirmos duomenų eilutės numeris: ",
    last_row: "Paskutinės duomenų eilutės numeris: ",
    instruction: "Nustatyta atsitiktinės atrankos būdu atrinkti ",
    percentage_suffix: "% visų duomenų eilučių.",
    count_suffix: " duomenų eilutes.",
    selected_rows: "Bendras atriktų eilučių skaičius: ",
    heading: "Atriktų eilučių numeriai:",
    legend: "(Sename faile ---> naujame faile)",
};

pub const ENGLISH: ReportLabels = ReportLabels {
    source: "Data sampled from file: ",
    total_rows: "Total number of data rows: ",
    first_row: "First data row number: ",
    last_row: "Last data row number: ",
    instruction: "Random sampling set to select ",
    percentage_suffix: "% of all data rows.",
    count_suffix: " data rows.",
    selected_rows: "Total number of selected rows: ",
    heading: "Selected row numbers:",
    legend: "(old file ---> new file)",
};
