//! User-facing messages in Lithuanian and English.

use std::path::Path;

use sheet_sampler::{Artifact, ExportOptions, ReportLanguage, SamplerError};

/// Why a `--percent` or `--count` value was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputProblem {
    PercentNotNumber,
    PercentOutOfRange,
    CountNotNumber,
    CountNegative,
}

pub fn input_problem(problem: InputProblem, lang: ReportLanguage) -> &'static str {
    use InputProblem::*;
    match (lang, problem) {
        (ReportLanguage::Lithuanian, PercentNotNumber) => "Netinkama skaitinė reikšmė procentams.",
        (ReportLanguage::Lithuanian, PercentOutOfRange) => "Procentai turi būti nuo 0 iki 100.",
        (ReportLanguage::Lithuanian, CountNotNumber) => "Netinkama skaitinė reikšmė kiekiui.",
        (ReportLanguage::Lithuanian, CountNegative) => {
            "Kiekis turi būti neneigiamas sveikasis skaičius."
        }
        (ReportLanguage::English, PercentNotNumber) => "Invalid numeric value for percent.",
        (ReportLanguage::English, PercentOutOfRange) => "Percent must be between 0 and 100.",
        (ReportLanguage::English, CountNotNumber) => "Invalid numeric value for count.",
        (ReportLanguage::English, CountNegative) => "Count must be a non-negative integer.",
    }
}

/// The one message shown for a failed run
pub fn failure(error: &SamplerError, lang: ReportLanguage) -> &'static str {
    match (lang, error) {
        (ReportLanguage::Lithuanian, SamplerError::HeaderNotFound) => {
            "Lentelėje nerasta antraštės eilutės."
        }
        (ReportLanguage::Lithuanian, SamplerError::EmptyDataRegion { .. }) => {
            "Po antraštės eilute nėra duomenų eilučių."
        }
        (ReportLanguage::Lithuanian, SamplerError::ExportFailure { artifact, .. }) => {
            match artifact {
                Artifact::Workbook => "Klaida bandant sukurti Excel'io failą.",
                Artifact::Report => "Klaida bandant išrašyti tekstinį failą.",
            }
        }
        (ReportLanguage::Lithuanian, SamplerError::Unclassified { .. }) => "Nežinoma klaida.",
        (ReportLanguage::English, SamplerError::HeaderNotFound) => {
            "No header row found in the table."
        }
        (ReportLanguage::English, SamplerError::EmptyDataRegion { .. }) => {
            "There are no data rows below the header row."
        }
        (ReportLanguage::English, SamplerError::ExportFailure { artifact, .. }) => match artifact {
            Artifact::Workbook => "Error while creating the Excel file.",
            Artifact::Report => "Error while writing the text file.",
        },
        (ReportLanguage::English, SamplerError::Unclassified { .. }) => "Unknown error.",
    }
}

/// The confirmation shown after both files were written
pub fn success(options: &ExportOptions, directory: &Path, lang: ReportLanguage) -> String {
    match lang {
        ReportLanguage::Lithuanian => format!(
            "Duomenys sėkmingai apdoroti ir išsaugoti.\n\
             Nauja Excel'io lentelė išsaugota faile {}.\n\
             Duomenų apdorojimo paaiškinimas išsaugotas faile {}.\n\
             Abu failai išsaugoti: {}",
            options.workbook_name,
            options.report_name,
            directory.display()
        ),
        ReportLanguage::English => format!(
            "Data processed and saved successfully.\n\
             The new Excel table was saved to file {}.\n\
             The processing explanation was saved to file {}.\n\
             Both files saved to: {}",
            options.workbook_name,
            options.report_name,
            directory.display()
        ),
    }
}
