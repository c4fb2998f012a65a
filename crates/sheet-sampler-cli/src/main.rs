//! sheet-sampler CLI - random sampling of spreadsheet rows

mod logger;
mod messages;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use serde::Serialize;
use sheet_sampler::export::{DEFAULT_REPORT_NAME, DEFAULT_SHEET_NAME, DEFAULT_WORKBOOK_NAME};
use sheet_sampler::prelude::*;
use sheet_sampler::{DataRegion, HeaderRow};

use messages::InputProblem;

#[derive(Parser)]
#[command(name = "sheet-sampler")]
#[command(
    author,
    version,
    about = "Randomly sample the data rows of a spreadsheet table"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["percent", "count"])))]
struct Cli {
    /// Input spreadsheet file (xlsx, xlsm, xls)
    input: PathBuf,

    /// Directory receiving the output workbook and report
    #[arg(short, long, value_name = "DIR")]
    output_dir: PathBuf,

    /// Share of the data rows to take, from 0 to 100
    #[arg(short, long, value_name = "P", allow_hyphen_values = true)]
    percent: Option<String>,

    /// Number of data rows to take
    #[arg(short, long, value_name = "N", allow_hyphen_values = true)]
    count: Option<String>,

    /// Seed for a reproducible selection
    #[arg(long, value_name = "U64")]
    seed: Option<u64>,

    /// Language of the messages and the report
    #[arg(long, value_enum, default_value_t = Lang::Lt)]
    lang: Lang,

    /// File name of the output workbook
    #[arg(long, value_name = "NAME", default_value = DEFAULT_WORKBOOK_NAME)]
    workbook_name: String,

    /// File name of the report
    #[arg(long, value_name = "NAME", default_value = DEFAULT_REPORT_NAME)]
    report_name: String,

    /// Name of the output worksheet
    #[arg(long, value_name = "NAME", default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lang {
    /// Lithuanian
    Lt,
    /// English
    En,
}

impl From<Lang> for ReportLanguage {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::Lt => ReportLanguage::Lithuanian,
            Lang::En => ReportLanguage::English,
        }
    }
}

/// Machine-readable result printed by `--json`
#[derive(Serialize)]
struct Summary<'a> {
    input: &'a Path,
    header: HeaderRow,
    region: DataRegion,
    report: &'a Report,
    files: &'a ExportedFiles,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);
    let lang = ReportLanguage::from(cli.lang);

    match run(&cli, lang) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<SamplerError>() {
                Some(e) => {
                    if has_diagnostics(e) {
                        log::error!("{err:#}");
                    } else {
                        log::debug!("{err:#}");
                    }
                    eprintln!("{}", messages::failure(e, lang));
                }
                None => eprintln!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, lang: ReportLanguage) -> Result<()> {
    let spec = sample_spec(cli.percent.as_deref(), cli.count.as_deref(), lang)?;

    let export = ExportOptions {
        directory: cli.output_dir.clone(),
        workbook_name: cli.workbook_name.clone(),
        report_name: cli.report_name.clone(),
        sheet_name: cli.sheet_name.clone(),
        language: lang,
    };
    let exporter = FileExporter::new(export);
    let options = ExtractOptions {
        source_name: String::new(),
        seed: cli.seed,
    };

    let outcome = process_file(&cli.input, spec, &options, &exporter)?;

    let directory =
        std::fs::canonicalize(&cli.output_dir).unwrap_or_else(|_| cli.output_dir.clone());
    let confirmation = messages::success(exporter.options(), &directory, lang);

    if cli.json {
        // Keep stdout a single JSON document
        eprintln!("{confirmation}");
        let summary = Summary {
            input: &cli.input,
            header: outcome.extraction.header,
            region: outcome.extraction.region,
            report: &outcome.extraction.report,
            files: &outcome.files,
        };
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
        println!("{json}");
    } else {
        println!("{confirmation}");
    }

    Ok(())
}

/// Failures whose localized message hides the underlying cause
fn has_diagnostics(err: &SamplerError) -> bool {
    matches!(
        err,
        SamplerError::Unclassified { .. } | SamplerError::ExportFailure { .. }
    )
}

/// Validate the raw `--percent` / `--count` value.
///
/// clap guarantees exactly one of them is present.
fn sample_spec(
    percent: Option<&str>,
    count: Option<&str>,
    lang: ReportLanguage,
) -> Result<SampleSpec> {
    let problem = |p| anyhow!(messages::input_problem(p, lang));

    match (percent, count) {
        (Some(value), _) => {
            let p: f64 = value
                .trim()
                .parse()
                .map_err(|_| problem(InputProblem::PercentNotNumber))?;
            if !(0.0..=100.0).contains(&p) {
                return Err(problem(InputProblem::PercentOutOfRange));
            }
            Ok(SampleSpec::Percentage(p))
        }
        (None, Some(value)) => {
            let n: i64 = value
                .trim()
                .parse()
                .map_err(|_| problem(InputProblem::CountNotNumber))?;
            if n < 0 {
                return Err(problem(InputProblem::CountNegative));
            }
            let n = u32::try_from(n).map_err(|_| problem(InputProblem::CountNotNumber))?;
            Ok(SampleSpec::Count(n))
        }
        (None, None) => Err(anyhow!("Either --percent or --count is required")),
    }
}
