// Integration tests for the sheet-sampler binary: exit codes, messages and
// the --json stdout contract.

use std::path::Path;
use std::process::{Command, Output};

use sheet_sampler_core::{CellValue, Workbook};
use sheet_sampler_xlsx::XlsxWriter;
use tempfile::TempDir;

fn sampler() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sheet-sampler"))
}

fn write_input(path: &Path, rows: u32) {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.push_row(["Name", "Age", "City"]).unwrap();
    for i in 0..rows {
        sheet
            .push_row([
                CellValue::text(format!("P{i}")),
                CellValue::Number(i as f64),
                CellValue::text("Klaipėda"),
            ])
            .unwrap();
    }
    XlsxWriter::write_file(&workbook, path).unwrap();
}

fn run(args: &[&str]) -> Output {
    sampler().args(args).output().expect("run sheet-sampler")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn success_prints_confirmation() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xlsx");
    write_input(&input, 10);
    let out = dir.path().to_str().unwrap();

    let output = run(&[input.to_str().unwrap(), "--output-dir", out, "--count", "3"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Duomenys sėkmingai apdoroti ir išsaugoti.\n"));
    assert!(stdout.contains("rezultatas.xlsx"));
    assert!(stdout.contains("paaiskinimas.txt"));
    assert!(dir.path().join("rezultatas.xlsx").is_file());

    let report = std::fs::read_to_string(dir.path().join("paaiskinimas.txt")).unwrap();
    assert!(report.starts_with("Atrenkami duomenys iš failo: in.xlsx\n"));
    let mappings = report
        .lines()
        .filter(|l| l.contains(" ---> ") && !l.starts_with('('));
    assert_eq!(mappings.count(), 3);
}

#[test]
fn json_summary_is_single_document() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xlsx");
    write_input(&input, 8);
    let out = dir.path().to_str().unwrap();

    let output = run(&[
        input.to_str().unwrap(),
        "-o",
        out,
        "--percent",
        "50",
        "--seed",
        "4",
        "--lang",
        "en",
        "--json",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Data processed and saved successfully."));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["report"]["row_count"], 8);
    assert_eq!(value["report"]["selected_count"], 4);
    assert_eq!(value["report"]["spec"]["mode"], "percentage");
    assert_eq!(value["report"]["entries"].as_array().unwrap().len(), 4);
    assert_eq!(value["header"]["column_count"], 3);
    assert_eq!(value["region"]["first"], 1);
    assert!(value["files"]["workbook"]
        .as_str()
        .unwrap()
        .ends_with("rezultatas.xlsx"));
}

#[test]
fn invalid_values_fail_with_one_message() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xlsx");
    write_input(&input, 3);
    let input = input.to_str().unwrap();
    let out = dir.path().to_str().unwrap();

    let cases: [(&[&str], &str); 4] = [
        (&["--count", "-1"], "Kiekis turi būti neneigiamas sveikasis skaičius.\n"),
        (&["--count", "a"], "Netinkama skaitinė reikšmė kiekiui.\n"),
        (&["--percent", "101"], "Procentai turi būti nuo 0 iki 100.\n"),
        (&["--percent", "x", "--lang", "en"], "Invalid numeric value for percent.\n"),
    ];
    for (extra, message) in cases {
        let mut args = vec![input, "-o", out];
        args.extend_from_slice(extra);
        let output = run(&args);
        assert_eq!(output.status.code(), Some(1), "{extra:?}");
        assert_eq!(stderr(&output), message);
    }
    assert!(!dir.path().join("rezultatas.xlsx").exists());
}

#[test]
fn blank_sheet_reports_missing_header() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("blank.xlsx");
    XlsxWriter::write_file(&Workbook::new(), &input).unwrap();

    let output = run(&[
        input.to_str().unwrap(),
        "-o",
        dir.path().to_str().unwrap(),
        "-c",
        "1",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Lentelėje nerasta antraštės eilutės.\n");
}

#[test]
fn missing_output_dir_is_workbook_failure() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.xlsx");
    write_input(&input, 3);
    let missing = dir.path().join("nope");

    let output = run(&[
        input.to_str().unwrap(),
        "-o",
        missing.to_str().unwrap(),
        "-c",
        "1",
        "--lang",
        "en",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.ends_with("Error while creating the Excel file.\n"), "{err}");
    assert!(err.contains("[ERROR"), "{err}");
    assert!(err.contains("rezultatas.xlsx"), "{err}");
}

#[test]
fn missing_input_names_the_cause() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nera.xlsx");

    let output = run(&[
        missing.to_str().unwrap(),
        "-o",
        dir.path().to_str().unwrap(),
        "-c",
        "1",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    let lines: Vec<&str> = err.lines().collect();
    assert_eq!(lines.last(), Some(&"Nežinoma klaida."));
    assert!(lines[0].starts_with("[ERROR"), "{err}");
    assert!(lines[0].contains("nera.xlsx"), "{err}");
    assert!(!dir.path().join("rezultatas.xlsx").exists());
}
