//! XLSX writer

use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use crate::error::XlsxResult;
use crate::styles::{DATETIME_XF, STYLES_XML};
use sheet_sampler_core::date::datetime_to_serial;
use sheet_sampler_core::{CellAddress, CellValue, Workbook, Worksheet};

/// XLSX file writer
///
/// Writes cell values only. Text goes out as inline strings, so no shared
/// string table is produced.
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Write a workbook to a writer
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip, workbook)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;
        Self::write_part(&mut zip, "xl/styles.xml", STYLES_XML)?;

        for (i, sheet) in workbook.worksheets().enumerate() {
            let content = Self::worksheet_xml(sheet);
            Self::write_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", i + 1), &content)?;
        }

        zip.finish()?;
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i + 1
            ));
        }

        content.push_str("\n</Types>");
        Self::write_part(zip, "[Content_Types].xml", &content)
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;
        Self::write_part(zip, "_rels/.rels", content)
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>"#,
        );

        for (i, sheet) in workbook.worksheets().enumerate() {
            content.push_str(&format!(
                r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                escape_xml(sheet.name()),
                i + 1,
                i + 1
            ));
        }

        content.push_str("\n    </sheets>\n</workbook>");
        Self::write_part(zip, "xl/workbook.xml", &content)
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        for i in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                i + 1
            ));
        }

        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
            workbook.sheet_count() + 1
        ));

        Self::write_part(zip, "xl/_rels/workbook.xml.rels", &content)
    }

    /// Serialize a worksheet; present rows without cells are kept as `<row/>`
    fn worksheet_xml(sheet: &Worksheet) -> String {
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>"#,
        );

        for row in sheet.rows() {
            let row_number = row.index() + 1;
            if row.is_empty() {
                content.push_str(&format!("\n        <row r=\"{}\"/>", row_number));
                continue;
            }

            content.push_str(&format!("\n        <row r=\"{}\">", row_number));
            for (col, value) in row.cells() {
                let cell_ref = CellAddress::new(row.index(), col).to_a1_string();
                content.push_str("\n            ");
                content.push_str(&Self::cell_xml(&cell_ref, value));
            }
            content.push_str("\n        </row>");
        }

        content.push_str("\n    </sheetData>\n</worksheet>");
        content
    }

    fn cell_xml(cell_ref: &str, value: &CellValue) -> String {
        match value {
            CellValue::Blank => format!("<c r=\"{}\"/>", cell_ref),
            CellValue::Text(s) => format!(
                "<c r=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                cell_ref,
                escape_xml(&encode_excel_escapes(s.as_str()))
            ),
            CellValue::Number(n) => format!("<c r=\"{}\"><v>{}</v></c>", cell_ref, n),
            CellValue::Boolean(b) => format!(
                "<c r=\"{}\" t=\"b\"><v>{}</v></c>",
                cell_ref,
                if *b { 1 } else { 0 }
            ),
            CellValue::Date(dt) => format!(
                "<c r=\"{}\" s=\"{}\"><v>{}</v></c>",
                cell_ref,
                DATETIME_XF,
                datetime_to_serial(*dt)
            ),
            CellValue::Error(e) => format!(
                "<c r=\"{}\" t=\"e\"><v>{}</v></c>",
                cell_ref,
                escape_xml(e.as_str())
            ),
            CellValue::Formula(f) => format!(
                "<c r=\"{}\"><f>{}</f></c>",
                cell_ref,
                escape_xml(f.strip_prefix('=').unwrap_or(f))
            ),
        }
    }
}

/// Encode text that XML 1.0 cannot carry as `_xHHHH_`, and protect literal
/// `_xHHHH_` sequences with `_x005F_` so the reader restores them verbatim
fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, ch) in s.char_indices() {
        match ch {
            '_' if is_escape_sequence(&s[i..]) => result.push_str("_x005F_"),
            '\t' | '\n' => result.push(ch),
            '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => {
                result.push_str(&format!("_x{:04X}_", ch as u32));
            }
            _ => result.push(ch),
        }
    }
    result
}

/// Whether `s` starts with `_xHHHH_`
fn is_escape_sequence(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
