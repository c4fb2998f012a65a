//! XLSX reader

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ahash::AHashMap;
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_cell_formats;
use sheet_sampler_core::date::serial_to_datetime;
use sheet_sampler_core::{CellAddress, CellError, CellValue, NumberFormat, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// `_x000d_` is a carriage return, `_x0009_` a tab and so on. A literal
/// `_xHHHH_` in the original text is stored with its underscore escaped as
/// `_x005f_`.
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match decode_escape(tail) {
            Some(ch) => {
                result.push(ch);
                rest = &tail[7..];
            }
            None => {
                result.push('_');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Decode one `_xHHHH_` sequence at the start of `s`
fn decode_escape(s: &str) -> Option<char> {
    if s.len() < 7 || s.as_bytes()[6] != b'_' {
        return None;
    }
    let hex = s.get(2..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Parse the ISO 8601 value of a `t="d"` cell
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Sheet entries of `xl/workbook.xml`
struct WorkbookInfo {
    /// (name, relationship id) in workbook order
    sheets: Vec<(String, String)>,
    date_1904: bool,
}

/// Workbook-wide tables needed to decode worksheet cells
struct SheetContext<'a> {
    shared_strings: &'a [String],
    cell_formats: &'a [NumberFormat],
    date_1904: bool,
}

/// A `<c>` element being parsed
#[derive(Default)]
struct PendingCell {
    row: u32,
    col: u16,
    cell_type: Option<String>,
    style: Option<usize>,
    value: Option<String>,
    formula: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_formats = Self::read_cell_formats(&mut archive)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let ctx = SheetContext {
            shared_strings: &shared_strings,
            cell_formats: &cell_formats,
            date_1904: info.date_1904,
        };

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = info.date_1904;

        for (name, r_id) in &info.sheets {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship ({})", name, r_id);
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &ctx)?;
            log::debug!(
                "read sheet '{}' from {} ({} rows)",
                name,
                path,
                worksheet.row_count()
            );
            workbook.add_existing_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        // Leading and trailing spaces inside <t> are part of the value
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" if in_si => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_cell_formats<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<NumberFormat>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_cell_formats(file),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Read workbook.xml to get sheet names, rIds and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo {
            sheets: Vec::new(),
            date_1904: false,
        };

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"workbookPr" => {
                        info.date_1904 = attr_string(&e, b"date1904")
                            .map_or(false, |s| s == "1" || s.eq_ignore_ascii_case("true"));
                    }
                    b"sheet" => {
                        let name = attr_string(&e, b"name");
                        let r_id = attr_string(&e, b"r:id");
                        if let (Some(name), Some(r_id)) = (name, r_id) {
                            info.sheets.push((name, r_id));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<AHashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = AHashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_string(&e, b"Id");
                    let target = attr_string(&e, b"Target");
                    let rel_type = attr_string(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet from the archive
    ///
    /// Every `<row>` element makes its row present, even without cells, and
    /// every `<c>` element makes its cell present, even without a value.
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        ctx: &SheetContext<'_>,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        // Row cursor, used when `r` attributes are omitted
        let mut current_row: Option<u32> = None;
        let mut next_row: u32 = 0;
        let mut next_col: u16 = 0;

        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        let row = Self::begin_row(&e, next_row, worksheet)?;
                        current_row = Some(row);
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let pending = Self::begin_cell(&e, current_row, next_col)?;
                        next_col = pending.col.saturating_add(1);
                        cell = Some(pending);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"f" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.formula = Some(String::new());
                            in_formula = true;
                        }
                    }
                    b"is" => {
                        if let Some(pending) = cell.as_mut() {
                            pending.value = Some(String::new());
                            in_inline_str = true;
                        }
                    }
                    b"rPh" if in_inline_str => in_phonetic = true,
                    b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        let row = Self::begin_row(&e, next_row, worksheet)?;
                        current_row = Some(row);
                        next_row = row + 1;
                        next_col = 0;
                    }
                    b"c" => {
                        let pending = Self::begin_cell(&e, current_row, next_col)?;
                        next_col = pending.col.saturating_add(1);
                        Self::process_cell(worksheet, pending, ctx)?;
                    }
                    b"f" => {
                        // Shared formula reference
                        if let Some(pending) = cell.as_mut() {
                            pending.formula = Some(String::new());
                        }
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            Self::process_cell(worksheet, pending, ctx)?;
                        }
                        in_value = false;
                        in_formula = false;
                        in_inline_str = false;
                        in_inline_text = false;
                        in_phonetic = false;
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_inline_text = false,
                    b"row" => current_row = None,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_formula || in_inline_text => {
                    let text = e.unescape()?;
                    if let Some(pending) = cell.as_mut() {
                        let target = if in_formula {
                            &mut pending.formula
                        } else {
                            &mut pending.value
                        };
                        target.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Mark the row of a `<row>` element as present and return its index
    fn begin_row(e: &BytesStart<'_>, next_row: u32, worksheet: &mut Worksheet) -> XlsxResult<u32> {
        let row = match attr_string(e, b"r") {
            Some(r) => r
                .parse::<u32>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .ok_or_else(|| XlsxError::Parse(format!("Invalid row number '{}'", r)))?,
            None => next_row,
        };
        worksheet.ensure_row(row)?;
        Ok(row)
    }

    /// Start a `<c>` element, positioning it by `r` or by the row cursor
    fn begin_cell(
        e: &BytesStart<'_>,
        current_row: Option<u32>,
        next_col: u16,
    ) -> XlsxResult<PendingCell> {
        let mut pending = PendingCell::default();
        let mut cell_ref = None;

        for attr in e.attributes().flatten() {
            let value = attr.unescape_value().ok().map(|s| s.to_string());
            match attr.key.as_ref() {
                b"r" => cell_ref = value,
                b"t" => pending.cell_type = value,
                b"s" => pending.style = value.and_then(|s| s.parse().ok()),
                _ => {}
            }
        }

        match cell_ref {
            Some(cell_ref) => {
                let addr = CellAddress::parse(&cell_ref).map_err(|e| {
                    XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
                })?;
                pending.row = addr.row;
                pending.col = addr.col;
            }
            None => {
                pending.row = current_row
                    .ok_or_else(|| XlsxError::Parse("Cell outside of a row".into()))?;
                pending.col = next_col;
            }
        }

        Ok(pending)
    }

    /// Decode a finished cell and store it in the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: PendingCell,
        ctx: &SheetContext<'_>,
    ) -> XlsxResult<()> {
        let PendingCell {
            row,
            col,
            cell_type,
            style,
            value,
            formula,
        } = cell;

        let cell_value = match (formula, value) {
            (Some(f), _) => CellValue::Formula(f),
            (None, None) => CellValue::Blank,
            (None, Some(value)) => match cell_type.as_deref() {
                // Shared string
                Some("s") => {
                    let idx: usize = value.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", value))
                    })?;
                    let s = ctx.shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::text(s)
                }

                Some("b") => {
                    let value = value.trim();
                    CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true"))
                }

                Some("e") => CellError::from_str(value.trim())
                    .map(CellValue::Error)
                    .unwrap_or_else(|| CellValue::text(&value)),

                Some("inlineStr") | Some("str") => CellValue::text(decode_excel_escapes(&value)),

                Some("d") => parse_iso_datetime(&value)
                    .map(CellValue::Date)
                    .unwrap_or_else(|| CellValue::text(&value)),

                None | Some("n") => match value.trim().parse::<f64>() {
                    Ok(n) => Self::number_value(n, style, ctx),
                    Err(_) => CellValue::text(&value),
                },

                // Unknown type - treat as string
                Some(_) => CellValue::text(&value),
            },
        };

        worksheet.set_value_at(row, col, cell_value)?;
        Ok(())
    }

    /// A number is a date when its cell format is a date/time format
    fn number_value(n: f64, style: Option<usize>, ctx: &SheetContext<'_>) -> CellValue {
        let is_date = style
            .and_then(|s| ctx.cell_formats.get(s))
            .is_some_and(NumberFormat::is_date_format);
        if is_date {
            if let Some(dt) = serial_to_datetime(n, ctx.date_1904) {
                return CellValue::Date(dt);
            }
        }
        CellValue::Number(n)
    }
}

fn attr_string(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}
