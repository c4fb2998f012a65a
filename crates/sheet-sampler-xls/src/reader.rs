//! XLS (BIFF8) reader.
//!
//! Opens a Compound File Binary (CFB/OLE2) container, reads the `Workbook`
//! stream, parses BIFF8 records, and populates a `sheet_sampler_core::Workbook`.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use sheet_sampler_core::date::serial_to_datetime;
use sheet_sampler_core::{CellError, CellValue, NumberFormat, Workbook, Worksheet};

use crate::biff::parser::{read_f64, read_rk, read_u16, read_u32};
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{self, BiffRecord};
use crate::error::{XlsError, XlsResult};
use crate::styles::FormatTable;

/// XLS file reader.
pub struct XlsReader;

/// Metadata for a sheet parsed from the BOUNDSHEET record.
#[derive(Debug)]
struct SheetInfo {
    /// Sheet type: 0 = worksheet, 2 = chart, 6 = macro/VBA.
    sheet_type: u8,
    name: String,
}

/// Workbook-wide tables needed to decode cell records
struct SheetContext<'a> {
    sst: &'a [String],
    formats: &'a [NumberFormat],
    date_1904: bool,
}

impl SheetContext<'_> {
    /// A number is a date when its XF carries a date/time format
    fn number_value(&self, value: f64, xf_idx: u16) -> CellValue {
        let is_date = self
            .formats
            .get(xf_idx as usize)
            .is_some_and(NumberFormat::is_date_format);
        if is_date {
            if let Some(dt) = serial_to_datetime(value, self.date_1904) {
                return CellValue::Date(dt);
            }
        }
        CellValue::Number(value)
    }
}

impl XlsReader {
    /// Read an XLS file from a filesystem path.
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsResult<Workbook> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::read(file)
    }

    /// Read an XLS file from any `Read + Seek` source.
    pub fn read<R: Read + Seek>(reader: R) -> XlsResult<Workbook> {
        let mut cfb = cfb::CompoundFile::open(reader)?;

        // BIFF5 files name the stream "Book"; the version check rejects them
        let stream_path = if cfb.exists("/Workbook") {
            "/Workbook"
        } else if cfb.exists("/Book") {
            "/Book"
        } else {
            return Err(XlsError::InvalidFormat(
                "no Workbook or Book stream found in CFB".into(),
            ));
        };

        let mut stream_data = Vec::new();
        {
            let mut stream = cfb.open_stream(stream_path)?;
            stream.read_to_end(&mut stream_data)?;
        }

        let all_records = biff::read_all_records(&mut Cursor::new(&stream_data))?;
        Self::read_records(&all_records)
    }

    /// Build a workbook from the records of a Workbook stream.
    fn read_records(all_records: &[BiffRecord]) -> XlsResult<Workbook> {
        // Phase 1: workbook globals, up to the first EOF
        let mut sst: Vec<String> = Vec::new();
        let mut sheets: Vec<SheetInfo> = Vec::new();
        let mut date_1904 = false;
        let mut format_table = FormatTable::new();
        let mut in_globals = false;
        let mut globals_end = None;

        for (idx, rec) in all_records.iter().enumerate() {
            match rec.record_type {
                records::BOF if !in_globals => {
                    let (version, dt) = biff::parse_bof(&rec.data)?;
                    if dt != records::BOF_WORKBOOK_GLOBALS {
                        return Err(XlsError::InvalidFormat(format!(
                            "stream starts with substream type 0x{dt:04X}, not workbook globals"
                        )));
                    }
                    if version != records::BIFF8_VERSION {
                        return Err(XlsError::UnsupportedVersion(format!(
                            "expected BIFF8 (0x0600), got 0x{version:04X}"
                        )));
                    }
                    in_globals = true;
                }
                records::EOF if in_globals => {
                    globals_end = Some(idx);
                    break;
                }
                records::SST if in_globals => {
                    sst = parse_sst(&rec.data, &rec.continue_offsets)?;
                }
                records::BOUNDSHEET if in_globals => {
                    sheets.push(Self::parse_boundsheet(&rec.data)?);
                }
                records::DATEMODE if in_globals => {
                    let mut off = 0;
                    date_1904 = read_u16(&rec.data, &mut off)? == 1;
                }
                records::FORMAT if in_globals => {
                    if let Err(e) = format_table.add_format(&rec.data) {
                        log::warn!("skipping FORMAT record: {e}");
                    }
                }
                records::XF if in_globals => format_table.add_xf(&rec.data),
                _ => {}
            }
        }

        let globals_end = globals_end.ok_or_else(|| {
            XlsError::InvalidFormat("no complete workbook globals substream found".into())
        })?;

        let formats = format_table.build();
        let ctx = SheetContext {
            sst: &sst,
            formats: &formats,
            date_1904,
        };

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = date_1904;

        // Phase 2: one BOF..EOF substream per BOUNDSHEET entry, in order
        let sheet_record_groups = Self::split_sheet_records(&all_records[globals_end + 1..]);

        for (biff_idx, info) in sheets.iter().enumerate() {
            // Only worksheets; charts and macro sheets have no cell grid
            if info.sheet_type != 0 {
                continue;
            }

            let mut ws = Worksheet::new(info.name.as_str());
            match sheet_record_groups.get(biff_idx) {
                Some(sheet_records) => Self::parse_sheet_records(sheet_records, &mut ws, &ctx)?,
                None => log::warn!("sheet '{}' has no substream", info.name),
            }
            log::debug!("read sheet '{}' ({} rows)", info.name, ws.row_count());
            workbook.add_existing_worksheet(ws)?;
        }

        Ok(workbook)
    }

    /// BOUNDSHEET: stream_offset(4) + visibility(1) + type(1) + short_string
    fn parse_boundsheet(data: &[u8]) -> XlsResult<SheetInfo> {
        let mut offset = 4;
        let _visibility = data.get(offset).copied().unwrap_or(0);
        offset += 1;
        let sheet_type = data.get(offset).copied().unwrap_or(0);
        offset += 1;
        let name = read_short_string(data, &mut offset)?;

        Ok(SheetInfo { sheet_type, name })
    }

    /// Split records into per-sheet groups; each top-level BOF..EOF pair is
    /// one sheet, and nested substreams (embedded charts) stay inside it.
    fn split_sheet_records(records: &[BiffRecord]) -> Vec<Vec<&BiffRecord>> {
        let mut groups: Vec<Vec<&BiffRecord>> = Vec::new();
        let mut current: Option<Vec<&BiffRecord>> = None;
        let mut depth = 0usize;

        for rec in records {
            match rec.record_type {
                records::BOF => {
                    if depth == 0 {
                        current = Some(Vec::new());
                    }
                    depth += 1;
                }
                records::EOF => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                    }
                }
                // Only the sheet's own records, not those of embedded charts
                _ if depth == 1 => {
                    if let Some(group) = current.as_mut() {
                        group.push(rec);
                    }
                }
                _ => {}
            }
        }

        groups
    }

    /// Parse cell records from a sheet's record group.
    fn parse_sheet_records(
        records: &[&BiffRecord],
        ws: &mut Worksheet,
        ctx: &SheetContext<'_>,
    ) -> XlsResult<()> {
        for rec in records {
            let data = rec.data.as_slice();
            match rec.record_type {
                records::ROW => Self::parse_row(data, ws)?,
                records::LABELSST => Self::parse_labelsst(data, ws, ctx)?,
                records::LABEL | records::RSTRING => Self::parse_label(data, ws)?,
                records::NUMBER => Self::parse_number(data, ws, ctx)?,
                records::RK => Self::parse_rk(data, ws, ctx)?,
                records::MULRK => Self::parse_mulrk(data, ws, ctx)?,
                records::BLANK => Self::parse_blank(data, ws)?,
                records::MULBLANK => Self::parse_mulblank(data, ws)?,
                records::BOOLERR => Self::parse_boolerr(data, ws)?,
                records::FORMULA => Self::parse_formula(data, ws)?,
                _ => {}
            }
        }

        Ok(())
    }

    /// Common cell header: row(2) + col(2) + xf(2)
    fn read_cell_header(data: &[u8], off: &mut usize) -> XlsResult<(u32, u16, u16)> {
        let row = read_u16(data, off)? as u32;
        let col = read_u16(data, off)?;
        let xf_idx = read_u16(data, off)?;
        Ok((row, col, xf_idx))
    }

    /// Trailing last-column field of MULRK/MULBLANK records.
    fn read_last_col(data: &[u8], kind: &str) -> XlsResult<u16> {
        if data.len() < 6 {
            return Err(XlsError::Parse(format!("{kind} record too short")));
        }
        let mut off = data.len() - 2;
        read_u16(data, &mut off)
    }

    // ── Cell record parsers ──────────────────────────────────────────────

    /// ROW: row_index(2) + first_col(2) + last_col_plus1(2) + ...
    ///
    /// Marks the row present, even when no cell record follows for it.
    fn parse_row(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let row_index = read_u16(data, &mut off)? as u32;
        ws.ensure_row(row_index)?;
        Ok(())
    }

    /// LABELSST: row(2) + col(2) + xf(2) + sst_index(4)
    fn parse_labelsst(data: &[u8], ws: &mut Worksheet, ctx: &SheetContext<'_>) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _) = Self::read_cell_header(data, &mut off)?;
        let sst_idx = read_u32(data, &mut off)? as usize;

        let value = match ctx.sst.get(sst_idx) {
            Some(s) => CellValue::text(s),
            None => {
                log::warn!("SST index {sst_idx} out of bounds at row {row}, col {col}");
                CellValue::Blank
            }
        };
        ws.set_value_at(row, col, value)?;
        Ok(())
    }

    /// LABEL / RSTRING: row(2) + col(2) + xf(2) + unicode_string (+ runs)
    fn parse_label(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _) = Self::read_cell_header(data, &mut off)?;
        let text = read_unicode_string(data, &mut off)?;
        ws.set_value_at(row, col, CellValue::text(text))?;
        Ok(())
    }

    /// NUMBER: row(2) + col(2) + xf(2) + f64(8)
    fn parse_number(data: &[u8], ws: &mut Worksheet, ctx: &SheetContext<'_>) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, xf_idx) = Self::read_cell_header(data, &mut off)?;
        let value = read_f64(data, &mut off)?;
        ws.set_value_at(row, col, ctx.number_value(value, xf_idx))?;
        Ok(())
    }

    /// RK: row(2) + col(2) + xf(2) + rk(4)
    fn parse_rk(data: &[u8], ws: &mut Worksheet, ctx: &SheetContext<'_>) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, xf_idx) = Self::read_cell_header(data, &mut off)?;
        let value = read_rk(data, &mut off)?;
        ws.set_value_at(row, col, ctx.number_value(value, xf_idx))?;
        Ok(())
    }

    /// MULRK: row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
    fn parse_mulrk(data: &[u8], ws: &mut Worksheet, ctx: &SheetContext<'_>) -> XlsResult<()> {
        let last_col = Self::read_last_col(data, "MULRK")?;
        let rk_data_end = data.len() - 2;

        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let mut col = read_u16(data, &mut off)?;

        while off + 6 <= rk_data_end && col <= last_col {
            let xf_idx = read_u16(data, &mut off)?;
            let value = read_rk(data, &mut off)?;
            ws.set_value_at(row, col, ctx.number_value(value, xf_idx))?;
            col += 1;
        }

        Ok(())
    }

    /// BLANK: row(2) + col(2) + xf(2)
    fn parse_blank(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _) = Self::read_cell_header(data, &mut off)?;
        ws.set_value_at(row, col, CellValue::Blank)?;
        Ok(())
    }

    /// MULBLANK: row(2) + first_col(2) + [xf(2)]* + last_col(2)
    fn parse_mulblank(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let last_col = Self::read_last_col(data, "MULBLANK")?;
        let xf_data_end = data.len() - 2;

        let mut off = 0;
        let row = read_u16(data, &mut off)? as u32;
        let mut col = read_u16(data, &mut off)?;

        while off + 2 <= xf_data_end && col <= last_col {
            off += 2;
            ws.set_value_at(row, col, CellValue::Blank)?;
            col += 1;
        }
        Ok(())
    }

    /// BOOLERR: row(2) + col(2) + xf(2) + value(1) + is_error(1)
    fn parse_boolerr(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _) = Self::read_cell_header(data, &mut off)?;
        let val = data.get(off).copied().unwrap_or(0);
        let is_error = data.get(off + 1).copied().unwrap_or(0);

        let cell_value = if is_error != 0 {
            CellValue::Error(CellError::from_code(val))
        } else {
            CellValue::Boolean(val != 0)
        };

        ws.set_value_at(row, col, cell_value)?;
        Ok(())
    }

    /// FORMULA: row(2) + col(2) + xf(2) + result(8) + options(2) + ...
    ///
    /// BIFF8 stores parsed tokens rather than formula text, so the cell keeps
    /// an empty formula. The cached result is not needed.
    fn parse_formula(data: &[u8], ws: &mut Worksheet) -> XlsResult<()> {
        let mut off = 0;
        let (row, col, _) = Self::read_cell_header(data, &mut off)?;
        ws.set_value_at(row, col, CellValue::Formula(String::new()))?;
        Ok(())
    }
}
