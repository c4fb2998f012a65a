//! Read synthetic BIFF8 workbooks packed in a CFB container.

use std::io::{Cursor, Write};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sheet_sampler_core::{CellError, CellValue};
use sheet_sampler_xls::{XlsError, XlsReader};

const BOF: u16 = 0x0809;
const EOF: u16 = 0x000A;
const BOUNDSHEET: u16 = 0x0085;
const SST: u16 = 0x00FC;
const DATEMODE: u16 = 0x0022;
const FORMAT: u16 = 0x041E;
const XF: u16 = 0x00E0;
const LABELSST: u16 = 0x00FD;
const LABEL: u16 = 0x0204;
const NUMBER: u16 = 0x0203;
const RK: u16 = 0x027E;
const MULRK: u16 = 0x00BD;
const BLANK: u16 = 0x0201;
const MULBLANK: u16 = 0x00BE;
const BOOLERR: u16 = 0x0205;
const FORMULA: u16 = 0x0006;
const ROW: u16 = 0x0208;

/// Builds a BIFF8 Workbook stream record by record.
#[derive(Default)]
struct Biff {
    bytes: Vec<u8>,
}

impl Biff {
    fn record(&mut self, record_type: u16, body: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(&record_type.to_le_bytes());
        self.bytes.extend_from_slice(&(body.len() as u16).to_le_bytes());
        self.bytes.extend_from_slice(body);
        self
    }

    fn bof(&mut self, dt: u16) -> &mut Self {
        let mut body = 0x0600u16.to_le_bytes().to_vec();
        body.extend_from_slice(&dt.to_le_bytes());
        body.extend_from_slice(&[0; 12]);
        self.record(BOF, &body)
    }

    fn eof(&mut self) -> &mut Self {
        self.record(EOF, &[])
    }

    fn xf(&mut self, ifmt: u16) -> &mut Self {
        let mut body = vec![0u8; 20];
        body[2..4].copy_from_slice(&ifmt.to_le_bytes());
        self.record(XF, &body)
    }

    fn format(&mut self, id: u16, code: &str) -> &mut Self {
        let mut body = id.to_le_bytes().to_vec();
        body.extend_from_slice(&unicode(code));
        self.record(FORMAT, &body)
    }

    fn boundsheet(&mut self, name: &str) -> &mut Self {
        let mut body = vec![0, 0, 0, 0, 0, 0, name.len() as u8, 0];
        body.extend_from_slice(name.as_bytes());
        self.record(BOUNDSHEET, &body)
    }

    fn sst(&mut self, strings: &[&str]) -> &mut Self {
        let mut body = (strings.len() as u32).to_le_bytes().to_vec();
        body.extend_from_slice(&(strings.len() as u32).to_le_bytes());
        for s in strings {
            body.extend_from_slice(&unicode(s));
        }
        self.record(SST, &body)
    }

    fn cell(&mut self, record_type: u16, row: u16, col: u16, xf: u16, tail: &[u8]) -> &mut Self {
        let mut body = Vec::new();
        for v in [row, col, xf] {
            body.extend_from_slice(&v.to_le_bytes());
        }
        body.extend_from_slice(tail);
        self.record(record_type, &body)
    }

    fn row(&mut self, row: u16) -> &mut Self {
        let mut body = row.to_le_bytes().to_vec();
        body.extend_from_slice(&[0; 14]);
        self.record(ROW, &body)
    }

    /// Wrap the stream in a CFB container
    fn into_xls(self) -> Vec<u8> {
        let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        {
            let mut stream = comp.create_stream("/Workbook").unwrap();
            stream.write_all(&self.bytes).unwrap();
        }
        comp.flush().unwrap();
        comp.into_inner().into_inner()
    }
}

/// UTF-16 BIFF8 string with a 2-byte length prefix
fn unicode(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut out = (units.len() as u16).to_le_bytes().to_vec();
    out.push(0x01);
    for u in units {
        out.extend_from_slice(&u.to_le_bytes());
    }
    out
}

fn rk_int(n: i32) -> [u8; 4] {
    (((n << 2) as u32) | 0x02).to_le_bytes()
}

fn globals(biff: &mut Biff, date_1904: bool) {
    biff.bof(0x0005)
        .record(DATEMODE, &(date_1904 as u16).to_le_bytes())
        .format(164, "yyyy\\-mm\\-dd")
        .xf(0)
        .xf(164)
        .xf(2)
        .boundsheet("Duomenys")
        .sst(&["Vardas", "Pavardė"])
        .eof();
}

fn ymd(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn test_read_cell_records() {
    let mut biff = Biff::default();
    globals(&mut biff, false);
    biff.bof(0x0010)
        .row(0)
        .cell(LABELSST, 0, 0, 0, &0u32.to_le_bytes())
        .cell(LABELSST, 0, 1, 0, &1u32.to_le_bytes())
        .cell(LABEL, 0, 2, 0, &unicode("Šalis"))
        .cell(NUMBER, 1, 0, 0, &3.5f64.to_le_bytes())
        .cell(RK, 1, 1, 2, &rk_int(42))
        .cell(BOOLERR, 1, 2, 0, &[1, 0])
        .cell(BOOLERR, 1, 3, 0, &[0x07, 1])
        .cell(FORMULA, 1, 4, 0, &[0; 16])
        .cell(NUMBER, 2, 0, 1, &45292f64.to_le_bytes())
        .cell(RK, 2, 1, 1, &rk_int(45293));
    // MULRK row 3, cols 0..=1
    let mut mulrk = 3u16.to_le_bytes().to_vec();
    mulrk.extend_from_slice(&0u16.to_le_bytes());
    for n in [7, 8] {
        mulrk.extend_from_slice(&0u16.to_le_bytes());
        mulrk.extend_from_slice(&rk_int(n));
    }
    mulrk.extend_from_slice(&1u16.to_le_bytes());
    biff.record(MULRK, &mulrk).eof();

    let workbook = XlsReader::read(Cursor::new(biff.into_xls())).unwrap();
    assert_eq!(workbook.sheet_count(), 1);
    let ws = workbook.worksheet(0).unwrap();
    assert_eq!(ws.name(), "Duomenys");

    assert_eq!(ws.value("A1").unwrap(), Some(&CellValue::text("Vardas")));
    assert_eq!(ws.value("B1").unwrap(), Some(&CellValue::text("Pavardė")));
    assert_eq!(ws.value("C1").unwrap(), Some(&CellValue::text("Šalis")));
    assert_eq!(ws.value("A2").unwrap(), Some(&CellValue::Number(3.5)));
    assert_eq!(ws.value("B2").unwrap(), Some(&CellValue::Number(42.0)));
    assert_eq!(ws.value("C2").unwrap(), Some(&CellValue::Boolean(true)));
    assert_eq!(
        ws.value("D2").unwrap(),
        Some(&CellValue::Error(CellError::Div0))
    );
    assert_eq!(
        ws.value("E2").unwrap(),
        Some(&CellValue::Formula(String::new()))
    );
    assert_eq!(ws.value("A3").unwrap(), Some(&CellValue::Date(ymd(2024, 1, 1))));
    assert_eq!(ws.value("B3").unwrap(), Some(&CellValue::Date(ymd(2024, 1, 2))));
    assert_eq!(ws.value("A4").unwrap(), Some(&CellValue::Number(7.0)));
    assert_eq!(ws.value("B4").unwrap(), Some(&CellValue::Number(8.0)));
}

#[test]
fn test_present_rows_and_blank_cells() {
    let mut biff = Biff::default();
    globals(&mut biff, false);
    biff.bof(0x0010)
        .row(1)
        .row(4)
        .cell(LABELSST, 1, 0, 0, &0u32.to_le_bytes())
        .cell(BLANK, 1, 3, 0, &[]);
    // MULBLANK row 6, cols 1..=2
    let mut mulblank = 6u16.to_le_bytes().to_vec();
    mulblank.extend_from_slice(&1u16.to_le_bytes());
    mulblank.extend_from_slice(&[0, 0, 0, 0]);
    mulblank.extend_from_slice(&2u16.to_le_bytes());
    biff.record(MULBLANK, &mulblank).eof();

    let workbook = XlsReader::read(Cursor::new(biff.into_xls())).unwrap();
    let ws = workbook.worksheet(0).unwrap();

    assert!(ws.row(0).is_none());
    assert_eq!(ws.row(1).unwrap().physical_span(), 4);
    assert_eq!(ws.value("D2").unwrap(), Some(&CellValue::Blank));
    assert!(ws.row(4).unwrap().is_empty());
    assert_eq!(ws.row(6).unwrap().physical_span(), 3);
    assert_eq!(ws.row(6).unwrap().cells().count(), 2);
}

#[test]
fn test_1904_date_system() {
    let mut biff = Biff::default();
    globals(&mut biff, true);
    biff.bof(0x0010)
        .cell(NUMBER, 0, 0, 1, &43830f64.to_le_bytes())
        .eof();

    let workbook = XlsReader::read(Cursor::new(biff.into_xls())).unwrap();
    assert!(workbook.settings().date_1904);
    assert_eq!(
        workbook.worksheet(0).unwrap().value("A1").unwrap(),
        Some(&CellValue::Date(ymd(2024, 1, 1)))
    );
}

#[test]
fn test_not_a_compound_file() {
    let result = XlsReader::read(Cursor::new(b"PK\x03\x04 not ole".to_vec()));
    assert!(matches!(result, Err(XlsError::Io(_))));
}
