//! Number formats from the FORMAT and XF records of the workbook globals.

use ahash::AHashMap;

use crate::biff::parser::read_u16;
use crate::biff::strings::read_unicode_string;
use crate::error::{XlsError, XlsResult};
use sheet_sampler_core::NumberFormat;

/// Format codes and the format index of each XF record, in stream order
#[derive(Debug, Default)]
pub(crate) struct FormatTable {
    formats: AHashMap<u16, String>,
    xf_formats: Vec<u16>,
}

impl FormatTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_format(&mut self, data: &[u8]) -> XlsResult<()> {
        let (id, code) = parse_format(data)?;
        self.formats.insert(id, code);
        Ok(())
    }

    /// Record the next XF; a malformed XF keeps its slot as General
    pub(crate) fn add_xf(&mut self, data: &[u8]) {
        let ifmt = parse_xf_format(data).unwrap_or_else(|e| {
            log::warn!("XF {}: {}", self.xf_formats.len(), e);
            0
        });
        self.xf_formats.push(ifmt);
    }

    /// Resolve the number format of every XF, indexed like cell records' `ixfe`
    pub(crate) fn build(&self) -> Vec<NumberFormat> {
        self.xf_formats
            .iter()
            .map(|&id| NumberFormat::resolve(id as u32, self.formats.get(&id).map(String::as_str)))
            .collect()
    }
}

/// Parse a FORMAT record (0x041E).
///
/// Layout:
///   0  u16  ifmt   - format index
///   2  ...  format string (unicode string, 2-byte length prefix)
fn parse_format(data: &[u8]) -> XlsResult<(u16, String)> {
    let mut off = 0;
    let ifmt = read_u16(data, &mut off)?;
    let s = read_unicode_string(data, &mut off)?;
    Ok((ifmt, s))
}

/// Read the format index of an XF record (0x00E0, 20 bytes in BIFF8).
///
/// Layout: `ifnt` (u16) then `ifmt` (u16); the remaining 16 bytes hold
/// alignment, borders and fill, none of which matter here.
fn parse_xf_format(data: &[u8]) -> XlsResult<u16> {
    if data.len() < 20 {
        return Err(XlsError::Parse(format!(
            "XF record too short: {} bytes (expected 20)",
            data.len()
        )));
    }
    let mut off = 2;
    read_u16(data, &mut off)
}
