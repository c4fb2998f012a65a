//! BIFF8 Unicode string decoding.
//!
//! A BIFF8 string is laid out as:
//! - char_count (2 bytes, or 1 byte for "short" strings) + flags (1 byte)
//! - flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = UTF-16LE
//! - flags bit 2 (`fExtSt`): a 4-byte extended data size follows
//! - flags bit 3 (`fRichSt`): a 2-byte rich text run count follows
//! - the character data, then 4 bytes per rich text run, then the extended
//!   data
//!
//! In the SST, character data may be split by a CONTINUE boundary. The
//! continuation then starts with a new flags byte that can switch between
//! compressed and UTF-16 encoding.

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    read_characters(data, offset, char_count, flags, &[])
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (LABEL, FORMAT).
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    read_string_at(data, offset, &[])
}

/// Read a 2-byte-prefixed string whose character data may cross any of the
/// given CONTINUE `boundaries`.
fn read_string_at(data: &[u8], offset: &mut usize, boundaries: &[usize]) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let is_rich = (flags & 0x08) != 0;
    let has_ext = (flags & 0x04) != 0;

    let run_count = if is_rich { read_u16(data, offset)? } else { 0 };
    let ext_size = if has_ext { read_u32(data, offset)? } else { 0 };

    let text = read_characters(data, offset, char_count, flags, boundaries)?;

    // Rich text runs are 4 bytes each (char_pos u16 + font_idx u16)
    *offset += run_count as usize * 4 + ext_size as usize;

    Ok(text)
}

/// Read `char_count` characters starting at `offset`.
///
/// When the data reaches a CONTINUE boundary mid-string, the next byte is a
/// fresh flags byte selecting the encoding of the remaining characters.
fn read_characters(
    data: &[u8],
    offset: &mut usize,
    char_count: usize,
    mut flags: u8,
    boundaries: &[usize],
) -> XlsResult<String> {
    let mut units: Vec<u16> = Vec::with_capacity(char_count);
    let mut remaining = char_count;

    while remaining > 0 {
        if *offset > 0 && boundaries.binary_search(offset).is_ok() {
            flags = read_u8(data, offset)?;
        }

        let width = if (flags & 0x01) != 0 { 2 } else { 1 };
        let segment_end = boundaries
            .iter()
            .copied()
            .find(|&b| b > *offset)
            .unwrap_or(data.len())
            .min(data.len());
        let take = remaining.min(segment_end.saturating_sub(*offset) / width);
        if take == 0 {
            return Err(XlsError::Parse(format!(
                "string data too short: {} characters missing at offset {}",
                remaining, *offset
            )));
        }

        let bytes = &data[*offset..*offset + take * width];
        if width == 2 {
            units.extend(
                bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]])),
            );
        } else {
            // Compressed characters are the low byte of the code point
            units.extend(bytes.iter().map(|&b| b as u16));
        }

        *offset += take * width;
        remaining -= take;
    }

    String::from_utf16(&units).map_err(|e| XlsError::Parse(format!("invalid UTF-16 string: {e}")))
}

/// Parse the SST (Shared String Table) from its merged record body.
///
/// The body starts with the total reference count (u32) and the number of
/// unique strings (u32), followed by the unique strings. `boundaries` are
/// the record's CONTINUE offsets.
pub fn parse_sst(data: &[u8], boundaries: &[usize]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_strings = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    // Cap the allocation; the count comes from the file
    let mut strings = Vec::with_capacity(unique_count.min(data.len() / 3));

    for i in 0..unique_count {
        match read_string_at(data, &mut offset, boundaries) {
            Ok(s) => strings.push(s),
            Err(e) => {
                // Some writers pad or truncate the SST; keep what was read
                log::warn!("SST parse error at string {i}/{unique_count}: {e}");
                break;
            }
        }
    }

    Ok(strings)
}
