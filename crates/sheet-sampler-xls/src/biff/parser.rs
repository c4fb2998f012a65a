//! Low-level binary parsing helpers for BIFF8 records.
//!
//! All multi-byte integers in BIFF8 are little-endian. Every reader takes
//! the body and a cursor offset, and advances the offset on success.

use crate::error::{XlsError, XlsResult};

/// Borrow `N` bytes at `offset`, advancing `offset`.
#[inline]
fn take<const N: usize>(data: &[u8], offset: &mut usize) -> XlsResult<[u8; N]> {
    let bytes = offset
        .checked_add(N)
        .and_then(|end| data.get(*offset..end))
        .ok_or_else(|| {
            XlsError::Parse(format!(
                "unexpected end of data at offset {}, need {} bytes",
                *offset, N
            ))
        })?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    *offset += N;
    Ok(out)
}

#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    take::<1>(data, offset).map(|b| b[0])
}

#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    take(data, offset).map(u16::from_le_bytes)
}

#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    take(data, offset).map(u32::from_le_bytes)
}

/// Read an IEEE 754 double.
#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    take(data, offset).map(f64::from_le_bytes)
}

/// Decode an RK-encoded number.
///
/// - Bit 0: the decoded number is divided by 100
/// - Bit 1: bits 2..31 are a signed 30-bit integer; otherwise they are the
///   upper 30 bits of an IEEE 754 double whose lower 34 bits are zero
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

/// Read an RK value from 4 bytes at `offset`.
#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}
