//! Canonical text form of cell values.
//!
//! Every cell copied into the output table goes through [`coerce`], so the
//! output workbook contains text only. Emptiness tests used while locating
//! the header use the same conversion.

use sheet_sampler_core::CellValue;

/// Format used for date/time cells: zero padded, 24 hour clock
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a cell, possibly absent, to its canonical text.
///
/// | Value | Text |
/// |-------|------|
/// | absent | `""` |
/// | `Text` | verbatim |
/// | `Number` | `f64` Display (`42.0` becomes `"42"`) |
/// | `Boolean` | `"true"` / `"false"` |
/// | `Date` | `YYYY-MM-DD HH:MM:SS` |
/// | `Blank`, `Error`, `Formula` | `""` |
pub fn coerce(cell: Option<&CellValue>) -> String {
    match cell {
        Some(CellValue::Text(s)) => s.as_str().to_string(),
        Some(CellValue::Number(n)) => n.to_string(),
        Some(CellValue::Boolean(b)) => b.to_string(),
        Some(CellValue::Date(dt)) => dt.format(DATE_TIME_FORMAT).to_string(),
        Some(CellValue::Blank | CellValue::Error(_) | CellValue::Formula(_)) | None => {
            String::new()
        }
    }
}

/// Whether a cell coerces to the empty string, without allocating
pub fn is_empty_value(cell: Option<&CellValue>) -> bool {
    match cell {
        Some(CellValue::Text(s)) => s.is_empty(),
        Some(CellValue::Number(_) | CellValue::Boolean(_) | CellValue::Date(_)) => false,
        Some(CellValue::Blank | CellValue::Error(_) | CellValue::Formula(_)) | None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use sheet_sampler_core::CellError;

    #[test]
    fn test_coerce_variants() {
        assert_eq!(coerce(None), "");
        assert_eq!(coerce(Some(&CellValue::text("  Vilnius "))), "  Vilnius ");
        assert_eq!(coerce(Some(&CellValue::Number(42.0))), "42");
        assert_eq!(coerce(Some(&CellValue::Number(3.5))), "3.5");
        assert_eq!(coerce(Some(&CellValue::Number(-0.25))), "-0.25");
        assert_eq!(coerce(Some(&CellValue::Boolean(true))), "true");
        assert_eq!(coerce(Some(&CellValue::Boolean(false))), "false");
        assert_eq!(coerce(Some(&CellValue::Blank)), "");
        assert_eq!(coerce(Some(&CellValue::Error(CellError::Na))), "");
        assert_eq!(coerce(Some(&CellValue::Formula("=A1+1".into()))), "");
    }

    #[test]
    fn test_coerce_date_is_zero_padded() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(7, 4, 9)
            .unwrap();
        assert_eq!(coerce(Some(&CellValue::Date(dt))), "2024-03-05 07:04:09");
    }

    #[test]
    fn test_is_empty_value_agrees_with_coerce() {
        let values = [
            CellValue::Blank,
            CellValue::text(""),
            CellValue::text("x"),
            CellValue::Number(0.0),
            CellValue::Boolean(false),
            CellValue::Error(CellError::Ref),
            CellValue::Formula(String::new()),
        ];
        for value in &values {
            assert_eq!(is_empty_value(Some(value)), coerce(Some(value)).is_empty());
        }
        assert!(is_empty_value(None));
    }
}
