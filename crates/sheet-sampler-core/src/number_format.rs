//! Number format types

use once_cell::sync::Lazy;
use regex::Regex;

static QUOTED_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*""#).expect("Hardcode regex pattern"));
static ESCAPED_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\.|_.|\*.").expect("Hardcode regex pattern"));
static ELAPSED_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?:h+|m+|s+)\]").expect("Hardcode regex pattern"));
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("Hardcode regex pattern"));
static AM_PM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)am/pm|a/p").expect("Hardcode regex pattern"));
static DATE_TOKENS_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[yYmMdDhHsSeEbBgG\-T/,. :年月日0]+$").expect("Hardcode regex pattern")
});
static DATE_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[yYmMdDhHsSeE年月日]").expect("Hardcode regex pattern"));

/// Number format attached to a cell through its style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;

    /// Resolve a format from its ID and an optional custom code
    ///
    /// Readers call this with the code table of the file: id 0 is General,
    /// ids with a custom code are [`NumberFormat::Custom`], the rest are
    /// built-in.
    pub fn resolve(id: u32, custom_code: Option<&str>) -> Self {
        match (id, custom_code) {
            (0, _) => NumberFormat::General,
            (_, Some(code)) => NumberFormat::Custom(code.to_string()),
            (id, None) => NumberFormat::BuiltIn(id),
        }
    }

    /// Get the format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => Self::builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }

    /// Get built-in format string by ID
    fn builtin_format_string(id: u32) -> &'static str {
        match id {
            1 => "0",
            2 => "0.00",
            3 => "#,##0",
            4 => "#,##0.00",
            9 => "0%",
            10 => "0.00%",
            11 => "0.00E+00",
            12 => "# ?/?",
            13 => "# ??/??",
            14 => "mm-dd-yy",
            15 => "d-mmm-yy",
            16 => "d-mmm",
            17 => "mmm-yy",
            18 => "h:mm AM/PM",
            19 => "h:mm:ss AM/PM",
            20 => "h:mm",
            21 => "h:mm:ss",
            22 => "m/d/yy h:mm",
            37 => "#,##0 ;(#,##0)",
            38 => "#,##0 ;[Red](#,##0)",
            39 => "#,##0.00;(#,##0.00)",
            40 => "#,##0.00;[Red](#,##0.00)",
            45 => "mm:ss",
            46 => "[h]:mm:ss",
            47 => "mmss.0",
            48 => "##0.0E+0",
            49 => "@",
            _ => "General",
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => is_date_format_code(code),
        }
    }
}

/// Classify a custom format code by its first section
fn is_date_format_code(code: &str) -> bool {
    let code = QUOTED_LITERAL.replace_all(code, "");
    let code = ESCAPED_CHAR.replace_all(&code, "");
    let section = code.split(';').next().unwrap_or_default().trim();

    if ELAPSED_TIME.is_match(section) {
        return true;
    }

    let section = BRACKETED.replace_all(section, "");
    let section = AM_PM.replace_all(&section, "");
    let section = section.trim();

    !section.is_empty() && DATE_TOKENS_ONLY.is_match(section) && DATE_LETTER.is_match(section)
}
