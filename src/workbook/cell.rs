// src/workbook/cell.rs

// --- Imports ---
use crate::workbook::CellSource;
use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Longest leading decimal literal, the way spreadsheet-exported text is coerced to numbers.
static NUMERIC_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("Failed to compile NUMERIC_PREFIX_RE")
});

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d+$").expect("Failed to compile INTEGER_RE")
});

static DIGITS_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+$").expect("Failed to compile DIGITS_ONLY_RE")
});

// --- Data Structures ---

/// Typed content of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Excel serial date (1900 date system).
    Date(f64),
}

/// A stored cell: its typed value plus the display string the producing
/// application rendered for it, when one was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub formatted: Option<String>,
    pub value: CellValue,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self { formatted: None, value: value.into() }
    }

    pub fn with_formatted(value: impl Into<CellValue>, formatted: impl Into<String>) -> Self {
        Self { formatted: Some(formatted.into()), value: value.into() }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl CellValue {
    /// Whether the value counts as "present" for row qualification.
    /// Empty text, zero, NaN and `false` do not.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Number(n) => *n != 0.0 && !n.is_nan(),
            CellValue::Bool(b) => *b,
            CellValue::Date(_) => true,
        }
    }

    /// Borrow the text when the value is textual.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Permissive numeric coercion. Never fails: anything unparseable or
    /// non-finite is 0.
    pub fn coerce_number(&self) -> f64 {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_float_prefix(s).unwrap_or(0.0),
            CellValue::Empty | CellValue::Bool(_) | CellValue::Date(_) => 0.0,
        };
        if n.is_finite() { n } else { 0.0 }
    }

    /// String rendition used when a cell is stored as an item field.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format!("{}", n),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Date(serial) => match excel_serial_to_date(*serial) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => format!("{}", serial),
            },
        }
    }

    /// Display string for truthy values, `None` otherwise.
    pub fn to_optional_string(&self) -> Option<String> {
        self.is_truthy().then(|| self.to_display_string())
    }
}

// --- Cell Reader ---

/// Reads the value at `column`/`row` (1-based) of `sheet`.
///
/// Priority: the pre-rendered display string, then the typed value, then empty.
pub fn read_cell<S: CellSource + ?Sized>(sheet: &S, column: char, row: u32) -> CellValue {
    let Some(cell) = sheet.cell(column, row) else {
        return CellValue::Empty;
    };

    if let Some(text) = cell.formatted.as_deref().filter(|t| !t.is_empty()) {
        return CellValue::Text(text.to_string());
    }

    cell.value.clone()
}

// --- Coercion Helpers ---

/// Parses the longest numeric prefix of `s` after leading whitespace.
/// `"12.5kg"` gives 12.5, `"$40"` gives `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let literal = NUMERIC_PREFIX_RE.find(trimmed)?.as_str();
    literal.parse::<f64>().ok()
}

/// Strict integer interpretation of a raw cell value.
///
/// Text must be an optionally signed run of digits (surrounding whitespace allowed);
/// numbers must be integral. Falsy values never qualify.
pub fn parse_integer(value: &CellValue) -> Option<i64> {
    if !value.is_truthy() {
        return None;
    }
    match value {
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if INTEGER_RE.is_match(trimmed) {
                trimmed.parse::<i64>().ok()
            } else {
                None
            }
        }
        CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
        _ => None,
    }
}

/// True when the trimmed text is a non-empty run of ASCII digits.
pub fn is_digits_only(s: &str) -> bool {
    DIGITS_ONLY_RE.is_match(s.trim())
}

/// Converts an Excel 1900-system serial to a calendar date.
/// Serials outside chrono's date range give `None`.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 || serial >= i32::MAX as f64 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::Worksheet;

    #[test]
    fn test_read_cell_priority() {
        let mut sheet = Worksheet::new();
        sheet.insert('A', 1, Cell::with_formatted(1234.0, "$1,234.00"));
        sheet.insert('B', 1, Cell::new(42.0));
        sheet.insert('C', 1, Cell::with_formatted(7.0, ""));
        sheet.insert('D', 1, Cell::new(CellValue::Empty));

        assert_eq!(read_cell(&sheet, 'A', 1), CellValue::Text("$1,234.00".to_string()));
        assert_eq!(read_cell(&sheet, 'B', 1), CellValue::Number(42.0));
        assert_eq!(read_cell(&sheet, 'C', 1), CellValue::Number(7.0), "empty display string falls through");
        assert_eq!(read_cell(&sheet, 'D', 1), CellValue::Empty);
        assert_eq!(read_cell(&sheet, 'Z', 99), CellValue::Empty, "missing cell reads as empty");
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("12.5kg"), Some(12.5));
        assert_eq!(parse_float_prefix("  -3e2 units"), Some(-300.0));
        assert_eq!(parse_float_prefix(".75"), Some(0.75));
        assert_eq!(parse_float_prefix("1,234.00"), Some(1.0));
        assert_eq!(parse_float_prefix("$1,234.00"), None);
        assert_eq!(parse_float_prefix(""), None);
        assert_eq!(parse_float_prefix("abc"), None);
        assert_eq!(parse_float_prefix("Infinity"), Some(f64::INFINITY));
    }

    #[test]
    fn test_coerce_number_never_fails() {
        assert_eq!(CellValue::Empty.coerce_number(), 0.0);
        assert_eq!(CellValue::from("n/a").coerce_number(), 0.0);
        assert_eq!(CellValue::from("1500").coerce_number(), 1500.0);
        assert_eq!(CellValue::Number(f64::NAN).coerce_number(), 0.0);
        assert_eq!(CellValue::Bool(true).coerce_number(), 0.0);
        assert_eq!(CellValue::Date(45000.0).coerce_number(), 0.0);
        assert_eq!(CellValue::from("Infinity").coerce_number(), 0.0);
        assert_eq!(CellValue::from("-Infinity").coerce_number(), 0.0);
        assert_eq!(CellValue::Number(f64::INFINITY).coerce_number(), 0.0);
    }

    #[test]
    fn test_truthiness() {
        assert!(!CellValue::Empty.is_truthy());
        assert!(!CellValue::from("").is_truthy());
        assert!(CellValue::from(" ").is_truthy());
        assert!(!CellValue::Number(0.0).is_truthy());
        assert!(CellValue::Number(-1.0).is_truthy());
        assert!(!CellValue::Bool(false).is_truthy());
    }

    #[test]
    fn test_parse_integer_is_strict() {
        assert_eq!(parse_integer(&CellValue::from("12")), Some(12));
        assert_eq!(parse_integer(&CellValue::from(" 7 ")), Some(7));
        assert_eq!(parse_integer(&CellValue::from("12A")), None);
        assert_eq!(parse_integer(&CellValue::from("1.5")), None);
        assert_eq!(parse_integer(&CellValue::Number(14.0)), Some(14));
        assert_eq!(parse_integer(&CellValue::Number(14.5)), None);
        assert_eq!(parse_integer(&CellValue::Number(0.0)), None);
        assert_eq!(parse_integer(&CellValue::Empty), None);
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(CellValue::Number(20.0).to_display_string(), "20");
        assert_eq!(CellValue::Number(2.5).to_display_string(), "2.5");
        assert_eq!(CellValue::Bool(true).to_display_string(), "TRUE");
        assert_eq!(CellValue::Date(45292.0).to_display_string(), "2024-01-01");
        assert_eq!(CellValue::Date(-3.0).to_display_string(), "-3");
        assert_eq!(CellValue::Number(0.0).to_optional_string(), None);
        assert!(is_digits_only(" 204 "));
        assert!(!is_digits_only("204b"));
    }

    #[test]
    fn test_out_of_range_serials_fall_back_to_the_number() {
        assert_eq!(excel_serial_to_date(1e20), None);
        assert_eq!(excel_serial_to_date(f64::MAX), None);
        assert_eq!(CellValue::Date(1e20).to_display_string(), "100000000000000000000");
        assert_eq!(CellValue::Date(1e15).to_optional_string(), Some("1000000000000000".to_string()));
    }
}
