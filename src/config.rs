// src/config.rs
use crate::utils::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Defaults for the "Unit Breakdown" template ---
pub const DEFAULT_SHEET_NAME: &str = "Unit Breakdown";
pub const DEFAULT_MAIN_ROWS: RowRange = RowRange { start: 7, end: 200 };
pub const DEFAULT_PASS_THROUGH_ROWS: RowRange = RowRange { start: 180, end: 350 };
pub const DEFAULT_PCO_ROWS: RowRange = RowRange { start: 205, end: 300 };
pub const DEFAULT_PASS_THROUGH_CEILING: u32 = 205;

/// Inclusive, 1-based row window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub fn new(start: u32, end: u32) -> Result<Self, AppError> {
        if start == 0 {
            return Err(AppError::Config(format!("Row ranges are 1-based, got start row {}", start)));
        }
        if start > end {
            return Err(AppError::Config(format!("Row range start {} is after end {}", start, end)));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.start && row <= self.end
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for RowRange {
    type Err = AppError;

    /// Parses "7-200" style ranges.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| AppError::Config(format!("Invalid row range '{}', expected START-END", s)))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| AppError::Config(format!("Invalid row number '{}' in range '{}': {}", part, s, e)))
        };
        RowRange::new(parse(start)?, parse(end)?)
    }
}

/// Scan windows and boundaries for one spreadsheet layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub sheet_name: String,
    pub main_rows: RowRange,
    pub pass_through_rows: RowRange,
    pub pco_rows: RowRange,
    /// Pass-Through items must sit strictly above this row.
    pub pass_through_ceiling: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            main_rows: DEFAULT_MAIN_ROWS,
            pass_through_rows: DEFAULT_PASS_THROUGH_ROWS,
            pco_rows: DEFAULT_PCO_ROWS,
            pass_through_ceiling: DEFAULT_PASS_THROUGH_CEILING,
        }
    }
}

impl ExtractionConfig {
    /// Loads the defaults, overridden by `SOV_*` environment variables when present.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("SOV_SHEET_NAME") {
            tracing::debug!("Using sheet name '{}' from SOV_SHEET_NAME", name);
            config.sheet_name = name;
        }
        if let Some(range) = lookup("SOV_MAIN_ROWS") {
            config.main_rows = range.parse()?;
        }
        if let Some(range) = lookup("SOV_PASS_THROUGH_ROWS") {
            config.pass_through_rows = range.parse()?;
        }
        if let Some(range) = lookup("SOV_PCO_ROWS") {
            config.pco_rows = range.parse()?;
        }
        if let Some(ceiling) = lookup("SOV_PASS_THROUGH_CEILING") {
            config.pass_through_ceiling = ceiling.trim().parse().map_err(|e| {
                AppError::Config(format!("Invalid SOV_PASS_THROUGH_CEILING '{}': {}", ceiling, e))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_template_layout() {
        let config = ExtractionConfig::default();
        assert_eq!(config.sheet_name, "Unit Breakdown");
        assert_eq!(config.main_rows, RowRange { start: 7, end: 200 });
        assert_eq!(config.pass_through_rows, RowRange { start: 180, end: 350 });
        assert_eq!(config.pco_rows, RowRange { start: 205, end: 300 });
        assert_eq!(config.pass_through_ceiling, 205);
    }

    #[test]
    fn test_row_range_parsing() {
        let range: RowRange = "10 - 20".parse().unwrap();
        assert_eq!(range, RowRange { start: 10, end: 20 });
        assert!(range.contains(10) && range.contains(20));
        assert!(!range.contains(21));
        assert_eq!(range.to_string(), "10-20");

        assert!("20-10".parse::<RowRange>().is_err());
        assert!("0-10".parse::<RowRange>().is_err());
        assert!("abc".parse::<RowRange>().is_err());
        assert!("5-x".parse::<RowRange>().is_err());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SOV_SHEET_NAME", "Breakdown v2"),
            ("SOV_PCO_ROWS", "250-400"),
            ("SOV_PASS_THROUGH_CEILING", "250"),
        ]
        .into_iter()
        .collect();

        let config = ExtractionConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.sheet_name, "Breakdown v2");
        assert_eq!(config.pco_rows, RowRange { start: 250, end: 400 });
        assert_eq!(config.pass_through_ceiling, 250);
        assert_eq!(config.main_rows, DEFAULT_MAIN_ROWS);
    }

    #[test]
    fn test_malformed_lookup_is_config_error() {
        let result = ExtractionConfig::from_lookup(|k| {
            (k == "SOV_MAIN_ROWS").then(|| "seven".to_string())
        });
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
