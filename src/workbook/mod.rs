// src/workbook/mod.rs
pub mod cell;
pub mod loader;

use std::collections::HashMap;

pub use cell::{read_cell, Cell, CellValue};

/// Per-address cell access for one sheet. Columns are single letters, rows 1-based.
pub trait CellSource {
    fn cell(&self, column: char, row: u32) -> Option<&Cell>;
}

/// A parsed workbook: ordered sheet names plus lookup by name.
pub trait WorkbookSource {
    type Sheet: CellSource;

    fn sheet_names(&self) -> Vec<String>;
    fn sheet(&self, name: &str) -> Option<&Self::Sheet>;
}

/// In-memory sheet keyed by (column letter, row).
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    cells: HashMap<(char, u32), Cell>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: char, row: u32, cell: Cell) {
        self.cells.insert((column.to_ascii_uppercase(), row), cell);
    }

    /// Stores a typed value with no display string.
    pub fn set(&mut self, column: char, row: u32, value: impl Into<CellValue>) {
        self.insert(column, row, Cell::new(value));
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, column: char, row: u32, value: impl Into<CellValue>) -> Self {
        self.set(column, row, value);
        self
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Highest row holding any cell, 0 for an empty sheet.
    pub fn max_row(&self) -> u32 {
        self.cells.keys().map(|(_, row)| *row).max().unwrap_or(0)
    }
}

impl CellSource for Worksheet {
    fn cell(&self, column: char, row: u32) -> Option<&Cell> {
        self.cells.get(&(column.to_ascii_uppercase(), row))
    }
}

/// In-memory workbook preserving sheet order.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Worksheet)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet, replacing any existing sheet of the same name in place.
    pub fn add_sheet(&mut self, name: impl Into<String>, sheet: Worksheet) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = sheet,
            None => self.sheets.push((name, sheet)),
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: Worksheet) -> Self {
        self.add_sheet(name, sheet);
        self
    }
}

impl WorkbookSource for Workbook {
    type Sheet = Worksheet;

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, sheet)| sheet)
    }
}
