// src/workbook/loader.rs
use crate::utils::error::WorkbookError;
use crate::workbook::{Cell, CellValue, Workbook, Worksheet};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;

// Extensions calamine can sniff; anything else is rejected before reading.
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reads a workbook file and converts every sheet into the in-memory model.
/// File bytes are read asynchronously; parsing itself is synchronous.
pub async fn load_workbook(path: &Path) -> Result<Workbook, WorkbookError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        tracing::warn!("Rejecting {} - not a spreadsheet file", path.display());
        return Err(WorkbookError::UnsupportedFormat(path.display().to_string()));
    }

    tracing::info!("Reading workbook from: {}", path.display());
    let bytes = tokio::fs::read(path).await?; // Propagates as WorkbookError::Io
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

    parse_workbook_bytes(bytes)
}

/// Parses raw xlsx/xls/ods bytes.
pub fn parse_workbook_bytes(bytes: Vec<u8>) -> Result<Workbook, WorkbookError> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| WorkbookError::Parse(e.to_string()))?;

    let mut workbook = Workbook::new();
    for (name, range) in sheets.worksheets() {
        let sheet = convert_range(&range);
        tracing::debug!("Loaded sheet '{}' ({} cells)", name, sheet.len());
        workbook.add_sheet(name, sheet);
    }

    Ok(workbook)
}

/// Copies the used cells of a calamine range into a [`Worksheet`].
/// Range coordinates are relative to `range.start()` and 0-based.
fn convert_range(range: &Range<Data>) -> Worksheet {
    let mut sheet = Worksheet::new();
    let Some((start_row, start_col)) = range.start() else {
        return sheet;
    };

    for (row, col, data) in range.used_cells() {
        let abs_col = start_col + col as u32;
        let Some(letter) = column_letter(abs_col) else {
            tracing::trace!("Skipping cell beyond column Z (index {})", abs_col);
            continue;
        };
        if let Some(cell) = convert_cell(data) {
            sheet.insert(letter, start_row + row as u32 + 1, cell);
        }
    }

    sheet
}

/// 0-based column index to its letter, single-letter columns only.
fn column_letter(index: u32) -> Option<char> {
    (index < 26).then(|| (b'A' + index as u8) as char)
}

fn convert_cell(data: &Data) -> Option<Cell> {
    let cell = match data {
        Data::Empty => return None,
        Data::Int(n) => Cell::new(*n as f64),
        Data::Float(n) => Cell::new(*n),
        Data::String(s) => Cell::new(s.as_str()),
        Data::Bool(b) => Cell::new(*b),
        Data::DateTime(dt) => Cell::new(CellValue::Date(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::new(s.as_str()),
        Data::Error(e) => {
            let code = e.to_string();
            Cell::with_formatted(code.as_str(), code.clone())
        }
    };
    Some(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), Some('A'));
        assert_eq!(column_letter(6), Some('G'));
        assert_eq!(column_letter(25), Some('Z'));
        assert_eq!(column_letter(26), None);
    }

    #[test]
    fn test_convert_cell_mapping() {
        assert_eq!(convert_cell(&Data::Empty), None);
        assert_eq!(convert_cell(&Data::Int(5)).unwrap().value, CellValue::Number(5.0));
        assert_eq!(
            convert_cell(&Data::String("Mobilization".to_string())).unwrap().value,
            CellValue::from("Mobilization")
        );
        assert_eq!(convert_cell(&Data::Bool(false)).unwrap().value, CellValue::Bool(false));
    }

    #[test]
    fn test_garbage_bytes_fail_to_parse() {
        let result = parse_workbook_bytes(b"definitely not a spreadsheet".to_vec());
        assert!(matches!(result, Err(WorkbookError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("sov_notes_missing_input.xlsx");
        let result = load_workbook(&path).await;
        assert!(matches!(result, Err(WorkbookError::Io(_))));
    }

    #[test]
    fn test_non_spreadsheet_extension_rejected() {
        let path = Path::new("sov_export.csv");
        let result = tokio_test::block_on(load_workbook(path));
        assert!(matches!(result, Err(WorkbookError::UnsupportedFormat(_))));
    }
}
