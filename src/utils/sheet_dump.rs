// src/utils/sheet_dump.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;
use crate::config::RowRange;
use crate::utils::error::AppError;
use crate::workbook::{read_cell, CellSource};

// Columns shown in a dump; every section reads within A..=G.
const DUMP_COLUMNS: &[char] = &['A', 'B', 'C', 'D', 'E', 'F', 'G'];

/// Renders the non-empty cells of `rows` as one line per row, e.g.
/// `Row 7: A="PK-1" | C="Mobilization" | G=500`.
pub fn render_rows<S: CellSource + ?Sized>(sheet: &S, rows: RowRange) -> String {
    let mut dump = String::new();

    for row in rows.rows() {
        let cells: Vec<String> = DUMP_COLUMNS
            .iter()
            .filter_map(|column| {
                let value = read_cell(sheet, *column, row);
                if !value.is_truthy() {
                    return None;
                }
                Some(match value.as_text() {
                    Some(text) => format!("{}={:?}", column, text),
                    None => format!("{}={}", column, value.to_display_string()),
                })
            })
            .collect();

        if !cells.is_empty() {
            dump.push_str(&format!("Row {}: {}\n", row, cells.join(" | ")));
        }
    }

    dump
}

/// Writes a row dump of the sheet to `filename` for layout debugging.
pub fn save_sheet_dump<S: CellSource + ?Sized>(
    sheet: &S,
    sheet_name: &str,
    rows: RowRange,
    filename: &Path,
) -> Result<(), AppError> {
    let mut file = File::create(filename)?;

    writeln!(file, "# Sheet \"{}\" rows {}", sheet_name, rows)?;
    file.write_all(render_rows(sheet, rows).as_bytes())?;

    tracing::info!("Saved sheet dump to {}", filename.display());
    Ok(())
}
