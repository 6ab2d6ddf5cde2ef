// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::activities::{ActivityBoard, SectionTotals};
use crate::extractors::{PassReport, SovItem};
use crate::utils::error::StorageError;
use chrono::NaiveDate;
use std::io::Write;

/// Source details recorded alongside the outputs of one run.
pub struct RunInfo<'a> {
    pub source_file: &'a Path,
    pub sheet_name: &'a str,
    pub contractor: &'a str,
    pub date: NaiveDate,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

/// Keeps file names portable: anything outside [A-Za-z0-9._-] becomes '_'.
fn sanitize_file_component(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();
    if cleaned.is_empty() { "unknown".to_string() } else { cleaned }
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory for debug artifacts, created on demand.
    pub fn debug_dir(&self) -> Result<PathBuf, StorageError> {
        let dir = self.base_dir.join("debug");
        fs::create_dir_all(&dir).map_err(StorageError::IoError)?;
        Ok(dir)
    }

    /// Saves the rendered billing note as SOV_Activities_<contractor>_<date>.txt
    pub fn save_note(&self, contractor: &str, date: NaiveDate, note: &str) -> Result<PathBuf, StorageError> {
        let filename = format!(
            "SOV_Activities_{}_{}.txt",
            sanitize_file_component(contractor),
            date.format("%Y-%m-%d")
        );
        let file_path = self.base_dir.join(filename);

        let mut file = fs::File::create(&file_path)
            .map_err(StorageError::IoError)?;
        file.write_all(note.as_bytes())
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved billing note to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves the extracted items (with their final `assigned` flags) as JSON
    pub fn save_items(&self, items: &[SovItem]) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("sov_items.json");

        let items_str = serde_json::to_string_pretty(items)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, items_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved {} items to {}", items.len(), file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the run in JSON format
    pub fn save_run_metadata(
        &self,
        run: &RunInfo<'_>,
        items: &[SovItem],
        passes: &[PassReport],
        board: &ActivityBoard,
    ) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join("sov_run_meta.json");

        let metadata = serde_json::json!({
            "source_file": run.source_file.display().to_string(),
            "sheet_name": run.sheet_name,
            "contractor": run.contractor,
            "note_date": run.date.format("%Y-%m-%d").to_string(),
            "passes": passes,
            "totals": SectionTotals::from_items(items),
            "activities": board.activities(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str)
            .map_err(StorageError::IoError)?;

        tracing::info!("Saved run metadata to {}", file_path.display());

        Ok(file_path)
    }
}
