// src/utils/error.rs
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Failed to parse workbook: {0}")]
    Parse(String),

    #[error("Unsupported workbook format: {0}")]
    UnsupportedFormat(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Sheet \"{sheet}\" not found in workbook (available: {available:?})")]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum GroupingError {
    #[error("Unknown activity id: {0}")]
    UnknownActivity(u32),

    #[error("Unknown item id: {0}")]
    UnknownItem(u32),

    #[error("Unknown activity code: {0}")]
    UnknownCode(String),

    #[error("Item {0} is already assigned to an activity")]
    AlreadyAssigned(u32),

    #[error("Item {item} is not part of activity {activity}")]
    NotInActivity { activity: u32, item: u32 },

    #[error("No unassigned items available")]
    NoUnassignedItems,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Workbook loading failed: {0}")]
    Workbook(#[from] WorkbookError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Grouping failed: {0}")]
    Grouping(#[from] GroupingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
