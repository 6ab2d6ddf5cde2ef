// src/lib.rs
pub mod activities;
pub mod config;
pub mod extractors;
pub mod notes;
pub mod storage;
pub mod utils;
pub mod workbook;

pub use config::ExtractionConfig;
pub use extractors::SovExtractor;
pub use utils::AppError;
