// src/extractors/sov.rs

// --- Imports ---
use crate::config::ExtractionConfig;
use crate::extractors::item::{Section, SovItem};
use crate::extractors::section::{
    MainStrategy, PassThroughStrategy, PcoStrategy, RowCells, RowOutcome, SectionStrategy,
};
use crate::utils::error::ExtractError;
use crate::workbook::{CellSource, WorkbookSource};
use serde::Serialize;

// --- Data Structures ---

/// Scan state of a single pass. Only a section-ending header terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    Terminated,
}

/// What one pass saw, for logging and run metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub section: Section,
    pub accepted: usize,
    pub headers: Vec<u32>,
    pub terminated_at: Option<u32>,
}

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub items: Vec<SovItem>,
    pub passes: Vec<PassReport>,
}

// --- Main Extractor Structure ---
pub struct SovExtractor {
    config: ExtractionConfig,
}

impl SovExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extracts all billable items from the configured sheet.
    /// Ids start at 1 on every call.
    pub fn extract<W: WorkbookSource>(&self, workbook: &W) -> Result<Vec<SovItem>, ExtractError> {
        self.extract_with_report(workbook).map(|extraction| extraction.items)
    }

    /// Like [`extract`](Self::extract), also returning per-pass reports.
    pub fn extract_with_report<W: WorkbookSource>(&self, workbook: &W) -> Result<Extraction, ExtractError> {
        let sheet_name = &self.config.sheet_name;

        // 1. Locate the target sheet (hard failure, nothing partial)
        let sheet = workbook.sheet(sheet_name).ok_or_else(|| {
            let available = workbook.sheet_names();
            tracing::error!("Sheet \"{}\" not found. Available sheets: {:?}", sheet_name, available);
            ExtractError::MissingSheet {
                sheet: sheet_name.clone(),
                available,
            }
        })?;
        tracing::info!("Found target sheet: \"{}\"", sheet_name);

        // 2. Run the three passes in order over their own windows
        let strategies: [&dyn SectionStrategy; 3] = [&MainStrategy, &PassThroughStrategy, &PcoStrategy];
        let mut items = Vec::new();
        let mut last_id = 0u32;
        let mut passes = Vec::with_capacity(strategies.len());

        for strategy in strategies {
            let report = self.run_pass(strategy, sheet, &mut last_id, &mut items);
            tracing::info!(
                "{} pass complete: {} items (headers at {:?}, terminated at {:?})",
                report.section,
                report.accepted,
                report.headers,
                report.terminated_at
            );
            passes.push(report);
        }

        tracing::info!("Extracted {} SOV items from \"{}\"", items.len(), sheet_name);
        Ok(Extraction { items, passes })
    }

    /// Scans one window in strict row order, appending accepted rows.
    fn run_pass<S: CellSource + ?Sized>(
        &self,
        strategy: &dyn SectionStrategy,
        sheet: &S,
        last_id: &mut u32,
        items: &mut Vec<SovItem>,
    ) -> PassReport {
        let section = strategy.section();
        let window = strategy.window(&self.config);
        let mut report = PassReport {
            section,
            accepted: 0,
            headers: Vec::new(),
            terminated_at: None,
        };
        let mut state = ScanState::Scanning;

        tracing::debug!("Processing {} section over rows {}", section, window);

        for row_number in window.rows() {
            let row = RowCells::read(sheet, row_number);
            if !row.is_blank() {
                tracing::trace!("Row {} {} data: {:?}", row_number, section, row);
            }

            match strategy.evaluate(&row, &self.config) {
                RowOutcome::Blank => {}
                RowOutcome::Header => {
                    tracing::debug!("Found {} header at row {}", section, row_number);
                    report.headers.push(row_number);
                }
                RowOutcome::EndOfSection => {
                    tracing::debug!("Found next-section header at row {} - stopping {} processing", row_number, section);
                    report.terminated_at = Some(row_number);
                    state = ScanState::Terminated;
                }
                RowOutcome::Rejected(reason) => {
                    tracing::debug!("Skipping {} row {}: {}", section, row_number, reason);
                }
                RowOutcome::Accepted(draft) => {
                    *last_id += 1;
                    tracing::debug!(
                        "Found {} item at row {}: '{}' ({})",
                        section,
                        row_number,
                        draft.description,
                        draft.this_billing_value
                    );
                    items.push(draft.into_item(*last_id));
                    report.accepted += 1;
                }
            }

            if state == ScanState::Terminated {
                break;
            }
        }

        report
    }
}

impl Default for SovExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
