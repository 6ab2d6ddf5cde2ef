// src/extractors/section.rs

// --- Imports ---
use crate::config::{ExtractionConfig, RowRange};
use crate::extractors::item::{ItemDraft, Section};
use crate::extractors::pricing::{price, price_pass_through};
use crate::workbook::cell::{is_digits_only, parse_integer};
use crate::workbook::{read_cell, CellSource, CellValue};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Constants ---
// Columns A..=G carry every field the three sections use.
const FIRST_COLUMN: char = 'A';
const COLUMN_COUNT: usize = 7;

static EMPTY_CELL: CellValue = CellValue::Empty;

// --- Regex Patterns for Header Text (Lazy Static) ---
static PASS_THROUGH_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)pass-throughs").expect("Failed to compile PASS_THROUGH_HEADER_RE")
});

static CHANGE_ORDER_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)change order").expect("Failed to compile CHANGE_ORDER_HEADER_RE")
});

/// Header row that opens the Pass-Through block.
pub fn is_pass_through_header(text: &str) -> bool {
    PASS_THROUGH_HEADER_RE.is_match(text)
}

/// Header row that opens the change-order block.
pub fn is_change_order_header(text: &str) -> bool {
    CHANGE_ORDER_HEADER_RE.is_match(text)
}

// --- Data Structures ---

/// Snapshot of columns A..=G for one row, read through the cell reader.
#[derive(Debug, Clone, PartialEq)]
pub struct RowCells {
    pub row: u32,
    values: Vec<CellValue>,
}

impl RowCells {
    pub fn read<S: CellSource + ?Sized>(sheet: &S, row: u32) -> Self {
        let values = (0..COLUMN_COUNT)
            .map(|offset| read_cell(sheet, (FIRST_COLUMN as u8 + offset as u8) as char, row))
            .collect();
        Self { row, values }
    }

    pub fn get(&self, column: char) -> &CellValue {
        let index = (column.to_ascii_uppercase() as usize).wrapping_sub(FIRST_COLUMN as usize);
        self.values.get(index).unwrap_or(&EMPTY_CELL)
    }

    pub fn number(&self, column: char) -> f64 {
        self.get(column).coerce_number()
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| !v.is_truthy())
    }
}

/// What a strategy decided about one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Nothing to look at (no description).
    Blank,
    /// Section header; scanning continues.
    Header,
    /// Start of the next section; the pass stops here.
    EndOfSection,
    Rejected(&'static str),
    Accepted(ItemDraft),
}

/// Per-section classification rules for one scan pass.
pub trait SectionStrategy {
    fn section(&self) -> Section;

    fn window(&self, config: &ExtractionConfig) -> RowRange;

    fn evaluate(&self, row: &RowCells, config: &ExtractionConfig) -> RowOutcome;
}

fn description_or_line(description: &CellValue, row: u32) -> String {
    let text = description.to_display_string();
    if text.is_empty() {
        format!("Line {}", row)
    } else {
        text
    }
}

// --- Main Contract Items ---
// A=prime key, B=unit #, C=description, D=unit of measure, E=unit cost, F=est. quantity, G=contract cost
pub struct MainStrategy;

impl SectionStrategy for MainStrategy {
    fn section(&self) -> Section {
        Section::Main
    }

    fn window(&self, config: &ExtractionConfig) -> RowRange {
        config.main_rows
    }

    fn evaluate(&self, row: &RowCells, _config: &ExtractionConfig) -> RowOutcome {
        let description = row.get('C');
        if !description.is_truthy() {
            return RowOutcome::Blank;
        }

        let unit_cost = row.number('E');
        let estimated_quantity = row.number('F');
        let contract_value = row.number('G');

        if !(estimated_quantity > 0.0 || contract_value > 0.0) {
            return RowOutcome::Rejected("no estimated quantity or contract cost");
        }

        let Some(billing) = price(contract_value, unit_cost, estimated_quantity) else {
            return RowOutcome::Rejected("no billable value");
        };

        RowOutcome::Accepted(ItemDraft {
            section: Section::Main,
            line_number: row.row,
            prime_key: row.get('A').to_optional_string(),
            pco_number: None,
            description: description_or_line(description, row.row),
            unit: row.get('B').to_optional_string(),
            unit_of_measure: row.get('D').to_optional_string(),
            unit_cost,
            estimated_quantity,
            contract_value,
            markup: None,
            this_billing: billing.quantity,
            this_billing_value: billing.value,
        })
    }
}

// --- Pass-Through Items ---
// A=item number, B (or C)=description, F=markup, G=contract cost
pub struct PassThroughStrategy;

impl SectionStrategy for PassThroughStrategy {
    fn section(&self) -> Section {
        Section::PassThrough
    }

    fn window(&self, config: &ExtractionConfig) -> RowRange {
        config.pass_through_rows
    }

    fn evaluate(&self, row: &RowCells, config: &ExtractionConfig) -> RowOutcome {
        let description = if row.get('B').is_truthy() { row.get('B') } else { row.get('C') };
        if !description.is_truthy() {
            return RowOutcome::Blank;
        }

        if let Some(text) = description.as_text() {
            if is_pass_through_header(text) {
                return RowOutcome::Header;
            }
            if is_change_order_header(text) {
                return RowOutcome::EndOfSection;
            }
        }

        // Narrative text only; a bare number in the description column is a stray cell.
        let Some(text) = description.as_text() else {
            return RowOutcome::Rejected("description is not text");
        };
        if text.trim().is_empty() || is_digits_only(text) {
            return RowOutcome::Rejected("description is blank or purely numeric");
        }

        let contract_value = row.number('G');
        let Some(billing) = price_pass_through(contract_value) else {
            return RowOutcome::Rejected("no contract cost");
        };

        if row.row >= config.pass_through_ceiling {
            return RowOutcome::Rejected("below the pass-through section ceiling");
        }

        let item_number = row
            .get('A')
            .to_optional_string()
            .unwrap_or_else(|| format!("PT-{}", row.row));

        RowOutcome::Accepted(ItemDraft {
            section: Section::PassThrough,
            line_number: row.row,
            prime_key: Some(item_number.clone()),
            pco_number: Some(item_number),
            description: text.to_string(),
            unit: None,
            unit_of_measure: None,
            unit_cost: 0.0,
            estimated_quantity: 0.0,
            contract_value,
            markup: row.get('F').to_optional_string(),
            this_billing: billing.quantity,
            this_billing_value: billing.value,
        })
    }
}

// --- PCO (Project Change Order) Items ---
// B=PCO #, C=description, D=unit of measure, E=unit cost, F=est. quantity, G=contract cost
pub struct PcoStrategy;

impl SectionStrategy for PcoStrategy {
    fn section(&self) -> Section {
        Section::Pco
    }

    fn window(&self, config: &ExtractionConfig) -> RowRange {
        config.pco_rows
    }

    fn evaluate(&self, row: &RowCells, _config: &ExtractionConfig) -> RowOutcome {
        let description = row.get('C');
        if !description.is_truthy() {
            return RowOutcome::Blank;
        }

        if description.as_text().is_some_and(is_change_order_header) {
            return RowOutcome::Header;
        }

        // The gate looks at the raw source value, never the PCO-{row} placeholder.
        let pco_raw = row.get('B');
        if parse_integer(pco_raw).is_none() {
            return RowOutcome::Rejected("PCO number is not an integer");
        }

        let unit_cost = row.number('E');
        let estimated_quantity = row.number('F');
        let contract_value = row.number('G');

        if !(contract_value > 0.0 || (unit_cost > 0.0 && estimated_quantity > 0.0)) {
            return RowOutcome::Rejected("no contract cost or unit pricing");
        }

        let Some(billing) = price(contract_value, unit_cost, estimated_quantity) else {
            return RowOutcome::Rejected("no billable value");
        };

        let pco_number = pco_raw
            .to_optional_string()
            .unwrap_or_else(|| format!("PCO-{}", row.row));

        RowOutcome::Accepted(ItemDraft {
            section: Section::Pco,
            line_number: row.row,
            prime_key: Some(pco_number.clone()),
            pco_number: Some(pco_number),
            description: description_or_line(description, row.row),
            unit: None,
            unit_of_measure: row.get('D').to_optional_string(),
            unit_cost,
            estimated_quantity,
            contract_value,
            markup: None,
            this_billing: billing.quantity,
            this_billing_value: billing.value,
        })
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::{Cell, Worksheet};

    fn row_of(sheet: &Worksheet, row: u32) -> RowCells {
        RowCells::read(sheet, row)
    }

    fn accepted(outcome: RowOutcome) -> ItemDraft {
        match outcome {
            RowOutcome::Accepted(draft) => draft,
            other => panic!("expected an accepted row, got {:?}", other),
        }
    }

    #[test]
    fn test_header_predicates() {
        assert!(is_pass_through_header("PASS-THROUGHS"));
        assert!(is_pass_through_header("Pass-Throughs (at cost)"));
        assert!(!is_pass_through_header("Pass-Through"));
        assert!(is_change_order_header("Change Orders"));
        assert!(is_change_order_header("PROJECT CHANGE ORDER LOG"));
        assert!(!is_change_order_header("Changeorder"));
    }

    #[test]
    fn test_row_cells_reads_through_formatting() {
        let mut sheet = Worksheet::new();
        sheet.insert('G', 12, Cell::with_formatted(1500.0, "1500.00"));
        let row = row_of(&sheet, 12);
        assert_eq!(row.get('G'), &CellValue::from("1500.00"));
        assert_eq!(row.number('G'), 1500.0);
        assert_eq!(row.get('Z'), &CellValue::Empty);
        assert!(row_of(&sheet, 13).is_blank());
    }

    #[test]
    fn test_main_row_fields() {
        let sheet = Worksheet::new()
            .with('A', 9, "PK-1")
            .with('B', 9, "1.01")
            .with('C', 9, "Mobilization")
            .with('D', 9, "LS")
            .with('E', 9, 10.0)
            .with('F', 9, 20.0)
            .with('G', 9, 500.0);

        let draft = accepted(MainStrategy.evaluate(&row_of(&sheet, 9), &ExtractionConfig::default()));
        assert_eq!(draft.prime_key.as_deref(), Some("PK-1"));
        assert_eq!(draft.unit.as_deref(), Some("1.01"));
        assert_eq!(draft.unit_of_measure.as_deref(), Some("LS"));
        assert_eq!(draft.this_billing_value, 500.0);
        assert_eq!(draft.this_billing, 20.0);
    }

    #[test]
    fn test_main_requires_quantity_or_contract() {
        let config = ExtractionConfig::default();
        let sheet = Worksheet::new()
            .with('C', 10, "Priced but no quantity")
            .with('E', 10, 99.0)
            .with('C', 11, "Quantity without any price")
            .with('F', 11, 5.0);

        assert_eq!(
            MainStrategy.evaluate(&row_of(&sheet, 10), &config),
            RowOutcome::Rejected("no estimated quantity or contract cost")
        );
        assert_eq!(
            MainStrategy.evaluate(&row_of(&sheet, 11), &config),
            RowOutcome::Rejected("no billable value")
        );
        assert_eq!(MainStrategy.evaluate(&row_of(&sheet, 12), &config), RowOutcome::Blank);
    }

    #[test]
    fn test_pass_through_description_fallback_and_defaults() {
        let sheet = Worksheet::new()
            .with('C', 185, "Permit Fees")
            .with('F', 185, "10%")
            .with('G', 185, 800.0);

        let draft = accepted(PassThroughStrategy.evaluate(&row_of(&sheet, 185), &ExtractionConfig::default()));
        assert_eq!(draft.description, "Permit Fees");
        assert_eq!(draft.prime_key.as_deref(), Some("PT-185"));
        assert_eq!(draft.markup.as_deref(), Some("10%"));
        assert_eq!(draft.this_billing, 1.0);
        assert_eq!(draft.this_billing_value, 800.0);
    }

    #[test]
    fn test_pass_through_rejects_numbered_rows() {
        // A change-order style row (number in B) must not pass as narrative text.
        let config = ExtractionConfig::default();
        let sheet = Worksheet::new()
            .with('B', 190, "12")
            .with('C', 190, "Extra trenching")
            .with('G', 190, 900.0)
            .with('B', 191, 12.0)
            .with('G', 191, 900.0);

        assert!(matches!(
            PassThroughStrategy.evaluate(&row_of(&sheet, 190), &config),
            RowOutcome::Rejected(_)
        ));
        assert_eq!(
            PassThroughStrategy.evaluate(&row_of(&sheet, 191), &config),
            RowOutcome::Rejected("description is not text")
        );
    }

    #[test]
    fn test_pass_through_headers() {
        let config = ExtractionConfig::default();
        let sheet = Worksheet::new()
            .with('B', 181, "Pass-Throughs")
            .with('B', 182, "Change Orders");
        assert_eq!(PassThroughStrategy.evaluate(&row_of(&sheet, 181), &config), RowOutcome::Header);
        assert_eq!(PassThroughStrategy.evaluate(&row_of(&sheet, 182), &config), RowOutcome::EndOfSection);
    }

    #[test]
    fn test_pass_through_ceiling() {
        let config = ExtractionConfig::default();
        let sheet = Worksheet::new().with('B', 205, "Late entry").with('G', 205, 50.0);
        assert_eq!(
            PassThroughStrategy.evaluate(&row_of(&sheet, 205), &config),
            RowOutcome::Rejected("below the pass-through section ceiling")
        );
    }

    #[test]
    fn test_pco_unit_pricing() {
        let sheet = Worksheet::new()
            .with('B', 220, 4.0)
            .with('C', 220, "Added valve")
            .with('D', 220, "EA")
            .with('E', 220, 250.0)
            .with('F', 220, 3.0);

        let draft = accepted(PcoStrategy.evaluate(&row_of(&sheet, 220), &ExtractionConfig::default()));
        assert_eq!(draft.pco_number.as_deref(), Some("4"));
        assert_eq!(draft.prime_key.as_deref(), Some("4"));
        assert_eq!(draft.this_billing_value, 750.0);
        assert_eq!(draft.this_billing, 3.0);
    }

    #[test]
    fn test_pco_header_is_skipped() {
        let sheet = Worksheet::new().with('B', 206, 1.0).with('C', 206, "Change Orders").with('G', 206, 10.0);
        assert_eq!(
            PcoStrategy.evaluate(&row_of(&sheet, 206), &ExtractionConfig::default()),
            RowOutcome::Header
        );
    }
}
