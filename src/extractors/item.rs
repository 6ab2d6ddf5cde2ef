// src/extractors/item.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which scan pass produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    Main,
    #[serde(rename = "Pass-Through")]
    PassThrough,
    #[serde(rename = "PCO")]
    Pco,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Main => "Main Contract Items",
            Section::PassThrough => "Pass-Through Items",
            Section::Pco => "PCO Items",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Main => write!(f, "Main"),
            Section::PassThrough => write!(f, "Pass-Through"),
            Section::Pco => write!(f, "PCO"),
        }
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Section::Main),
            "pass-through" | "passthrough" | "pt" => Ok(Section::PassThrough),
            "pco" => Ok(Section::Pco),
            other => Err(format!("Unknown section '{}' (expected main, pass-through or pco)", other)),
        }
    }
}

/// One billable line classified out of the SOV sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SovItem {
    pub id: u32,
    pub section: Section,
    pub line_number: u32,
    pub prime_key: Option<String>,
    pub pco_number: Option<String>,
    pub description: String,
    pub unit: Option<String>,
    pub unit_of_measure: Option<String>,
    pub unit_cost: f64,
    pub estimated_quantity: f64,
    pub contract_value: f64,
    pub markup: Option<String>,
    pub this_billing: f64,
    pub this_billing_value: f64,
    pub assigned: bool,
}

impl SovItem {
    /// Short identifier used in notes and summaries.
    pub fn label(&self) -> String {
        match (self.section, &self.pco_number) {
            (Section::PassThrough, Some(number)) => format!("Pass-Through #{}", number),
            (Section::Pco, Some(number)) => format!("PCO #{}", number),
            _ => self
                .unit
                .clone()
                .unwrap_or_else(|| format!("Line {}", self.line_number)),
        }
    }
}

/// An accepted row before it receives its id.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub section: Section,
    pub line_number: u32,
    pub prime_key: Option<String>,
    pub pco_number: Option<String>,
    pub description: String,
    pub unit: Option<String>,
    pub unit_of_measure: Option<String>,
    pub unit_cost: f64,
    pub estimated_quantity: f64,
    pub contract_value: f64,
    pub markup: Option<String>,
    pub this_billing: f64,
    pub this_billing_value: f64,
}

impl ItemDraft {
    pub fn into_item(self, id: u32) -> SovItem {
        SovItem {
            id,
            section: self.section,
            line_number: self.line_number,
            prime_key: self.prime_key,
            pco_number: self.pco_number,
            description: self.description,
            unit: self.unit,
            unit_of_measure: self.unit_of_measure,
            unit_cost: self.unit_cost,
            estimated_quantity: self.estimated_quantity,
            contract_value: self.contract_value,
            markup: self.markup,
            this_billing: self.this_billing,
            this_billing_value: self.this_billing_value,
            assigned: false,
        }
    }
}
