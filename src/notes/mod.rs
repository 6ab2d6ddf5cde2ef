// src/notes/mod.rs
//! Renders grouped SOV items as plain-text billing notes.

use crate::activities::{ActivityBoard, SectionTotals};
use crate::extractors::{Section, SovItem};
use chrono::NaiveDate;

// --- Constants ---
pub const NOTE_WIDTH: usize = 95;
const RULE_WIDTH: usize = 40;
const NOTE_TITLE: &str = "STATEMENT OF VALUES - ACTIVITY SUMMARY";
const SUMMARY_DESCRIPTION_CHARS: usize = 30;

/// `$1,234.56` style currency.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("${}{}.{}", sign, grouped, cents)
}

/// Breaks `text` into lines of at most `max_width` characters, preferring the
/// last space within the limit. Continuation lines are trimmed.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest: Vec<char> = text.chars().collect();
    let max_width = max_width.max(1);

    while !rest.is_empty() {
        if rest.len() <= max_width {
            lines.push(rest.iter().collect());
            break;
        }
        let break_point = rest[..=max_width]
            .iter()
            .rposition(|c| *c == ' ')
            .filter(|pos| *pos > 0)
            .unwrap_or(max_width);
        lines.push(rest[..break_point].iter().collect());
        let remainder: String = rest[break_point..].iter().collect();
        rest = remainder.trim().chars().collect();
    }

    lines
}

/// Left-pads `text` so it sits centered in `width`.
pub fn center_text(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(padding), text)
}

/// MM/DD/YYYY, the date format billing notes use.
pub fn format_note_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

fn quantity_suffix(item: &SovItem) -> String {
    format!(
        " | Qty: {} {}",
        item.this_billing,
        item.unit_of_measure.as_deref().unwrap_or("EA")
    )
}

/// One note line for an item, before wrapping.
pub fn item_line(item: &SovItem) -> String {
    let value = format_currency(item.this_billing_value);
    match item.section {
        Section::PassThrough => {
            let head = match &item.pco_number {
                Some(number) => format!("Pass-Through #{}: {}", number, item.description),
                None => format!("PT Line {}: {}", item.line_number, item.description),
            };
            format!("{} | {}", head, value)
        }
        Section::Pco => {
            let head = match &item.pco_number {
                Some(number) => format!("PCO #{}: {}", number, item.description),
                None => format!("PCO Line {}: {}", item.line_number, item.description),
            };
            format!("{}{} | {}", head, quantity_suffix(item), value)
        }
        Section::Main => format!("{}: {}{} | {}", item.label(), item.description, quantity_suffix(item), value),
    }
}

/// Wraps an item line, indenting continuations past the first colon.
fn push_wrapped(output: &mut Vec<String>, line: &str) {
    let lines = wrap_text(line, NOTE_WIDTH);
    let Some((first, rest)) = lines.split_first() else {
        return;
    };
    let indent = first.chars().position(|c| c == ':').map(|i| i + 2).unwrap_or(2);
    output.push(first.clone());
    for continuation in rest {
        output.push(format!("{}{}", " ".repeat(indent), continuation));
    }
}

/// Full billing note for every non-empty activity, followed by the SOV total.
pub fn format_note(board: &ActivityBoard, items: &[SovItem], contractor: &str, date: NaiveDate) -> String {
    let banner = "=".repeat(NOTE_WIDTH);
    let formatted_date = format_note_date(date);
    let mut output = vec![
        banner.clone(),
        center_text(NOTE_TITLE, NOTE_WIDTH),
        banner.clone(),
        String::new(),
    ];
    let mut grand_total = 0.0;

    for activity in board.activities().iter().filter(|a| !a.is_empty()) {
        let activity_items = board.items_of(items, activity.id);
        let activity_total = board.activity_total(items, activity.id);

        output.push(String::new());
        output.push(format!("ACTIVITY: {} HCSS Note", activity.label()));
        output.push("-".repeat(RULE_WIDTH));
        output.push(String::new());
        output.push(format!("Date: {}", formatted_date));
        output.push(banner.clone());
        output.push(format!("Per {} SOV:", contractor));

        for item in activity_items {
            push_wrapped(&mut output, &item_line(item));
        }

        output.push("=".repeat(RULE_WIDTH));
        output.push(format!("Total: {}", format_currency(activity_total)));
        output.push(String::new());

        grand_total += activity_total;
    }

    output.push(String::new());
    output.push(banner.clone());
    output.push(format!("SOV TOTAL: {}", format_currency(grand_total)));
    output.push(banner);

    output.join("\n")
}

/// Short per-activity review listing plus the SOV total.
pub fn activity_summary(board: &ActivityBoard, items: &[SovItem]) -> String {
    let mut output = Vec::new();
    let mut grand_total = 0.0;

    for activity in board.activities().iter().filter(|a| !a.is_empty()) {
        let activity_items = board.items_of(items, activity.id);
        let total = board.activity_total(items, activity.id);
        grand_total += total;

        output.push(format!("{}  {}", activity.label(), format_currency(total)));
        for item in activity_items {
            let description: String = item.description.chars().take(SUMMARY_DESCRIPTION_CHARS).collect();
            output.push(format!("  • {}: {}", item.label(), description));
        }
    }

    output.push(format!("SOV Total: {}", format_currency(grand_total)));
    output.join("\n")
}

/// Section subtotals block, one line per figure.
pub fn totals_report(totals: &SectionTotals) -> String {
    [
        format!("Items: {} ({} assigned)", totals.item_count, totals.assigned_count),
        format!("{}: {}", Section::Main.title(), format_currency(totals.main)),
        format!("{}: {}", Section::PassThrough.title(), format_currency(totals.pass_through)),
        format!("{}: {}", Section::Pco.title(), format_currency(totals.pco)),
        format!("SOV Total: {}", format_currency(totals.total)),
    ]
    .join("\n")
}
