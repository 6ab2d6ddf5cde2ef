// src/activities/mod.rs
pub mod codes;

use crate::extractors::{Section, SovItem};
use crate::utils::error::GroupingError;
use serde::Serialize;

pub use codes::{resolve_code, ACTIVITY_CODES};

/// Label used for activities with no code selected.
pub const UNNAMED_ACTIVITY: &str = "Unnamed Activity";

/// A billing bucket and the ids of the items assigned to it, in assignment order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: u32,
    pub code: Option<&'static str>,
    pub item_ids: Vec<u32>,
}

impl Activity {
    pub fn label(&self) -> &str {
        self.code.unwrap_or(UNNAMED_ACTIVITY)
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

/// Groups extracted items into activities. The item list stays the owner of
/// each item's `assigned` flag; the board only records membership.
#[derive(Debug, Clone, Default)]
pub struct ActivityBoard {
    activities: Vec<Activity>,
}

impl ActivityBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn activity(&self, id: u32) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Adds an activity, optionally tied to a code from the taxonomy.
    pub fn add_activity(&mut self, code: Option<&str>) -> Result<u32, GroupingError> {
        let code = match code {
            Some(query) => Some(resolve_code(query).ok_or_else(|| GroupingError::UnknownCode(query.to_string()))?),
            None => None,
        };
        let id = self.activities.len() as u32 + 1;
        self.activities.push(Activity { id, code, item_ids: Vec::new() });
        tracing::debug!("Added activity {} ({})", id, code.unwrap_or(UNNAMED_ACTIVITY));
        Ok(id)
    }

    /// Returns the activity for `code`, creating it on first use.
    pub fn activity_for_code(&mut self, code: &str) -> Result<u32, GroupingError> {
        let resolved = resolve_code(code).ok_or_else(|| GroupingError::UnknownCode(code.to_string()))?;
        match self.activities.iter().find(|a| a.code == Some(resolved)) {
            Some(existing) => Ok(existing.id),
            None => self.add_activity(Some(resolved)),
        }
    }

    fn activity_mut(&mut self, id: u32) -> Result<&mut Activity, GroupingError> {
        self.activities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(GroupingError::UnknownActivity(id))
    }

    /// Assigns one item; an item belongs to at most one activity.
    pub fn assign(&mut self, items: &mut [SovItem], activity_id: u32, item_id: u32) -> Result<(), GroupingError> {
        let activity = self.activity_mut(activity_id)?;
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(GroupingError::UnknownItem(item_id))?;
        if item.assigned {
            return Err(GroupingError::AlreadyAssigned(item_id));
        }
        item.assigned = true;
        activity.item_ids.push(item_id);
        Ok(())
    }

    /// Removes an item from an activity and marks it unassigned again.
    pub fn unassign(&mut self, items: &mut [SovItem], activity_id: u32, item_id: u32) -> Result<(), GroupingError> {
        let activity = self.activity_mut(activity_id)?;
        let position = activity
            .item_ids
            .iter()
            .position(|id| *id == item_id)
            .ok_or(GroupingError::NotInActivity { activity: activity_id, item: item_id })?;
        activity.item_ids.remove(position);
        if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
            item.assigned = false;
        }
        Ok(())
    }

    /// Assigns every unassigned item matching `filter`. Returns how many moved.
    fn assign_matching<F>(&mut self, items: &mut [SovItem], activity_id: u32, filter: F) -> Result<usize, GroupingError>
    where
        F: Fn(&SovItem) -> bool,
    {
        let activity = self.activity_mut(activity_id)?;
        let mut count = 0;
        for item in items.iter_mut().filter(|i| !i.assigned && filter(i)) {
            item.assigned = true;
            activity.item_ids.push(item.id);
            count += 1;
        }
        if count == 0 {
            return Err(GroupingError::NoUnassignedItems);
        }
        Ok(count)
    }

    /// Assigns all unassigned items to one activity.
    pub fn assign_all(&mut self, items: &mut [SovItem], activity_id: u32) -> Result<usize, GroupingError> {
        self.assign_matching(items, activity_id, |_| true)
    }

    /// Assigns all unassigned items of one section to one activity.
    pub fn assign_section(
        &mut self,
        items: &mut [SovItem],
        activity_id: u32,
        section: Section,
    ) -> Result<usize, GroupingError> {
        self.assign_matching(items, activity_id, |i| i.section == section)
    }

    /// Items of an activity, in assignment order.
    pub fn items_of<'a>(&self, items: &'a [SovItem], activity_id: u32) -> Vec<&'a SovItem> {
        self.activity(activity_id)
            .map(|activity| {
                activity
                    .item_ids
                    .iter()
                    .filter_map(|id| items.iter().find(|i| i.id == *id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn activity_total(&self, items: &[SovItem], activity_id: u32) -> f64 {
        self.items_of(items, activity_id)
            .iter()
            .map(|i| i.this_billing_value)
            .sum()
    }
}

/// Counts and subtotals over an item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTotals {
    pub item_count: usize,
    pub assigned_count: usize,
    pub main: f64,
    pub pass_through: f64,
    pub pco: f64,
    pub total: f64,
}

impl SectionTotals {
    pub fn from_items(items: &[SovItem]) -> Self {
        let mut totals = SectionTotals {
            item_count: items.len(),
            ..Default::default()
        };
        for item in items {
            if item.assigned {
                totals.assigned_count += 1;
            }
            match item.section {
                Section::Main => totals.main += item.this_billing_value,
                Section::PassThrough => totals.pass_through += item.this_billing_value,
                Section::Pco => totals.pco += item.this_billing_value,
            }
        }
        totals.total = totals.main + totals.pass_through + totals.pco;
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::ItemDraft;

    fn item(id: u32, section: Section, value: f64) -> SovItem {
        ItemDraft {
            section,
            line_number: 10 + id,
            prime_key: None,
            pco_number: None,
            description: format!("Item {}", id),
            unit: None,
            unit_of_measure: None,
            unit_cost: 0.0,
            estimated_quantity: 0.0,
            contract_value: value,
            markup: None,
            this_billing: 1.0,
            this_billing_value: value,
        }
        .into_item(id)
    }

    fn sample_items() -> Vec<SovItem> {
        vec![
            item(1, Section::Main, 500.0),
            item(2, Section::Main, 50.0),
            item(3, Section::PassThrough, 1200.0),
            item(4, Section::Pco, 9000.0),
        ]
    }

    #[test]
    fn test_assign_and_unassign() {
        let mut items = sample_items();
        let mut board = ActivityBoard::new();
        let activity = board.add_activity(Some("5060")).unwrap();

        board.assign(&mut items, activity, 2).unwrap();
        assert!(items[1].assigned);
        assert_eq!(board.assign(&mut items, activity, 2), Err(GroupingError::AlreadyAssigned(2)));
        assert_eq!(board.assign(&mut items, activity, 99), Err(GroupingError::UnknownItem(99)));
        assert_eq!(board.assign(&mut items, 7, 1), Err(GroupingError::UnknownActivity(7)));
        assert_eq!(board.activity_total(&items, activity), 50.0);

        board.unassign(&mut items, activity, 2).unwrap();
        assert!(!items[1].assigned);
        assert!(board.activity(activity).unwrap().is_empty());
        assert_eq!(
            board.unassign(&mut items, activity, 2),
            Err(GroupingError::NotInActivity { activity, item: 2 })
        );
    }

    #[test]
    fn test_assign_all_takes_only_unassigned() {
        let mut items = sample_items();
        let mut board = ActivityBoard::new();
        let first = board.add_activity(None).unwrap();
        let second = board.add_activity(Some("6050")).unwrap();

        board.assign(&mut items, second, 4).unwrap();
        assert_eq!(board.assign_all(&mut items, first), Ok(3));
        assert_eq!(board.assign_all(&mut items, first), Err(GroupingError::NoUnassignedItems));
        assert_eq!(board.activity_total(&items, first), 1750.0);
        assert_eq!(board.activity(first).unwrap().label(), UNNAMED_ACTIVITY);
    }

    #[test]
    fn test_assign_section_and_code_reuse() {
        let mut items = sample_items();
        let mut board = ActivityBoard::new();
        let pco = board.activity_for_code("6050").unwrap();
        assert_eq!(board.activity_for_code("6050: MATERIALS").unwrap(), pco);
        assert_eq!(
            board.activity_for_code("1234"),
            Err(GroupingError::UnknownCode("1234".to_string()))
        );

        assert_eq!(board.assign_section(&mut items, pco, Section::Pco), Ok(1));
        let assigned: Vec<u32> = board.items_of(&items, pco).iter().map(|i| i.id).collect();
        assert_eq!(assigned, vec![4]);
    }

    #[test]
    fn test_section_totals() {
        let mut items = sample_items();
        items[0].assigned = true;
        let totals = SectionTotals::from_items(&items);
        assert_eq!(totals.item_count, 4);
        assert_eq!(totals.assigned_count, 1);
        assert_eq!(totals.main, 550.0);
        assert_eq!(totals.pass_through, 1200.0);
        assert_eq!(totals.pco, 9000.0);
        assert_eq!(totals.total, 10750.0);
    }
}
