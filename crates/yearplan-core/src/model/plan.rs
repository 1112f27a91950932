use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::calendar::day_index;
use crate::error::PlanError;

/// Number of recurring milestone slots in a plan (one every eight weeks).
pub const MILESTONE_SLOTS: usize = 6;

/// Theme given to a freshly created plan.
pub const DEFAULT_THEME: &str = "Living Uncommon";

/// The four standing life domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Health,
    Wealth,
    Relationship,
    #[serde(rename = "Self")]
    SelfCare,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Health, Self::Wealth, Self::Relationship, Self::SelfCare];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "Health",
            Self::Wealth => "Wealth",
            Self::Relationship => "Relationship",
            Self::SelfCare => "Self",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" => Ok(Self::Health),
            "wealth" => Ok(Self::Wealth),
            "relationship" | "relationships" => Ok(Self::Relationship),
            "self" => Ok(Self::SelfCare),
            _ => Err(ParseEnumError {
                expected: "category (health, wealth, relationship, self)",
                got: s.to_string(),
            }),
        }
    }
}

/// Progress of the anchor goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
}

impl AnchorStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AnchorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnchorStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "in-progress" | "in_progress" | "doing" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "status (planned, in-progress, completed)",
                got: s.to_string(),
            }),
        }
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

/// The single year-defining, high-stakes goal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub title: String,
    pub description: String,
    pub day: Option<u16>,
    pub status: AnchorStatus,
}

/// One of the standing life-domain goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub completed: bool,
}

/// A recurring milestone event. May span several non-contiguous days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Day offsets, strictly ascending.
    pub days: Vec<u16>,
}

impl Milestone {
    /// Empty milestone bound to `slot`.
    #[must_use]
    pub fn for_slot(slot: usize) -> Self {
        Self {
            id: slot.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn first_day(&self) -> Option<u16> {
        self.days.first().copied()
    }

    #[must_use]
    pub fn contains(&self, day: u16) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    /// Insert `day` keeping the list sorted and free of duplicates.
    pub fn insert_day(&mut self, day: u16) {
        if let Err(pos) = self.days.binary_search(&day) {
            self.days.insert(pos, day);
        }
    }

    pub fn remove_day(&mut self, day: u16) -> bool {
        let before = self.days.len();
        self.days.retain(|d| *d != day);
        before != self.days.len()
    }
}

/// Which part of the plan a day belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "slot")]
pub enum DayOwner {
    Anchor,
    Protected,
    Milestone(usize),
}

impl DayOwner {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Anchor => "anchor goal",
            Self::Protected => "protected dates",
            Self::Milestone(_) => "milestones",
        }
    }
}

/// A user's year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualPlan {
    pub year: i32,
    pub theme: String,
    pub anchor: Anchor,
    pub goals: Vec<Goal>,
    pub milestones: [Option<Milestone>; MILESTONE_SLOTS],
    /// Protected day offsets, in insertion order.
    pub protected: Vec<u16>,
}

impl AnnualPlan {
    #[must_use]
    pub fn new(year: i32) -> Self {
        Self {
            year,
            theme: DEFAULT_THEME.to_string(),
            anchor: Anchor::default(),
            goals: Vec::new(),
            milestones: Default::default(),
            protected: Vec::new(),
        }
    }

    #[must_use]
    pub fn days_in_year(&self) -> u16 {
        day_index::days_in_year(self.year)
    }

    /// Reject offsets that fall outside this plan's year.
    pub fn check_offset(&self, offset: u16) -> Result<(), PlanError> {
        let days = self.days_in_year();
        if offset < days {
            Ok(())
        } else {
            Err(PlanError::OffsetOutOfRange {
                year: self.year,
                offset: i64::from(offset),
                days,
            })
        }
    }

    pub fn check_slot(slot: usize) -> Result<(), PlanError> {
        if slot < MILESTONE_SLOTS {
            Ok(())
        } else {
            Err(PlanError::SlotOutOfRange(slot))
        }
    }

    #[must_use]
    pub fn is_protected(&self, day: u16) -> bool {
        self.protected.contains(&day)
    }

    /// Slot index of the milestone holding `day`, if any.
    #[must_use]
    pub fn milestone_slot_of(&self, day: u16) -> Option<usize> {
        self.milestones
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|m| m.contains(day)))
    }

    /// First slot whose milestone is absent or has no days.
    #[must_use]
    pub fn first_unset_slot(&self) -> Option<usize> {
        self.milestones
            .iter()
            .position(|slot| slot.as_ref().is_none_or(|m| m.days.is_empty()))
    }

    #[must_use]
    pub fn owner_of(&self, day: u16) -> Option<DayOwner> {
        if self.anchor.day == Some(day) {
            return Some(DayOwner::Anchor);
        }
        if self.is_protected(day) {
            return Some(DayOwner::Protected);
        }
        self.milestone_slot_of(day).map(DayOwner::Milestone)
    }

    #[must_use]
    pub fn goals_in(&self, category: Category) -> Vec<&Goal> {
        self.goals.iter().filter(|g| g.category == category).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("HEALTH".parse::<Category>(), Ok(Category::Health));
        assert_eq!("self".parse::<Category>(), Ok(Category::SelfCare));
        assert!("career".parse::<Category>().is_err());
    }

    #[test]
    fn category_serializes_with_display_names() {
        let json = serde_json::to_string(&Category::SelfCare).expect("serialize");
        assert_eq!(json, "\"Self\"");
    }

    #[test]
    fn anchor_status_uses_kebab_case() {
        let json = serde_json::to_string(&AnchorStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in-progress\"");
        assert_eq!("done".parse::<AnchorStatus>(), Ok(AnchorStatus::Completed));
    }

    #[test]
    fn milestone_insert_keeps_order_without_duplicates() {
        let mut m = Milestone::for_slot(0);
        m.insert_day(40);
        m.insert_day(3);
        m.insert_day(40);
        m.insert_day(12);
        assert_eq!(m.days, vec![3, 12, 40]);
        assert!(m.remove_day(12));
        assert!(!m.remove_day(12));
        assert_eq!(m.first_day(), Some(3));
    }

    #[test]
    fn first_unset_slot_skips_dated_milestones() {
        let mut plan = AnnualPlan::new(2026);
        assert_eq!(plan.first_unset_slot(), Some(0));

        plan.milestones[0] = Some(Milestone {
            days: vec![5],
            ..Milestone::for_slot(0)
        });
        plan.milestones[1] = Some(Milestone::for_slot(1));
        assert_eq!(plan.first_unset_slot(), Some(1));
    }

    #[test]
    fn owner_of_reports_each_location() {
        let mut plan = AnnualPlan::new(2026);
        plan.anchor.day = Some(10);
        plan.protected.push(11);
        plan.milestones[3] = Some(Milestone {
            days: vec![12, 13],
            ..Milestone::for_slot(3)
        });

        assert_eq!(plan.owner_of(10), Some(DayOwner::Anchor));
        assert_eq!(plan.owner_of(11), Some(DayOwner::Protected));
        assert_eq!(plan.owner_of(13), Some(DayOwner::Milestone(3)));
        assert_eq!(plan.owner_of(14), None);
    }

    #[test]
    fn check_offset_respects_leap_years() {
        assert!(AnnualPlan::new(2028).check_offset(365).is_ok());
        assert!(AnnualPlan::new(2026).check_offset(365).is_err());
    }
}
