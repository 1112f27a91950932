//! Twelve-month grid of the plan year and edit-mode click handling.

use chrono::NaiveDate;
use serde::Serialize;

use super::classify::{DayFlags, classify_year};
use super::day_index;
use crate::error::PlanError;
use crate::model::AnnualPlan;
use crate::mutate::{self, Assignment, MilestonePolicy};

/// Cell color, by precedence anchor > milestone > protected > today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Paint {
    Anchor,
    Milestone,
    Protected,
    Today,
    Default,
}

impl Paint {
    #[must_use]
    pub const fn from_flags(flags: DayFlags) -> Self {
        if flags.is_anchor {
            Self::Anchor
        } else if flags.is_milestone {
            Self::Milestone
        } else if flags.is_protected {
            Self::Protected
        } else if flags.is_today {
            Self::Today
        } else {
            Self::Default
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// Global day offset within the year.
    pub offset: u16,
    /// 1-based day of month.
    pub day: u8,
    pub paint: Paint,
    /// Past-or-today overlay. Presentational only.
    pub crossed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub month: u32,
    pub name: &'static str,
    /// Blank cells before day 1 so the first column is Monday.
    pub padding: u8,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    /// Rows of seven, with `None` for padding and trailing blanks.
    #[must_use]
    pub fn weeks(&self) -> Vec<[Option<DayCell>; 7]> {
        let mut slots: Vec<Option<DayCell>> = vec![None; usize::from(self.padding)];
        slots.extend(self.cells.iter().copied().map(Some));
        slots
            .chunks(7)
            .map(|chunk| {
                let mut row = [None; 7];
                row[..chunk.len()].copy_from_slice(chunk);
                row
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearGrid {
    pub year: i32,
    pub months: Vec<MonthGrid>,
}

impl YearGrid {
    /// Build all twelve months, recomputing today/past against `today`.
    #[must_use]
    pub fn build(plan: &AnnualPlan, today: NaiveDate) -> Self {
        let flags = classify_year(plan, today);
        let months = (1..=12)
            .map(|month| {
                let start = day_index::month_start_offset(plan.year, month);
                let len = day_index::days_in_month(plan.year, month);
                let cells = (0..len)
                    .filter_map(|i| {
                        let offset = start + i;
                        let f = *flags.get(usize::from(offset))?;
                        Some(DayCell {
                            offset,
                            day: u8::try_from(i + 1).unwrap_or(u8::MAX),
                            paint: Paint::from_flags(f),
                            crossed: f.crossed(),
                        })
                    })
                    .collect();
                MonthGrid {
                    month,
                    name: day_index::month_name(month),
                    padding: day_index::monday_padding(plan.year, month),
                    cells,
                }
            })
            .collect();
        Self {
            year: plan.year,
            months,
        }
    }

    #[must_use]
    pub fn month(&self, month: u32) -> Option<&MonthGrid> {
        self.months.iter().find(|m| m.month == month)
    }
}

/// Selected assignment while editing the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditMode {
    pub assignment: Assignment,
    pub policy: MilestonePolicy,
}

/// Click dispatch for the calendar view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSession {
    pub edit: Option<EditMode>,
}

impl CalendarSession {
    #[must_use]
    pub const fn viewing() -> Self {
        Self { edit: None }
    }

    #[must_use]
    pub const fn editing(assignment: Assignment, policy: MilestonePolicy) -> Self {
        Self {
            edit: Some(EditMode { assignment, policy }),
        }
    }

    /// Handle a click on `offset`. Outside edit mode cells are inert and
    /// this returns `Ok(None)`.
    pub fn click(&self, plan: &AnnualPlan, offset: u16) -> Result<Option<AnnualPlan>, PlanError> {
        let Some(mode) = self.edit else {
            return Ok(None);
        };
        mutate::apply_with(plan, offset, mode.assignment, mode.policy).map(Some)
    }
}
