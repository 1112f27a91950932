use chrono::NaiveDate;
use serde::Serialize;

use super::day_index;
use crate::model::AnnualPlan;

/// The next upcoming milestone and how far away it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub slot: usize,
    pub title: String,
    pub first_day: u16,
    pub days_until: i64,
}

/// Earliest milestone whose first day is on or after `today_offset`.
///
/// `today_offset` may be negative or beyond the year's end. Milestones with
/// no days never qualify.
#[must_use]
pub fn next_milestone(plan: &AnnualPlan, today_offset: i64) -> Option<Countdown> {
    plan.milestones
        .iter()
        .enumerate()
        .filter_map(|(slot, m)| {
            let m = m.as_ref()?;
            let first = m.first_day()?;
            (i64::from(first) >= today_offset).then(|| (slot, m, first))
        })
        .min_by_key(|(slot, _, first)| (*first, *slot))
        .map(|(slot, m, first)| Countdown {
            slot,
            title: m.title.clone(),
            first_day: first,
            days_until: i64::from(first) - today_offset,
        })
}

/// [`next_milestone`] relative to a calendar date.
#[must_use]
pub fn next_milestone_from(plan: &AnnualPlan, today: NaiveDate) -> Option<Countdown> {
    next_milestone(plan, day_index::signed_offset(plan.year, today))
}
