use chrono::NaiveDate;
use serde::Serialize;

use super::day_index;
use crate::model::AnnualPlan;

/// Independent flags for one day of the plan year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayFlags {
    pub is_anchor: bool,
    pub is_milestone: bool,
    pub is_protected: bool,
    pub is_today: bool,
    pub is_past: bool,
}

impl DayFlags {
    /// Past or today: the day gets crossed out.
    #[must_use]
    pub const fn crossed(self) -> bool {
        self.is_past || self.is_today
    }
}

/// Classify `offset` against the plan and a caller-supplied `today`.
#[must_use]
pub fn classify(plan: &AnnualPlan, offset: u16, today: NaiveDate) -> DayFlags {
    let today_offset = day_index::signed_offset(plan.year, today);
    let at = i64::from(offset);
    DayFlags {
        is_anchor: plan.anchor.day == Some(offset),
        is_milestone: plan.milestone_slot_of(offset).is_some(),
        is_protected: plan.is_protected(offset),
        is_today: at == today_offset,
        is_past: at < today_offset,
    }
}

/// Flags for every day of the plan year, indexed by offset.
#[must_use]
pub fn classify_year(plan: &AnnualPlan, today: NaiveDate) -> Vec<DayFlags> {
    (0..plan.days_in_year())
        .map(|offset| classify(plan, offset, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Milestone;

    fn today(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn flags_follow_plan_fields() {
        let mut plan = AnnualPlan::new(2026);
        plan.anchor.day = Some(100);
        plan.protected = vec![3, 4];
        plan.milestones[2] = Some(Milestone {
            days: vec![50, 52],
            ..Milestone::for_slot(2)
        });

        let flags = classify_year(&plan, today(2026, 1, 5));
        assert_eq!(flags.len(), 365);
        assert!(flags[100].is_anchor);
        assert!(flags[3].is_protected && flags[4].is_protected);
        assert!(flags[50].is_milestone && flags[52].is_milestone);
        assert!(!flags[51].is_milestone);
    }

    #[test]
    fn today_and_past_track_the_supplied_date() {
        let plan = AnnualPlan::new(2026);
        let flags = classify_year(&plan, today(2026, 1, 3));
        assert!(flags[0].is_past && flags[1].is_past);
        assert!(flags[2].is_today && !flags[2].is_past);
        assert!(!flags[3].crossed());
    }

    #[test]
    fn past_year_is_entirely_crossed() {
        let plan = AnnualPlan::new(2025);
        let flags = classify_year(&plan, today(2026, 6, 1));
        assert!(flags.iter().all(|f| f.is_past && !f.is_today));
    }

    #[test]
    fn leap_year_classifies_december_31() {
        let plan = AnnualPlan::new(2028);
        assert_eq!(classify_year(&plan, today(2028, 1, 1)).len(), 366);
    }
}
