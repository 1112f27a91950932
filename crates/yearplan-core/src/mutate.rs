//! Plan mutation rules.
//!
//! Every function here takes the current value and returns a new one; the
//! caller decides when to persist. The central operation is [`apply`], which
//! assigns a day of the year to exactly one part of the plan.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::debug;

use crate::error::PlanError;
use crate::model::{
    AnchorStatus, AnnualPlan, AppState, Category, DayOwner, Goal, Milestone, ParseEnumError,
    WeeklyWin, new_id,
};

/// What a calendar click assigns the day to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Assignment {
    Anchor,
    Protected,
    /// `slot` is 0-based; `None` picks the first unset slot, else slot 0.
    Milestone { slot: Option<usize> },
    Clear,
}

/// How a milestone slot grows when another day is added to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MilestonePolicy {
    /// Add the day and keep the list sorted.
    #[default]
    Accumulate,
    /// A slot holding two or more days restarts with just the new day;
    /// otherwise behaves like `Accumulate`.
    PairThenReset,
}

impl fmt::Display for MilestonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accumulate => "accumulate",
            Self::PairThenReset => "pair-then-reset",
        })
    }
}

impl FromStr for MilestonePolicy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accumulate" => Ok(Self::Accumulate),
            "pair-then-reset" | "pair_then_reset" => Ok(Self::PairThenReset),
            _ => Err(ParseEnumError {
                expected: "milestone policy (accumulate, pair-then-reset)",
                got: s.to_string(),
            }),
        }
    }
}

/// Remove `offset` from the anchor, the protected list, and every milestone.
fn clear_day(plan: &mut AnnualPlan, offset: u16) {
    if plan.anchor.day == Some(offset) {
        plan.anchor.day = None;
    }
    plan.protected.retain(|d| *d != offset);
    for milestone in plan.milestones.iter_mut().flatten() {
        milestone.remove_day(offset);
    }
}

fn add_to_slot(milestone: &mut Milestone, offset: u16, policy: MilestonePolicy) {
    if policy == MilestonePolicy::PairThenReset && milestone.days.len() >= 2 {
        milestone.days.clear();
    }
    milestone.insert_day(offset);
}

fn resolve_slot(plan: &AnnualPlan, slot: Option<usize>) -> Result<usize, PlanError> {
    match slot {
        Some(slot) => {
            AnnualPlan::check_slot(slot)?;
            Ok(slot)
        }
        None => Ok(plan.first_unset_slot().unwrap_or(0)),
    }
}

/// [`apply_with`] using [`MilestonePolicy::Accumulate`].
pub fn apply(
    plan: &AnnualPlan,
    offset: u16,
    assignment: Assignment,
) -> Result<AnnualPlan, PlanError> {
    apply_with(plan, offset, assignment, MilestonePolicy::Accumulate)
}

/// Assign `offset` to one part of the plan.
///
/// The day is first cleared from every location that could hold it, then
/// the new assignment is applied. `Clear` stops after the first step.
pub fn apply_with(
    plan: &AnnualPlan,
    offset: u16,
    assignment: Assignment,
    policy: MilestonePolicy,
) -> Result<AnnualPlan, PlanError> {
    plan.check_offset(offset)?;
    let mut next = plan.clone();
    clear_day(&mut next, offset);

    match assignment {
        Assignment::Anchor => next.anchor.day = Some(offset),
        Assignment::Protected => next.protected.push(offset),
        Assignment::Milestone { slot } => {
            let slot = resolve_slot(&next, slot)?;
            let milestone = next.milestones[slot].get_or_insert_with(|| Milestone::for_slot(slot));
            add_to_slot(milestone, offset, policy);
        }
        Assignment::Clear => {}
    }

    debug!(offset, ?assignment, %policy, "applied calendar assignment");
    Ok(next)
}

/// Result of a click in the onboarding milestone picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickOutcome {
    pub plan: AnnualPlan,
    pub slot: usize,
    /// `true` if the day was added, `false` if it was toggled off.
    pub added: bool,
}

/// Onboarding milestone picker: toggle `offset` in a milestone slot.
///
/// Days owned by the anchor or the protected list are blocked. The target
/// slot is `slot` if given, else the slot already holding the day, else the
/// first unset slot. Adding follows [`MilestonePolicy::PairThenReset`].
pub fn pick_milestone_day(
    plan: &AnnualPlan,
    offset: u16,
    slot: Option<usize>,
) -> Result<PickOutcome, PlanError> {
    plan.check_offset(offset)?;
    if let Some(owner @ (DayOwner::Anchor | DayOwner::Protected)) = plan.owner_of(offset) {
        return Err(PlanError::DayBlocked {
            offset,
            owner: owner.label(),
        });
    }

    let target = match slot {
        Some(slot) => {
            AnnualPlan::check_slot(slot)?;
            slot
        }
        None => plan
            .milestone_slot_of(offset)
            .or_else(|| plan.first_unset_slot())
            .ok_or(PlanError::NoFreeSlot)?,
    };

    let mut next = plan.clone();
    let milestone = next.milestones[target].get_or_insert_with(|| Milestone::for_slot(target));
    let added = if milestone.remove_day(offset) {
        false
    } else {
        add_to_slot(milestone, offset, MilestonePolicy::PairThenReset);
        true
    };

    // A day lives in one slot only; drop it from any other slot.
    if added {
        next.milestones
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .filter_map(|(_, m)| m.as_mut())
            .for_each(|other| {
                other.remove_day(offset);
            });
    }

    Ok(PickOutcome {
        plan: next,
        slot: target,
        added,
    })
}

/// Onboarding protected-day picker: toggle `offset` in the protected list.
///
/// Returns the new plan and whether the day is now protected.
pub fn toggle_protected(plan: &AnnualPlan, offset: u16) -> Result<(AnnualPlan, bool), PlanError> {
    if plan.is_protected(offset) {
        let next = apply(plan, offset, Assignment::Clear)?;
        Ok((next, false))
    } else {
        let next = apply(plan, offset, Assignment::Protected)?;
        Ok((next, true))
    }
}

#[must_use]
pub fn set_theme(plan: &AnnualPlan, theme: &str) -> AnnualPlan {
    let mut next = plan.clone();
    next.theme = theme.to_string();
    next
}

/// Field edits for the anchor goal; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AnchorUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<AnchorStatus>,
}

#[must_use]
pub fn update_anchor(plan: &AnnualPlan, update: AnchorUpdate) -> AnnualPlan {
    let mut next = plan.clone();
    if let Some(title) = update.title {
        next.anchor.title = title;
    }
    if let Some(description) = update.description {
        next.anchor.description = description;
    }
    if let Some(status) = update.status {
        next.anchor.status = status;
    }
    next
}

/// Append a goal. Blank titles are rejected.
pub fn add_goal(
    plan: &AnnualPlan,
    category: Category,
    title: &str,
    description: &str,
) -> Result<(AnnualPlan, Goal), PlanError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(PlanError::EmptyTitle);
    }
    let goal = Goal {
        id: new_id(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        completed: false,
    };
    let mut next = plan.clone();
    next.goals.push(goal.clone());
    Ok((next, goal))
}

/// Field edits for a goal; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub completed: Option<bool>,
}

pub fn update_goal(
    plan: &AnnualPlan,
    goal_id: &str,
    update: GoalUpdate,
) -> Result<AnnualPlan, PlanError> {
    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(PlanError::EmptyTitle);
    }
    let mut next = plan.clone();
    let goal = next
        .goals
        .iter_mut()
        .find(|g| g.id == goal_id)
        .ok_or_else(|| PlanError::GoalNotFound(goal_id.to_string()))?;
    if let Some(title) = update.title {
        goal.title = title.trim().to_string();
    }
    if let Some(description) = update.description {
        goal.description = description;
    }
    if let Some(category) = update.category {
        goal.category = category;
    }
    if let Some(completed) = update.completed {
        goal.completed = completed;
    }
    Ok(next)
}

pub fn toggle_goal(plan: &AnnualPlan, goal_id: &str) -> Result<AnnualPlan, PlanError> {
    let completed = plan
        .goals
        .iter()
        .find(|g| g.id == goal_id)
        .map(|g| !g.completed)
        .ok_or_else(|| PlanError::GoalNotFound(goal_id.to_string()))?;
    update_goal(
        plan,
        goal_id,
        GoalUpdate {
            completed: Some(completed),
            ..GoalUpdate::default()
        },
    )
}

pub fn remove_goal(plan: &AnnualPlan, goal_id: &str) -> Result<AnnualPlan, PlanError> {
    if !plan.goals.iter().any(|g| g.id == goal_id) {
        return Err(PlanError::GoalNotFound(goal_id.to_string()));
    }
    let mut next = plan.clone();
    next.goals.retain(|g| g.id != goal_id);
    Ok(next)
}

/// Set title and/or description of a milestone slot, creating it if empty.
pub fn set_milestone_details(
    plan: &AnnualPlan,
    slot: usize,
    title: Option<String>,
    description: Option<String>,
) -> Result<AnnualPlan, PlanError> {
    AnnualPlan::check_slot(slot)?;
    let mut next = plan.clone();
    let milestone = next.milestones[slot].get_or_insert_with(|| Milestone::for_slot(slot));
    if let Some(title) = title {
        milestone.title = title;
    }
    if let Some(description) = description {
        milestone.description = description;
    }
    Ok(next)
}

/// Empty a milestone slot, releasing its days.
pub fn remove_milestone(plan: &AnnualPlan, slot: usize) -> Result<AnnualPlan, PlanError> {
    AnnualPlan::check_slot(slot)?;
    let mut next = plan.clone();
    next.milestones[slot] = None;
    Ok(next)
}

pub fn toggle_prep_item(state: &AppState, item_id: &str) -> Result<AppState, PlanError> {
    let mut next = state.clone();
    let item = next
        .prep
        .iter_mut()
        .find(|p| p.id == item_id)
        .ok_or_else(|| PlanError::PrepItemNotFound(item_id.to_string()))?;
    item.completed = !item.completed;
    Ok(next)
}

/// Prepend a weekly review so the list stays newest first.
#[must_use]
pub fn record_weekly_win(state: &AppState, win: WeeklyWin) -> AppState {
    let mut next = state.clone();
    next.weekly_wins.insert(0, win);
    next
}

/// Mark onboarding done. The anchor goal must have a day.
pub fn complete_onboarding(state: &AppState) -> Result<AppState, PlanError> {
    if state.plan.anchor.day.is_none() {
        return Err(PlanError::AnchorDateMissing);
    }
    let mut next = state.clone();
    next.onboarding_complete = true;
    Ok(next)
}

/// Number of milestone slots that have at least one day.
#[must_use]
pub fn scheduled_milestones(plan: &AnnualPlan) -> usize {
    plan.milestones
        .iter()
        .flatten()
        .filter(|m| !m.days.is_empty())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryWin, MILESTONE_SLOTS, WeekStatus};
    use chrono::NaiveDate;

    fn plan_with_slot(slot: usize, days: &[u16]) -> AnnualPlan {
        let mut plan = AnnualPlan::new(2026);
        plan.milestones[slot] = Some(Milestone {
            title: format!("trip {slot}"),
            days: days.to_vec(),
            ..Milestone::for_slot(slot)
        });
        plan
    }

    fn days(plan: &AnnualPlan, slot: usize) -> Vec<u16> {
        plan.milestones[slot]
            .as_ref()
            .map(|m| m.days.clone())
            .unwrap_or_default()
    }

    #[test]
    fn protecting_the_anchor_day_moves_it() {
        let mut plan = AnnualPlan::new(2026);
        plan.anchor.day = Some(10);

        let next = apply(&plan, 10, Assignment::Protected).expect("apply");
        assert_eq!(next.anchor.day, None);
        assert_eq!(next.protected, vec![10]);
        // input untouched
        assert_eq!(plan.anchor.day, Some(10));
    }

    #[test]
    fn anchor_assignment_clears_other_locations() {
        let mut plan = plan_with_slot(1, &[7, 8]);
        plan.protected = vec![3, 8];

        let next = apply(&plan, 8, Assignment::Anchor).expect("apply");
        assert_eq!(next.anchor.day, Some(8));
        assert_eq!(next.protected, vec![3]);
        assert_eq!(days(&next, 1), vec![7]);
    }

    #[test]
    fn moving_the_anchor_releases_the_old_day() {
        let mut plan = AnnualPlan::new(2026);
        plan.anchor.day = Some(4);
        let next = apply(&plan, 9, Assignment::Anchor).expect("apply");
        assert_eq!(next.anchor.day, Some(9));
    }

    #[test]
    fn clear_removes_day_everywhere() {
        let mut plan = plan_with_slot(0, &[2, 5, 9]);
        plan.protected = vec![1];
        let next = apply(&plan, 5, Assignment::Clear).expect("apply");
        assert_eq!(days(&next, 0), vec![2, 9]);

        let next = apply(&next, 1, Assignment::Clear).expect("apply");
        assert!(next.protected.is_empty());
    }

    #[test]
    fn accumulate_appends_and_sorts() {
        let plan = plan_with_slot(2, &[5, 6]);
        let next = apply(&plan, 20, Assignment::Milestone { slot: Some(2) }).expect("apply");
        assert_eq!(days(&next, 2), vec![5, 6, 20]);

        let next = apply(&next, 1, Assignment::Milestone { slot: Some(2) }).expect("apply");
        assert_eq!(days(&next, 2), vec![1, 5, 6, 20]);
    }

    #[test]
    fn pair_then_reset_restarts_full_slots() {
        let plan = plan_with_slot(2, &[5, 6]);
        let next = apply_with(
            &plan,
            20,
            Assignment::Milestone { slot: Some(2) },
            MilestonePolicy::PairThenReset,
        )
        .expect("apply");
        assert_eq!(days(&next, 2), vec![20]);

        let next = apply_with(
            &next,
            21,
            Assignment::Milestone { slot: Some(2) },
            MilestonePolicy::PairThenReset,
        )
        .expect("apply");
        assert_eq!(days(&next, 2), vec![20, 21]);
        // title survives the reset
        assert_eq!(next.milestones[2].as_ref().map(|m| m.title.as_str()), Some("trip 2"));
    }

    #[test]
    fn milestone_without_slot_uses_first_unset_then_slot_zero() {
        let plan = plan_with_slot(0, &[30]);
        let next = apply(&plan, 40, Assignment::Milestone { slot: None }).expect("apply");
        assert_eq!(days(&next, 1), vec![40]);
        assert_eq!(next.milestones[1].as_ref().map(|m| m.id.as_str()), Some("1"));

        let mut full = AnnualPlan::new(2026);
        for slot in 0..MILESTONE_SLOTS {
            full.milestones[slot] = Some(Milestone {
                days: vec![u16::try_from(slot).expect("small") * 10],
                ..Milestone::for_slot(slot)
            });
        }
        let next = apply(&full, 300, Assignment::Milestone { slot: None }).expect("apply");
        assert_eq!(days(&next, 0), vec![0, 300]);
    }

    #[test]
    fn reassigning_a_milestone_day_moves_it_between_slots() {
        let plan = plan_with_slot(0, &[30, 31]);
        let next = apply(&plan, 31, Assignment::Milestone { slot: Some(4) }).expect("apply");
        assert_eq!(days(&next, 0), vec![30]);
        assert_eq!(days(&next, 4), vec![31]);
    }

    #[test]
    fn apply_rejects_bad_offset_and_slot() {
        let plan = AnnualPlan::new(2026);
        assert!(matches!(
            apply(&plan, 365, Assignment::Anchor),
            Err(PlanError::OffsetOutOfRange { .. })
        ));
        assert!(matches!(
            apply(&plan, 3, Assignment::Milestone { slot: Some(6) }),
            Err(PlanError::SlotOutOfRange(6))
        ));
    }

    #[test]
    fn picker_toggles_and_blocks() {
        let mut plan = AnnualPlan::new(2026);
        plan.anchor.day = Some(50);
        plan.protected = vec![51];

        assert!(matches!(
            pick_milestone_day(&plan, 50, None),
            Err(PlanError::DayBlocked { .. })
        ));
        assert!(matches!(
            pick_milestone_day(&plan, 51, Some(0)),
            Err(PlanError::DayBlocked { .. })
        ));

        let first = pick_milestone_day(&plan, 60, None).expect("pick");
        assert!(first.added);
        assert_eq!(first.slot, 0);

        let second = pick_milestone_day(&first.plan, 61, Some(0)).expect("pick");
        assert_eq!(days(&second.plan, 0), vec![60, 61]);

        // clicking an owned day without a slot toggles it off in its slot
        let third = pick_milestone_day(&second.plan, 61, None).expect("pick");
        assert!(!third.added);
        assert_eq!(days(&third.plan, 0), vec![60]);
    }

    #[test]
    fn picker_resets_after_two_days() {
        let plan = plan_with_slot(3, &[5, 6]);
        let out = pick_milestone_day(&plan, 20, Some(3)).expect("pick");
        assert_eq!(days(&out.plan, 3), vec![20]);
    }

    #[test]
    fn picker_without_free_slot_errors() {
        let mut plan = AnnualPlan::new(2026);
        for slot in 0..MILESTONE_SLOTS {
            plan.milestones[slot] = Some(Milestone {
                days: vec![u16::try_from(slot).expect("small")],
                ..Milestone::for_slot(slot)
            });
        }
        assert!(matches!(
            pick_milestone_day(&plan, 100, None),
            Err(PlanError::NoFreeSlot)
        ));
    }

    #[test]
    fn toggle_protected_round_trips() {
        let plan = AnnualPlan::new(2026);
        let (on, protected) = toggle_protected(&plan, 12).expect("toggle");
        assert!(protected);
        assert_eq!(on.protected, vec![12]);
        let (off, protected) = toggle_protected(&on, 12).expect("toggle");
        assert!(!protected);
        assert!(off.protected.is_empty());
    }

    #[test]
    fn goal_lifecycle() {
        let plan = AnnualPlan::new(2026);
        assert!(matches!(
            add_goal(&plan, Category::Health, "   ", ""),
            Err(PlanError::EmptyTitle)
        ));

        let (plan, goal) = add_goal(&plan, Category::Health, " Run a marathon ", "")
            .expect("add");
        assert_eq!(goal.title, "Run a marathon");
        assert_eq!(plan.goals_in(Category::Health).len(), 1);

        let plan = toggle_goal(&plan, &goal.id).expect("toggle");
        assert!(plan.goals[0].completed);

        let plan = update_goal(
            &plan,
            &goal.id,
            GoalUpdate {
                category: Some(Category::SelfCare),
                ..GoalUpdate::default()
            },
        )
        .expect("update");
        assert_eq!(plan.goals[0].category, Category::SelfCare);

        let plan = remove_goal(&plan, &goal.id).expect("remove");
        assert!(plan.goals.is_empty());
        assert!(matches!(
            remove_goal(&plan, &goal.id),
            Err(PlanError::GoalNotFound(_))
        ));
    }

    #[test]
    fn milestone_details_and_removal() {
        let plan = AnnualPlan::new(2026);
        let plan = set_milestone_details(&plan, 5, Some("Grand Canyon".into()), None)
            .expect("set");
        assert_eq!(
            plan.milestones[5].as_ref().map(|m| m.title.as_str()),
            Some("Grand Canyon")
        );
        assert_eq!(scheduled_milestones(&plan), 0);

        let plan = remove_milestone(&plan, 5).expect("remove");
        assert!(plan.milestones[5].is_none());
        assert!(remove_milestone(&plan, 6).is_err());
    }

    #[test]
    fn anchor_update_only_touches_given_fields() {
        let mut plan = AnnualPlan::new(2026);
        plan.anchor.title = "Swim the channel".into();
        let next = update_anchor(
            &plan,
            AnchorUpdate {
                status: Some(AnchorStatus::InProgress),
                ..AnchorUpdate::default()
            },
        );
        assert_eq!(next.anchor.title, "Swim the channel");
        assert_eq!(next.anchor.status, AnchorStatus::InProgress);
    }

    #[test]
    fn state_level_operations() {
        let state = AppState::new(2026);
        assert!(matches!(
            complete_onboarding(&state),
            Err(PlanError::AnchorDateMissing)
        ));

        let toggled = toggle_prep_item(&state, "env-purge").expect("toggle");
        assert_eq!(toggled.prep_progress(), (1, 9));
        assert!(toggle_prep_item(&state, "nope").is_err());

        let start = NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date");
        let older = WeeklyWin::new("a".into(), start, vec![], String::new(), WeekStatus::Planned);
        let newer = WeeklyWin::new(
            "b".into(),
            start + chrono::Duration::days(7),
            vec![CategoryWin {
                category: Category::Wealth,
                task: "Review budget".into(),
                completed: true,
            }],
            String::new(),
            WeekStatus::Completed,
        )
        .with_self_score(9, 8);
        let state = record_weekly_win(&record_weekly_win(&toggled, older), newer);
        assert_eq!(state.weekly_wins[0].id, "b");
        assert_eq!(state.latest_score(), Some(9));

        let mut anchored = state;
        anchored.plan.anchor.day = Some(200);
        assert!(complete_onboarding(&anchored).expect("complete").onboarding_complete);
    }
}
