use chrono::NaiveDate;
use proptest::prelude::*;
use yearplan_core::model::{
    AnchorStatus, AnnualPlan, AppState, Category, CategoryWin, Goal, MILESTONE_SLOTS, WeekStatus,
    WeeklyWin, default_checklist,
};
use yearplan_core::mutate::{self, Assignment, MilestonePolicy};

/// One calendar or picker interaction.
#[derive(Debug, Clone)]
pub enum Op {
    Apply(u16, Assignment, MilestonePolicy),
    Pick(u16, Option<usize>),
    ToggleProtected(u16),
}

pub fn arb_year() -> impl Strategy<Value = i32> + Clone {
    1900i32..2200
}

pub fn arb_policy() -> impl Strategy<Value = MilestonePolicy> + Clone {
    prop_oneof![
        Just(MilestonePolicy::Accumulate),
        Just(MilestonePolicy::PairThenReset),
    ]
}

pub fn arb_assignment() -> impl Strategy<Value = Assignment> + Clone {
    prop_oneof![
        Just(Assignment::Anchor),
        Just(Assignment::Protected),
        Just(Assignment::Clear),
        prop::option::of(0..MILESTONE_SLOTS).prop_map(|slot| Assignment::Milestone { slot }),
    ]
}

/// Offsets are drawn from a narrow window so operations collide often.
pub fn arb_op() -> impl Strategy<Value = Op> + Clone {
    let offset = 0u16..40;
    prop_oneof![
        4 => (offset.clone(), arb_assignment(), arb_policy())
            .prop_map(|(o, a, p)| Op::Apply(o, a, p)),
        2 => (offset.clone(), prop::option::of(0..MILESTONE_SLOTS))
            .prop_map(|(o, s)| Op::Pick(o, s)),
        1 => offset.prop_map(Op::ToggleProtected),
    ]
}

/// Run `op`, keeping the previous plan when it is rejected.
pub fn run_op(plan: &AnnualPlan, op: &Op) -> AnnualPlan {
    let next = match *op {
        Op::Apply(offset, assignment, policy) => {
            mutate::apply_with(plan, offset, assignment, policy)
        }
        Op::Pick(offset, slot) => mutate::pick_milestone_day(plan, offset, slot).map(|o| o.plan),
        Op::ToggleProtected(offset) => mutate::toggle_protected(plan, offset).map(|(p, _)| p),
    };
    next.unwrap_or_else(|_| plan.clone())
}

pub fn arb_plan() -> impl Strategy<Value = AnnualPlan> {
    (
        arb_year(),
        "[A-Za-z ]{0,20}",
        prop::collection::vec(arb_op(), 0..40),
    )
        .prop_map(|(year, theme, ops)| {
            let mut plan = AnnualPlan::new(year);
            plan.theme = theme;
            ops.iter().fold(plan, |p, op| run_op(&p, op))
        })
}

pub fn arb_category() -> impl Strategy<Value = Category> + Clone {
    prop::sample::select(Category::ALL.to_vec())
}

pub fn arb_goal() -> impl Strategy<Value = Goal> {
    (
        "[a-z0-9]{9}",
        "[A-Za-z ]{1,24}",
        "[A-Za-z ]{0,40}",
        arb_category(),
        any::<bool>(),
    )
        .prop_map(|(id, title, description, category, completed)| Goal {
            id,
            title,
            description,
            category,
            completed,
        })
}

fn arb_category_win() -> impl Strategy<Value = CategoryWin> {
    (arb_category(), "[A-Za-z ]{1,20}", any::<bool>()).prop_map(|(category, task, completed)| {
        CategoryWin {
            category,
            task,
            completed,
        }
    })
}

/// A weekly review, either rated or carrying only a bare score out of 10.
pub fn arb_weekly_win() -> impl Strategy<Value = WeeklyWin> {
    (
        "[a-z0-9]{9}",
        0i64..3000,
        prop::collection::vec("[A-Za-z][A-Za-z ]{0,15}[A-Za-z]", 0..4),
        prop::collection::vec(arb_category_win(), 0..5),
        "[A-Za-z .]{0,40}",
        prop::option::of((1u8..=10, 1u8..=10)),
        0u8..=10,
        prop_oneof![Just(WeekStatus::Planned), Just(WeekStatus::Completed)],
    )
        .prop_map(
            |(id, days, standards, entries, reflections, ratings, bare_score, status)| {
                let start = NaiveDate::from_ymd_opt(2020, 1, 6).expect("valid date")
                    + chrono::Duration::days(days);
                let week = WeeklyWin::new(id, start, entries, reflections, status)
                    .with_non_negotiables(standards);
                match ratings {
                    Some((execution, effort)) => week.with_self_score(execution, effort),
                    None => WeeklyWin {
                        execution: None,
                        effort: None,
                        score: bare_score,
                        ..week
                    },
                }
            },
        )
}

/// A full application state: a plan built from random edits plus goals,
/// reviews, and a partly ticked checklist.
pub fn arb_state() -> impl Strategy<Value = AppState> {
    let checklist_len = default_checklist().len();
    (
        arb_plan(),
        "[A-Za-z ]{0,24}",
        prop_oneof![
            Just(AnchorStatus::Planned),
            Just(AnchorStatus::InProgress),
            Just(AnchorStatus::Completed),
        ],
        prop::collection::vec(arb_goal(), 0..8),
        prop::collection::vec(arb_weekly_win(), 0..6),
        prop::collection::vec(any::<bool>(), checklist_len),
        any::<bool>(),
    )
        .prop_map(
            |(mut plan, anchor_title, anchor_status, goals, weekly_wins, ticks, onboarded)| {
                plan.anchor.title = anchor_title;
                plan.anchor.status = anchor_status;
                plan.goals = goals;
                let mut prep = default_checklist();
                for (item, tick) in prep.iter_mut().zip(ticks) {
                    item.completed = tick;
                }
                AppState {
                    plan,
                    weekly_wins,
                    prep,
                    onboarding_complete: onboarded,
                }
            },
        )
}
