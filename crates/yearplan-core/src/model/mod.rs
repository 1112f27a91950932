//! Plan data model: the annual plan, weekly reviews, the prep checklist, and
//! the aggregate [`AppState`] that is persisted as a unit.

pub mod plan;
pub mod prep;
pub mod weekly;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use plan::{
    Anchor, AnchorStatus, AnnualPlan, Category, DayOwner, Goal, MILESTONE_SLOTS, Milestone,
    ParseEnumError,
};
pub use prep::{PrepItem, default_checklist};
pub use weekly::{CategoryWin, WeekStatus, WeeklyWin};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

/// Short random base-36 identifier for goals and weekly reviews.
#[must_use]
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}

/// Everything the planner stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub plan: AnnualPlan,
    /// Newest first.
    pub weekly_wins: Vec<WeeklyWin>,
    pub prep: Vec<PrepItem>,
    pub onboarding_complete: bool,
}

impl AppState {
    /// Fresh state for `year` with the default checklist.
    #[must_use]
    pub fn new(year: i32) -> Self {
        Self {
            plan: AnnualPlan::new(year),
            weekly_wins: Vec::new(),
            prep: default_checklist(),
            onboarding_complete: false,
        }
    }

    #[must_use]
    pub fn latest_score(&self) -> Option<u8> {
        self.weekly_wins.first().map(|w| w.score)
    }

    /// `(completed, total)` for the prep checklist.
    #[must_use]
    pub fn prep_progress(&self) -> (usize, usize) {
        let done = self.prep.iter().filter(|p| p.completed).count();
        (done, self.prep.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_short_base36() {
        let id = new_id();
        assert_eq!(id.len(), ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn new_state_seeds_checklist() {
        let state = AppState::new(2026);
        assert_eq!(state.plan.year, 2026);
        assert!(!state.onboarding_complete);
        assert_eq!(state.prep_progress(), (0, 9));
        assert_eq!(state.latest_score(), None);
    }
}
