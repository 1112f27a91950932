//! On-disk shape of the state file.
//!
//! Keys are camelCase and multi-day fields are comma-joined strings of day
//! offsets. Every field has a default so partially written or hand-edited
//! files still load. Conversion to the in-memory model drops values that
//! cannot be interpreted and logs each drop.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::migrate::CURRENT_VERSION;
use crate::calendar::day_index::{join_day_list, parse_day, parse_day_list};
use crate::model::plan::DEFAULT_THEME;
use crate::model::weekly::{SELF_SCORE_RANGE, clamp_rating, self_score};
use crate::model::{
    Anchor, AnchorStatus, AnnualPlan, AppState, Category, CategoryWin, Goal, MILESTONE_SLOTS,
    Milestone, PrepItem, WeekStatus, WeeklyWin, default_checklist,
};

const WEEK_START_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredState {
    pub version: u64,
    pub annual_plan: StoredPlan,
    pub weekly_wins: Vec<StoredWeeklyWin>,
    pub prep_checklist: Vec<StoredPrepItem>,
    pub onboarding_complete: bool,
}

impl Default for StoredState {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            annual_plan: StoredPlan::default(),
            weekly_wins: Vec::new(),
            prep_checklist: Vec::new(),
            onboarding_complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredPlan {
    pub year: i32,
    pub theme: String,
    pub misogi: StoredAnchor,
    pub big4: Vec<StoredGoal>,
    pub kevin_rule_events: Vec<Option<StoredMilestone>>,
    pub non_negotiable_dates: Vec<String>,
}

impl Default for StoredPlan {
    fn default() -> Self {
        Self {
            year: current_year(),
            theme: DEFAULT_THEME.to_string(),
            misogi: StoredAnchor::default(),
            big4: Vec::new(),
            kevin_rule_events: vec![None; MILESTONE_SLOTS],
            non_negotiable_dates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredAnchor {
    pub title: String,
    pub description: String,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredGoal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredMilestone {
    pub id: String,
    pub title: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredWeeklyWin {
    pub id: String,
    pub week_start: String,
    pub non_negotiables: Vec<String>,
    pub big4_wins: Vec<StoredCategoryWin>,
    pub reflections: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,
    /// Self-score out of 10. Some older files hold a completion percentage.
    pub score: f64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredCategoryWin {
    pub category: String,
    pub task: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredPrepItem {
    pub id: String,
    pub task: String,
    pub description: String,
    pub completed: bool,
}

fn current_year() -> i32 {
    use chrono::Datelike;
    Local::now().year()
}

fn parse_category(raw: &str) -> Category {
    raw.parse().unwrap_or_else(|_| {
        warn!(category = raw, "unknown goal category, filing under Self");
        Category::SelfCare
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stored_rating(raw: f64) -> Option<u8> {
    if raw.is_nan() {
        return None;
    }
    Some(clamp_rating(raw.clamp(0.0, 100.0).round() as u8))
}

/// Score of a review that carries no ratings. Values above 10 were written
/// as completion percentages and are rescaled.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn legacy_score(raw: f64) -> u8 {
    if raw.is_nan() || raw <= 0.0 {
        return 0;
    }
    let max = f64::from(*SELF_SCORE_RANGE.end());
    let scaled = if raw > max { raw / 10.0 } else { raw };
    scaled.clamp(0.0, max).round() as u8
}

fn parse_week_start(raw: &str) -> Option<NaiveDate> {
    WEEK_START_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw.trim(), fmt).ok())
}

impl From<&AppState> for StoredState {
    fn from(state: &AppState) -> Self {
        let plan = &state.plan;
        Self {
            version: CURRENT_VERSION,
            annual_plan: StoredPlan {
                year: plan.year,
                theme: plan.theme.clone(),
                misogi: StoredAnchor {
                    title: plan.anchor.title.clone(),
                    description: plan.anchor.description.clone(),
                    date: plan.anchor.day.map(|d| d.to_string()).unwrap_or_default(),
                    status: plan.anchor.status.as_str().to_string(),
                },
                big4: plan
                    .goals
                    .iter()
                    .map(|g| StoredGoal {
                        id: g.id.clone(),
                        title: g.title.clone(),
                        description: g.description.clone(),
                        category: g.category.as_str().to_string(),
                        completed: g.completed,
                    })
                    .collect(),
                kevin_rule_events: plan
                    .milestones
                    .iter()
                    .map(|slot| {
                        slot.as_ref().map(|m| StoredMilestone {
                            id: m.id.clone(),
                            title: m.title.clone(),
                            date: join_day_list(&m.days),
                            description: m.description.clone(),
                        })
                    })
                    .collect(),
                non_negotiable_dates: plan.protected.iter().map(u16::to_string).collect(),
            },
            weekly_wins: state
                .weekly_wins
                .iter()
                .map(|w| StoredWeeklyWin {
                    id: w.id.clone(),
                    week_start: w.week_start.format("%Y-%m-%d").to_string(),
                    non_negotiables: w.non_negotiables.clone(),
                    big4_wins: w
                        .entries
                        .iter()
                        .map(|e| StoredCategoryWin {
                            category: e.category.as_str().to_string(),
                            task: e.task.clone(),
                            completed: e.completed,
                        })
                        .collect(),
                    reflections: w.reflections.clone(),
                    execution: w.execution.map(f64::from),
                    effort: w.effort.map(f64::from),
                    score: f64::from(w.score),
                    status: w.status.as_str().to_string(),
                })
                .collect(),
            prep_checklist: state
                .prep
                .iter()
                .map(|p| StoredPrepItem {
                    id: p.id.clone(),
                    task: p.task.clone(),
                    description: p.description.clone(),
                    completed: p.completed,
                })
                .collect(),
            onboarding_complete: state.onboarding_complete,
        }
    }
}

impl StoredPlan {
    fn into_plan(self) -> AnnualPlan {
        let year = self.year;
        let mut plan = AnnualPlan::new(year);
        plan.theme = self.theme;

        plan.anchor = Anchor {
            title: self.misogi.title,
            description: self.misogi.description,
            day: parse_day(&self.misogi.date, year),
            status: if self.misogi.status.is_empty() {
                AnchorStatus::Planned
            } else {
                self.misogi.status.parse().unwrap_or_else(|_| {
                    warn!(status = %self.misogi.status, "unknown anchor status, using planned");
                    AnchorStatus::Planned
                })
            },
        };
        if plan.anchor.day.is_none() && !self.misogi.date.trim().is_empty() {
            warn!(date = %self.misogi.date, year, "dropping invalid anchor date");
        }

        plan.goals = self
            .big4
            .into_iter()
            .map(|g| Goal {
                id: g.id,
                title: g.title,
                description: g.description,
                category: parse_category(&g.category),
                completed: g.completed,
            })
            .collect();

        // A day keeps its first owner: the anchor, then slots in order.
        let mut claimed: Vec<u16> = plan.anchor.day.into_iter().collect();
        for (slot, stored) in self
            .kevin_rule_events
            .into_iter()
            .take(MILESTONE_SLOTS)
            .enumerate()
        {
            let Some(m) = stored else { continue };
            let mut days = parse_day_list(&m.date, year);
            days.retain(|day| {
                let taken = claimed.contains(day);
                if taken {
                    warn!(day, slot, "milestone day already assigned elsewhere, dropping");
                }
                !taken
            });
            claimed.extend_from_slice(&days);
            plan.milestones[slot] = Some(Milestone {
                id: if m.id.is_empty() { slot.to_string() } else { m.id },
                title: m.title,
                description: m.description,
                days,
            });
        }

        for raw in &self.non_negotiable_dates {
            match parse_day(raw, year) {
                Some(day) if plan.owner_of(day).is_none() => plan.protected.push(day),
                Some(day) => warn!(day, "protected day already assigned elsewhere, dropping"),
                None => warn!(date = %raw, year, "dropping invalid protected date"),
            }
        }

        plan
    }
}

impl From<StoredState> for AppState {
    fn from(stored: StoredState) -> Self {
        let weekly_wins = stored
            .weekly_wins
            .into_iter()
            .filter_map(|w| {
                let Some(week_start) = parse_week_start(&w.week_start) else {
                    warn!(id = %w.id, week_start = %w.week_start, "dropping weekly review with unreadable date");
                    return None;
                };
                let entries: Vec<CategoryWin> = w
                    .big4_wins
                    .into_iter()
                    .map(|e| CategoryWin {
                        category: parse_category(&e.category),
                        task: e.task,
                        completed: e.completed,
                    })
                    .collect();
                let ratings = (
                    w.execution.and_then(stored_rating),
                    w.effort.and_then(stored_rating),
                );
                let (execution, effort, score) = match ratings {
                    (Some(execution), Some(effort)) => {
                        (Some(execution), Some(effort), self_score(execution, effort))
                    }
                    (None, None) => (None, None, legacy_score(w.score)),
                    _ => {
                        warn!(id = %w.id, "weekly review has only one rating, keeping the stored score");
                        (None, None, legacy_score(w.score))
                    }
                };
                let status = w.status.parse().unwrap_or(WeekStatus::Planned);
                Some(WeeklyWin {
                    id: w.id,
                    week_start,
                    non_negotiables: w
                        .non_negotiables
                        .into_iter()
                        .filter(|item| !item.trim().is_empty())
                        .collect(),
                    entries,
                    reflections: w.reflections,
                    execution,
                    effort,
                    score,
                    status,
                })
            })
            .collect();

        let prep = if stored.prep_checklist.is_empty() {
            default_checklist()
        } else {
            stored
                .prep_checklist
                .into_iter()
                .map(|p| PrepItem {
                    id: p.id,
                    task: p.task,
                    description: p.description,
                    completed: p.completed,
                })
                .collect()
        };

        Self {
            plan: stored.annual_plan.into_plan(),
            weekly_wins,
            prep,
            onboarding_complete: stored.onboarding_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_lists_are_comma_joined_on_disk() {
        let mut state = AppState::new(2026);
        state.plan.milestones[1] = Some(Milestone {
            title: "Desert run".into(),
            days: vec![5, 6, 20],
            ..Milestone::for_slot(1)
        });
        state.plan.protected = vec![9, 3];
        state.plan.anchor.day = Some(100);

        let stored = StoredState::from(&state);
        assert_eq!(stored.annual_plan.kevin_rule_events.len(), MILESTONE_SLOTS);
        assert_eq!(
            stored.annual_plan.kevin_rule_events[1]
                .as_ref()
                .map(|m| m.date.as_str()),
            Some("5,6,20")
        );
        assert_eq!(stored.annual_plan.non_negotiable_dates, vec!["9", "3"]);
        assert_eq!(stored.annual_plan.misogi.date, "100");
    }

    #[test]
    fn invalid_entries_are_dropped_on_load() {
        let stored = StoredState {
            annual_plan: StoredPlan {
                year: 2026,
                misogi: StoredAnchor {
                    date: "not-a-day".into(),
                    status: "sideways".into(),
                    ..StoredAnchor::default()
                },
                kevin_rule_events: vec![Some(StoredMilestone {
                    date: "3,x,900,1".into(),
                    ..StoredMilestone::default()
                })],
                non_negotiable_dates: vec!["1".into(), "2".into(), "oops".into()],
                ..StoredPlan::default()
            },
            ..StoredState::default()
        };

        let state = AppState::from(stored);
        assert_eq!(state.plan.anchor.day, None);
        assert_eq!(state.plan.anchor.status, AnchorStatus::Planned);
        let m = state.plan.milestones[0].as_ref().expect("slot 0");
        assert_eq!(m.days, vec![1, 3]);
        assert_eq!(m.id, "0");
        // day 1 belongs to the milestone, so only day 2 stays protected
        assert_eq!(state.plan.protected, vec![2]);
    }

    #[test]
    fn doubly_owned_days_keep_their_first_owner() {
        let stored = StoredState {
            annual_plan: StoredPlan {
                year: 2026,
                misogi: StoredAnchor {
                    date: "40".into(),
                    ..StoredAnchor::default()
                },
                kevin_rule_events: vec![
                    Some(StoredMilestone {
                        date: "40,41".into(),
                        ..StoredMilestone::default()
                    }),
                    None,
                    Some(StoredMilestone {
                        date: "41,42".into(),
                        ..StoredMilestone::default()
                    }),
                ],
                non_negotiable_dates: vec!["40".into(), "42".into(), "43".into()],
                ..StoredPlan::default()
            },
            ..StoredState::default()
        };

        let plan = AppState::from(stored).plan;
        assert_eq!(plan.anchor.day, Some(40));
        assert_eq!(plan.milestones[0].as_ref().map(|m| m.days.clone()), Some(vec![41]));
        assert!(plan.milestones[1].is_none());
        assert_eq!(plan.milestones[2].as_ref().map(|m| m.days.clone()), Some(vec![42]));
        assert_eq!(plan.protected, vec![43]);
        assert_eq!(plan.milestone_slot_of(41), Some(0));
        assert_eq!(plan.milestone_slot_of(40), None);
    }

    #[test]
    fn legacy_locale_week_start_is_understood() {
        let stored = StoredState {
            weekly_wins: vec![
                StoredWeeklyWin {
                    id: "a".into(),
                    week_start: "1/5/2026".into(),
                    score: 7.4,
                    ..StoredWeeklyWin::default()
                },
                StoredWeeklyWin {
                    id: "b".into(),
                    week_start: "someday".into(),
                    ..StoredWeeklyWin::default()
                },
            ],
            ..StoredState::default()
        };
        let state = AppState::from(stored);
        assert_eq!(state.weekly_wins.len(), 1);
        assert_eq!(
            state.weekly_wins[0].week_start,
            NaiveDate::from_ymd_opt(2026, 1, 5).expect("valid date")
        );
        assert_eq!(state.weekly_wins[0].score, 7);
        assert_eq!(state.weekly_wins[0].execution, None);
    }

    #[test]
    fn self_scored_review_is_read_as_written() {
        let raw = r#"{
            "weekStart": "2026-01-05",
            "nonNegotiables": ["First 60", "Sweat", " "],
            "reflections": "Held the line.",
            "score": 9
        }"#;
        let stored: StoredWeeklyWin = serde_json::from_str(raw).expect("parse");
        let state = AppState::from(StoredState {
            weekly_wins: vec![stored],
            ..StoredState::default()
        });
        let week = &state.weekly_wins[0];
        assert_eq!(week.score, 9);
        assert_eq!(week.non_negotiables, vec!["First 60", "Sweat"]);
        assert!(week.entries.is_empty());
    }

    #[test]
    fn ratings_drive_the_score() {
        let stored = StoredWeeklyWin {
            week_start: "2026-01-05".into(),
            execution: Some(8.0),
            effort: Some(15.0),
            score: 2.0,
            ..StoredWeeklyWin::default()
        };
        let state = AppState::from(StoredState {
            weekly_wins: vec![stored],
            ..StoredState::default()
        });
        let week = &state.weekly_wins[0];
        assert_eq!(week.execution, Some(8));
        assert_eq!(week.effort, Some(10));
        assert_eq!(week.score, 9);
    }

    #[test]
    fn percentage_scores_are_rescaled() {
        assert_eq!(legacy_score(62.5), 6);
        assert_eq!(legacy_score(40.0), 4);
        assert_eq!(legacy_score(100.0), 10);
        assert_eq!(legacy_score(9.0), 9);
        assert_eq!(legacy_score(0.0), 0);
        assert_eq!(legacy_score(f64::NAN), 0);
    }

    #[test]
    fn empty_checklist_is_reseeded() {
        let state = AppState::from(StoredState::default());
        assert_eq!(state.prep.len(), default_checklist().len());
    }
}
