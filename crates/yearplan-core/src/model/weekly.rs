use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::plan::{Category, ParseEnumError};

/// Whether a week's review has been closed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStatus {
    #[default]
    Planned,
    Completed,
}

impl WeekStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for WeekStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planned" => Ok(Self::Planned),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "week status (planned, completed)",
                got: s.to_string(),
            }),
        }
    }
}

/// Lowest and highest value of an execution or effort rating.
pub const SELF_SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Rating a new review starts from when none is given.
pub const DEFAULT_SELF_SCORE: u8 = 7;

/// One life-domain task for the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryWin {
    pub category: Category,
    pub task: String,
    pub completed: bool,
}

/// A weekly self-review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWin {
    pub id: String,
    pub week_start: NaiveDate,
    /// Standards held for the week, in the order given.
    pub non_negotiables: Vec<String>,
    pub entries: Vec<CategoryWin>,
    pub reflections: String,
    /// How well the week was executed, 1..=10. `None` for reviews recorded
    /// before ratings were kept.
    pub execution: Option<u8>,
    /// How hard the week was pushed, 1..=10.
    pub effort: Option<u8>,
    /// Self-score out of 10. 0 means the review was never scored.
    pub score: u8,
    pub status: WeekStatus,
}

impl WeeklyWin {
    /// Build a review rated at the default execution and effort.
    #[must_use]
    pub fn new(
        id: String,
        week_start: NaiveDate,
        entries: Vec<CategoryWin>,
        reflections: String,
        status: WeekStatus,
    ) -> Self {
        Self {
            id,
            week_start,
            non_negotiables: Vec::new(),
            entries,
            reflections,
            execution: Some(DEFAULT_SELF_SCORE),
            effort: Some(DEFAULT_SELF_SCORE),
            score: self_score(DEFAULT_SELF_SCORE, DEFAULT_SELF_SCORE),
            status,
        }
    }

    /// Rate the week and derive its score. Ratings are clamped to 1..=10.
    #[must_use]
    pub fn with_self_score(mut self, execution: u8, effort: u8) -> Self {
        let execution = clamp_rating(execution);
        let effort = clamp_rating(effort);
        self.execution = Some(execution);
        self.effort = Some(effort);
        self.score = self_score(execution, effort);
        self
    }

    /// Attach the week's standards. Blank entries are dropped.
    #[must_use]
    pub fn with_non_negotiables(mut self, items: Vec<String>) -> Self {
        self.non_negotiables = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        self
    }

    /// Entries marked achieved.
    #[must_use]
    pub fn completed_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.completed).count()
    }
}

#[must_use]
pub fn clamp_rating(raw: u8) -> u8 {
    raw.clamp(*SELF_SCORE_RANGE.start(), *SELF_SCORE_RANGE.end())
}

/// Mean of execution and effort, halves rounded up.
#[must_use]
pub fn self_score(execution: u8, effort: u8) -> u8 {
    let mean = (u16::from(execution) + u16::from(effort)).div_ceil(2);
    u8::try_from(mean).unwrap_or(u8::MAX)
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let back = i64::from(date.weekday().num_days_from_monday());
    date - Duration::days(back)
}
