//! Subcommand implementations. One module per top-level command.

pub mod anchor;
pub mod calendar;
pub mod coach;
pub mod completions;
pub mod config;
pub mod countdown;
pub mod finish;
pub mod goal;
pub mod init;
pub mod mark;
pub mod milestone;
pub mod prep;
pub mod protect;
pub mod status;
pub mod theme;
pub mod view;
pub mod week;

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;
use yearplan_core::calendar::day_index;
use yearplan_core::config::EffectiveConfig;
use yearplan_core::model::AppState;
use yearplan_core::store::StateStore;
use yearplan_core::suggest::{GeminiGenerator, SuggestionClient};

use crate::output::OutputMode;

/// Everything a command needs: resolved config, output mode, the clock, and
/// the state store.
#[derive(Debug)]
pub struct Context {
    pub config: EffectiveConfig,
    pub output: OutputMode,
    pub today: NaiveDate,
    pub store: StateStore,
}

impl Context {
    pub fn new(config: EffectiveConfig, output: OutputMode, today: NaiveDate) -> Self {
        let store = StateStore::open(config.data_dir.clone());
        debug!(dir = %store.dir().display(), %today, "command context ready");
        Self {
            config,
            output,
            today,
            store,
        }
    }

    /// Load the plan, failing with `NotInitialized` when there is none.
    pub fn load(&self) -> Result<AppState> {
        Ok(self.store.load_required()?)
    }

    /// One locked read-modify-write cycle.
    pub fn update<T>(
        &self,
        f: impl FnOnce(&AppState) -> Result<(AppState, T)>,
    ) -> Result<(AppState, T)> {
        self.store.update(f)
    }

    pub fn suggestion_client(&self) -> SuggestionClient<GeminiGenerator> {
        SuggestionClient::new(GeminiGenerator::from_config(&self.config.user.suggest))
    }
}

/// Views the bare `yp` command can show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Status,
    Calendar,
    Prep,
    Goals,
    Weeks,
    Coach,
}

impl View {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Calendar => "calendar",
            Self::Prep => "prep",
            Self::Goals => "goals",
            Self::Weeks => "weeks",
            Self::Coach => "coach",
        }
    }

    /// Parse a stored view name. Unknown names fall back to the default.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|name| Self::from_str(name, true).ok())
            .unwrap_or_default()
    }
}

/// `2026-02-01 (day 31)`, or just the offset if it does not map to a date.
pub fn describe_day(year: i32, offset: u16) -> String {
    day_index::date_for_offset(year, offset).map_or_else(
        |_| format!("day {offset}"),
        |date| format!("{} (day {offset})", date.format("%Y-%m-%d")),
    )
}

/// ISO date string for `offset`, used in JSON payloads.
pub fn iso_day(year: i32, offset: u16) -> Option<String> {
    day_index::date_for_offset(year, offset)
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_view_names_round_trip() {
        for view in View::value_variants() {
            assert_eq!(View::from_stored(Some(view.as_str())), *view);
        }
    }

    #[test]
    fn unknown_stored_view_is_status() {
        assert_eq!(View::from_stored(Some("dashboard")), View::Status);
        assert_eq!(View::from_stored(None), View::Status);
    }

    #[test]
    fn days_are_described_as_dates() {
        assert_eq!(describe_day(2026, 31), "2026-02-01 (day 31)");
        assert_eq!(describe_day(2026, 400), "day 400");
        assert_eq!(iso_day(2028, 365).as_deref(), Some("2028-12-31"));
    }
}
