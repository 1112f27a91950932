use std::fmt;

use chrono::NaiveDate;
use yearplan_core::calendar::day_index;
use yearplan_core::error::ErrorCode;
use yearplan_core::model::{Category, MILESTONE_SLOTS};

use crate::output::CliError;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_TEXT_LEN: usize = 2000;
pub const PLAN_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: ErrorCode,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code: code.code(),
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(self.to_string(), self.suggestion.clone(), self.code)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}': {}", self.field, self.value, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Trim `s` and check it is a usable title. Returns the trimmed title.
pub fn validate_title(s: &str) -> Result<String, ValidationError> {
    let title = s.trim();
    if title.is_empty() {
        return Err(ValidationError::new(
            "title",
            s,
            "must not be empty",
            "provide a non-empty title",
            ErrorCode::EmptyTitle,
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            s,
            format!("must be <= {MAX_TITLE_LEN} characters"),
            "shorten the title",
            ErrorCode::InvalidInput,
        ));
    }
    if title.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "title",
            s,
            "must not contain control characters",
            "remove control characters from the title",
            ErrorCode::InvalidInput,
        ));
    }
    Ok(title.to_string())
}

/// Trim free text (descriptions, reflections) and cap its length.
pub fn validate_text(field: &'static str, s: &str) -> Result<String, ValidationError> {
    let text = s.trim();
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::new(
            field,
            format!("{}...", text.chars().take(20).collect::<String>()),
            format!("must be <= {MAX_TEXT_LEN} characters"),
            format!("shorten the {field}"),
            ErrorCode::InvalidInput,
        ));
    }
    Ok(text.to_string())
}

/// Parse a day argument: a `YYYY-MM-DD` date inside `year`, or a raw
/// zero-based day offset.
pub fn parse_day_arg(raw: &str, year: i32) -> Result<u16, ValidationError> {
    let value = raw.trim();
    if let Ok(offset) = value.parse::<u16>() {
        let days = day_index::days_in_year(year);
        if offset >= days {
            return Err(ValidationError::new(
                "day",
                raw,
                format!("offset must be below {days} for {year}"),
                format!("use 0..{days} or a date like {year}-03-14"),
                ErrorCode::OffsetOutOfRange,
            ));
        }
        return Ok(offset);
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ValidationError::new(
            "day",
            raw,
            "expected YYYY-MM-DD or a day offset",
            format!("use a date like {year}-03-14 or an offset like 72"),
            ErrorCode::InvalidInput,
        )
    })?;
    day_index::offset_for_date(year, date).map_err(|_| {
        ValidationError::new(
            "day",
            raw,
            format!("date is not in {year}"),
            format!("pick a day in {year}"),
            ErrorCode::DateOutsideYear,
        )
    })
}

/// Check that a plan year is one every day of which has a calendar date.
pub fn validate_year(year: i32) -> Result<i32, ValidationError> {
    if PLAN_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(ValidationError::new(
            "year",
            year.to_string(),
            format!(
                "must be between {} and {}",
                PLAN_YEARS.start(),
                PLAN_YEARS.end()
            ),
            "pass a four-digit year like --year 2026",
            ErrorCode::InvalidInput,
        ))
    }
}

/// Check a 1-based milestone slot and convert it to the 0-based index.
pub fn validate_slot(slot: usize) -> Result<usize, ValidationError> {
    if (1..=MILESTONE_SLOTS).contains(&slot) {
        Ok(slot - 1)
    } else {
        Err(ValidationError::new(
            "slot",
            slot.to_string(),
            format!("must be between 1 and {MILESTONE_SLOTS}"),
            "milestone slots are numbered 1 to 6",
            ErrorCode::SlotOutOfRange,
        ))
    }
}

/// Parse a `CATEGORY=TASK` weekly-win entry.
pub fn parse_win_entry(raw: &str) -> Result<(Category, String), ValidationError> {
    let invalid = |reason: &str| {
        ValidationError::new(
            "win",
            raw,
            reason.to_string(),
            "use --win health=\"Run three times\"",
            ErrorCode::InvalidInput,
        )
    };
    let (category, task) = raw
        .split_once('=')
        .ok_or_else(|| invalid("expected CATEGORY=TASK"))?;
    let category: Category = category
        .parse()
        .map_err(|_| invalid("category must be health, wealth, relationship, or self"))?;
    let task = task.trim();
    if task.is_empty() {
        return Err(invalid("task must not be empty"));
    }
    Ok((category, task.to_string()))
}
