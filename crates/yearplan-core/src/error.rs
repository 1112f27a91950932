use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for script-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    AlreadyInitialized,
    ConfigParseError,
    CorruptState,
    UnsupportedVersion,
    OffsetOutOfRange,
    DateOutsideYear,
    SlotOutOfRange,
    NoFreeSlot,
    DayBlocked,
    GoalNotFound,
    PrepItemNotFound,
    EmptyTitle,
    AnchorDateMissing,
    InvalidInput,
    StateWriteFailed,
    LockContention,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::AlreadyInitialized => "E1005",
            Self::ConfigParseError => "E1002",
            Self::CorruptState => "E1003",
            Self::UnsupportedVersion => "E1004",
            Self::OffsetOutOfRange => "E2001",
            Self::DateOutsideYear => "E2002",
            Self::SlotOutOfRange => "E2003",
            Self::NoFreeSlot => "E2004",
            Self::DayBlocked => "E2005",
            Self::GoalNotFound => "E2006",
            Self::PrepItemNotFound => "E2007",
            Self::EmptyTitle => "E2008",
            Self::AnchorDateMissing => "E2009",
            Self::InvalidInput => "E2010",
            Self::StateWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Plan not initialized",
            Self::AlreadyInitialized => "Plan already initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::CorruptState => "Stored state could not be parsed",
            Self::UnsupportedVersion => "Stored state is from a newer version",
            Self::OffsetOutOfRange => "Day offset outside the plan year",
            Self::DateOutsideYear => "Date outside the plan year",
            Self::SlotOutOfRange => "Milestone slot out of range",
            Self::NoFreeSlot => "No free milestone slot",
            Self::DayBlocked => "Day already reserved",
            Self::GoalNotFound => "Goal not found",
            Self::PrepItemNotFound => "Checklist item not found",
            Self::EmptyTitle => "Title must not be empty",
            Self::AnchorDateMissing => "Anchor date not set",
            Self::InvalidInput => "Invalid argument",
            Self::StateWriteFailed => "State file write failed",
            Self::LockContention => "Lock contention",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `yp init` to start a plan."),
            Self::AlreadyInitialized => Some("Pass --force to start over with a fresh plan."),
            Self::ConfigParseError => Some("Fix syntax in yearplan/config.toml and retry."),
            Self::CorruptState => {
                Some("Restore state.json from a backup or move it aside and run `yp init`.")
            }
            Self::UnsupportedVersion => Some("Upgrade yp to read this state file."),
            Self::OffsetOutOfRange | Self::DateOutsideYear => {
                Some("Pick a day inside the plan's year.")
            }
            Self::SlotOutOfRange => Some("Milestone slots are numbered 1 to 6."),
            Self::NoFreeSlot => Some("Pass --slot to choose which milestone gets the day."),
            Self::DayBlocked => Some("Clear the day first with `yp mark <day> --as clear`."),
            Self::GoalNotFound => Some("Run `yp goal list` to see goal ids."),
            Self::PrepItemNotFound => Some("Run `yp prep list` to see checklist ids."),
            Self::EmptyTitle => Some("Provide a non-empty --title."),
            Self::AnchorDateMissing => {
                Some("Set the anchor day with `yp mark <day> --as anchor` first.")
            }
            Self::InvalidInput => Some("Run the command with --help to see accepted values."),
            Self::StateWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `yp` process finishes."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised by plan operations and the state store.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("no plan found in {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("a plan already exists in {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("day offset {offset} is outside {year} (valid: 0..{days})")]
    OffsetOutOfRange { year: i32, offset: i64, days: u16 },

    #[error("{date} is not in {year}")]
    DateOutsideYear { year: i32, date: chrono::NaiveDate },

    #[error("milestone slot {0} does not exist")]
    SlotOutOfRange(usize),

    #[error("every milestone slot already has days assigned")]
    NoFreeSlot,

    #[error("day {offset} is already reserved for the {owner}")]
    DayBlocked { offset: u16, owner: &'static str },

    #[error("goal '{0}' not found")]
    GoalNotFound(String),

    #[error("checklist item '{0}' not found")]
    PrepItemNotFound(String),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("the anchor goal needs a date before setup can finish")]
    AnchorDateMissing,

    #[error("state file {} is not valid JSON: {source}", path.display())]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("state file version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u64, supported: u64 },

    #[error("state I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("state lock at {} timed out after {waited:?}", path.display())]
    LockTimeout {
        path: PathBuf,
        waited: std::time::Duration,
    },
}

impl PlanError {
    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized(_) => ErrorCode::NotInitialized,
            Self::AlreadyInitialized(_) => ErrorCode::AlreadyInitialized,
            Self::OffsetOutOfRange { .. } => ErrorCode::OffsetOutOfRange,
            Self::DateOutsideYear { .. } => ErrorCode::DateOutsideYear,
            Self::SlotOutOfRange(_) => ErrorCode::SlotOutOfRange,
            Self::NoFreeSlot => ErrorCode::NoFreeSlot,
            Self::DayBlocked { .. } => ErrorCode::DayBlocked,
            Self::GoalNotFound(_) => ErrorCode::GoalNotFound,
            Self::PrepItemNotFound(_) => ErrorCode::PrepItemNotFound,
            Self::EmptyTitle => ErrorCode::EmptyTitle,
            Self::AnchorDateMissing => ErrorCode::AnchorDateMissing,
            Self::CorruptState { .. } => ErrorCode::CorruptState,
            Self::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            Self::Io { .. } => ErrorCode::StateWriteFailed,
            Self::LockTimeout { .. } => ErrorCode::LockContention,
        }
    }

    /// Remediation hint for the user, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}
