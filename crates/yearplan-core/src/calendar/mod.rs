//! The year calendar: day-offset arithmetic, per-day classification, the
//! twelve-month grid, and the next-milestone countdown.

pub mod classify;
pub mod countdown;
pub mod day_index;
pub mod grid;

pub use classify::{DayFlags, classify, classify_year};
pub use countdown::{Countdown, next_milestone, next_milestone_from};
pub use grid::{CalendarSession, DayCell, EditMode, MonthGrid, Paint, YearGrid};
