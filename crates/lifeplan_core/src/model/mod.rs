//! Typed planner document model.
//!
//! # Responsibility
//! - Define the canonical data structures for the persisted planner document.
//! - Host pure domain calculations (goal progress, habit scheduling, streaks,
//!   recurring-bill generation).
//!
//! # Invariants
//! - Every entity carries a stable string `id`; fresh ids are UUID v4.
//! - All persisted structs serialize in camelCase to match the stored JSON.
//! - These types never repair themselves; untrusted input goes through
//!   `crate::normalize` first.

pub mod budget;
pub mod calendar;
pub mod category;
pub mod document;
pub mod goal;
pub mod habit;
pub mod notes;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

/// Returns a fresh entity id.
pub(crate) fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current wall-clock time in epoch milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Converts a calendar date to epoch milliseconds at midnight UTC.
pub(crate) fn date_to_ms(date: NaiveDate) -> i64 {
    chrono::NaiveDateTime::new(date, chrono::NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
}

/// Number of days in the given month, accounting for leap years.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}
