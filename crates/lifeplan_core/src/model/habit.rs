//! Habits, recurrence rules and streak accounting.
//!
//! # Responsibility
//! - Model year-global habits with their recurrence schedule and check set.
//! - Answer "due on date?" and "current streak as of date?" queries.
//!
//! # Invariants
//! - `checks` is a set: one entry per calendar day, naturally sorted.
//! - Day numbers in rules use 0 = Sunday .. 6 = Saturday.
//! - `linked_goal_ids` only references goals of the same year.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Recurrence schedule attached to a habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RecurrenceRule {
    /// Due every day.
    Daily,
    /// Due Monday through Friday.
    Weekdays,
    /// Due on an explicit set of week days.
    DaysOfWeek { days: Vec<u8> },
    /// Due once a month on `day_of_month`, clamped to the month length.
    Monthly { day_of_month: u8 },
    /// Due every `interval` days counted from `start`.
    EveryNDays {
        interval: u32,
        start: Option<NaiveDate>,
    },
    /// Due until `times` checks exist in the week, optionally gated to
    /// `allowed_days`.
    TimesPerWeek {
        times: u8,
        allowed_days: Option<Vec<u8>>,
    },
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::Weekdays
    }
}

impl RecurrenceRule {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekdays => "weekdays",
            Self::DaysOfWeek { .. } => "daysOfWeek",
            Self::Monthly { .. } => "monthly",
            Self::EveryNDays { .. } => "everyNDays",
            Self::TimesPerWeek { .. } => "timesPerWeek",
        }
    }
}

/// Week-day number with 0 = Sunday, matching the persisted layout.
fn day_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// A tracked habit with its check history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub recurrence_rule: RecurrenceRule,
    pub linked_goal_ids: Vec<String>,
    pub checks: BTreeSet<NaiveDate>,
    pub created_at: i64,
}

impl Habit {
    /// Creates an unchecked habit created "now".
    pub fn new(title: impl Into<String>, recurrence_rule: RecurrenceRule) -> Self {
        Self {
            id: super::fresh_id(),
            title: title.into(),
            notes: String::new(),
            recurrence_rule,
            linked_goal_ids: Vec::new(),
            checks: BTreeSet::new(),
            created_at: super::now_ms(),
        }
    }

    pub fn is_checked(&self, date: NaiveDate) -> bool {
        self.checks.contains(&date)
    }

    /// Flips the check state for one day. Returns the new state.
    pub fn toggle_check(&mut self, date: NaiveDate) -> bool {
        if self.checks.remove(&date) {
            false
        } else {
            self.checks.insert(date);
            true
        }
    }

    /// The calendar day the habit was created, from its epoch-ms stamp.
    fn created_date(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.created_at).map(|at| at.date_naive())
    }

    /// Number of checks falling inside the Monday-based week of `date`.
    fn checks_in_week_of(&self, date: NaiveDate) -> usize {
        let week = date.week(Weekday::Mon);
        self.checks.range(week.first_day()..=week.last_day()).count()
    }

    /// Whether the habit is scheduled for `date`.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match &self.recurrence_rule {
            RecurrenceRule::Daily => true,
            RecurrenceRule::Weekdays => {
                !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
            }
            RecurrenceRule::DaysOfWeek { days } => days.contains(&day_number(date)),
            RecurrenceRule::Monthly { day_of_month } => {
                let clamped = u32::from(*day_of_month)
                    .min(super::days_in_month(date.year(), date.month()))
                    .max(1);
                date.day() == clamped
            }
            RecurrenceRule::EveryNDays { interval, start } => {
                let anchor = start.or_else(|| self.created_date()).unwrap_or(date);
                let gap = date.signed_duration_since(anchor).num_days();
                gap % i64::from((*interval).max(1)) == 0
            }
            RecurrenceRule::TimesPerWeek {
                times,
                allowed_days,
            } => {
                if let Some(allowed) = allowed_days {
                    if !allowed.contains(&day_number(date)) {
                        return false;
                    }
                }
                self.is_checked(date) || self.checks_in_week_of(date) < usize::from(*times)
            }
        }
    }

    /// Length of the unbroken run of kept commitments ending at `as_of`.
    ///
    /// Walking backwards from `as_of`: off-schedule days are skipped
    /// outright (checks on them do not count), due days that were checked
    /// extend the streak, and a due day left unchecked breaks it. The walk
    /// stops at the earlier of the first recorded check and the habit's
    /// creation day.
    pub fn current_streak(&self, as_of: NaiveDate) -> u32 {
        let mut floor = self.created_date().unwrap_or(as_of);
        if let Some(first) = self.checks.first() {
            floor = floor.min(*first);
        }

        let mut streak = 0;
        let mut date = as_of;
        loop {
            if self.is_due_on(date) {
                if self.is_checked(date) {
                    streak += 1;
                } else {
                    break;
                }
            }
            if date <= floor {
                break;
            }
            match date.pred_opt() {
                Some(previous) => date = previous,
                None => break,
            }
        }
        streak
    }
}
