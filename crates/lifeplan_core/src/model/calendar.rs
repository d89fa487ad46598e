//! Calendar view preferences.
//!
//! # Responsibility
//! - Model per-year calendar display settings: view, overlay filters, focus
//!   and the selected date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calendar zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    Week,
    Month,
    Year,
}

impl Default for CalendarView {
    fn default() -> Self {
        Self::Week
    }
}

impl CalendarView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Parses the persisted key; unknown input yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }
}

/// Which entity layers the calendar renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFilters {
    pub show_goals: bool,
    pub show_milestones: bool,
    pub show_habits: bool,
    pub show_transactions: bool,
}

impl Default for CalendarFilters {
    fn default() -> Self {
        Self {
            show_goals: true,
            show_milestones: true,
            show_habits: true,
            show_transactions: true,
        }
    }
}

/// What the calendar is focused on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusKind {
    All,
    Goal,
    Habit,
}

impl Default for FocusKind {
    fn default() -> Self {
        Self::All
    }
}

impl FocusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Goal => "goal",
            Self::Habit => "habit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "goal" => Some(Self::Goal),
            "habit" => Some(Self::Habit),
            _ => None,
        }
    }
}

/// Focus target; `id` is set only for goal/habit focus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarFocus {
    pub kind: FocusKind,
    pub id: Option<String>,
}

/// Per-year calendar preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarPrefs {
    pub default_view: CalendarView,
    pub filters: CalendarFilters,
    pub focus: CalendarFocus,
    pub selected_date: NaiveDate,
}

impl CalendarPrefs {
    /// Default preferences pointing at `selected_date`.
    pub fn default_for(selected_date: NaiveDate) -> Self {
        Self {
            default_view: CalendarView::default(),
            filters: CalendarFilters::default(),
            focus: CalendarFocus::default(),
            selected_date,
        }
    }
}
