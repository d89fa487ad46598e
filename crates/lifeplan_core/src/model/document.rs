//! Top-level persisted planner document.
//!
//! # Responsibility
//! - Model the single JSON blob the application persists.
//! - Keep the year registry ordered and addressable by calendar year.
//!
//! # Invariants
//! - After normalization `years_order` equals the sorted key set of `years`.
//! - `version` always equals [`DOCUMENT_VERSION`] after normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::budget::BudgetModel;
use crate::model::calendar::CalendarPrefs;
use crate::model::category::CategoryGroups;
use crate::model::goal::Goal;
use crate::model::habit::Habit;
use crate::model::notes::NotesModel;

/// Schema version stamped into every normalized document.
pub const DOCUMENT_VERSION: u32 = 7;

/// Inclusive bounds for years accepted by year-level commands.
pub const YEAR_MIN: i32 = 1900;
pub const YEAR_MAX: i32 = 3000;

/// Document-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub currency: String,
    pub current_year: Option<i32>,
    pub week_starts_on: String,
}

/// All planning state for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearModel {
    pub year: i32,
    pub categories: CategoryGroups,
    pub goals: Vec<Goal>,
    pub habits: Vec<Habit>,
    pub notes: NotesModel,
    pub calendar: CalendarPrefs,
    pub budget: BudgetModel,
}

impl YearModel {
    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == goal_id)
    }

    pub fn goal_mut(&mut self, goal_id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|goal| goal.id == goal_id)
    }

    pub fn habit(&self, habit_id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == habit_id)
    }

    pub fn habit_mut(&mut self, habit_id: &str) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|habit| habit.id == habit_id)
    }
}

/// The whole persisted planner state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerDocument {
    pub version: u32,
    pub settings: Settings,
    pub years_order: Vec<i32>,
    pub years: BTreeMap<i32, YearModel>,
}

impl PlannerDocument {
    pub fn year(&self, year: i32) -> Option<&YearModel> {
        self.years.get(&year)
    }

    pub fn year_mut(&mut self, year: i32) -> Option<&mut YearModel> {
        self.years.get_mut(&year)
    }
}

/// True when `year` lies inside the supported planning range.
pub fn year_in_range(year: i32) -> bool {
    (YEAR_MIN..=YEAR_MAX).contains(&year)
}
