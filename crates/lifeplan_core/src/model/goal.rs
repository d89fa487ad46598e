//! Goal aggregates: milestones, task checklists, progress math.
//!
//! # Responsibility
//! - Model yearly goals with their milestone/task tree.
//! - Compute blended completion progress.
//!
//! # Invariants
//! - `category_id` must reference a goal category; documents that violate
//!   this are repaired (goal removed) by `crate::normalize`.
//! - `linked_habit_ids` only references habits of the same year.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weight of the task-completion fraction when a manual target also exists.
const TASK_WEIGHT: f64 = 0.7;
/// Weight of the manual `current/target` fraction alongside tasks.
const MANUAL_WEIGHT: f64 = 0.3;

/// One checklist entry under a milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub done: bool,
}

impl TaskItem {
    pub fn new(title: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        Self {
            id: super::fresh_id(),
            title: title.into(),
            due_date,
            done: false,
        }
    }
}

/// A dated milestone holding a task checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub tasks: Vec<TaskItem>,
}

impl Milestone {
    pub fn new(title: impl Into<String>, due_date: Option<NaiveDate>) -> Self {
        Self {
            id: super::fresh_id(),
            title: title.into(),
            due_date,
            tasks: Vec::new(),
        }
    }
}

/// A yearly goal tied to one goal category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub notes: String,
    pub milestones: Vec<Milestone>,
    pub linked_habit_ids: Vec<String>,
}

impl Goal {
    /// Creates an empty goal bound to `category_id`.
    pub fn new(title: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            id: super::fresh_id(),
            title: title.into(),
            category_id: category_id.into(),
            start_date: None,
            end_date: None,
            target_value: 0.0,
            current_value: 0.0,
            unit: String::new(),
            notes: String::new(),
            milestones: Vec::new(),
            linked_habit_ids: Vec::new(),
        }
    }

    /// Counts `(done, total)` tasks across all milestones.
    pub fn task_counts(&self) -> (u32, u32) {
        let mut done = 0;
        let mut total = 0;
        for milestone in &self.milestones {
            for task in &milestone.tasks {
                total += 1;
                if task.done {
                    done += 1;
                }
            }
        }
        (done, total)
    }

    /// Manual completion fraction `current/target`, clamped to `0..=1`.
    ///
    /// Returns `0.0` when no positive target is set.
    pub fn manual_fraction(&self) -> f64 {
        if self.target_value > 0.0 {
            (self.current_value / self.target_value).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Blended completion progress in `0..=1`.
    ///
    /// With tasks present the task fraction weighs 0.7 and the manual
    /// fraction 0.3 (manual only participates when a positive target is
    /// set). Without tasks the manual fraction stands alone.
    pub fn progress(&self) -> f64 {
        let (done, total) = self.task_counts();
        let progress = if total > 0 {
            let task_fraction = f64::from(done) / f64::from(total);
            if self.target_value > 0.0 {
                task_fraction * TASK_WEIGHT + self.manual_fraction() * MANUAL_WEIGHT
            } else {
                task_fraction
            }
        } else {
            self.manual_fraction()
        };
        progress.clamp(0.0, 1.0)
    }

    pub fn milestone_mut(&mut self, milestone_id: &str) -> Option<&mut Milestone> {
        self.milestones
            .iter_mut()
            .find(|milestone| milestone.id == milestone_id)
    }
}
