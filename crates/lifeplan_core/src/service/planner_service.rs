//! Planner command service: the single mutation surface over the document.
//!
//! # Responsibility
//! - Own the in-memory normalized document and orchestrate every mutation as
//!   mutate -> normalize -> persist -> swap.
//! - Surface semantic errors for bad references and invalid input.
//!
//! # Invariants
//! - The held document is always normalized; callers only ever observe
//!   repaired state.
//! - Every successful command persists before the held state is swapped.
//! - Corrupt stored payloads recover to the default document; storage
//!   transport errors still propagate.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde_json::Value;

use crate::model::budget::{
    Account, RecurringRule, RecurringSchedule, Transaction, TransactionKind,
};
use crate::model::calendar::{CalendarFilters, CalendarFocus, CalendarView, FocusKind};
use crate::model::category::{Category, CategoryGroup};
use crate::model::document::{year_in_range, PlannerDocument, YearModel};
use crate::model::goal::{Goal, Milestone, TaskItem};
use crate::model::habit::{Habit, RecurrenceRule};
use crate::model::notes::{
    rank_pinned_recency, Folder, NoteFile, NotesModel, DEFAULT_FILE_NAME, DEFAULT_FOLDER_NAME,
};
use crate::normalize::{default_year, normalize_document};
use crate::repo::document_repo::{DocumentRepository, RepoError, DOCUMENT_KEY};
use crate::service::note_preview::derive_markdown_preview;

/// Result type used by planner commands.
pub type PlannerResult<T> = Result<T, PlannerError>;

/// Errors surfaced by planner commands.
#[derive(Debug)]
pub enum PlannerError {
    /// Year lies outside the supported planning range.
    InvalidYear(i32),
    /// Month outside `1..=12`.
    InvalidMonth(u32),
    /// Import payload is not parseable as a document object.
    InvalidImport(String),
    /// Target year already exists.
    YearAlreadyExists(i32),
    /// Target year is not in the registry.
    YearNotFound(i32),
    /// Referenced category does not exist in the addressed list.
    CategoryNotFound(String),
    GoalNotFound(String),
    MilestoneNotFound(String),
    TaskNotFound(String),
    HabitNotFound(String),
    FolderNotFound(String),
    FileNotFound(String),
    NoteNotFound(String),
    AccountNotFound(String),
    TransactionNotFound(String),
    RuleNotFound(String),
    /// Document (de)serialization failure.
    Serialize(serde_json::Error),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for PlannerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidYear(year) => write!(f, "year out of supported range: {year}"),
            Self::InvalidMonth(month) => write!(f, "month out of range: {month}"),
            Self::InvalidImport(message) => write!(f, "import rejected: {message}"),
            Self::YearAlreadyExists(year) => write!(f, "year already exists: {year}"),
            Self::YearNotFound(year) => write!(f, "year not found: {year}"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::GoalNotFound(id) => write!(f, "goal not found: {id}"),
            Self::MilestoneNotFound(id) => write!(f, "milestone not found: {id}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::FolderNotFound(id) => write!(f, "folder not found: {id}"),
            Self::FileNotFound(id) => write!(f, "file not found: {id}"),
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::AccountNotFound(id) => write!(f, "account not found: {id}"),
            Self::TransactionNotFound(id) => write!(f, "transaction not found: {id}"),
            Self::RuleNotFound(id) => write!(f, "recurring rule not found: {id}"),
            Self::Serialize(err) => write!(f, "document serialization failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PlannerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PlannerError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for PlannerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Input for [`PlannerService::create_goal`].
#[derive(Debug, Clone, Default)]
pub struct NewGoal {
    pub title: String,
    pub category_id: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_value: f64,
    pub unit: String,
}

/// Input for [`PlannerService::create_habit`].
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub title: String,
    pub notes: String,
    pub recurrence_rule: RecurrenceRule,
}

/// Input for [`PlannerService::add_transaction`].
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub note: String,
}

/// Input for [`PlannerService::create_recurring_rule`].
#[derive(Debug, Clone)]
pub struct NewRecurringRule {
    pub name: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub day_of_month: u8,
}

/// One in-memory notes search match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSearchHit {
    pub note_id: String,
    pub file_id: String,
    pub title: String,
    /// Markdown-stripped body snippet, when the body is not empty.
    pub snippet: Option<String>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn push_unique(ids: &mut Vec<String>, id: String) {
    if !ids.iter().any(|existing| *existing == id) {
        ids.push(id);
    }
}

/// Command service over the stored planner document.
pub struct PlannerService<R: DocumentRepository> {
    repo: R,
    doc: PlannerDocument,
}

impl<R: DocumentRepository> PlannerService<R> {
    /// Loads and normalizes the stored document.
    ///
    /// A missing blob yields the default document. A stored blob that is not
    /// valid JSON is discarded with a recovery event; storage errors are
    /// returned to the caller untouched.
    pub fn load(repo: R) -> PlannerResult<Self> {
        let doc = match repo.load_raw(DOCUMENT_KEY)? {
            Some(payload) => match serde_json::from_str::<Value>(&payload) {
                Ok(raw) => normalize_document(raw),
                Err(err) => {
                    warn!(
                        "event=document_load module=service status=recovered error_code=corrupt_payload error={err}"
                    );
                    normalize_document(Value::Null)
                }
            },
            None => normalize_document(Value::Null),
        };
        info!(
            "event=document_load module=service status=ok years={}",
            doc.years.len()
        );
        Ok(Self { repo, doc })
    }

    /// The current normalized document.
    pub fn document(&self) -> &PlannerDocument {
        &self.doc
    }

    /// The selected year's model, when one is selected and present.
    pub fn current_year(&self) -> Option<&YearModel> {
        self.doc
            .settings
            .current_year
            .and_then(|year| self.doc.year(year))
    }

    /// Persists the current document as-is. Used by debounced save owners.
    pub fn save(&mut self) -> PlannerResult<()> {
        let working = self.doc.clone();
        self.commit(working)
    }

    fn commit(&mut self, working: PlannerDocument) -> PlannerResult<()> {
        let raw = serde_json::to_value(&working)?;
        self.replace_with(raw)
    }

    fn replace_with(&mut self, raw: Value) -> PlannerResult<()> {
        let normalized = normalize_document(raw);
        let payload = serde_json::to_string(&normalized)?;
        self.repo.save_raw(DOCUMENT_KEY, &payload)?;
        debug!(
            "event=document_save module=service status=ok years={} bytes={}",
            normalized.years.len(),
            payload.len()
        );
        self.doc = normalized;
        Ok(())
    }

    fn ensure_year_allowed(year: i32) -> PlannerResult<()> {
        if year_in_range(year) {
            Ok(())
        } else {
            Err(PlannerError::InvalidYear(year))
        }
    }

    fn year_entry(working: &mut PlannerDocument, year: i32) -> PlannerResult<&mut YearModel> {
        working
            .years
            .get_mut(&year)
            .ok_or(PlannerError::YearNotFound(year))
    }

    // ----- years and settings -----

    /// Creates a fully-populated default year.
    pub fn add_year(&mut self, year: i32) -> PlannerResult<()> {
        Self::ensure_year_allowed(year)?;
        if self.doc.years.contains_key(&year) {
            return Err(PlannerError::YearAlreadyExists(year));
        }
        let mut working = self.doc.clone();
        working.years.insert(year, default_year(year, today()));
        working.years_order.push(year);
        self.commit(working)
    }

    /// Removes a year and repoints the selection if it pointed there.
    pub fn delete_year(&mut self, year: i32) -> PlannerResult<()> {
        if !self.doc.years.contains_key(&year) {
            return Err(PlannerError::YearNotFound(year));
        }
        let mut working = self.doc.clone();
        working.years.remove(&year);
        working.years_order.retain(|&entry| entry != year);
        // A stale selection would make normalization resurrect the year.
        if working.settings.current_year == Some(year) {
            working.settings.current_year = working.years.keys().next_back().copied();
        }
        self.commit(working)
    }

    pub fn select_year(&mut self, year: i32) -> PlannerResult<()> {
        Self::ensure_year_allowed(year)?;
        if !self.doc.years.contains_key(&year) {
            return Err(PlannerError::YearNotFound(year));
        }
        let mut working = self.doc.clone();
        working.settings.current_year = Some(year);
        self.commit(working)
    }

    /// Sets the display currency; blank input resets to the default.
    pub fn set_currency(&mut self, currency: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        working.settings.currency = currency.trim().to_string();
        self.commit(working)
    }

    // ----- categories -----

    pub fn create_category(
        &mut self,
        year: i32,
        group: CategoryGroup,
        name: &str,
    ) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let category = Category::new(name);
        let id = category.id.clone();
        entry.categories.list_mut(group).push(category);
        self.commit(working)?;
        Ok(id)
    }

    pub fn rename_category(
        &mut self,
        year: i32,
        group: CategoryGroup,
        category_id: &str,
        name: &str,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let category = entry
            .categories
            .list_mut(group)
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or_else(|| PlannerError::CategoryNotFound(category_id.to_string()))?;
        category.name = name.to_string();
        self.commit(working)
    }

    pub fn set_category_archived(
        &mut self,
        year: i32,
        group: CategoryGroup,
        category_id: &str,
        archived: bool,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let category = entry
            .categories
            .list_mut(group)
            .iter_mut()
            .find(|category| category.id == category_id)
            .ok_or_else(|| PlannerError::CategoryNotFound(category_id.to_string()))?;
        category.archived = archived;
        self.commit(working)
    }

    /// Deletes a category. Goals of a deleted goal category cascade away
    /// during the normalization pass of the commit.
    pub fn delete_category(
        &mut self,
        year: i32,
        group: CategoryGroup,
        category_id: &str,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let list = entry.categories.list_mut(group);
        let before = list.len();
        list.retain(|category| category.id != category_id);
        if list.len() == before {
            return Err(PlannerError::CategoryNotFound(category_id.to_string()));
        }

        let goals_before = self.doc.year(year).map_or(0, |entry| entry.goals.len());
        self.commit(working)?;
        let goals_after = self.doc.year(year).map_or(0, |entry| entry.goals.len());
        if goals_after < goals_before {
            info!(
                "event=category_cascade module=service status=ok year={year} group={} goals_removed={}",
                group.as_str(),
                goals_before - goals_after
            );
        }
        Ok(())
    }

    // ----- goals -----

    /// Creates a goal bound to an existing goal category.
    pub fn create_goal(&mut self, year: i32, input: NewGoal) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        if !entry.categories.has_goal_category(&input.category_id) {
            return Err(PlannerError::CategoryNotFound(input.category_id));
        }
        let mut goal = Goal::new(input.title, input.category_id);
        goal.start_date = input.start_date;
        goal.end_date = input.end_date;
        goal.target_value = input.target_value;
        goal.unit = input.unit;
        let id = goal.id.clone();
        entry.goals.push(goal);
        self.commit(working)?;
        Ok(id)
    }

    /// Replaces a goal wholesale; the category must still exist.
    pub fn update_goal(&mut self, year: i32, goal: Goal) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        if !entry.categories.has_goal_category(&goal.category_id) {
            return Err(PlannerError::CategoryNotFound(goal.category_id.clone()));
        }
        let slot = entry
            .goal_mut(&goal.id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal.id.clone()))?;
        *slot = goal;
        self.commit(working)
    }

    pub fn delete_goal(&mut self, year: i32, goal_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.goals.len();
        entry.goals.retain(|goal| goal.id != goal_id);
        if entry.goals.len() == before {
            return Err(PlannerError::GoalNotFound(goal_id.to_string()));
        }
        self.commit(working)
    }

    /// Updates the manual progress value.
    pub fn set_goal_progress(
        &mut self,
        year: i32,
        goal_id: &str,
        current_value: f64,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let goal = entry
            .goal_mut(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        goal.current_value = current_value;
        self.commit(working)
    }

    pub fn add_milestone(
        &mut self,
        year: i32,
        goal_id: &str,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let goal = entry
            .goal_mut(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        let milestone = Milestone::new(title, due_date);
        let id = milestone.id.clone();
        goal.milestones.push(milestone);
        self.commit(working)?;
        Ok(id)
    }

    pub fn add_task(
        &mut self,
        year: i32,
        goal_id: &str,
        milestone_id: &str,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let goal = entry
            .goal_mut(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        let milestone = goal
            .milestone_mut(milestone_id)
            .ok_or_else(|| PlannerError::MilestoneNotFound(milestone_id.to_string()))?;
        let task = TaskItem::new(title, due_date);
        let id = task.id.clone();
        milestone.tasks.push(task);
        self.commit(working)?;
        Ok(id)
    }

    /// Flips one task's done flag. Returns the new state.
    pub fn toggle_task(
        &mut self,
        year: i32,
        goal_id: &str,
        milestone_id: &str,
        task_id: &str,
    ) -> PlannerResult<bool> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let goal = entry
            .goal_mut(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        let milestone = goal
            .milestone_mut(milestone_id)
            .ok_or_else(|| PlannerError::MilestoneNotFound(milestone_id.to_string()))?;
        let task = milestone
            .tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or_else(|| PlannerError::TaskNotFound(task_id.to_string()))?;
        task.done = !task.done;
        let done = task.done;
        self.commit(working)?;
        Ok(done)
    }

    // ----- habits -----

    pub fn create_habit(&mut self, year: i32, input: NewHabit) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let mut habit = Habit::new(input.title, input.recurrence_rule);
        habit.notes = input.notes;
        let id = habit.id.clone();
        entry.habits.push(habit);
        self.commit(working)?;
        Ok(id)
    }

    /// Replaces a habit wholesale.
    pub fn update_habit(&mut self, year: i32, habit: Habit) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let slot = entry
            .habit_mut(&habit.id)
            .ok_or_else(|| PlannerError::HabitNotFound(habit.id.clone()))?;
        *slot = habit;
        self.commit(working)
    }

    pub fn delete_habit(&mut self, year: i32, habit_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.habits.len();
        entry.habits.retain(|habit| habit.id != habit_id);
        if entry.habits.len() == before {
            return Err(PlannerError::HabitNotFound(habit_id.to_string()));
        }
        self.commit(working)
    }

    /// Flips the check for one day. Returns the new checked state.
    pub fn toggle_habit_check(
        &mut self,
        year: i32,
        habit_id: &str,
        date: NaiveDate,
    ) -> PlannerResult<bool> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let habit = entry
            .habit_mut(habit_id)
            .ok_or_else(|| PlannerError::HabitNotFound(habit_id.to_string()))?;
        let checked = habit.toggle_check(date);
        self.commit(working)?;
        Ok(checked)
    }

    /// Links a goal and a habit in both directions.
    pub fn link_habit(&mut self, year: i32, goal_id: &str, habit_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        if entry.habit(habit_id).is_none() {
            return Err(PlannerError::HabitNotFound(habit_id.to_string()));
        }
        let goal = entry
            .goal_mut(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        push_unique(&mut goal.linked_habit_ids, habit_id.to_string());
        if let Some(habit) = entry.habit_mut(habit_id) {
            push_unique(&mut habit.linked_goal_ids, goal_id.to_string());
        }
        self.commit(working)
    }

    pub fn unlink_habit(&mut self, year: i32, goal_id: &str, habit_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let goal = entry
            .goal_mut(goal_id)
            .ok_or_else(|| PlannerError::GoalNotFound(goal_id.to_string()))?;
        goal.linked_habit_ids.retain(|id| id != habit_id);
        let habit = entry
            .habit_mut(habit_id)
            .ok_or_else(|| PlannerError::HabitNotFound(habit_id.to_string()))?;
        habit.linked_goal_ids.retain(|id| id != goal_id);
        self.commit(working)
    }

    /// Goal categories reachable from a habit through its linked goals.
    pub fn habit_categories(&self, year: i32, habit_id: &str) -> PlannerResult<Vec<Category>> {
        let entry = self
            .doc
            .year(year)
            .ok_or(PlannerError::YearNotFound(year))?;
        let habit = entry
            .habit(habit_id)
            .ok_or_else(|| PlannerError::HabitNotFound(habit_id.to_string()))?;
        let category_ids: BTreeSet<&str> = habit
            .linked_goal_ids
            .iter()
            .filter_map(|goal_id| entry.goal(goal_id))
            .map(|goal| goal.category_id.as_str())
            .collect();
        Ok(entry
            .categories
            .goals
            .iter()
            .filter(|category| category_ids.contains(category.id.as_str()))
            .cloned()
            .collect())
    }

    // ----- notes -----

    pub fn create_folder(&mut self, year: i32, name: &str) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let folder = Folder::new(name);
        let id = folder.id.clone();
        entry.notes.folders.push(folder);
        self.commit(working)?;
        Ok(id)
    }

    pub fn create_file(&mut self, year: i32, folder_id: &str, name: &str) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        if entry.notes.folder(folder_id).is_none() {
            return Err(PlannerError::FolderNotFound(folder_id.to_string()));
        }
        let file = NoteFile::new(folder_id, name);
        let id = file.id.clone();
        entry.notes.files.push(file);
        self.commit(working)?;
        Ok(id)
    }

    /// Creates a note. Without an explicit file the note lands in the first
    /// file of the first folder, synthesizing the default chain on demand.
    pub fn create_note(
        &mut self,
        year: i32,
        file_id: Option<&str>,
        title: &str,
        body: &str,
    ) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let target_file_id = match file_id {
            Some(file_id) => {
                if entry.notes.file(file_id).is_none() {
                    return Err(PlannerError::FileNotFound(file_id.to_string()));
                }
                file_id.to_string()
            }
            None => Self::default_note_home(&mut entry.notes),
        };
        let note = crate::model::notes::Note::new(target_file_id, title, body);
        let id = note.id.clone();
        entry.notes.notes.push(note);
        entry.notes.ui.note_id = Some(id.clone());
        self.commit(working)?;
        Ok(id)
    }

    /// First file of the first folder, synthesizing folder and file when the
    /// tree is empty.
    fn default_note_home(notes: &mut NotesModel) -> String {
        if let Some(folder) = notes.folders.first() {
            if let Some(file) = notes.files.iter().find(|file| file.folder_id == folder.id) {
                return file.id.clone();
            }
        }
        let folder_id = match notes.folders.first() {
            Some(folder) => folder.id.clone(),
            None => {
                let folder = Folder::new(DEFAULT_FOLDER_NAME);
                let id = folder.id.clone();
                notes.folders.push(folder);
                id
            }
        };
        let file = NoteFile::new(folder_id, DEFAULT_FILE_NAME);
        let id = file.id.clone();
        notes.files.push(file);
        id
    }

    /// Full content replacement; bumps the note's `updated_at`.
    pub fn update_note(
        &mut self,
        year: i32,
        note_id: &str,
        title: &str,
        body: &str,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let note = entry
            .notes
            .note_mut(note_id)
            .ok_or_else(|| PlannerError::NoteNotFound(note_id.to_string()))?;
        note.title = title.to_string();
        note.body = body.to_string();
        note.touch();
        self.commit(working)
    }

    pub fn delete_note(&mut self, year: i32, note_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.notes.notes.len();
        entry.notes.notes.retain(|note| note.id != note_id);
        if entry.notes.notes.len() == before {
            return Err(PlannerError::NoteNotFound(note_id.to_string()));
        }
        self.commit(working)
    }

    /// Deletes a file together with the notes it contains.
    pub fn delete_file(&mut self, year: i32, file_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.notes.files.len();
        entry.notes.files.retain(|file| file.id != file_id);
        if entry.notes.files.len() == before {
            return Err(PlannerError::FileNotFound(file_id.to_string()));
        }
        entry.notes.notes.retain(|note| note.file_id != file_id);
        self.commit(working)
    }

    /// Deletes a folder together with its files and their notes.
    pub fn delete_folder(&mut self, year: i32, folder_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.notes.folders.len();
        entry.notes.folders.retain(|folder| folder.id != folder_id);
        if entry.notes.folders.len() == before {
            return Err(PlannerError::FolderNotFound(folder_id.to_string()));
        }
        let removed_files: BTreeSet<String> = entry
            .notes
            .files
            .iter()
            .filter(|file| file.folder_id == folder_id)
            .map(|file| file.id.clone())
            .collect();
        entry.notes.files.retain(|file| file.folder_id != folder_id);
        entry
            .notes
            .notes
            .retain(|note| !removed_files.contains(&note.file_id));
        self.commit(working)
    }

    /// Stores the notes selection. Selections are advisory: anything stale
    /// is repaired to the first available candidate during the commit.
    pub fn select_notes(
        &mut self,
        year: i32,
        folder_id: Option<&str>,
        file_id: Option<&str>,
        note_id: Option<&str>,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        entry.notes.ui.folder_id = folder_id.map(str::to_string);
        entry.notes.ui.file_id = file_id.map(str::to_string);
        entry.notes.ui.note_id = note_id.map(str::to_string);
        self.commit(working)
    }

    pub fn set_notes_query(&mut self, year: i32, q: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        entry.notes.ui.q = q.to_string();
        self.commit(working)
    }

    pub fn set_folder_pinned(
        &mut self,
        year: i32,
        folder_id: &str,
        pinned: bool,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let folder = entry
            .notes
            .folders
            .iter_mut()
            .find(|folder| folder.id == folder_id)
            .ok_or_else(|| PlannerError::FolderNotFound(folder_id.to_string()))?;
        folder.pinned = pinned;
        self.commit(working)
    }

    pub fn set_file_pinned(&mut self, year: i32, file_id: &str, pinned: bool) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let file = entry
            .notes
            .files
            .iter_mut()
            .find(|file| file.id == file_id)
            .ok_or_else(|| PlannerError::FileNotFound(file_id.to_string()))?;
        file.pinned = pinned;
        self.commit(working)
    }

    pub fn set_note_pinned(&mut self, year: i32, note_id: &str, pinned: bool) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let note = entry
            .notes
            .note_mut(note_id)
            .ok_or_else(|| PlannerError::NoteNotFound(note_id.to_string()))?;
        note.pinned = pinned;
        self.commit(working)
    }

    /// Case-insensitive substring search over titles and bodies.
    ///
    /// Blank queries return no hits. Hits are ordered pinned-first then by
    /// recency, matching the notes listing.
    pub fn search_notes(&self, year: i32, query: &str) -> PlannerResult<Vec<NoteSearchHit>> {
        let entry = self
            .doc
            .year(year)
            .ok_or(PlannerError::YearNotFound(year))?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let matches = entry.notes.notes.iter().filter(|note| {
            note.title.to_lowercase().contains(&needle) || note.body.to_lowercase().contains(&needle)
        });
        Ok(rank_pinned_recency(matches)
            .into_iter()
            .map(|note| NoteSearchHit {
                note_id: note.id.clone(),
                file_id: note.file_id.clone(),
                title: note.title.clone(),
                snippet: derive_markdown_preview(&note.body).preview_text,
            })
            .collect())
    }

    // ----- budget -----

    pub fn create_account(&mut self, year: i32, name: &str) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let account = Account::new(name);
        let id = account.id.clone();
        entry.budget.accounts.push(account);
        self.commit(working)?;
        Ok(id)
    }

    pub fn set_account_archived(
        &mut self,
        year: i32,
        account_id: &str,
        archived: bool,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let account = entry
            .budget
            .accounts
            .iter_mut()
            .find(|account| account.id == account_id)
            .ok_or_else(|| PlannerError::AccountNotFound(account_id.to_string()))?;
        account.archived = archived;
        self.commit(working)
    }

    /// Appends a hand-entered transaction. Referenced accounts must exist;
    /// category references are advisory and stay unvalidated.
    pub fn add_transaction(&mut self, year: i32, input: NewTransaction) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        for account_id in [&input.account_id, &input.to_account_id]
            .into_iter()
            .flatten()
        {
            if entry.budget.account(account_id).is_none() {
                return Err(PlannerError::AccountNotFound(account_id.clone()));
            }
        }
        let mut tx = Transaction::new(input.kind, input.date, input.amount);
        tx.category_id = input.category_id;
        tx.account_id = input.account_id;
        tx.to_account_id = input.to_account_id;
        tx.note = input.note;
        let id = tx.id.clone();
        entry.budget.transactions.push(tx);
        self.commit(working)?;
        Ok(id)
    }

    /// Replaces a transaction's fields. The signature is system-managed:
    /// generated rows keep their rule lineage and get their `_sig`
    /// re-derived from the edited values, so editing a signature field
    /// makes the rule regenerate a fresh occurrence alongside the edit.
    pub fn update_transaction(&mut self, year: i32, tx: Transaction) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let slot = entry
            .budget
            .transactions
            .iter_mut()
            .find(|existing| existing.id == tx.id)
            .ok_or_else(|| PlannerError::TransactionNotFound(tx.id.clone()))?;
        let prior_sig = slot.sig.take();
        *slot = tx;
        slot.sig = prior_sig;
        slot.restamp_sig();
        self.commit(working)
    }

    pub fn delete_transaction(&mut self, year: i32, tx_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.budget.transactions.len();
        entry.budget.transactions.retain(|tx| tx.id != tx_id);
        if entry.budget.transactions.len() == before {
            return Err(PlannerError::TransactionNotFound(tx_id.to_string()));
        }
        self.commit(working)
    }

    pub fn create_recurring_rule(
        &mut self,
        year: i32,
        input: NewRecurringRule,
    ) -> PlannerResult<String> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        if let Some(account_id) = &input.account_id {
            if entry.budget.account(account_id).is_none() {
                return Err(PlannerError::AccountNotFound(account_id.clone()));
            }
        }
        let rule = RecurringRule {
            id: crate::model::fresh_id(),
            name: input.name,
            kind: input.kind,
            amount: input.amount,
            category_id: input.category_id,
            account_id: input.account_id,
            schedule: RecurringSchedule::Monthly {
                day_of_month: input.day_of_month.clamp(1, 31),
                interval: 1,
            },
        };
        let id = rule.id.clone();
        entry.budget.recurring_rules.push(rule);
        self.commit(working)?;
        Ok(id)
    }

    pub fn update_recurring_rule(&mut self, year: i32, rule: RecurringRule) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let slot = entry
            .budget
            .recurring_rules
            .iter_mut()
            .find(|existing| existing.id == rule.id)
            .ok_or_else(|| PlannerError::RuleNotFound(rule.id.clone()))?;
        *slot = rule;
        self.commit(working)
    }

    pub fn delete_recurring_rule(&mut self, year: i32, rule_id: &str) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let before = entry.budget.recurring_rules.len();
        entry.budget.recurring_rules.retain(|rule| rule.id != rule_id);
        if entry.budget.recurring_rules.len() == before {
            return Err(PlannerError::RuleNotFound(rule_id.to_string()));
        }
        self.commit(working)
    }

    /// Materializes recurring rules for one month of the year, skipping
    /// already-generated occurrences. Returns the number of transactions
    /// appended; zero appends skip the persistence round-trip.
    pub fn generate_recurring(&mut self, year: i32, month: u32) -> PlannerResult<usize> {
        if !(1..=12).contains(&month) {
            return Err(PlannerError::InvalidMonth(month));
        }
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        let appended = entry.budget.generate_recurring(year, month);
        if appended == 0 {
            return Ok(0);
        }
        self.commit(working)?;
        info!(
            "event=recurring_generate module=service status=ok year={year} month={month} appended={appended}"
        );
        Ok(appended)
    }

    // ----- calendar -----

    pub fn set_calendar_view(&mut self, year: i32, view: CalendarView) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        entry.calendar.default_view = view;
        self.commit(working)
    }

    pub fn set_calendar_filters(
        &mut self,
        year: i32,
        filters: CalendarFilters,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        entry.calendar.filters = filters;
        self.commit(working)
    }

    /// Sets the calendar focus. A goal/habit focus without a target degrades
    /// to "all" during the commit's normalization pass.
    pub fn set_calendar_focus(
        &mut self,
        year: i32,
        kind: FocusKind,
        target: Option<&str>,
    ) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        entry.calendar.focus = CalendarFocus {
            kind,
            id: target.map(str::to_string),
        };
        self.commit(working)
    }

    pub fn set_calendar_date(&mut self, year: i32, date: NaiveDate) -> PlannerResult<()> {
        let mut working = self.doc.clone();
        let entry = Self::year_entry(&mut working, year)?;
        entry.calendar.selected_date = date;
        self.commit(working)
    }

    // ----- import / export / reset -----

    /// Pretty-printed export of the current normalized document.
    pub fn export_json(&self) -> PlannerResult<String> {
        let payload = serde_json::to_string_pretty(&self.doc)?;
        info!(
            "event=document_export module=service status=ok bytes={}",
            payload.len()
        );
        Ok(payload)
    }

    /// Replaces the whole document from an exported payload.
    ///
    /// The payload must parse as a JSON object; its content is then repaired
    /// by normalization rather than validated.
    pub fn import_json(&mut self, payload: &str) -> PlannerResult<()> {
        let raw: Value = serde_json::from_str(payload)
            .map_err(|err| PlannerError::InvalidImport(err.to_string()))?;
        if !raw.is_object() {
            return Err(PlannerError::InvalidImport(
                "expected a top-level object".to_string(),
            ));
        }
        self.replace_with(raw)?;
        info!(
            "event=document_import module=service status=ok years={}",
            self.doc.years.len()
        );
        Ok(())
    }

    /// Drops all data and persists the default document.
    pub fn reset(&mut self) -> PlannerResult<()> {
        self.replace_with(Value::Null)?;
        warn!("event=document_reset module=service status=ok");
        Ok(())
    }
}
