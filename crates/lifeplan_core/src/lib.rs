//! Core domain logic for the yearly life planner.
//! This crate is the single source of truth for document repair and
//! business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::budget::{
    Account, BudgetModel, RecurringRule, RecurringSchedule, Transaction, TransactionKind,
};
pub use model::calendar::{CalendarFilters, CalendarFocus, CalendarPrefs, CalendarView, FocusKind};
pub use model::category::{Category, CategoryGroup, CategoryGroups};
pub use model::document::{
    year_in_range, PlannerDocument, Settings, YearModel, DOCUMENT_VERSION, YEAR_MAX, YEAR_MIN,
};
pub use model::goal::{Goal, Milestone, TaskItem};
pub use model::habit::{Habit, RecurrenceRule};
pub use model::notes::{Folder, Note, NoteFile, NotesModel, NotesUiState};
pub use normalize::{default_year, normalize_document, normalize_document_at};
pub use repo::document_repo::{
    DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository, DOCUMENT_KEY,
};
pub use service::debounce::SaveDebouncer;
pub use service::note_preview::{derive_markdown_preview, MarkdownPreview};
pub use service::planner_service::{
    NewGoal, NewHabit, NewRecurringRule, NewTransaction, NoteSearchHit, PlannerError,
    PlannerResult, PlannerService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
