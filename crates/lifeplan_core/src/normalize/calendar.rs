//! Calendar preference normalization.

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::calendar::{
    CalendarFilters, CalendarFocus, CalendarPrefs, CalendarView, FocusKind,
};
use crate::normalize::value::{bool_default_true, date_or_none, field, opt_id, string_or_empty};

/// Coerces calendar preferences; unknown views and focus kinds reset to the
/// defaults and a focus without a target degrades to "all".
pub(crate) fn normalize_calendar(raw: &Value, today: NaiveDate) -> CalendarPrefs {
    let filters_raw = field(raw, "filters");
    let focus_raw = field(raw, "focus");

    let mut kind = FocusKind::parse(&string_or_empty(field(focus_raw, "kind"))).unwrap_or_default();
    let id = match kind {
        FocusKind::All => None,
        _ => opt_id(field(focus_raw, "id")),
    };
    if id.is_none() {
        kind = FocusKind::All;
    }

    CalendarPrefs {
        default_view: CalendarView::parse(&string_or_empty(field(raw, "defaultView")))
            .unwrap_or_default(),
        filters: CalendarFilters {
            show_goals: bool_default_true(field(filters_raw, "showGoals")),
            show_milestones: bool_default_true(field(filters_raw, "showMilestones")),
            show_habits: bool_default_true(field(filters_raw, "showHabits")),
            show_transactions: bool_default_true(field(filters_raw, "showTransactions")),
        },
        focus: CalendarFocus { kind, id },
        selected_date: date_or_none(field(raw, "selectedDate")).unwrap_or(today),
    }
}
