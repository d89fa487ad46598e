//! Document normalization: schema repair with referential cascades.
//!
//! # Responsibility
//! - Convert any stored or imported JSON into the canonical typed document
//!   in a single pass.
//! - Repair structure (missing containers, orphaned references, legacy
//!   layouts) instead of rejecting it.
//!
//! # Invariants
//! - Idempotent: re-normalizing a normalized document changes nothing.
//! - Total: never fails, never panics; unknown shapes degrade to defaults.
//! - Unknown keys are dropped, not preserved.
//!
//! # See also
//! - `crate::model` for the canonical shapes this module produces.

mod budget;
mod calendar;
mod notes;
mod value;
mod year;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::document::{PlannerDocument, Settings, YearModel, DOCUMENT_VERSION};
use value::{array, field, string_or, year_from_key, year_from_value};

/// Week start is fixed; historical documents carried other values.
const WEEK_STARTS_ON: &str = "monday";
/// Currency fallback for missing or blank settings.
const DEFAULT_CURRENCY: &str = "USD";

/// Normalizes against the current local date.
pub fn normalize_document(raw: Value) -> PlannerDocument {
    normalize_document_at(raw, chrono::Local::now().date_naive())
}

/// Normalizes with an explicit "today", for deterministic callers.
pub fn normalize_document_at(raw: Value, today: NaiveDate) -> PlannerDocument {
    let settings_raw = field(&raw, "settings");
    let currency = {
        let stored = string_or(field(settings_raw, "currency"), DEFAULT_CURRENCY);
        if stored.trim().is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            stored
        }
    };
    let current_year = year_from_value(field(settings_raw, "currentYear"));

    // Year registry: the union of yearsOrder, the years map keys and the
    // selected year. Missing entries materialize as default years.
    let mut registry: BTreeSet<i32> = BTreeSet::new();
    for entry in array(field(&raw, "yearsOrder")) {
        if let Some(year) = year_from_value(entry) {
            registry.insert(year);
        }
    }
    let years_raw = field(&raw, "years");
    if let Value::Object(map) = years_raw {
        for key in map.keys() {
            if let Some(year) = year_from_key(key) {
                registry.insert(year);
            }
        }
    }
    if let Some(year) = current_year {
        registry.insert(year);
    }

    let mut years: BTreeMap<i32, YearModel> = BTreeMap::new();
    for &entry in &registry {
        let raw_year = field(years_raw, &entry.to_string());
        years.insert(entry, year::normalize_year(raw_year, entry, today));
    }

    PlannerDocument {
        version: DOCUMENT_VERSION,
        settings: Settings {
            currency,
            current_year,
            week_starts_on: WEEK_STARTS_ON.to_string(),
        },
        years_order: registry.into_iter().collect(),
        years,
    }
}

/// A fully-populated default year, as produced for missing registry entries.
pub fn default_year(year: i32, today: NaiveDate) -> YearModel {
    year::normalize_year(&Value::Null, year, today)
}

#[cfg(test)]
mod tests {
    use super::{normalize_document_at, DEFAULT_CURRENCY};
    use chrono::NaiveDate;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn null_input_yields_empty_default_document() {
        let document = normalize_document_at(json!(null), today());
        assert_eq!(document.settings.currency, DEFAULT_CURRENCY);
        assert_eq!(document.settings.current_year, None);
        assert_eq!(document.settings.week_starts_on, "monday");
        assert!(document.years.is_empty());
        assert!(document.years_order.is_empty());
    }

    #[test]
    fn registry_unions_order_map_and_selection() {
        let document = normalize_document_at(
            json!({
                "settings": {"currentYear": 2027},
                "yearsOrder": [2026, "2024"],
                "years": {"2025": {}}
            }),
            today(),
        );
        assert_eq!(document.years_order, vec![2024, 2025, 2026, 2027]);
        assert_eq!(
            document.years.keys().copied().collect::<Vec<i32>>(),
            vec![2024, 2025, 2026, 2027]
        );
        // The synthesized selected year is fully populated.
        let year = &document.years[&2027];
        assert_eq!(year.year, 2027);
        assert_eq!(year.budget.accounts.len(), 3);
    }

    #[test]
    fn week_start_is_forced_to_monday() {
        let document = normalize_document_at(
            json!({"settings": {"weekStartsOn": "sunday", "currency": "EUR"}}),
            today(),
        );
        assert_eq!(document.settings.week_starts_on, "monday");
        assert_eq!(document.settings.currency, "EUR");
    }
}
