use chrono::NaiveDate;
use lifeplan_core::{normalize_document_at, DOCUMENT_VERSION};
use serde_json::{json, Value};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

#[test]
fn null_input_yields_default_document() {
    let doc = normalize_document_at(Value::Null, today());

    assert_eq!(doc.version, DOCUMENT_VERSION);
    assert_eq!(doc.settings.currency, "USD");
    assert_eq!(doc.settings.week_starts_on, "monday");
    assert_eq!(doc.settings.current_year, None);
    assert!(doc.years.is_empty());
    assert!(doc.years_order.is_empty());
}

#[test]
fn normalize_is_idempotent_over_serialization() {
    let raw = json!({
        "version": "3",
        "settings": {"currency": 42, "currentYear": "2025", "weekStartsOn": "sunday"},
        "yearsOrder": [2025, 2025, "2024"],
        "years": {
            "2025": {
                "categories": {"goals": [{"id": "c1", "name": "Health"}]},
                "goals": [
                    {
                        "id": "g1",
                        "title": "Run",
                        "categoryId": "c1",
                        "targetValue": "120",
                        "habits": [{"id": "h1", "title": "Jog"}]
                    },
                    {"id": "g2", "title": "Ghost", "categoryId": "missing"}
                ],
                "notes": [{"id": "n1", "title": "Plan", "text": "legacy body"}],
                "budget": {
                    "transactions": [{"id": "t1", "type": "expense", "amount": "12.5"}]
                }
            }
        }
    });

    let first = normalize_document_at(raw, today());
    let reparsed = serde_json::to_value(&first).unwrap();
    let second = normalize_document_at(reparsed, today());

    assert_eq!(first, second);
}

#[test]
fn year_registry_unions_order_entries_map_keys_and_selection() {
    let raw = json!({
        "settings": {"currentYear": 2027},
        "yearsOrder": [2024, "2025"],
        "years": {"2026": {}}
    });

    let doc = normalize_document_at(raw, today());

    assert_eq!(doc.years_order, vec![2024, 2025, 2026, 2027]);
    assert_eq!(doc.years.keys().copied().collect::<Vec<_>>(), vec![2024, 2025, 2026, 2027]);
    assert_eq!(doc.settings.current_year, Some(2027));
    for (year, model) in &doc.years {
        assert_eq!(*year, model.year);
    }
}

#[test]
fn dead_category_reference_drops_goal_and_shrinks_links() {
    let raw = json!({
        "years": {
            "2025": {
                "categories": {"goals": [{"id": "c1", "name": "Health"}]},
                "goals": [
                    {"id": "g1", "title": "Keep", "categoryId": "c1", "linkedHabitIds": ["h1"]},
                    {"id": "g2", "title": "Drop", "categoryId": "ghost", "linkedHabitIds": ["h1"]}
                ],
                "habits": [
                    {"id": "h1", "title": "Jog", "linkedGoalIds": ["g1", "g2"]}
                ]
            }
        }
    });

    let doc = normalize_document_at(raw, today());
    let year = doc.years.get(&2025).unwrap();

    assert_eq!(year.goals.len(), 1);
    assert_eq!(year.goals[0].id, "g1");
    assert_eq!(year.goals[0].linked_habit_ids, vec!["h1"]);
    assert_eq!(year.habits[0].linked_goal_ids, vec!["g1"]);
}

#[test]
fn embedded_goal_habits_hoist_to_year_list() {
    let raw = json!({
        "years": {
            "2025": {
                "categories": {"goals": [{"id": "c1", "name": "Health"}]},
                "goals": [
                    {
                        "id": "g1",
                        "title": "Run",
                        "categoryId": "c1",
                        "habits": [{"id": "h1", "title": "Jog", "checks": ["2025-06-01"]}]
                    }
                ],
                "habits": [
                    {"id": "h1", "title": "Jog", "checks": ["2025-06-02"]}
                ]
            }
        }
    });

    let doc = normalize_document_at(raw, today());
    let year = doc.years.get(&2025).unwrap();

    assert_eq!(year.habits.len(), 1, "duplicate ids must merge");
    let habit = &year.habits[0];
    assert_eq!(habit.linked_goal_ids, vec!["g1"]);
    assert!(habit.is_checked(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()));
    assert!(habit.is_checked(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()));
    assert_eq!(year.goals[0].linked_habit_ids, vec!["h1"]);
}

#[test]
fn junk_fields_coerce_instead_of_failing() {
    let raw = json!({
        "years": {
            "2025": {
                "categories": {"goals": [{"id": "c1", "name": "Health", "archived": 1}]},
                "goals": [
                    {
                        "id": "g1",
                        "title": "Read",
                        "categoryId": "c1",
                        "targetValue": "42.5",
                        "currentValue": null,
                        "startDate": "not-a-date",
                        "endDate": "2025-12-31"
                    }
                ]
            }
        }
    });

    let doc = normalize_document_at(raw, today());
    let year = doc.years.get(&2025).unwrap();
    let goal = &year.goals[0];

    assert!(year.categories.goals[0].archived);
    assert_eq!(goal.target_value, 42.5);
    assert_eq!(goal.current_value, 0.0);
    assert_eq!(goal.start_date, None);
    assert_eq!(goal.end_date, NaiveDate::from_ymd_opt(2025, 12, 31));
}

#[test]
fn milestone_due_dates_and_task_titles_survive() {
    let raw = json!({
        "years": {
            "2025": {
                "categories": {"goals": [{"id": "c1", "name": "Health"}]},
                "goals": [
                    {
                        "id": "g1",
                        "title": "Run",
                        "categoryId": "c1",
                        "milestones": [
                            {
                                "id": "m1",
                                "title": "Base",
                                "dueDate": "2025-06-01",
                                "tasks": [
                                    {"id": "t1", "title": "Draft the plan", "dueDate": "2025-05-20", "done": 1},
                                    {"id": "t2", "title": "Buy shoes"}
                                ]
                            }
                        ]
                    }
                ]
            }
        }
    });

    let doc = normalize_document_at(raw, today());
    let milestone = &doc.years.get(&2025).unwrap().goals[0].milestones[0];

    assert_eq!(milestone.due_date, NaiveDate::from_ymd_opt(2025, 6, 1));
    assert_eq!(milestone.tasks[0].title, "Draft the plan");
    assert_eq!(
        milestone.tasks[0].due_date,
        NaiveDate::from_ymd_opt(2025, 5, 20)
    );
    assert!(milestone.tasks[0].done);
    assert_eq!(milestone.tasks[1].title, "Buy shoes");
    assert_eq!(milestone.tasks[1].due_date, None);
    assert!(!milestone.tasks[1].done);
}

#[test]
fn version_is_restamped_and_unknown_keys_drop() {
    let raw = json!({
        "version": 3,
        "legacyJunk": {"nested": true},
        "years": {"2025": {"somethingElse": []}}
    });

    let doc = normalize_document_at(raw, today());
    assert_eq!(doc.version, DOCUMENT_VERSION);

    let reparsed = serde_json::to_value(&doc).unwrap();
    assert!(reparsed.get("legacyJunk").is_none());
    assert!(reparsed["years"]["2025"].get("somethingElse").is_none());
}

#[test]
fn generated_signature_survives_normalization() {
    let raw = json!({
        "years": {
            "2025": {
                "budget": {
                    "transactions": [
                        {"id": "t1", "type": "expense", "amount": 850.0, "date": "2025-03-01",
                         "_sig": "r1|2025-03-01|expense|850|c1|a1"},
                        {"id": "t2", "type": "income", "amount": 100.0, "date": "2025-03-02"}
                    ]
                }
            }
        }
    });

    let doc = normalize_document_at(raw, today());
    let budget = &doc.years.get(&2025).unwrap().budget;

    assert_eq!(
        budget.transactions[0].sig.as_deref(),
        Some("r1|2025-03-01|expense|850|c1|a1")
    );
    assert_eq!(budget.transactions[1].sig, None);
}

#[test]
fn fresh_year_seeds_default_accounts() {
    let raw = json!({"settings": {"currentYear": 2025}});

    let doc = normalize_document_at(raw, today());
    let budget = &doc.years.get(&2025).unwrap().budget;

    let names: Vec<&str> = budget.accounts.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Bank", "Cash", "Savings"]);
    assert!(budget.transactions.is_empty());
    assert!(budget.recurring_rules.is_empty());
}

#[test]
fn week_start_is_forced_to_monday() {
    let raw = json!({"settings": {"weekStartsOn": "saturday"}});
    let doc = normalize_document_at(raw, today());
    assert_eq!(doc.settings.week_starts_on, "monday");
}
