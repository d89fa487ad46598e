//! Year-level normalization: category lists, the goal/habit graph and its
//! referential cascade.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde_json::Value;

use crate::model::category::{Category, CategoryGroups};
use crate::model::date_to_ms;
use crate::model::document::YearModel;
use crate::model::goal::{Goal, Milestone, TaskItem};
use crate::model::habit::{Habit, RecurrenceRule};
use crate::normalize::value::{
    array, date_from_str, date_or_none, day_numbers, epoch_ms_or, field, id_list, id_or_fresh,
    int_or, number_or, string_or_empty, truthy,
};
use crate::normalize::{budget, calendar, notes};

pub(crate) fn normalize_year(raw: &Value, year: i32, today: NaiveDate) -> YearModel {
    let categories_raw = field(raw, "categories");
    let categories = CategoryGroups {
        goals: category_list(field(categories_raw, "goals")),
        budget_income: category_list(field(categories_raw, "budgetIncome")),
        budget_expense: category_list(field(categories_raw, "budgetExpense")),
    };

    // Year-global habits first so their stored order and fields win over
    // embedded duplicates.
    let mut habits: Vec<Habit> = Vec::new();
    let mut habit_slots: BTreeMap<String, usize> = BTreeMap::new();
    for raw_habit in array(field(raw, "habits")) {
        merge_habit(
            &mut habits,
            &mut habit_slots,
            normalize_habit(raw_habit, today),
        );
    }

    // Goals, hoisting any habits still embedded under them.
    let mut goals: Vec<Goal> = Vec::new();
    for raw_goal in array(field(raw, "goals")) {
        let mut goal = normalize_goal(raw_goal);
        for raw_embedded in array(field(raw_goal, "habits")) {
            let mut habit = normalize_habit(raw_embedded, today);
            push_unique(&mut habit.linked_goal_ids, goal.id.clone());
            let habit_id = merge_habit(&mut habits, &mut habit_slots, habit);
            push_unique(&mut goal.linked_habit_ids, habit_id);
        }
        goals.push(goal);
    }

    // Strict category rule: goals without a live goal category are dropped,
    // then links on both sides shrink to the surviving id sets.
    let category_ids: BTreeSet<&str> = categories
        .goals
        .iter()
        .map(|category| category.id.as_str())
        .collect();
    goals.retain(|goal| category_ids.contains(goal.category_id.as_str()));

    let goal_ids: BTreeSet<String> = goals.iter().map(|goal| goal.id.clone()).collect();
    for habit in &mut habits {
        habit.linked_goal_ids.retain(|id| goal_ids.contains(id));
    }
    let habit_ids: BTreeSet<String> = habits.iter().map(|habit| habit.id.clone()).collect();
    for goal in &mut goals {
        goal.linked_habit_ids.retain(|id| habit_ids.contains(id));
    }

    YearModel {
        year,
        categories,
        goals,
        habits,
        notes: notes::normalize_notes(field(raw, "notes"), today),
        calendar: calendar::normalize_calendar(field(raw, "calendar"), today),
        budget: budget::normalize_budget(field(raw, "budget")),
    }
}

fn category_list(raw: &Value) -> Vec<Category> {
    array(raw)
        .iter()
        .map(|entry| Category {
            id: id_or_fresh(field(entry, "id")),
            name: string_or_empty(field(entry, "name")),
            archived: truthy(field(entry, "archived")),
        })
        .collect()
}

/// Inserts a habit, or merges link/check sets into an existing one with the
/// same id. Returns the canonical habit id.
fn merge_habit(
    habits: &mut Vec<Habit>,
    slots: &mut BTreeMap<String, usize>,
    habit: Habit,
) -> String {
    match slots.get(&habit.id) {
        Some(&slot) => {
            let existing = &mut habits[slot];
            for link in habit.linked_goal_ids {
                push_unique(&mut existing.linked_goal_ids, link);
            }
            existing.checks.extend(habit.checks);
            existing.id.clone()
        }
        None => {
            let id = habit.id.clone();
            slots.insert(id.clone(), habits.len());
            habits.push(habit);
            id
        }
    }
}

fn push_unique(ids: &mut Vec<String>, id: String) {
    if !ids.iter().any(|existing| *existing == id) {
        ids.push(id);
    }
}

fn normalize_goal(raw: &Value) -> Goal {
    Goal {
        id: id_or_fresh(field(raw, "id")),
        title: string_or_empty(field(raw, "title")),
        category_id: string_or_empty(field(raw, "categoryId")),
        start_date: date_or_none(field(raw, "startDate")),
        end_date: date_or_none(field(raw, "endDate")),
        target_value: number_or(field(raw, "targetValue"), 0.0),
        current_value: number_or(field(raw, "currentValue"), 0.0),
        unit: string_or_empty(field(raw, "unit")),
        notes: string_or_empty(field(raw, "notes")),
        milestones: array(field(raw, "milestones"))
            .iter()
            .map(normalize_milestone)
            .collect(),
        linked_habit_ids: id_list(field(raw, "linkedHabitIds")),
    }
}

fn normalize_milestone(raw: &Value) -> Milestone {
    Milestone {
        id: id_or_fresh(field(raw, "id")),
        title: string_or_empty(field(raw, "title")),
        due_date: date_or_none(field(raw, "dueDate")),
        tasks: array(field(raw, "tasks")).iter().map(normalize_task).collect(),
    }
}

fn normalize_task(raw: &Value) -> TaskItem {
    TaskItem {
        id: id_or_fresh(field(raw, "id")),
        title: string_or_empty(field(raw, "title")),
        due_date: date_or_none(field(raw, "dueDate")),
        done: truthy(field(raw, "done")),
    }
}

fn normalize_habit(raw: &Value, today: NaiveDate) -> Habit {
    Habit {
        id: id_or_fresh(field(raw, "id")),
        title: string_or_empty(field(raw, "title")),
        notes: string_or_empty(field(raw, "notes")),
        recurrence_rule: normalize_rule(field(raw, "recurrenceRule")),
        linked_goal_ids: id_list(field(raw, "linkedGoalIds")),
        checks: normalize_checks(field(raw, "checks")),
        created_at: epoch_ms_or(field(raw, "createdAt"), date_to_ms(today)),
    }
}

/// Coerces a recurrence rule; unknown kinds reset to weekdays.
fn normalize_rule(raw: &Value) -> RecurrenceRule {
    match string_or_empty(field(raw, "kind")).as_str() {
        "daily" => RecurrenceRule::Daily,
        "weekdays" => RecurrenceRule::Weekdays,
        "daysOfWeek" => RecurrenceRule::DaysOfWeek {
            days: day_numbers(field(raw, "days")),
        },
        "monthly" => RecurrenceRule::Monthly {
            day_of_month: int_or(field(raw, "dayOfMonth"), 1).clamp(1, 31) as u8,
        },
        "everyNDays" => RecurrenceRule::EveryNDays {
            interval: int_or(field(raw, "interval"), 1).clamp(1, i64::from(u32::MAX)) as u32,
            start: date_or_none(field(raw, "start")),
        },
        "timesPerWeek" => RecurrenceRule::TimesPerWeek {
            times: int_or(field(raw, "times"), 1).clamp(1, 7) as u8,
            allowed_days: {
                let days = day_numbers(field(raw, "allowedDays"));
                if days.is_empty() {
                    None
                } else {
                    Some(days)
                }
            },
        },
        _ => RecurrenceRule::default(),
    }
}

/// Accepts both check layouts: the canonical date array and the legacy
/// `{date: flag}` map.
fn normalize_checks(raw: &Value) -> BTreeSet<NaiveDate> {
    let mut checks = BTreeSet::new();
    match raw {
        Value::Array(entries) => {
            for entry in entries {
                if let Some(date) = date_or_none(entry) {
                    checks.insert(date);
                }
            }
        }
        Value::Object(map) => {
            for (key, flag) in map {
                if truthy(flag) {
                    if let Some(date) = date_from_str(key) {
                        checks.insert(date);
                    }
                }
            }
        }
        _ => {}
    }
    checks
}
