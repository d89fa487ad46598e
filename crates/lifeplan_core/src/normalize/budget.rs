//! Budget ledger normalization.

use serde_json::Value;

use crate::model::budget::{
    Account, BudgetModel, RecurringRule, RecurringSchedule, Transaction, TransactionKind,
};
use crate::normalize::value::{
    array, date_or_none, field, id_or_fresh, int_or, number_or, opt_id, string_or_empty, truthy,
};

/// Account names seeded into a year that has none.
const DEFAULT_ACCOUNT_NAMES: [&str; 3] = ["Bank", "Cash", "Savings"];

pub(crate) fn normalize_budget(raw: &Value) -> BudgetModel {
    let mut accounts: Vec<Account> = array(field(raw, "accounts"))
        .iter()
        .map(normalize_account)
        .collect();
    if accounts.is_empty() {
        accounts = DEFAULT_ACCOUNT_NAMES
            .iter()
            .copied()
            .map(Account::new)
            .collect();
    }

    BudgetModel {
        accounts,
        transactions: array(field(raw, "transactions"))
            .iter()
            .map(normalize_transaction)
            .collect(),
        recurring_rules: array(field(raw, "recurringRules"))
            .iter()
            .map(normalize_recurring_rule)
            .collect(),
    }
}

fn normalize_account(raw: &Value) -> Account {
    Account {
        id: id_or_fresh(field(raw, "id")),
        name: string_or_empty(field(raw, "name")),
        archived: truthy(field(raw, "archived")),
    }
}

/// Reads the transaction kind; older documents stored it under `type`.
fn normalize_kind(raw: &Value) -> TransactionKind {
    let stored = match field(raw, "kind") {
        Value::Null => field(raw, "type"),
        kind => kind,
    };
    TransactionKind::parse(&string_or_empty(stored)).unwrap_or_default()
}

fn normalize_transaction(raw: &Value) -> Transaction {
    Transaction {
        id: id_or_fresh(field(raw, "id")),
        kind: normalize_kind(raw),
        date: date_or_none(field(raw, "date")),
        amount: number_or(field(raw, "amount"), 0.0),
        category_id: opt_id(field(raw, "categoryId")),
        account_id: opt_id(field(raw, "accountId")),
        to_account_id: opt_id(field(raw, "toAccountId")),
        note: string_or_empty(field(raw, "note")),
        sig: match field(raw, "_sig") {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        },
    }
}

fn normalize_recurring_rule(raw: &Value) -> RecurringRule {
    RecurringRule {
        id: id_or_fresh(field(raw, "id")),
        name: string_or_empty(field(raw, "name")),
        kind: normalize_kind(raw),
        amount: number_or(field(raw, "amount"), 0.0),
        category_id: opt_id(field(raw, "categoryId")),
        account_id: opt_id(field(raw, "accountId")),
        schedule: normalize_schedule(field(raw, "schedule")),
    }
}

/// Monthly is the only schedule kind; damaged input resets to day 1,
/// interval 1.
fn normalize_schedule(raw: &Value) -> RecurringSchedule {
    RecurringSchedule::Monthly {
        day_of_month: int_or(field(raw, "dayOfMonth"), 1).clamp(1, 31) as u8,
        interval: int_or(field(raw, "interval"), 1).max(1) as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_budget;
    use crate::model::budget::TransactionKind;
    use serde_json::json;

    #[test]
    fn empty_budget_seeds_default_accounts() {
        let budget = normalize_budget(&json!(null));
        let names: Vec<&str> = budget
            .accounts
            .iter()
            .map(|account| account.name.as_str())
            .collect();
        assert_eq!(names, vec!["Bank", "Cash", "Savings"]);
        assert!(budget.transactions.is_empty());
    }

    #[test]
    fn existing_accounts_are_not_reseeded() {
        let budget = normalize_budget(&json!({"accounts": [{"id": "a1", "name": "Wallet"}]}));
        assert_eq!(budget.accounts.len(), 1);
        assert_eq!(budget.accounts[0].name, "Wallet");
        assert!(!budget.accounts[0].archived);
    }

    #[test]
    fn unknown_transaction_kind_becomes_expense() {
        let budget = normalize_budget(&json!({
            "transactions": [
                {"id": "t1", "kind": "refund", "amount": "12.5"},
                {"id": "t2", "kind": "income", "amount": 3, "_sig": "r|2025-01-01|income|3||"}
            ]
        }));
        assert_eq!(budget.transactions[0].kind, TransactionKind::Expense);
        assert_eq!(budget.transactions[0].amount, 12.5);
        assert_eq!(budget.transactions[0].sig, None);
        assert_eq!(budget.transactions[1].kind, TransactionKind::Income);
        assert_eq!(
            budget.transactions[1].sig.as_deref(),
            Some("r|2025-01-01|income|3||")
        );
    }

    #[test]
    fn legacy_type_key_still_sets_the_kind() {
        let budget = normalize_budget(&json!({
            "transactions": [{"id": "t1", "type": "income", "amount": 5}],
            "recurringRules": [{"id": "r1", "name": "Salary", "type": "income"}]
        }));
        assert_eq!(budget.transactions[0].kind, TransactionKind::Income);
        assert_eq!(budget.recurring_rules[0].kind, TransactionKind::Income);
    }

    #[test]
    fn schedule_day_is_clamped_into_month_bounds() {
        let budget = normalize_budget(&json!({
            "recurringRules": [
                {"id": "r1", "name": "Rent", "schedule": {"dayOfMonth": 45, "interval": 2}},
                {"id": "r2", "name": "Gym", "schedule": {"dayOfMonth": 0}}
            ]
        }));
        let schedules: Vec<(u8, u32)> = budget
            .recurring_rules
            .iter()
            .map(|rule| {
                let crate::model::budget::RecurringSchedule::Monthly {
                    day_of_month,
                    interval,
                } = rule.schedule;
                (day_of_month, interval)
            })
            .collect();
        assert_eq!(schedules, vec![(31, 2), (1, 1)]);
    }
}
