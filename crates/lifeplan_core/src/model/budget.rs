//! Budget ledger: accounts, transactions and recurring rules.
//!
//! # Responsibility
//! - Model the per-year money ledger.
//! - Materialize recurring rules into concrete transactions exactly once per
//!   rule occurrence.
//!
//! # Invariants
//! - Generated transactions carry a `_sig` dedup key; hand-entered ones
//!   never do.
//! - Generation appends at most one occurrence per rule and month.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A money account such as "Bank" or "Cash".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub archived: bool,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: super::fresh_id(),
            name: name.into(),
            archived: false,
        }
    }
}

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl Default for TransactionKind {
    fn default() -> Self {
        Self::Expense
    }
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub date: Option<NaiveDate>,
    pub amount: f64,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub to_account_id: Option<String>,
    pub note: String,
    /// Dedup signature, present only on generated transactions.
    #[serde(rename = "_sig", default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
}

impl Transaction {
    /// Creates a hand-entered transaction (no `_sig`).
    pub fn new(kind: TransactionKind, date: Option<NaiveDate>, amount: f64) -> Self {
        Self {
            id: super::fresh_id(),
            kind,
            date,
            amount,
            category_id: None,
            account_id: None,
            to_account_id: None,
            note: String::new(),
            sig: None,
        }
    }

    /// Re-derives the dedup signature from the current field values,
    /// keeping the rule id embedded in the existing one. Hand entries
    /// (no signature) are left untouched.
    ///
    /// An edit that changes a signature field stops matching the rule's
    /// own occurrence signature, so the rule fires again on the next
    /// generation pass.
    pub fn restamp_sig(&mut self) {
        let Some(sig) = &self.sig else {
            return;
        };
        let rule_id = sig.split('|').next().unwrap_or("").to_string();
        self.sig = Some(join_sig(
            &rule_id,
            self.date,
            self.kind,
            self.amount,
            self.category_id.as_deref(),
            self.account_id.as_deref(),
        ));
    }
}

/// Joins the dedup signature fields in their stored order.
fn join_sig(
    rule_id: &str,
    date: Option<NaiveDate>,
    kind: TransactionKind,
    amount: f64,
    category_id: Option<&str>,
    account_id: Option<&str>,
) -> String {
    let date = date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "{}|{}|{}|{}|{}|{}",
        rule_id,
        date,
        kind.as_str(),
        amount,
        category_id.unwrap_or(""),
        account_id.unwrap_or("")
    )
}

/// When a recurring rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RecurringSchedule {
    /// Fires once a month on `day_of_month`, clamped to the month length.
    /// `interval` is part of the stored layout; generation fires every
    /// month regardless of its value.
    Monthly { day_of_month: u8, interval: u32 },
}

impl Default for RecurringSchedule {
    fn default() -> Self {
        Self::Monthly {
            day_of_month: 1,
            interval: 1,
        }
    }
}

/// A recurring bill or income template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringRule {
    pub id: String,
    pub name: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
    pub schedule: RecurringSchedule,
}

impl RecurringRule {
    /// Dedup signature for this rule firing on `date`.
    ///
    /// The signature embeds the rule's id, date, kind, amount and the raw
    /// category/account references. Editing any of those fields changes the
    /// signature, so already-materialized occurrences will not match and the
    /// edited rule generates anew.
    pub fn occurrence_sig(&self, date: NaiveDate) -> String {
        join_sig(
            &self.id,
            Some(date),
            self.kind,
            self.amount,
            self.category_id.as_deref(),
            self.account_id.as_deref(),
        )
    }

    /// Concrete transaction for this rule firing on `date`.
    pub fn materialize(&self, date: NaiveDate) -> Transaction {
        Transaction {
            id: super::fresh_id(),
            kind: self.kind,
            date: Some(date),
            amount: self.amount,
            category_id: self.category_id.clone(),
            account_id: self.account_id.clone(),
            to_account_id: None,
            note: self.name.clone(),
            sig: Some(self.occurrence_sig(date)),
        }
    }

    /// The day this rule fires in `(year, month)`, clamped into the month.
    pub fn occurrence_in(&self, year: i32, month: u32) -> Option<NaiveDate> {
        let RecurringSchedule::Monthly { day_of_month, .. } = self.schedule;
        let day = u32::from(day_of_month)
            .min(super::days_in_month(year, month))
            .max(1);
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// The per-year budget ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetModel {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub recurring_rules: Vec<RecurringRule>,
}

impl BudgetModel {
    pub fn account(&self, account_id: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == account_id)
    }

    /// Materializes every recurring rule for `(year, month)`.
    ///
    /// Occurrences already present (matched by `_sig`) are skipped, so the
    /// call is idempotent for unchanged rules and safe on every render.
    /// Returns the number of transactions appended.
    pub fn generate_recurring(&mut self, year: i32, month: u32) -> usize {
        let existing: BTreeSet<&str> = self
            .transactions
            .iter()
            .filter_map(|tx| tx.sig.as_deref())
            .collect();

        let mut due: Vec<Transaction> = Vec::new();
        for rule in &self.recurring_rules {
            let Some(date) = rule.occurrence_in(year, month) else {
                continue;
            };
            let sig = rule.occurrence_sig(date);
            if existing.contains(sig.as_str()) {
                continue;
            }
            due.push(rule.materialize(date));
        }

        let appended = due.len();
        self.transactions.extend(due);
        appended
    }
}
