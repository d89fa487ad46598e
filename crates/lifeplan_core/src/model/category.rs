//! Category taxonomy shared by goals and budget flows.
//!
//! # Responsibility
//! - Model the three per-year category lists and addressing into them.
//!
//! # Invariants
//! - Category names are free-form text; only the `id` participates in
//!   referential checks.

use serde::{Deserialize, Serialize};

/// One named category entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub archived: bool,
}

impl Category {
    /// Creates a live category with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: super::fresh_id(),
            name: name.into(),
            archived: false,
        }
    }
}

/// Selector for one of the three category lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryGroup {
    Goals,
    BudgetIncome,
    BudgetExpense,
}

impl CategoryGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goals => "goals",
            Self::BudgetIncome => "budgetIncome",
            Self::BudgetExpense => "budgetExpense",
        }
    }
}

/// The per-year category lists, one per spending/planning surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroups {
    pub goals: Vec<Category>,
    pub budget_income: Vec<Category>,
    pub budget_expense: Vec<Category>,
}

impl CategoryGroups {
    /// Borrows the list addressed by `group`.
    pub fn list(&self, group: CategoryGroup) -> &Vec<Category> {
        match group {
            CategoryGroup::Goals => &self.goals,
            CategoryGroup::BudgetIncome => &self.budget_income,
            CategoryGroup::BudgetExpense => &self.budget_expense,
        }
    }

    /// Mutably borrows the list addressed by `group`.
    pub fn list_mut(&mut self, group: CategoryGroup) -> &mut Vec<Category> {
        match group {
            CategoryGroup::Goals => &mut self.goals,
            CategoryGroup::BudgetIncome => &mut self.budget_income,
            CategoryGroup::BudgetExpense => &mut self.budget_expense,
        }
    }

    /// True when the goal-category list contains `category_id`.
    pub fn has_goal_category(&self, category_id: &str) -> bool {
        self.goals.iter().any(|category| category.id == category_id)
    }
}
