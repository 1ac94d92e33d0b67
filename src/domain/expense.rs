use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Cents;

/// Store-assigned expense identifier. Monotonic, never reused.
pub type ExpenseId = i64;

/// Date format used for storage, input and export.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub owner: String,
    pub date: NaiveDate,
    pub category: String,
    pub amount_cents: Cents,
    pub note: String,
}

/// A validated expense that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpense {
    pub owner: String,
    pub date: NaiveDate,
    pub category: String,
    pub amount_cents: Cents,
    pub note: String,
}

/// The mutable fields of an expense. Id and owner never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseChanges {
    pub date: NaiveDate,
    pub category: String,
    pub amount_cents: Cents,
    pub note: String,
}

impl Expense {
    /// True if the expense belongs to `username`.
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner == username
    }
}

/// Derived aggregates over a list of expenses. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub total: Cents,
    pub count: usize,
    /// Integer mean in cents, 0 when there are no expenses.
    pub average: Cents,
}

impl ExpenseSummary {
    /// Sums in i128 so a ledger can never overflow mid-way; a total past
    /// `Cents::MAX` saturates.
    pub fn from_expenses(expenses: &[Expense]) -> Self {
        let total: i128 = expenses.iter().map(|e| i128::from(e.amount_cents)).sum();
        let count = expenses.len();
        let average = if count == 0 {
            0
        } else {
            total / count as i128
        };
        Self {
            total: saturate(total),
            count,
            average: saturate(average),
        }
    }
}

fn saturate(value: i128) -> Cents {
    Cents::try_from(value).unwrap_or(if value < 0 { Cents::MIN } else { Cents::MAX })
}
