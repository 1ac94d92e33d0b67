use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::domain::{
    CategorySet, Cents, DATE_FORMAT, Expense, ExpenseChanges, ExpenseId, ExpenseSummary,
    MAX_AMOUNT_CENTS, NewExpense, format_cents, parse_cents,
};
use crate::storage::{ExpenseFilter, Repository};

use super::AppError;
use super::reporting::{CategorySummary, MonthlySummary};

/// Application service for one store's expense ledger.
/// Every read and write is scoped to an owner passed in by the caller.
#[derive(Clone)]
pub struct LedgerService {
    repo: Repository,
    categories: CategorySet,
}

/// An owner's expenses plus aggregates over exactly those rows.
#[derive(Debug, Clone)]
pub struct ExpenseListing {
    pub expenses: Vec<Expense>,
    pub summary: ExpenseSummary,
}

impl ExpenseListing {
    fn new(expenses: Vec<Expense>) -> Self {
        let summary = ExpenseSummary::from_expenses(&expenses);
        Self { expenses, summary }
    }
}

impl LedgerService {
    /// Create a new ledger service accepting the given categories.
    pub fn new(repo: Repository, categories: CategorySet) -> Self {
        Self { repo, categories }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a new expense for `owner` and return its id.
    pub async fn add_expense(
        &self,
        owner: &str,
        date: &str,
        category: &str,
        amount_cents: Cents,
        note: &str,
    ) -> Result<ExpenseId, AppError> {
        let changes = self.validate(date, category, amount_cents, note)?;

        if !self.repo.user_exists(owner).await? {
            return Err(AppError::UnknownOwner(owner.to_string()));
        }

        let expense = NewExpense {
            owner: owner.to_string(),
            date: changes.date,
            category: changes.category,
            amount_cents: changes.amount_cents,
            note: changes.note,
        };
        let id = self.repo.insert_expense(&expense).await?;

        info!(owner, id, amount = %format_cents(amount_cents), "added expense");
        Ok(id)
    }

    /// List all of `owner`'s expenses, newest first, with aggregates.
    pub async fn get_expenses(&self, owner: &str) -> Result<ExpenseListing, AppError> {
        let expenses = self.repo.list_expenses_by_owner(owner).await?;
        debug!(owner, count = expenses.len(), "listed expenses");
        Ok(ExpenseListing::new(expenses))
    }

    /// List `owner`'s expenses matching `filter`, with aggregates over the
    /// matching rows only.
    pub async fn get_expenses_filtered(
        &self,
        owner: &str,
        filter: &ExpenseFilter,
    ) -> Result<ExpenseListing, AppError> {
        let expenses = self.repo.list_expenses_filtered(owner, filter).await?;
        debug!(owner, count = expenses.len(), "listed filtered expenses");
        Ok(ExpenseListing::new(expenses))
    }

    /// Overwrite date, category, amount and note of one of `owner`'s
    /// expenses.
    pub async fn update_expense(
        &self,
        owner: &str,
        id: ExpenseId,
        date: &str,
        category: &str,
        amount_cents: Cents,
        note: &str,
    ) -> Result<(), AppError> {
        let changes = self.validate(date, category, amount_cents, note)?;
        self.ensure_owned(owner, id).await?;

        if !self.repo.update_expense(id, &changes).await? {
            return Err(AppError::NotFound(id));
        }

        info!(owner, id, "updated expense");
        Ok(())
    }

    /// Permanently delete one of `owner`'s expenses.
    pub async fn delete_expense(&self, owner: &str, id: ExpenseId) -> Result<(), AppError> {
        self.ensure_owned(owner, id).await?;

        if !self.repo.delete_expense(id).await? {
            return Err(AppError::NotFound(id));
        }

        info!(owner, id, "deleted expense");
        Ok(())
    }

    // ========================
    // Reports
    // ========================

    /// Spending per category for `owner`, largest first.
    pub async fn category_breakdown(&self, owner: &str) -> Result<Vec<CategorySummary>, AppError> {
        let aggregates = self.repo.sum_expenses_by_category(owner).await?;
        Ok(CategorySummary::from_aggregates(aggregates))
    }

    /// Spending per calendar month for `owner`, oldest first.
    pub async fn monthly_totals(&self, owner: &str) -> Result<Vec<MonthlySummary>, AppError> {
        let aggregates = self.repo.sum_expenses_by_month(owner).await?;
        Ok(aggregates.into_iter().map(MonthlySummary::from).collect())
    }

    // ========================
    // Validation
    // ========================

    /// Validate user input for the mutable fields of an expense.
    pub fn validate(
        &self,
        date: &str,
        category: &str,
        amount_cents: Cents,
        note: &str,
    ) -> Result<ExpenseChanges, AppError> {
        validate_fields(&self.categories, date, category, amount_cents, note)
    }

    /// Map user input to the configured spelling of a category.
    pub fn resolve_category(&self, category: &str) -> Result<String, AppError> {
        resolve_category(&self.categories, category)
    }

    async fn ensure_owned(&self, owner: &str, id: ExpenseId) -> Result<(), AppError> {
        let expense = self
            .repo
            .get_expense(id)
            .await?
            .ok_or(AppError::NotFound(id))?;

        if !expense.is_owned_by(owner) {
            return Err(AppError::Forbidden(id));
        }
        Ok(())
    }
}

/// Check the mutable fields of an expense against `categories`.
/// Amount is checked first, then category, then date.
pub fn validate_fields(
    categories: &CategorySet,
    date: &str,
    category: &str,
    amount_cents: Cents,
    note: &str,
) -> Result<ExpenseChanges, AppError> {
    Ok(ExpenseChanges {
        amount_cents: validate_amount(amount_cents)?,
        category: resolve_category(categories, category)?,
        date: parse_date(date)?,
        note: note.trim().to_string(),
    })
}

/// Map user input to the spelling `categories` uses.
pub fn resolve_category(categories: &CategorySet, category: &str) -> Result<String, AppError> {
    categories.resolve(category).ok_or_else(|| {
        if category.trim().is_empty() {
            AppError::InvalidCategory("category must not be empty".to_string())
        } else {
            AppError::InvalidCategory(format!(
                "'{}' is not one of: {}",
                category.trim(),
                categories.names().join(", ")
            ))
        }
    })
}

/// Reject negative amounts and amounts above `MAX_AMOUNT_CENTS`.
pub fn validate_amount(amount_cents: Cents) -> Result<Cents, AppError> {
    if amount_cents < 0 {
        return Err(AppError::InvalidAmount(format!(
            "{} is negative",
            format_cents(amount_cents)
        )));
    }
    if amount_cents > MAX_AMOUNT_CENTS {
        return Err(AppError::InvalidAmount(format!(
            "{} exceeds the maximum of {}",
            format_cents(amount_cents),
            format_cents(MAX_AMOUNT_CENTS)
        )));
    }
    Ok(amount_cents)
}

/// Parse a decimal amount such as "12.50" into non-negative cents.
pub fn parse_amount(input: &str) -> Result<Cents, AppError> {
    let cents = parse_cents(input)
        .map_err(|e| AppError::InvalidAmount(format!("'{}': {}", input.trim(), e)))?;
    validate_amount(cents)
}

/// Parse a `YYYY-MM-DD` date. The year must have exactly four digits so
/// stored dates keep sorting as text.
pub fn parse_date(input: &str) -> Result<NaiveDate, AppError> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .ok()
        .filter(|date| (1000..=9999).contains(&date.year()))
        .ok_or_else(|| AppError::InvalidDate(input.to_string()))
}
