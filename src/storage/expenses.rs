use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::Row;

use crate::domain::{Cents, DATE_FORMAT, Expense, ExpenseChanges, ExpenseId, NewExpense};

use super::Repository;

const EXPENSE_COLUMNS: &str = "id, owner, date, category, amount_cents, note";

/// Optional filters for listing one owner's expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    /// Inclusive lower bound.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper bound.
    pub to_date: Option<NaiveDate>,
    pub limit: Option<usize>,
}

/// Per-category aggregate for one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryAggregate {
    pub category: String,
    pub count: i64,
    pub total: Cents,
}

/// Per-month aggregate for one owner, month formatted as "YYYY-MM".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthAggregate {
    pub month: String,
    pub count: i64,
    pub total: Cents,
}

impl Repository {
    // ========================
    // Expense operations
    // ========================

    /// Insert a new expense and return its freshly assigned id.
    pub async fn insert_expense(&self, expense: &NewExpense) -> Result<ExpenseId> {
        let mut write = self.begin_write().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO expenses (owner, date, category, amount_cents, note)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.owner)
        .bind(expense.date.format(DATE_FORMAT).to_string())
        .bind(&expense.category)
        .bind(expense.amount_cents)
        .bind(&expense.note)
        .execute(&mut *write.tx)
        .await
        .context("Failed to save expense")?;

        write.commit().await?;
        Ok(result.last_insert_rowid())
    }

    /// Get an expense by id, regardless of owner.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM expenses WHERE id = ?",
            EXPENSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch expense")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_expense(&row)?)),
            None => Ok(None),
        }
    }

    /// List an owner's expenses, newest date first. Expenses on the same
    /// date keep insertion order.
    pub async fn list_expenses_by_owner(&self, owner: &str) -> Result<Vec<Expense>> {
        self.list_expenses_filtered(owner, &ExpenseFilter::default())
            .await
    }

    /// List an owner's expenses with optional filters, same ordering as
    /// `list_expenses_by_owner`.
    pub async fn list_expenses_filtered(
        &self,
        owner: &str,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>> {
        let mut query = format!("SELECT {} FROM expenses WHERE owner = ?", EXPENSE_COLUMNS);

        // Bindings must outlive the query
        let from_date_str = filter.from_date.map(|d| d.format(DATE_FORMAT).to_string());
        let to_date_str = filter.to_date.map(|d| d.format(DATE_FORMAT).to_string());

        if filter.category.is_some() {
            query.push_str(" AND category = ? COLLATE NOCASE");
        }
        if from_date_str.is_some() {
            query.push_str(" AND date >= ?");
        }
        if to_date_str.is_some() {
            query.push_str(" AND date <= ?");
        }

        query.push_str(" ORDER BY date DESC, id ASC");

        if let Some(limit) = filter.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }

        let mut sql_query = sqlx::query(&query).bind(owner);

        if let Some(category) = &filter.category {
            sql_query = sql_query.bind(category);
        }
        if let Some(from) = &from_date_str {
            sql_query = sql_query.bind(from);
        }
        if let Some(to) = &to_date_str {
            sql_query = sql_query.bind(to);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    /// Overwrite the mutable fields of an expense.
    /// Returns `false` if no expense has that id.
    pub async fn update_expense(&self, id: ExpenseId, changes: &ExpenseChanges) -> Result<bool> {
        let mut write = self.begin_write().await?;

        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET date = ?, category = ?, amount_cents = ?, note = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.date.format(DATE_FORMAT).to_string())
        .bind(&changes.category)
        .bind(changes.amount_cents)
        .bind(&changes.note)
        .bind(id)
        .execute(&mut *write.tx)
        .await
        .context("Failed to update expense")?;

        write.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    /// Permanently remove an expense.
    /// Returns `false` if no expense has that id.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        let mut write = self.begin_write().await?;

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&mut *write.tx)
            .await
            .context("Failed to delete expense")?;

        write.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    /// Totals per category for one owner, largest total first.
    pub async fn sum_expenses_by_category(&self, owner: &str) -> Result<Vec<CategoryAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(*) as count, COALESCE(SUM(amount_cents), 0) as total
            FROM expenses
            WHERE owner = ?
            GROUP BY category
            ORDER BY total DESC, category ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum expenses by category")?;

        Ok(rows
            .iter()
            .map(|row| CategoryAggregate {
                category: row.get("category"),
                count: row.get("count"),
                total: row.get("total"),
            })
            .collect())
    }

    /// Totals per calendar month for one owner, oldest month first.
    pub async fn sum_expenses_by_month(&self, owner: &str) -> Result<Vec<MonthAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT substr(date, 1, 7) as month, COUNT(*) as count, COALESCE(SUM(amount_cents), 0) as total
            FROM expenses
            WHERE owner = ?
            GROUP BY month
            ORDER BY month ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum expenses by month")?;

        Ok(rows
            .iter()
            .map(|row| MonthAggregate {
                month: row.get("month"),
                count: row.get("count"),
                total: row.get("total"),
            })
            .collect())
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let date_str: String = row.get("date");

        Ok(Expense {
            id: row.get("id"),
            owner: row.get("owner"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid expense date: {}", date_str))?,
            category: row.get("category"),
            amount_cents: row.get("amount_cents"),
            note: row.get("note"),
        })
    }
}
