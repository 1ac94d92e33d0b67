use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{DATE_FORMAT, Expense, ExpenseSummary, format_cents};
use crate::storage::FLAT_FILE_HEADER;

/// Snapshot of one owner's ledger for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub owner: String,
    pub expenses: Vec<Expense>,
    pub summary: ExpenseSummary,
}

/// Exporter for converting an owner's ledger to CSV or JSON
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export expenses to CSV, in listing order (newest first).
    /// Uses the flat-file column layout so the output can be imported again.
    pub async fn export_expenses_csv<W: Write>(&self, owner: &str, writer: W) -> Result<usize> {
        let listing = self.service.get_expenses(owner).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(FLAT_FILE_HEADER)?;

        for expense in &listing.expenses {
            csv_writer.write_record([
                expense.date.format(DATE_FORMAT).to_string(),
                expense.category.clone(),
                format_cents(expense.amount_cents),
                expense.note.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(listing.expenses.len())
    }

    /// Export the owner's ledger as a pretty-printed JSON snapshot
    pub async fn export_expenses_json<W: Write>(
        &self,
        owner: &str,
        mut writer: W,
    ) -> Result<LedgerSnapshot> {
        let listing = self.service.get_expenses(owner).await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            owner: owner.to_string(),
            expenses: listing.expenses,
            summary: listing.summary,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
