use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{CategorySet, Cents};
use crate::storage::{FlatFileLedger, FlatRecord};

use super::AppError;
use super::service::validate_fields;

/// Single-user flat-file ledger. Input is checked the same way the ledger
/// service checks it, so nothing invalid reaches the file.
pub struct QuickLedger {
    file: FlatFileLedger,
    categories: CategorySet,
}

impl QuickLedger {
    pub fn new(path: impl Into<PathBuf>, categories: CategorySet) -> Self {
        Self {
            file: FlatFileLedger::new(path),
            categories,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Validate and append one expense. Returns the record as written.
    pub fn add(
        &self,
        date: &str,
        category: &str,
        amount_cents: Cents,
        note: &str,
    ) -> Result<FlatRecord, AppError> {
        let changes = validate_fields(&self.categories, date, category, amount_cents, note)?;
        let record = FlatRecord {
            date: changes.date,
            category: changes.category,
            amount_cents: changes.amount_cents,
            note: changes.note,
        };

        self.file.append(&record)?;
        info!(path = %self.file.path().display(), category = %record.category, "Expense appended");
        Ok(record)
    }

    /// Every record in file order.
    pub fn list(&self) -> Result<Vec<FlatRecord>, AppError> {
        Ok(self.file.read_all()?)
    }
}
