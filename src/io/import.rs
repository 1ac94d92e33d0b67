use anyhow::Result;
use std::io::Read;

use crate::application::{AppError, LedgerService, parse_amount};

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// A row that could not be imported
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub message: String,
}

/// Importer for loading `date,category,amount,note` rows (the flat-file
/// layout, also produced by CSV export) into an owner's ledger.
pub struct Importer<'a> {
    service: &'a LedgerService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Import rows for `owner`. Invalid rows are reported and skipped; valid
    /// rows are stored one by one. With `dry_run` nothing is written.
    pub async fn import_expenses_csv<R: Read>(
        &self,
        owner: &str,
        reader: R,
        dry_run: bool,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let mut result = ImportResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        message: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let date = record.get(0).unwrap_or("");
            let category = record.get(1).unwrap_or("");
            let note = record.get(3).unwrap_or("");

            let outcome = match parse_amount(record.get(2).unwrap_or("")) {
                Ok(amount_cents) if dry_run => self
                    .service
                    .validate(date, category, amount_cents, note)
                    .map(|_| ()),
                Ok(amount_cents) => self
                    .service
                    .add_expense(owner, date, category, amount_cents, note)
                    .await
                    .map(|_| ()),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(()) => result.imported += 1,
                // Not a problem with the row: give up on the whole import
                Err(e @ (AppError::StoreUnavailable(_) | AppError::UnknownOwner(_))) => {
                    return Err(e.into());
                }
                Err(e) => result.errors.push(ImportError {
                    line,
                    message: e.to_string(),
                }),
            }
        }

        Ok(result)
    }
}
