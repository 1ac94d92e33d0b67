use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;

use crate::domain::{Cents, DATE_FORMAT, format_cents, parse_cents};

/// Header row of the flat-file format.
pub const FLAT_FILE_HEADER: [&str; 4] = ["date", "category", "amount", "note"];

/// One row of the flat-file ledger. No owner and no id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    pub date: NaiveDate,
    pub category: String,
    pub amount_cents: Cents,
    pub note: String,
}

impl FlatRecord {
    /// Parse a CSV row in `date,category,amount,note` order.
    /// The note column may be missing.
    pub fn from_csv(record: &csv::StringRecord) -> Result<Self> {
        let date_str = record.get(0).unwrap_or("").trim();
        let amount_str = record.get(2).unwrap_or("").trim();

        let parsed = Self {
            date: NaiveDate::parse_from_str(date_str, DATE_FORMAT)
                .with_context(|| format!("Invalid date '{}'", date_str))?,
            category: record.get(1).unwrap_or("").trim().to_string(),
            amount_cents: parse_cents(amount_str)
                .with_context(|| format!("Invalid amount '{}'", amount_str))?,
            note: record.get(3).unwrap_or("").to_string(),
        };
        parsed.check()?;
        Ok(parsed)
    }

    /// Rows in the file never carry a negative amount or a blank category.
    fn check(&self) -> Result<()> {
        ensure!(
            self.amount_cents >= 0,
            "Negative amount {}",
            format_cents(self.amount_cents)
        );
        ensure!(!self.category.trim().is_empty(), "Missing category");
        Ok(())
    }

    pub fn to_csv(&self) -> [String; 4] {
        [
            self.date.format(DATE_FORMAT).to_string(),
            self.category.clone(),
            format_cents(self.amount_cents),
            self.note.clone(),
        ]
    }
}

/// Append-only CSV ledger used by the single-user command-line mode.
pub struct FlatFileLedger {
    path: PathBuf,
}

impl FlatFileLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, writing the header first if the file is new or empty.
    pub fn append(&self, record: &FlatRecord) -> Result<()> {
        record.check()?;

        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to inspect ledger file: {}", self.path.display())
                });
            }
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open ledger file: {}", self.path.display()))?;

        let mut writer = csv::Writer::from_writer(file);
        if needs_header {
            writer.write_record(FLAT_FILE_HEADER)?;
        }
        writer.write_record(record.to_csv())?;
        writer.flush().context("Failed to write ledger file")?;
        Ok(())
    }

    /// Read every record in file order. A missing file reads as empty.
    pub fn read_all(&self) -> Result<Vec<FlatRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open ledger file: {}", self.path.display())
                });
            }
        };

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let mut records = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let line = index + 2; // header is line 1
            let row = result.with_context(|| format!("CSV parse error on line {}", line))?;
            records.push(FlatRecord::from_csv(&row).with_context(|| format!("Line {}", line))?);
        }
        Ok(records)
    }
}
