use anyhow::Result;
use chrono::NaiveDate;
use spendlog::CategorySet;
use spendlog::application::{AppError, QuickLedger};
use spendlog::storage::{FlatFileLedger, FlatRecord};
use tempfile::TempDir;

fn record(date: &str, category: &str, amount_cents: i64, note: &str) -> FlatRecord {
    FlatRecord {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        category: category.to_string(),
        amount_cents,
        note: note.to_string(),
    }
}

#[test]
fn test_missing_file_lists_as_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ledger = FlatFileLedger::new(temp_dir.path().join("expenses.csv"));

    assert!(ledger.read_all()?.is_empty());

    Ok(())
}

#[test]
fn test_append_writes_header_once_and_keeps_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    let ledger = FlatFileLedger::new(&path);

    let lunch = record("2024-01-02", "Food", 1250, "lunch");
    let bus = record("2024-01-01", "Transport", 250, "");
    ledger.append(&lunch)?;
    ledger.append(&bus)?;

    assert_eq!(ledger.read_all()?, vec![lunch, bus]);

    let contents = std::fs::read_to_string(&path)?;
    assert_eq!(contents.matches("date,category,amount,note").count(), 1);
    assert!(contents.contains("2024-01-02,Food,12.50,lunch"));

    Ok(())
}

#[test]
fn test_empty_file_gets_header() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    std::fs::write(&path, "")?;

    let ledger = FlatFileLedger::new(&path);
    ledger.append(&record("2024-01-01", "Other", 100, "misc"))?;

    let contents = std::fs::read_to_string(&path)?;
    assert!(contents.starts_with("date,category,amount,note"));
    assert_eq!(ledger.read_all()?.len(), 1);

    Ok(())
}

#[test]
fn test_reads_rows_without_note_column() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    std::fs::write(&path, "date,category,amount,note\n2024-03-01,Food,7\n")?;

    let records = FlatFileLedger::new(&path).read_all()?;

    assert_eq!(records, vec![record("2024-03-01", "Food", 700, "")]);

    Ok(())
}

#[test]
fn test_malformed_row_reports_line() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    std::fs::write(
        &path,
        "date,category,amount,note\n2024-03-01,Food,7,\n2024-03-02,Food,seven,\n",
    )?;

    let error = FlatFileLedger::new(&path).read_all().unwrap_err();

    assert!(format!("{:#}", error).contains("Line 3"));

    Ok(())
}

#[test]
fn test_quick_add_rejects_invalid_input_and_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    let ledger = QuickLedger::new(&path, CategorySet::default());

    let negative = ledger.add("2024-01-01", "Food", -500, "refund");
    assert!(matches!(negative, Err(AppError::InvalidAmount(_))));

    let blank = ledger.add("2024-01-01", "  ", 500, "");
    assert!(matches!(blank, Err(AppError::InvalidCategory(_))));

    let unknown = ledger.add("2024-01-01", "Travel", 500, "");
    assert!(matches!(unknown, Err(AppError::InvalidCategory(_))));

    assert!(!path.exists());
    assert!(ledger.list()?.is_empty());

    ledger.add("2024-01-01", "food", 500, "")?;
    assert_eq!(ledger.list()?, vec![record("2024-01-01", "Food", 500, "")]);

    Ok(())
}

#[test]
fn test_append_refuses_invalid_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");
    let ledger = FlatFileLedger::new(&path);

    assert!(ledger.append(&record("2024-01-01", "Food", -1, "")).is_err());
    assert!(ledger.append(&record("2024-01-01", "", 100, "")).is_err());
    assert!(!path.exists());

    Ok(())
}

#[test]
fn test_invalid_rows_in_file_are_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("expenses.csv");

    std::fs::write(&path, "date,category,amount,note\n2024-03-01,Food,-7,\n")?;
    let error = FlatFileLedger::new(&path).read_all().unwrap_err();
    assert!(format!("{:#}", error).contains("Negative amount"));

    std::fs::write(&path, "date,category,amount,note\n2024-03-01,,7,\n")?;
    let error = FlatFileLedger::new(&path).read_all().unwrap_err();
    assert!(format!("{:#}", error).contains("Missing category"));

    Ok(())
}
