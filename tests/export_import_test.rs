mod common;

use anyhow::Result;
use common::{StandardUsers, test_tracker};
use spendlog::io::{Exporter, Importer};

#[tokio::test]
async fn test_export_csv_has_header_and_rows() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;

    tracker
        .add_expense("alice", "2024-01-01", "Food", 1250, "lunch")
        .await?;
    tracker
        .add_expense("alice", "2024-01-02", "Bills", 4000, "phone, mobile")
        .await?;
    tracker
        .add_expense("bob", "2024-01-03", "Food", 700, "not alice")
        .await?;

    let bytes = tracker.export_csv("alice").await?;
    let text = String::from_utf8(bytes)?;
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(
        lines,
        vec![
            "date,category,amount,note",
            "2024-01-02,Bills,40.00,\"phone, mobile\"",
            "2024-01-01,Food,12.50,lunch",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_export_csv_for_empty_ledger_is_header_only() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;

    let text = String::from_utf8(tracker.export_csv("alice").await?)?;

    assert_eq!(text.trim_end(), "date,category,amount,note");

    Ok(())
}

#[tokio::test]
async fn test_export_json_snapshot() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;

    tracker
        .add_expense("alice", "2024-01-01", "Food", 1250, "lunch")
        .await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(tracker.ledger())
        .export_expenses_json("alice", &mut buffer)
        .await?;

    assert_eq!(snapshot.owner, "alice");
    assert_eq!(snapshot.expenses.len(), 1);
    assert_eq!(snapshot.summary.total, 1250);

    let parsed: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(parsed["expenses"][0]["date"], "2024-01-01");
    assert_eq!(parsed["expenses"][0]["amount_cents"], 1250);
    assert_eq!(parsed["summary"]["count"], 1);

    Ok(())
}

#[tokio::test]
async fn test_import_skips_invalid_rows() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;

    let csv = "\
date,category,amount,note
2024-01-01,Food,12.50,lunch
2024-01-02,Food,-3,refund
2024-01-03,Yachts,1000,
not-a-date,Bills,10,
2024-01-04,bills,40,power
";

    let result = Importer::new(tracker.ledger())
        .import_expenses_csv("alice", csv.as_bytes(), false)
        .await?;

    assert_eq!(result.imported, 2);
    let lines: Vec<usize> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 5]);

    let listing = tracker.list_expenses("alice").await?;
    assert_eq!(listing.expenses.len(), 2);
    assert_eq!(listing.expenses[0].category, "Bills");
    assert_eq!(listing.summary.total, 5250);

    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_writes_nothing() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;

    let csv = "date,category,amount,note\n2024-01-01,Food,12.50,lunch\n";

    let result = Importer::new(tracker.ledger())
        .import_expenses_csv("alice", csv.as_bytes(), true)
        .await?;

    assert_eq!(result.imported, 1);
    assert!(result.errors.is_empty());
    assert!(tracker.list_expenses("alice").await?.expenses.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_export_then_import_into_another_user() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;

    tracker
        .add_expense("alice", "2024-01-01", "Food", 1250, "lunch")
        .await?;
    tracker
        .add_expense("alice", "2024-01-02", "Shopping", 3000, "")
        .await?;

    let exported = tracker.export_csv("alice").await?;
    let result = Importer::new(tracker.ledger())
        .import_expenses_csv("bob", exported.as_slice(), false)
        .await?;
    assert_eq!(result.imported, 2);

    let alice = tracker.list_expenses("alice").await?;
    let bob = tracker.list_expenses("bob").await?;
    assert_eq!(alice.summary, bob.summary);
    assert!(bob.expenses.iter().all(|e| e.owner == "bob"));

    Ok(())
}

#[tokio::test]
async fn test_import_for_unknown_owner_fails() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;

    let csv = "date,category,amount,note\n2024-01-01,Food,12.50,lunch\n";
    let result = Importer::new(tracker.ledger())
        .import_expenses_csv("ghost", csv.as_bytes(), false)
        .await;

    assert!(result.is_err());

    Ok(())
}
