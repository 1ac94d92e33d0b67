mod common;

use std::sync::Arc;

use anyhow::Result;
use common::{StandardUsers, test_tracker};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_get_distinct_ids() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;
    let tracker = Arc::new(tracker);

    let mut handles = Vec::new();
    for i in 0..20 {
        let tracker = Arc::clone(&tracker);
        handles.push(tokio::spawn(async move {
            tracker
                .add_expense("alice", "2024-01-01", "Food", 100 + i, "")
                .await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await??);
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);

    let listing = tracker.list_expenses("alice").await?;
    assert_eq!(listing.summary.count, 20);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_apply_one_write_completely() -> Result<()> {
    let (tracker, _temp) = test_tracker().await?;
    StandardUsers::register(&tracker).await?;
    let id = tracker
        .add_expense("alice", "2024-01-01", "Food", 100, "original")
        .await?;
    let tracker = Arc::new(tracker);

    let first = {
        let tracker = Arc::clone(&tracker);
        tokio::spawn(async move {
            tracker
                .update_expense("alice", id, "2024-02-02", "Bills", 2222, "first")
                .await
        })
    };
    let second = {
        let tracker = Arc::clone(&tracker);
        tokio::spawn(async move {
            tracker
                .update_expense("alice", id, "2024-03-03", "Shopping", 3333, "second")
                .await
        })
    };
    first.await??;
    second.await??;

    let listing = tracker.list_expenses("alice").await?;
    let expense = &listing.expenses[0];
    let as_tuple = (
        expense.date.to_string(),
        expense.category.as_str(),
        expense.amount_cents,
        expense.note.as_str(),
    );
    assert!(
        as_tuple == ("2024-02-02".to_string(), "Bills", 2222, "first")
            || as_tuple == ("2024-03-03".to_string(), "Shopping", 3333, "second"),
        "writes were merged: {:?}",
        as_tuple
    );

    Ok(())
}
