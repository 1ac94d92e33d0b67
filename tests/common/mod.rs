// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use spendlog::application::HashScheme;
use spendlog::{Config, ExpenseTracker};
use tempfile::TempDir;

/// Helper to create a tracker over a temporary database.
/// Uses the fast sha256 scheme; tests that need Argon2 ask for it.
pub async fn test_tracker() -> Result<(ExpenseTracker, TempDir)> {
    test_tracker_with(HashScheme::Sha256).await
}

/// Helper to create a tracker hashing passwords with `scheme`.
pub async fn test_tracker_with(scheme: HashScheme) -> Result<(ExpenseTracker, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let config = Config::new(db_path.to_str().unwrap()).with_hash_scheme(scheme);
    let tracker = ExpenseTracker::init(&config).await?;
    Ok((tracker, temp_dir))
}

/// Test fixture: two registered users
pub struct StandardUsers;

impl StandardUsers {
    pub const ALICE: &'static str = "alice";
    pub const ALICE_PASSWORD: &'static str = "secret1";
    pub const BOB: &'static str = "bob";
    pub const BOB_PASSWORD: &'static str = "hunter2";

    pub async fn register(tracker: &ExpenseTracker) -> Result<()> {
        tracker.register(Self::ALICE, Self::ALICE_PASSWORD).await?;
        tracker.register(Self::BOB, Self::BOB_PASSWORD).await?;
        Ok(())
    }
}
