use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use super::MIGRATION_001_INITIAL;

/// Repository for persisting users (credential store) and expenses
/// (ledger store).
///
/// Clones share the same pool and the same write lock, so at most one
/// mutation is in flight at a time across the whole process. Reads go
/// straight to the pool and only ever see committed transactions.
#[derive(Clone)]
pub struct Repository {
    pub(super) pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

/// An open write: the global write lock plus the transaction it guards.
/// Dropping it without `commit` rolls the transaction back.
pub(super) struct WriteTx<'a> {
    _guard: MutexGuard<'a, ()>,
    pub(super) tx: Transaction<'static, Sqlite>,
}

impl WriteTx<'_> {
    pub(super) async fn commit(self) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Connect to a SQLite database at the given URL.
    /// Foreign keys are enforced on every connection; WAL lets readers run
    /// alongside the single writer.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options: SqliteConnectOptions = database_url
            .parse()
            .with_context(|| format!("Invalid database URL: {}", database_url))?;
        let options = options
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run more than once.
    pub async fn migrate(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Take the write lock and open a transaction under it.
    pub(super) async fn begin_write(&self) -> Result<WriteTx<'_>> {
        let guard = self.write_lock.lock().await;
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(WriteTx { _guard: guard, tx })
    }

    /// Close the underlying pool, waiting for open connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
