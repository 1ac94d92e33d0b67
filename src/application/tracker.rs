use crate::config::Config;
use crate::domain::{Cents, ExpenseId};
use crate::io::Exporter;
use crate::storage::Repository;

use super::{AppError, AuthService, ExpenseListing, LedgerService, Session};

/// The expense tracker as seen by a presentation layer: auth plus ledger
/// over one shared store.
pub struct ExpenseTracker {
    repo: Repository,
    auth: AuthService,
    ledger: LedgerService,
}

impl ExpenseTracker {
    /// Build the services over an already connected repository.
    pub fn new(repo: Repository, config: &Config) -> Self {
        Self {
            auth: AuthService::new(repo.clone(), config.hash_scheme),
            ledger: LedgerService::new(repo.clone(), config.categories.clone()),
            repo,
        }
    }

    /// Create (if needed) and migrate the database named in `config`.
    pub async fn init(config: &Config) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", config.database);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo, config))
    }

    /// Connect to an existing database.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", config.database);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo, config))
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn ledger(&self) -> &LedgerService {
        &self.ledger
    }

    /// Close the store. Pending writes have already committed.
    pub async fn close(&self) {
        self.repo.close().await;
    }

    // ========================
    // Auth
    // ========================

    pub async fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        self.auth.register(username, password).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<bool, AppError> {
        self.auth.login(username, password).await
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, AppError> {
        self.auth.authenticate(username, password).await
    }

    // ========================
    // Ledger
    // ========================

    pub async fn add_expense(
        &self,
        owner: &str,
        date: &str,
        category: &str,
        amount_cents: Cents,
        note: &str,
    ) -> Result<ExpenseId, AppError> {
        self.ledger
            .add_expense(owner, date, category, amount_cents, note)
            .await
    }

    pub async fn list_expenses(&self, owner: &str) -> Result<ExpenseListing, AppError> {
        self.ledger.get_expenses(owner).await
    }

    pub async fn update_expense(
        &self,
        owner: &str,
        id: ExpenseId,
        date: &str,
        category: &str,
        amount_cents: Cents,
        note: &str,
    ) -> Result<(), AppError> {
        self.ledger
            .update_expense(owner, id, date, category, amount_cents, note)
            .await
    }

    pub async fn delete_expense(&self, owner: &str, id: ExpenseId) -> Result<(), AppError> {
        self.ledger.delete_expense(owner, id).await
    }

    /// `owner`'s ledger as CSV bytes with a `date,category,amount,note`
    /// header.
    pub async fn export_csv(&self, owner: &str) -> Result<Vec<u8>, AppError> {
        let mut buffer = Vec::new();
        Exporter::new(&self.ledger)
            .export_expenses_csv(owner, &mut buffer)
            .await?;
        Ok(buffer)
    }
}
