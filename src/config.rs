use crate::application::HashScheme;
use crate::domain::CategorySet;

pub const DEFAULT_DATABASE: &str = "spendlog.db";

/// Runtime configuration shared by the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the SQLite database file.
    pub database: String,
    /// Scheme used to hash passwords of new registrations.
    pub hash_scheme: HashScheme,
    /// Categories accepted for expenses.
    pub categories: CategorySet,
}

impl Config {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_hash_scheme(mut self, hash_scheme: HashScheme) -> Self {
        self.hash_scheme = hash_scheme;
        self
    }

    pub fn with_categories(mut self, categories: CategorySet) -> Self {
        self.categories = categories;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            hash_scheme: HashScheme::default(),
            categories: CategorySet::default(),
        }
    }
}
