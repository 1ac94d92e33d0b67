use thiserror::Error;

use crate::domain::ExpenseId;

/// Typed outcomes surfaced to the presentation layer.
///
/// Messages never carry a password or a password hash.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("username already exists: {0}")]
    DuplicateUser(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown owner: {0}")]
    UnknownOwner(String),

    #[error("expense not found: {0}")]
    NotFound(ExpenseId),

    #[error("expense {0} belongs to another user")]
    Forbidden(ExpenseId),

    #[error("store unavailable: {0:#}")]
    StoreUnavailable(#[from] anyhow::Error),
}
