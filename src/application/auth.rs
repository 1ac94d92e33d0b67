use tracing::{debug, info, warn};

use crate::domain::User;
use crate::storage::Repository;

use super::password::{HashScheme, verify_password};
use super::{AppError, Session};

/// Registration and login on top of the credential store.
///
/// Holds no state between calls beyond the store itself.
#[derive(Clone)]
pub struct AuthService {
    repo: Repository,
    scheme: HashScheme,
}

impl AuthService {
    /// Create an auth service hashing new passwords with `scheme`.
    pub fn new(repo: Repository, scheme: HashScheme) -> Self {
        Self { repo, scheme }
    }

    pub fn scheme(&self) -> HashScheme {
        self.scheme
    }

    /// Register a new user.
    ///
    /// Fails with `DuplicateUser` if the name is taken; the existing
    /// credentials stay untouched.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        let username = normalize_username(username)?;
        if password.is_empty() {
            return Err(AppError::InvalidInput("password must not be empty".to_string()));
        }

        if self.repo.user_exists(username).await? {
            return Err(AppError::DuplicateUser(username.to_string()));
        }

        let password_hash = self.scheme.hash(username, password)?;
        let user = User::new(username, password_hash);

        // A concurrent registration can still win between the check and the insert
        if !self.repo.save_user(&user).await? {
            return Err(AppError::DuplicateUser(username.to_string()));
        }

        info!(username, scheme = %self.scheme, "registered user");
        Ok(())
    }

    /// Verify credentials and open a session.
    ///
    /// Unknown users and wrong passwords both fail with
    /// `InvalidCredentials`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        let Some(stored) = self.repo.get_password_hash(username).await? else {
            warn!(username, "login failed");
            return Err(AppError::InvalidCredentials);
        };

        match verify_password(&stored, username, password) {
            Ok(true) => {}
            Ok(false) => {
                warn!(username, "login failed");
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => {
                warn!(username, error = %e, "stored password hash is unreadable");
                return Err(AppError::InvalidCredentials);
            }
        }

        debug!(username, "login succeeded");
        Ok(Session::new(username))
    }

    /// Boolean form of `authenticate`. Only store failures are errors.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool, AppError> {
        match self.authenticate(username, password).await {
            Ok(_) => Ok(true),
            Err(AppError::InvalidCredentials) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check whether a username is registered.
    pub async fn user_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self.repo.user_exists(username.trim()).await?)
    }
}

fn normalize_username(username: &str) -> Result<&str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("username must not be empty".to_string()));
    }
    Ok(username)
}
