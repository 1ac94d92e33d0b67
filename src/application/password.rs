use anyhow::{Result, anyhow};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SHA256_PREFIX: &str = "sha256$";

/// Password hashing strategy used for new registrations.
///
/// Verification does not depend on the configured scheme: the stored hash
/// says which scheme produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashScheme {
    /// Argon2id with a random per-user salt, stored as a PHC string.
    #[default]
    Argon2,
    /// Legacy SHA-256 over `username:password`. Weak: kept for databases
    /// created by older versions.
    Sha256,
}

impl HashScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashScheme::Argon2 => "argon2",
            HashScheme::Sha256 => "sha256",
        }
    }

    /// Work out which scheme produced a stored hash.
    pub fn of_stored(stored: &str) -> Option<Self> {
        if stored.starts_with("$argon2") {
            Some(HashScheme::Argon2)
        } else if stored.starts_with(SHA256_PREFIX) {
            Some(HashScheme::Sha256)
        } else {
            None
        }
    }

    /// Hash a password for storage.
    pub fn hash(&self, username: &str, password: &str) -> Result<String> {
        match self {
            HashScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
                Ok(hash.to_string())
            }
            HashScheme::Sha256 => Ok(format!(
                "{}{}",
                SHA256_PREFIX,
                sha256_digest(username, password)
            )),
        }
    }
}

impl std::str::FromStr for HashScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(HashScheme::Argon2),
            "sha256" => Ok(HashScheme::Sha256),
            other => Err(format!(
                "unknown hash scheme '{}'. Valid schemes: argon2, sha256",
                other
            )),
        }
    }
}

impl std::fmt::Display for HashScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Check a password against a stored hash of either scheme.
///
/// Returns `Ok(false)` on mismatch. An error means the stored hash itself
/// is unreadable.
pub fn verify_password(stored: &str, username: &str, password: &str) -> Result<bool> {
    match HashScheme::of_stored(stored) {
        Some(HashScheme::Argon2) => {
            let parsed =
                PasswordHash::new(stored).map_err(|e| anyhow!("Malformed password hash: {}", e))?;
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        }
        Some(HashScheme::Sha256) => {
            let expected = stored.strip_prefix(SHA256_PREFIX).unwrap_or_default();
            let actual = sha256_digest(username, password);
            Ok(actual.as_bytes().ct_eq(expected.as_bytes()).into())
        }
        None => Err(anyhow!("Unrecognised password hash format")),
    }
}

fn sha256_digest(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_roundtrip() {
        let stored = HashScheme::Sha256.hash("alice", "secret1").unwrap();
        assert!(stored.starts_with("sha256$"));
        assert!(!stored.contains("secret1"));
        assert!(verify_password(&stored, "alice", "secret1").unwrap());
        assert!(!verify_password(&stored, "alice", "wrong").unwrap());
    }

    #[test]
    fn test_sha256_is_salted_by_username() {
        let alice = HashScheme::Sha256.hash("alice", "same").unwrap();
        let bob = HashScheme::Sha256.hash("bob", "same").unwrap();
        assert_ne!(alice, bob);
        assert!(!verify_password(&alice, "bob", "same").unwrap());
    }

    #[test]
    fn test_argon2_roundtrip_uses_random_salt() {
        let first = HashScheme::Argon2.hash("alice", "secret1").unwrap();
        let second = HashScheme::Argon2.hash("alice", "secret1").unwrap();
        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(verify_password(&first, "alice", "secret1").unwrap());
        assert!(!verify_password(&first, "alice", "wrong").unwrap());
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        assert!(verify_password("plaintext", "alice", "plaintext").is_err());
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("ARGON2".parse::<HashScheme>(), Ok(HashScheme::Argon2));
        assert_eq!("sha256".parse::<HashScheme>(), Ok(HashScheme::Sha256));
        assert!("md5".parse::<HashScheme>().is_err());
    }
}
