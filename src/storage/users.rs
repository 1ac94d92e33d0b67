use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::domain::User;

use super::Repository;

impl Repository {
    // ========================
    // Credential operations
    // ========================

    /// Save a new user. Returns `false` without touching the stored record
    /// if the username is already taken.
    pub async fn save_user(&self, user: &User) -> Result<bool> {
        let mut write = self.begin_write().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at.to_rfc3339())
        .execute(&mut *write.tx)
        .await
        .context("Failed to save user")?;

        write.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    /// Get a user by username.
    pub async fn get_user(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch user")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Get the stored password hash for a username.
    pub async fn get_password_hash(&self, username: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch password hash")?;

        Ok(row.map(|row| row.get("password_hash")))
    }

    /// Check whether a username is registered.
    pub async fn user_exists(&self, username: &str) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM users WHERE username = ?) as found")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check user")?;

        let found: i64 = row.get("found");
        Ok(found != 0)
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let created_at_str: String = row.get("created_at");

        Ok(User {
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
