//! API token storage.
//!
//! Tokens are opaque random strings handed to the user once. Only their
//! SHA-256 digest is stored.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::user_repo::UserRow;
use crate::models::User;

pub struct TokenRepository {
    pool: SqlitePool,
}

impl TokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new token for the user and returns its plaintext form.
    pub async fn issue(&self, user_id: Uuid) -> Result<String, sqlx::Error> {
        let token = generate_token();

        sqlx::query("INSERT INTO auth_tokens (token_hash, user_id, created_at) VALUES (?, ?, ?)")
            .bind(hash_token(&token))
            .bind(user_id.to_string())
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Resolves a token to its user.
    ///
    /// Returns `None` for unknown tokens and for tokens of inactive users.
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT u.id, u.email, u.name, u.is_active, u.created_at
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = ? AND u.is_active = 1
            "#,
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn revoke(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes every token of a user. Returns how many were removed.
    pub async fn revoke_all(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Generates a secure random token.
///
/// Returns 32 random bytes encoded as base64url (no padding).
fn generate_token() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{create_user, setup_db};
    use crate::db::UserRepository;

    #[tokio::test]
    async fn test_issue_and_authenticate() {
        let db = setup_db().await;
        let user = create_user(&db.pool, "user@example.com").await;
        let repo = TokenRepository::new(db.pool.clone());

        let token = repo.issue(user.id).await.unwrap();
        let found = repo.authenticate(&token).await.unwrap().unwrap();

        assert_eq!(found.id, user.id);
        assert_eq!(found.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let db = setup_db().await;
        let repo = TokenRepository::new(db.pool.clone());

        assert!(repo.authenticate("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_token_stored_hashed() {
        let db = setup_db().await;
        let user = create_user(&db.pool, "user@example.com").await;
        let repo = TokenRepository::new(db.pool.clone());

        let token = repo.issue(user.id).await.unwrap();

        let (stored,): (String,) = sqlx::query_as("SELECT token_hash FROM auth_tokens")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_ne!(stored, token);
        assert_eq!(stored.len(), 64);
    }

    #[tokio::test]
    async fn test_revoke() {
        let db = setup_db().await;
        let user = create_user(&db.pool, "user@example.com").await;
        let repo = TokenRepository::new(db.pool.clone());

        let token = repo.issue(user.id).await.unwrap();
        let other = repo.issue(user.id).await.unwrap();

        assert!(repo.revoke(&token).await.unwrap());
        assert!(!repo.revoke(&token).await.unwrap());
        assert!(repo.authenticate(&token).await.unwrap().is_none());
        assert!(repo.authenticate(&other).await.unwrap().is_some());

        assert_eq!(repo.revoke_all(user.id).await.unwrap(), 1);
        assert!(repo.authenticate(&other).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_user_rejected() {
        let db = setup_db().await;
        let user = create_user(&db.pool, "user@example.com").await;
        let repo = TokenRepository::new(db.pool.clone());

        let token = repo.issue(user.id).await.unwrap();
        UserRepository::new(db.pool.clone())
            .set_active(user.id, false)
            .await
            .unwrap();

        assert!(repo.authenticate(&token).await.unwrap().is_none());
    }

    #[test]
    fn test_generate_token_format() {
        let token = generate_token();

        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, generate_token());
    }
}
