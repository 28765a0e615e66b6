//! User account repository with salted password hashing.

use async_trait::async_trait;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use locus_core::{Error, NewUser, Result, User, UserRepository};

/// SQLite implementation of [`UserRepository`].
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

/// Hash format: `sha256$<salt-hex>$<digest-hex>` where the digest covers
/// salt bytes followed by the password bytes.
fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    format!("sha256${}${}", hex::encode(salt), hex::encode(hasher.finalize()))
}

fn verify_hash(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some("sha256"), Some(salt_hex), Some(_)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    hash_password(password, &salt) == stored
}

impl SqliteUserRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        if user.username.is_empty() {
            return Err(Error::Validation("username must not be empty".to_string()));
        }

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
            .bind(&user.username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if existing.is_some() {
            return Err(Error::Conflict(format!(
                "user {} already exists",
                user.username
            )));
        }

        let author = sqlx::query("INSERT INTO authors (first_name, last_name) VALUES (?, ?)")
            .bind(&user.first_name)
            .bind(&user.last_name)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        let author_id = author.last_insert_rowid();

        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        let password_hash = hash_password(&user.password, &salt);

        let res = sqlx::query(
            "INSERT INTO users (username, password_hash, active, author_id) VALUES (?, ?, 1, ?)",
        )
        .bind(&user.username)
        .bind(&password_hash)
        .bind(author_id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;
        let id = res.last_insert_rowid();

        tx.commit().await.map_err(Error::Database)?;

        Ok(User {
            id,
            username: user.username,
            password_hash,
            active: true,
            author_id,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, active, author_id FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, active, author_id FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(user)
    }

    async fn verify_password(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.get_by_username(username).await? else {
            return Ok(None);
        };
        if user.active && verify_hash(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::memory_db;

    fn jane() -> NewUser {
        NewUser {
            username: "jane".to_string(),
            password: "hunter2".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("secret", b"0123456789abcdef");
        assert!(verify_hash("secret", &hash));
        assert!(!verify_hash("wrong", &hash));
    }

    #[tokio::test]
    async fn test_create_and_verify_user() {
        let db = memory_db().await;
        let user = db.users.create(jane()).await.unwrap();
        assert!(user.active);

        let found = db.users.get_by_username("jane").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert_eq!(found.author_id, user.author_id);

        assert!(db
            .users
            .verify_password("jane", "hunter2")
            .await
            .unwrap()
            .is_some());
        assert!(db
            .users
            .verify_password("jane", "nope")
            .await
            .unwrap()
            .is_none());
        assert!(db
            .users
            .verify_password("nobody", "hunter2")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let db = memory_db().await;
        db.users.create(jane()).await.unwrap();
        let result = db.users.create(jane()).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }
}
