//! # User Repository
//!
//! Identity lookups. Registration, credentials and sessions are handled by
//! the host system; this repository only stores what orders, carts and
//! reports need to reference.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::User;

const USER_COLUMNS: &str = "id, username, email, location, role, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            "INSERT INTO users (id, username, email, location, role, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.location)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Checks whether a user exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use bazaar_core::{Role, User};
    use chrono::Utc;

    #[tokio::test]
    async fn test_insert_get_and_exists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = User {
            id: "u1".to_string(),
            username: "rivka".to_string(),
            email: "rivka@example.com".to_string(),
            location: "Haifa".to_string(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        db.users().insert(&user).await.unwrap();

        let fetched = db.users().get_by_id("u1").await.unwrap().unwrap();
        assert_eq!(fetched.username, "rivka");
        assert_eq!(fetched.role, Role::Admin);

        assert!(db.users().exists("u1").await.unwrap());
        assert!(!db.users().exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut user = User {
            id: "u1".to_string(),
            username: "rivka".to_string(),
            email: "rivka@example.com".to_string(),
            location: "Haifa".to_string(),
            role: Role::Buyer,
            created_at: Utc::now(),
        };
        db.users().insert(&user).await.unwrap();

        user.id = "u2".to_string();
        user.email = "other@example.com".to_string();
        assert!(db.users().insert(&user).await.is_err());
    }
}
