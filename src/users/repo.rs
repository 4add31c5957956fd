use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewUser, User};
use crate::error::StoreError;

const USER_COLUMNS: &str = "id, title, first_name, last_name, email, password_hash, role, \
     verification_token, is_verified, reset_token, reset_token_expires, created_at, updated_at";

/// Persistence for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, StoreError>;
    /// Inserts a user; an email already on file yields [`StoreError::EmailTaken`].
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    /// Overwrites the stored row with `user`.
    async fn save(&self, user: &User) -> Result<User, StoreError>;
    /// Returns false when no row had this id.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one_by(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }
}

fn map_unique_violation(e: sqlx::Error, email: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::EmailTaken(email.to_string())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC");
        let rows = sqlx::query_as::<_, User>(&sql).fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one_by("email", email).await
    }

    async fn find_by_verification_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.find_one_by("verification_token", token).await
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, StoreError> {
        self.find_one_by("reset_token", token).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.db.begin().await?;

        // Serialize bootstrap inserts so two concurrent first registrations
        // cannot both observe an empty table.
        if user.role.is_none() {
            sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!(
            r#"
            INSERT INTO users (id, title, first_name, last_name, email, password_hash, role,
                               verification_token, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6,
                    COALESCE($7, CASE WHEN EXISTS (SELECT 1 FROM users)
                                      THEN 'User'::user_role
                                      ELSE 'Admin'::user_role END),
                    $8, $9, $10)
            RETURNING {USER_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.title)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.verification_token)
            .bind(user.is_verified)
            .bind(OffsetDateTime::now_utc())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, &user.email))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users
               SET title = $2, first_name = $3, last_name = $4, email = $5,
                   password_hash = $6, role = $7, verification_token = $8,
                   is_verified = $9, reset_token = $10, reset_token_expires = $11,
                   updated_at = $12
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let saved = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.title)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.verification_token)
            .bind(user.is_verified)
            .bind(&user.reset_token)
            .bind(user.reset_token_expires)
            .bind(user.updated_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, &user.email))?;
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
