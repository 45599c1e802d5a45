// Credential store: user persistence keyed by username

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::ApiError;
use crate::users::models::{NewUser, User, UserChanges};

/// Storage for user records
///
/// Usernames, phone numbers and emails are each unique. Implementations report
/// a clash as `ApiError::Conflict` and a missing user as `ApiError::NotFound`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, ApiError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    async fn update(&self, username: &str, changes: UserChanges) -> Result<User, ApiError>;

    async fn delete(&self, username: &str) -> Result<(), ApiError>;
}

/// Conflict message for a unique field that is already taken
pub(crate) fn duplicate(field: &str, value: &str) -> ApiError {
    ApiError::Conflict {
        message: format!("User already exists with {}: {}", field, value),
    }
}

const USER_COLUMNS: &str =
    "username, name, address, phone_no, email, password_hash, created_at, updated_at";

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new PgUserStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn field_taken(
        tx: &mut Transaction<'_, Postgres>,
        column: &str,
        value: &str,
        exclude_username: Option<&str>,
    ) -> Result<bool, ApiError> {
        // column names come from this module only, never from input
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1 AND username IS DISTINCT FROM $2)",
            column
        );
        let exists: bool = sqlx::query_scalar(&query)
            .bind(value)
            .bind(exclude_username)
            .fetch_one(&mut **tx)
            .await?;
        Ok(exists)
    }

    /// Map unique-constraint races that slipped past the explicit checks
    fn map_write_error(error: sqlx::Error, values: &UniqueValues<'_>) -> ApiError {
        if let sqlx::Error::Database(db_err) = &error {
            if db_err.is_unique_violation() {
                return values.conflict(db_err.constraint());
            }
        }
        ApiError::DatabaseError(error)
    }
}

/// Values a write tries to store in the unique columns
struct UniqueValues<'a> {
    username: &'a str,
    phone_no: &'a str,
    email: &'a str,
}

impl UniqueValues<'_> {
    /// Conflict for a violated constraint (`users_pkey`, `users_phone_no_key`, `users_email_key`)
    fn conflict(&self, constraint: Option<&str>) -> ApiError {
        match constraint {
            Some(c) if c.contains("phone") => duplicate("phone_no", self.phone_no),
            Some(c) if c.contains("email") => duplicate("email", self.email),
            _ => duplicate("username", self.username),
        }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut tx = self.pool.begin().await?;

        if Self::field_taken(&mut tx, "username", &user.username, None).await? {
            return Err(duplicate("username", &user.username));
        }
        if Self::field_taken(&mut tx, "phone_no", &user.phone_no, None).await? {
            return Err(duplicate("phone_no", &user.phone_no));
        }
        if Self::field_taken(&mut tx, "email", &user.email, None).await? {
            return Err(duplicate("email", &user.email));
        }

        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, name, address, phone_no, email, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.address)
        .bind(&user.phone_no)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            Self::map_write_error(
                e,
                &UniqueValues {
                    username: &user.username,
                    phone_no: &user.phone_no,
                    email: &user.email,
                },
            )
        })?;

        tx.commit().await?;
        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, username: &str, changes: UserChanges) -> Result<User, ApiError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1 FOR UPDATE",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::user_not_found(username))?;

        if let Some(phone_no) = changes.phone_no.as_deref() {
            if Self::field_taken(&mut tx, "phone_no", phone_no, Some(username)).await? {
                return Err(duplicate("phone_no", phone_no));
            }
        }
        if let Some(email) = changes.email.as_deref() {
            if Self::field_taken(&mut tx, "email", email, Some(username)).await? {
                return Err(duplicate("email", email));
            }
        }

        let phone_no = changes.phone_no.unwrap_or(existing.phone_no);
        let email = changes.email.unwrap_or(existing.email);

        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET name = $1, address = $2, phone_no = $3, email = $4, password_hash = $5, \
                 updated_at = NOW() \
             WHERE username = $6 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(changes.name.unwrap_or(existing.name))
        .bind(changes.address.unwrap_or(existing.address))
        .bind(&phone_no)
        .bind(&email)
        .bind(changes.password_hash.unwrap_or(existing.password_hash))
        .bind(username)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            Self::map_write_error(
                e,
                &UniqueValues {
                    username,
                    phone_no: &phone_no,
                    email: &email,
                },
            )
        })?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, username: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::user_not_found(username));
        }
        Ok(())
    }
}
