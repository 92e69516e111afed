//! MySQL implementation of the ReflinkRepository trait.
//!
//! Records live in the `user_reflinks` table. The table carries a unique key
//! on `token` and on `(user_id, type)`, so the storage layer itself refuses a
//! second record for the same user and intent.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::types::Json;
use sqlx::{MySql, MySqlPool, Row, Transaction};
use uuid::Uuid;

use rl_core::domain::entities::reflink::{Intent, Properties, ReflinkToken};
use rl_core::errors::{DomainError, DomainResult};
use rl_core::repositories::ReflinkRepository;

/// Unique key guarding one record per user and intent
const USER_TYPE_KEY: &str = "uq_user_reflinks_user_type";

/// SQLSTATE MySQL reports for deadlocks and serialization failures
const SERIALIZATION_FAILURE: &str = "40001";

/// Earliest value a MySQL DATETIME column can hold
const DATETIME_MIN_YEAR: i32 = 1000;

/// Attempts made by `replace_for_user` when racing another create
const MAX_REPLACE_ATTEMPTS: usize = 3;

/// MySQL implementation of ReflinkRepository
pub struct MySqlReflinkRepository {
    /// Database connection pool
    pool: MySqlPool,
}

/// How a failed replace should be handled
enum ReplaceFailure {
    /// A concurrent create for the same user and intent won; try again
    Retry(sqlx::Error),
    Fatal(DomainError),
}

impl MySqlReflinkRepository {
    /// Create a new MySQL reflink repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to ReflinkToken entity
    fn row_to_token(row: &MySqlRow) -> DomainResult<ReflinkToken> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::storage(format!("Failed to get id: {}", e)))?;
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| DomainError::storage(format!("Failed to get user_id: {}", e)))?;
        let intent: String = row
            .try_get("type")
            .map_err(|e| DomainError::storage(format!("Failed to get type: {}", e)))?;
        let properties: Json<Properties> = row
            .try_get("properties")
            .map_err(|e| DomainError::storage(format!("Failed to get properties: {}", e)))?;

        Ok(ReflinkToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::storage(format!("Invalid reflink UUID: {}", e)))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DomainError::storage(format!("Invalid user UUID: {}", e)))?,
            token: row
                .try_get("token")
                .map_err(|e| DomainError::storage(format!("Failed to get token: {}", e)))?,
            intent: Intent::from(intent),
            properties: properties.0,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::storage(format!("Failed to get created_at: {}", e)))?,
        })
    }

    /// A lost race on the `(user_id, type)` key, or a deadlock, is retryable;
    /// a duplicate on any other key is not
    fn is_retryable(unique_violation: bool, message: &str, code: Option<&str>) -> bool {
        (unique_violation && message.contains(USER_TYPE_KEY)) || code == Some(SERIALIZATION_FAILURE)
    }

    fn classify(error: sqlx::Error) -> ReplaceFailure {
        let retryable = match &error {
            sqlx::Error::Database(db_err) => Self::is_retryable(
                db_err.is_unique_violation(),
                db_err.message(),
                db_err.code().as_deref(),
            ),
            _ => false,
        };

        if retryable {
            return ReplaceFailure::Retry(error);
        }

        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ReplaceFailure::Fatal(DomainError::storage("Duplicate reflink token"))
            }
            _ => ReplaceFailure::Fatal(DomainError::storage(format!(
                "Failed to save reflink token: {}",
                error
            ))),
        }
    }

    async fn try_replace(&self, token: &ReflinkToken) -> Result<(), sqlx::Error> {
        let mut tx: Transaction<'_, MySql> = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_reflinks WHERE user_id = ? AND `type` = ?")
            .bind(token.user_id.to_string())
            .bind(token.intent.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_reflinks (id, user_id, token, `type`, properties, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(token.id.to_string())
        .bind(token.user_id.to_string())
        .bind(&token.token)
        .bind(token.intent.as_str())
        .bind(Json(&token.properties))
        .bind(token.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}

#[async_trait]
impl ReflinkRepository for MySqlReflinkRepository {
    async fn replace_for_user(&self, token: ReflinkToken) -> DomainResult<ReflinkToken> {
        let mut attempt = 1;

        loop {
            let error = match self.try_replace(&token).await {
                Ok(()) => return Ok(token),
                Err(e) => e,
            };

            match Self::classify(error) {
                ReplaceFailure::Retry(e) if attempt < MAX_REPLACE_ATTEMPTS => {
                    tracing::warn!(
                        user_id = %token.user_id,
                        intent = %token.intent,
                        attempt,
                        "Concurrent reflink create, retrying: {}",
                        e
                    );
                    attempt += 1;
                }
                ReplaceFailure::Retry(e) => {
                    return Err(DomainError::storage(format!(
                        "Failed to save reflink token after {} attempts: {}",
                        attempt, e
                    )));
                }
                ReplaceFailure::Fatal(e) => return Err(e),
            }
        }
    }

    async fn find_by_token(&self, token: &str) -> DomainResult<Option<ReflinkToken>> {
        let query = r#"
            SELECT id, user_id, token, `type`, properties, created_at
            FROM user_reflinks
            WHERE token = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to find reflink token: {}", e)))?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_by_token(&self, token: &str) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM user_reflinks WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete reflink token: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn delete_for_user(&self, user_id: Uuid, intent: &Intent) -> DomainResult<u64> {
        let result = sqlx::query("DELETE FROM user_reflinks WHERE user_id = ? AND `type` = ?")
            .bind(user_id.to_string())
            .bind(intent.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user reflinks: {}", e)))?;

        Ok(result.rows_affected())
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        // No stored row predates the DATETIME range
        let floor = Utc
            .with_ymd_and_hms(DATETIME_MIN_YEAR, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        if cutoff <= floor {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM user_reflinks WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!("Failed to delete expired reflink tokens: {}", e))
            })?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> DomainResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM user_reflinks")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count reflink tokens: {}", e)))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| DomainError::storage(format!("Failed to get count: {}", e)))?;

        Ok(total as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_DUPLICATE: &str =
        "Duplicate entry '5f0c...' for key 'user_reflinks.uq_user_reflinks_token'";
    const USER_TYPE_DUPLICATE: &str =
        "Duplicate entry '1b4e...-password_reset' for key 'user_reflinks.uq_user_reflinks_user_type'";

    #[test]
    fn test_user_type_duplicate_is_retried() {
        assert!(MySqlReflinkRepository::is_retryable(
            true,
            USER_TYPE_DUPLICATE,
            Some("23000")
        ));
    }

    #[test]
    fn test_token_duplicate_is_not_retried() {
        assert!(!MySqlReflinkRepository::is_retryable(
            true,
            TOKEN_DUPLICATE,
            Some("23000")
        ));
    }

    #[test]
    fn test_deadlock_is_retried() {
        assert!(MySqlReflinkRepository::is_retryable(
            false,
            "Deadlock found when trying to get lock; try restarting transaction",
            Some("40001")
        ));
    }

    #[test]
    fn test_key_name_without_unique_violation_is_not_retried() {
        assert!(!MySqlReflinkRepository::is_retryable(
            false,
            USER_TYPE_DUPLICATE,
            Some("HY000")
        ));
    }

    #[test]
    fn test_non_database_error_is_fatal_storage_fault() {
        match MySqlReflinkRepository::classify(sqlx::Error::PoolTimedOut) {
            ReplaceFailure::Fatal(e) => assert!(e.is_storage_fault()),
            ReplaceFailure::Retry(_) => panic!("pool timeout must not be retried"),
        }
    }
}
