//! Repository trait defining the interface for reflink token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::reflink::{Intent, ReflinkToken};
use crate::errors::DomainResult;

/// Storage seam for reflink token records
///
/// Lookups are exact matches on the token string. Not-found is `Ok(None)`
/// or a zero row count, never an error.
#[async_trait]
pub trait ReflinkRepository: Send + Sync {
    /// Atomically replace every record for `(token.user_id, token.intent)`
    /// with `token`
    ///
    /// Two concurrent calls for the same pair must leave exactly one record.
    ///
    /// # Returns
    /// * `Ok(ReflinkToken)` - The stored record
    /// * `Err(DomainError::Storage)` - Persistence failed, or the token value
    ///   collides with an existing record
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use uuid::Uuid;
    /// # use rl_core::domain::entities::reflink::{Intent, Properties, ReflinkToken};
    /// # use rl_core::repositories::ReflinkRepository;
    /// # async fn example(repo: &impl ReflinkRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let token = ReflinkToken::new(
    ///     Uuid::new_v4(),
    ///     Intent::from(Intent::PASSWORD_RESET),
    ///     "0f3a...".to_string(),
    ///     Properties::new(),
    ///     Utc::now(),
    /// );
    ///
    /// let stored = repo.replace_for_user(token).await?;
    /// println!("Token stored with ID: {}", stored.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn replace_for_user(&self, token: ReflinkToken) -> DomainResult<ReflinkToken>;

    /// Find a record by its token value
    async fn find_by_token(&self, token: &str) -> DomainResult<Option<ReflinkToken>>;

    /// Delete the record matching `token`
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of records removed (0 when the token is unknown)
    async fn delete_by_token(&self, token: &str) -> DomainResult<u64>;

    /// Delete every record for a user and intent
    async fn delete_for_user(&self, user_id: Uuid, intent: &Intent) -> DomainResult<u64>;

    /// Delete every record with `created_at < cutoff`
    ///
    /// This method should be called periodically to purge expired tokens.
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use rl_core::repositories::ReflinkRepository;
    /// # async fn example(repo: &impl ReflinkRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let deleted = repo.delete_created_before(Utc::now() - Duration::hours(1)).await?;
    /// println!("Cleaned up {} expired tokens", deleted);
    /// # Ok(())
    /// # }
    /// ```
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> DomainResult<u64>;

    /// Total number of stored records, expired or not
    async fn count(&self) -> DomainResult<u64>;
}
