//! Reflink token store: issue, look up, validate and revoke reflink tokens

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use rl_shared::config::ReflinkConfig;

use crate::domain::entities::reflink::{
    expiry_cutoff, Intent, Properties, ReflinkToken, ReflinkUser,
};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::ReflinkRepository;

use super::clock::{Clock, SystemClock};
use super::generator::TokenGenerator;

/// Service owning the lifecycle of reflink tokens
///
/// Every validity decision goes through [`ReflinkToken::is_expired_at`] with
/// the configured TTL; expired records stay in storage until
/// [`delete_expired`](Self::delete_expired) purges them.
pub struct ReflinkTokenService<R: ReflinkRepository> {
    repository: Arc<R>,
    generator: TokenGenerator,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<R: ReflinkRepository> ReflinkTokenService<R> {
    /// Creates a new token store using the system clock
    ///
    /// # Arguments
    ///
    /// * `repository` - Storage backend for token records
    /// * `config` - Hash key and TTL, fixed for the lifetime of the service
    ///
    /// # Returns
    ///
    /// The service, or `DomainError::Configuration` if the hash key is empty
    /// or the TTL is not positive
    pub fn new(repository: Arc<R>, config: &ReflinkConfig) -> DomainResult<Self> {
        Self::with_clock(repository, config, Arc::new(SystemClock))
    }

    /// Creates a new token store with an explicit time source
    pub fn with_clock(
        repository: Arc<R>,
        config: &ReflinkConfig,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        let ttl = match Duration::try_seconds(config.ttl_seconds) {
            Some(ttl) if config.ttl_seconds > 0 => ttl,
            _ => {
                return Err(DomainError::Configuration {
                    message: format!(
                        "Reflink TTL must be positive and in range, got {}s",
                        config.ttl_seconds
                    ),
                })
            }
        };

        if config.is_using_default_key() {
            warn!("Reflink store is using the development hash key; set REFLINK_HASH_KEY");
        }

        Ok(Self {
            repository,
            generator: TokenGenerator::new(&config.hash_key)?,
            ttl,
            clock,
        })
    }

    /// Issue a new token for `(user, intent)`
    ///
    /// Any earlier token for the same user and intent is deleted in the same
    /// storage operation, so afterwards exactly one record exists for the pair.
    ///
    /// # Returns
    ///
    /// The token string to hand to the user out of band. On
    /// `DomainError::Storage` the user must be treated as not having a token.
    pub async fn create(
        &self,
        user: impl ReflinkUser,
        intent: impl Into<Intent>,
        properties: Properties,
    ) -> DomainResult<String> {
        let record = ReflinkToken::new(
            user.id(),
            intent.into(),
            self.generator.generate()?,
            properties,
            self.clock.now(),
        );

        let stored = self.repository.replace_for_user(record).await?;
        debug!(user_id = %stored.user_id, intent = %stored.intent, "Issued reflink token");

        Ok(stored.token)
    }

    /// [`create`](Self::create) with an empty properties payload
    pub async fn create_default(
        &self,
        user: impl ReflinkUser,
        intent: impl Into<Intent>,
    ) -> DomainResult<String> {
        self.create(user, intent, Properties::new()).await
    }

    /// Exact-match lookup; expired records are still returned
    pub async fn load(&self, token: &str) -> DomainResult<Option<ReflinkToken>> {
        self.repository.find_by_token(token).await
    }

    /// Whether `token` exists and has not expired
    ///
    /// Storage failures are returned as errors rather than folded into `false`.
    pub async fn exists(&self, token: &str) -> DomainResult<bool> {
        Ok(self
            .load(token)
            .await?
            .is_some_and(|record| !self.is_expired(&record)))
    }

    /// Remove the record for `token`; deleting an unknown token is not an error
    pub async fn delete(&self, token: &str) -> DomainResult<()> {
        let deleted = self.repository.delete_by_token(token).await?;
        debug!(deleted, "Deleted reflink token");
        Ok(())
    }

    /// Redeem a token: return its record and delete it, if it is still valid
    ///
    /// Returns `Ok(None)` for unknown or expired tokens, and when a concurrent
    /// caller consumed the same token first.
    pub async fn consume(&self, token: &str) -> DomainResult<Option<ReflinkToken>> {
        let record = match self.load(token).await? {
            Some(record) if !self.is_expired(&record) => record,
            _ => return Ok(None),
        };

        if self.repository.delete_by_token(token).await? == 0 {
            return Ok(None);
        }

        debug!(user_id = %record.user_id, intent = %record.intent, "Consumed reflink token");
        Ok(Some(record))
    }

    /// Purge every record whose `created_at` is older than `now - ttl`
    ///
    /// # Returns
    ///
    /// Number of records removed
    pub async fn delete_expired(&self) -> DomainResult<u64> {
        let cutoff = expiry_cutoff(self.clock.now(), self.ttl);
        self.repository.delete_created_before(cutoff).await
    }

    /// Delete every token of a user for one intent, e.g. after a password change
    pub async fn revoke_for_user(
        &self,
        user: impl ReflinkUser,
        intent: impl Into<Intent>,
    ) -> DomainResult<u64> {
        let intent = intent.into();
        self.repository.delete_for_user(user.id(), &intent).await
    }

    /// Generate a fresh token string without storing it
    pub fn generate_token(&self) -> DomainResult<String> {
        self.generator.generate()
    }

    pub fn is_expired(&self, record: &ReflinkToken) -> bool {
        record.is_expired_at(self.clock.now(), self.ttl)
    }

    pub fn expires_at(&self, record: &ReflinkToken) -> DateTime<Utc> {
        record.expires_at(self.ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }
}
