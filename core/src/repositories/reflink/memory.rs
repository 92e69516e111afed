//! In-memory implementation of ReflinkRepository
//!
//! Suitable for tests and single-process deployments. All records live behind
//! one `RwLock`, so the delete+insert in `replace_for_user` is atomic with
//! respect to every other operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::reflink::{Intent, ReflinkToken};
use crate::errors::{DomainError, DomainResult};

use super::r#trait::ReflinkRepository;

/// Records keyed by token value
#[derive(Clone, Default)]
pub struct InMemoryReflinkRepository {
    tokens: Arc<RwLock<HashMap<String, ReflinkToken>>>,
}

impl InMemoryReflinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<ReflinkToken> {
        self.tokens.read().await.values().cloned().collect()
    }

    /// Insert a record as-is, bypassing the replace semantics
    ///
    /// Used to seed fixtures such as records with back-dated `created_at`.
    pub async fn insert_raw(&self, token: ReflinkToken) -> DomainResult<()> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(DomainError::storage("Duplicate reflink token"));
        }
        tokens.insert(token.token.clone(), token);
        Ok(())
    }
}

#[async_trait]
impl ReflinkRepository for InMemoryReflinkRepository {
    async fn replace_for_user(&self, token: ReflinkToken) -> DomainResult<ReflinkToken> {
        let mut tokens = self.tokens.write().await;

        if let Some(existing) = tokens.get(&token.token) {
            // A collision with the record being superseded is still a collision
            if existing.id != token.id {
                return Err(DomainError::storage("Duplicate reflink token"));
            }
        }

        tokens.retain(|_, t| !t.belongs_to(token.user_id, &token.intent));
        tokens.insert(token.token.clone(), token.clone());

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> DomainResult<Option<ReflinkToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn delete_by_token(&self, token: &str) -> DomainResult<u64> {
        let mut tokens = self.tokens.write().await;
        Ok(u64::from(tokens.remove(token).is_some()))
    }

    async fn delete_for_user(&self, user_id: Uuid, intent: &Intent) -> DomainResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.belongs_to(user_id, intent));
        Ok((before - tokens.len()) as u64)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> DomainResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.created_at >= cutoff);
        Ok((before - tokens.len()) as u64)
    }

    async fn count(&self) -> DomainResult<u64> {
        Ok(self.tokens.read().await.len() as u64)
    }
}
