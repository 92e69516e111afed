//! Unit tests for the in-memory reflink repository

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::reflink::{Intent, Properties, ReflinkToken};
use crate::repositories::reflink::{InMemoryReflinkRepository, ReflinkRepository};

fn record(user_id: Uuid, intent: &str, token: &str) -> ReflinkToken {
    ReflinkToken::new(
        user_id,
        Intent::from(intent),
        token.to_string(),
        Properties::new(),
        Utc::now(),
    )
}

#[tokio::test]
async fn test_replace_and_find() {
    let repo = InMemoryReflinkRepository::new();
    let user_id = Uuid::new_v4();

    let stored = repo
        .replace_for_user(record(user_id, "password_reset", "tok_1"))
        .await
        .unwrap();

    let found = repo.find_by_token("tok_1").await.unwrap().unwrap();
    assert_eq!(found.id, stored.id);
    assert_eq!(found.user_id, user_id);
    assert!(repo.find_by_token("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_replace_removes_previous_for_same_intent_only() {
    let repo = InMemoryReflinkRepository::new();
    let user_id = Uuid::new_v4();
    let other_user = Uuid::new_v4();

    repo.replace_for_user(record(user_id, "password_reset", "old")).await.unwrap();
    repo.replace_for_user(record(user_id, "email_verification", "verify")).await.unwrap();
    repo.replace_for_user(record(other_user, "password_reset", "other")).await.unwrap();
    repo.replace_for_user(record(user_id, "password_reset", "new")).await.unwrap();

    assert!(repo.find_by_token("old").await.unwrap().is_none());
    assert!(repo.find_by_token("new").await.unwrap().is_some());
    assert!(repo.find_by_token("verify").await.unwrap().is_some());
    assert!(repo.find_by_token("other").await.unwrap().is_some());
    assert_eq!(repo.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_token_collision_is_storage_fault() {
    let repo = InMemoryReflinkRepository::new();

    repo.replace_for_user(record(Uuid::new_v4(), "password_reset", "same"))
        .await
        .unwrap();

    let result = repo
        .replace_for_user(record(Uuid::new_v4(), "password_reset", "same"))
        .await;

    assert!(result.unwrap_err().is_storage_fault());
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_by_token_is_idempotent() {
    let repo = InMemoryReflinkRepository::new();
    repo.replace_for_user(record(Uuid::new_v4(), "password_reset", "tok"))
        .await
        .unwrap();

    assert_eq!(repo.delete_by_token("tok").await.unwrap(), 1);
    assert_eq!(repo.delete_by_token("tok").await.unwrap(), 0);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_for_user() {
    let repo = InMemoryReflinkRepository::new();
    let user_id = Uuid::new_v4();
    repo.replace_for_user(record(user_id, "password_reset", "a")).await.unwrap();
    repo.replace_for_user(record(user_id, "email_verification", "b")).await.unwrap();

    let deleted = repo
        .delete_for_user(user_id, &Intent::from("password_reset"))
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    assert!(repo.find_by_token("b").await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_created_before() {
    let repo = InMemoryReflinkRepository::new();
    let now = Utc::now();

    let mut old = record(Uuid::new_v4(), "password_reset", "old");
    old.created_at = now - Duration::hours(2);
    let mut boundary = record(Uuid::new_v4(), "password_reset", "boundary");
    boundary.created_at = now - Duration::hours(1);
    let fresh = record(Uuid::new_v4(), "password_reset", "fresh");

    repo.insert_raw(old).await.unwrap();
    repo.insert_raw(boundary).await.unwrap();
    repo.insert_raw(fresh).await.unwrap();

    let deleted = repo
        .delete_created_before(now - Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(deleted, 1);
    assert!(repo.find_by_token("old").await.unwrap().is_none());
    assert!(repo.find_by_token("boundary").await.unwrap().is_some());
    assert!(repo.find_by_token("fresh").await.unwrap().is_some());
}
