//! Cache-aside behavior of the workflow definition provider

use std::time::Duration;

use conductor::db::{DatabasePool, MIGRATOR};
use conductor::definition::{CachedDefinitionProvider, DefinitionProvider};
use conductor::model::ExecutionMode;
use conductor::EngineError;
use sqlx::sqlite::SqlitePoolOptions;

async fn setup_db() -> DatabasePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

async fn seed_workflow(pool: &DatabasePool, workflow_id: &str, name: &str) {
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query("INSERT INTO workflows (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(workflow_id)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed_task(pool: &DatabasePool, workflow_id: &str, id: &str, sequence: i64, mode: &str) {
    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO workflow_tasks (id, workflow_id, name, sequence, execution_mode, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(workflow_id)
    .bind(id)
    .bind(sequence)
    .bind(mode)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_get_returns_ordered_definition() {
    let pool = setup_db().await;
    seed_workflow(&pool, "w1", "nightly-etl").await;
    seed_task(&pool, "w1", "t-load", 2, "sync").await;
    seed_task(&pool, "w1", "t-extract", 1, "sync").await;
    seed_task(&pool, "w1", "t-transform", 1, "async").await;

    let provider = CachedDefinitionProvider::new(pool, Duration::from_secs(300));
    let definition = provider.get("w1").await.unwrap();

    assert_eq!(definition.id, "w1");
    assert_eq!(definition.name, "nightly-etl");
    let ids: Vec<&str> = definition.tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t-extract", "t-transform", "t-load"]);
    assert_eq!(definition.tasks[1].mode, ExecutionMode::Async);
}

#[tokio::test]
async fn test_cache_hit_skips_durable_storage() {
    let pool = setup_db().await;
    seed_workflow(&pool, "w1", "cached").await;
    seed_task(&pool, "w1", "t1", 1, "sync").await;

    let provider = CachedDefinitionProvider::new(pool.clone(), Duration::from_secs(300));
    provider.get("w1").await.unwrap();

    // Remove the durable rows; a cached read must still succeed
    sqlx::query("DELETE FROM workflow_tasks").execute(&pool).await.unwrap();
    sqlx::query("DELETE FROM workflows").execute(&pool).await.unwrap();

    let definition = provider.get("w1").await.unwrap();
    assert_eq!(definition.name, "cached");
}

#[tokio::test]
async fn test_invalidate_is_idempotent_and_forces_reread() {
    let pool = setup_db().await;
    seed_workflow(&pool, "w1", "before").await;
    seed_task(&pool, "w1", "t1", 1, "sync").await;

    let provider = CachedDefinitionProvider::new(pool.clone(), Duration::from_secs(300));
    assert_eq!(provider.get("w1").await.unwrap().name, "before");

    sqlx::query("UPDATE workflows SET name = 'after' WHERE id = 'w1'")
        .execute(&pool)
        .await
        .unwrap();

    // Still the cached snapshot until invalidated
    assert_eq!(provider.get("w1").await.unwrap().name, "before");

    // Calling invalidate twice has the same observable effect as once
    provider.invalidate("w1");
    provider.invalidate("w1");

    assert_eq!(provider.get("w1").await.unwrap().name, "after");
}

#[tokio::test]
async fn test_expired_entry_is_reread() {
    let pool = setup_db().await;
    seed_workflow(&pool, "w1", "first").await;
    seed_task(&pool, "w1", "t1", 1, "sync").await;

    // Zero TTL: every get falls through to durable storage
    let provider = CachedDefinitionProvider::new(pool.clone(), Duration::ZERO);
    assert_eq!(provider.get("w1").await.unwrap().name, "first");

    sqlx::query("UPDATE workflows SET name = 'second' WHERE id = 'w1'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(provider.get("w1").await.unwrap().name, "second");
}

#[tokio::test]
async fn test_unknown_workflow_is_not_found() {
    let pool = setup_db().await;

    let provider = CachedDefinitionProvider::new(pool, Duration::from_secs(300));
    let err = provider.get("missing-id").await.unwrap_err();
    assert!(matches!(err, EngineError::WorkflowNotFound(_)));
}

#[tokio::test]
async fn test_workflow_without_tasks_is_not_found() {
    let pool = setup_db().await;
    seed_workflow(&pool, "w-empty", "empty").await;

    let provider = CachedDefinitionProvider::new(pool, Duration::from_secs(300));
    let err = provider.get("w-empty").await.unwrap_err();
    assert!(matches!(err, EngineError::WorkflowNotFound(_)));
}
