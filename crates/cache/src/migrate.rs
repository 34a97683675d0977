//! Schema setup for the cache database.

use std::collections::HashSet;

use sqlx::SqlitePool;
use tracing::{debug, info};

/// Schema steps, applied in order, each at most once.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_simplecache",
    include_str!("../migrations/001_simplecache.sql"),
)];

/// Bring the schema up to date and return how many steps ran.
///
/// Each step and its `_migrations` row commit together, so a failed step
/// leaves nothing half-applied and is retried on the next open.
pub async fn run(pool: &SqlitePool) -> Result<usize, sqlx::Error> {
    sqlx::raw_sql(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_ts INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    let applied: HashSet<String> = sqlx::query_as::<_, (String,)>("SELECT name FROM _migrations")
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|(name,)| name)
        .collect();

    let mut ran = 0;
    for (name, sql) in MIGRATIONS.iter().filter(|(name, _)| !applied.contains(*name)) {
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO _migrations (name, applied_ts) VALUES (?, ?)")
            .bind(*name)
            .bind(chrono::Utc::now().timestamp())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(migration = name, "cache schema step applied");
        ran += 1;
    }
    if ran == 0 {
        debug!("cache schema up to date");
    }
    Ok(ran)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = crate::connect(":memory:").await.unwrap();
        assert_eq!(run(&pool).await.unwrap(), MIGRATIONS.len());
        assert_eq!(run(&pool).await.unwrap(), 0);

        let applied: Vec<(String,)> = sqlx::query_as("SELECT name FROM _migrations")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(applied.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn creates_cache_tables() {
        let pool = crate::connect(":memory:").await.unwrap();
        run(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('simplecache', 'cache_meta') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, ["cache_meta", "simplecache"]);
    }
}
