use sqlx::SqlitePool;

/// A persisted cache row.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRow {
    pub id: String,
    pub expires: i64,
    pub data: String,
    pub checksum: Option<String>,
}

/// Lookup a cache row by key, expired or not.
pub async fn load(pool: &SqlitePool, id: &str) -> Result<Option<EntryRow>, sqlx::Error> {
    let row: Option<(String, i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, expires, data, checksum FROM simplecache WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(id, expires, data, checksum)| EntryRow {
        id,
        expires,
        data,
        checksum,
    }))
}

/// Insert or replace a cache row.
pub async fn store(pool: &SqlitePool, row: &EntryRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO simplecache (id, expires, data, checksum) VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET expires = excluded.expires, data = excluded.data, \
         checksum = excluded.checksum",
    )
    .bind(&row.id)
    .bind(row.expires)
    .bind(&row.data)
    .bind(&row.checksum)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete every row that expired before `now`. Returns the number removed.
pub async fn delete_expired(pool: &SqlitePool, now: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM simplecache WHERE expires < ?")
        .bind(now)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM simplecache")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();
        pool
    }

    fn row(id: &str, expires: i64) -> EntryRow {
        EntryRow {
            id: id.to_string(),
            expires,
            data: r#"{"title":"Inception"}"#.to_string(),
            checksum: None,
        }
    }

    #[tokio::test]
    async fn store_then_load_and_replace() {
        let pool = pool().await;
        store(&pool, &row("a", 100)).await.unwrap();
        assert_eq!(load(&pool, "a").await.unwrap(), Some(row("a", 100)));

        let mut updated = row("a", 200);
        updated.checksum = Some("v2".into());
        store(&pool, &updated).await.unwrap();
        assert_eq!(load(&pool, "a").await.unwrap(), Some(updated));
        assert_eq!(count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_expired_keeps_live_rows() {
        let pool = pool().await;
        store(&pool, &row("old", 10)).await.unwrap();
        store(&pool, &row("new", 1000)).await.unwrap();

        assert_eq!(delete_expired(&pool, 500).await.unwrap(), 1);
        assert!(load(&pool, "old").await.unwrap().is_none());
        assert!(load(&pool, "new").await.unwrap().is_some());
    }
}
