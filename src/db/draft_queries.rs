use sqlx::PgPool;

/// Fetch the stored snapshot text for a key
pub async fn find_draft(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT value FROM draft_snapshots WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Insert or replace a snapshot. Last write wins.
pub async fn upsert_draft(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO draft_snapshots (key, value, updated_at)
        VALUES ($1, $2, now())
        ON CONFLICT (key) DO UPDATE
        SET value = EXCLUDED.value,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_draft(pool: &PgPool, key: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM draft_snapshots WHERE key = $1")
        .bind(key)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn count_drafts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM draft_snapshots")
        .fetch_one(pool)
        .await
}
