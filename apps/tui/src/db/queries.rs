use chrono::Utc;
use sqlx::{query, query_as, SqlitePool};

use crate::db::models::PreferenceRecord;

pub async fn load_preference(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<PreferenceRecord>, sqlx::Error> {
    query_as::<_, PreferenceRecord>("SELECT key, value, updated FROM preferences WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Upserts one preference value and stamps it with the current time.
pub async fn save_preference(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    query(
        "INSERT INTO preferences (key, value, updated) VALUES (?, ?, ?) \
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated = excluded.updated",
    )
    .bind(key)
    .bind(value)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_preference(pool: &SqlitePool, key: &str) -> Result<bool, sqlx::Error> {
    let result = query("DELETE FROM preferences WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
