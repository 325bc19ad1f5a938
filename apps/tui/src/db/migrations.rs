use color_eyre::Result;
use sqlx::{migrate::MigrateDatabase, query, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};

/// Creates the preference table if it does not exist yet.
pub async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    query(
        "CREATE TABLE IF NOT EXISTS preferences (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Opens (creating if needed) the sqlite file behind `database_url` and applies the schema.
pub async fn create_database_pool(database_url: &str) -> Result<SqlitePool> {
    tracing::debug!(%database_url, "initializing preference database");

    let db_path = extract_db_path_from_url(database_url)?;

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tracing::info!(path = %parent.display(), "creating database directory");
            std::fs::create_dir_all(parent).map_err(|e| {
                color_eyre::eyre::eyre!("Failed to create database directory: {e}")
            })?;
        }
    }

    let db_exists = Sqlite::database_exists(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Error checking database: {e}"))?;

    if !db_exists {
        tracing::info!(path = %db_path, "creating preference database");
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create SQLite database: {e}"))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _| {
            Box::pin(async move {
                use sqlx::Executor as _;
                conn.execute("PRAGMA journal_mode = WAL;").await?;
                conn.execute("PRAGMA synchronous = NORMAL;").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to SQLite database: {e}"))?;

    setup_database(&pool)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to set up database schema: {e}"))?;

    tracing::debug!("preference database ready");
    Ok(pool)
}

/// Single-connection in-memory pool; every connection to `:memory:` is a fresh database.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    setup_database(&pool).await?;
    Ok(pool)
}

fn extract_db_path_from_url(url: &str) -> Result<String> {
    let Some(path_part) = url.strip_prefix("sqlite://") else {
        return Err(color_eyre::eyre::eyre!("Not a valid SQLite URL: {url}"));
    };

    if cfg!(windows) {
        if let Some(drive_idx) = path_part.find(':') {
            if drive_idx > 0 {
                let path = path_part
                    .strip_prefix('/')
                    .map_or_else(|| path_part.to_string(), str::to_string);
                return Ok(path);
            }
        }
    }

    if path_part.starts_with('/') {
        return Ok(format!("/{}", path_part.trim_start_matches('/')));
    }

    Ok(path_part.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_relative_and_absolute_paths() {
        assert_eq!(
            extract_db_path_from_url("sqlite://prefs.db").ok().as_deref(),
            Some("prefs.db")
        );
        assert_eq!(
            extract_db_path_from_url("sqlite:///var/lib/prefs.db").ok().as_deref(),
            Some("/var/lib/prefs.db")
        );
        assert!(extract_db_path_from_url("postgres://x").is_err());
    }

    #[tokio::test]
    async fn setup_is_idempotent() -> Result<(), sqlx::Error> {
        let pool = create_memory_pool().await?;
        setup_database(&pool).await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM preferences")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn creates_file_database_in_new_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("prefs.db");
        let url = format!("sqlite://{}", path.display());

        let pool = create_database_pool(&url).await?;
        pool.close().await;

        assert!(path.exists());
        Ok(())
    }
}
