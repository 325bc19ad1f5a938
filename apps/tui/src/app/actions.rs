use std::path::PathBuf;

use color_eyre::Result;
use sqlx::SqlitePool;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::db::create_database_pool;
use crate::domain::{Record, ViewMode};
use crate::table::{export_to_dir, ColumnRegistry, ExportError};

/// Side-effecting collaborators: the REST client, the preference pool and export settings.
#[derive(Debug, Clone)]
pub struct AppActions {
    pub api: ApiClient,
    pub db_pool: Option<SqlitePool>,
    pub export_dir: PathBuf,
    pub page_size: u64,
}

impl AppActions {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url, config.request_timeout)?;
        Ok(Self::with_client(api, config.export_dir.clone(), config.page_size))
    }

    pub const fn with_client(api: ApiClient, export_dir: PathBuf, page_size: u64) -> Self {
        Self {
            api,
            db_pool: None,
            export_dir,
            page_size,
        }
    }

    pub async fn initialize(&mut self, database_url: &str) -> Result<()> {
        self.db_pool = Some(create_database_pool(database_url).await?);
        Ok(())
    }

    pub const fn pool(&self) -> Option<&SqlitePool> {
        self.db_pool.as_ref()
    }

    pub fn export_rows(
        &self,
        rows: &[Record],
        column_ids: &[&str],
        registry: &ColumnRegistry,
        view: ViewMode,
    ) -> Result<PathBuf, ExportError> {
        export_to_dir(&self.export_dir, rows, column_ids, registry, view)
    }

    /// Fails when the backend is unreachable or answers with an error envelope.
    pub async fn check_backend(&self) -> Result<()> {
        self.api.server_config().await?;
        Ok(())
    }
}
