use color_eyre::eyre::eyre;
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";
pub const DEFAULT_DB_NAME: &str = "shadowcheck-prefs.db";
pub const DEFAULT_EXPORT_DIR: &str = "./exports";
pub const DEFAULT_LOG_PATH: &str = "shadowcheck.log";
pub const DEFAULT_PAGE_SIZE: u64 = 100;
pub const MAX_PAGE_SIZE: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub database_url: String,
    pub export_dir: PathBuf,
    pub page_size: u64,
    pub request_timeout: Duration,
    pub log_path: PathBuf,
}

impl AppConfig {
    /// Loads `.env` then reads the environment.
    pub fn from_env() -> color_eyre::eyre::Result<Self> {
        dotenv().ok();
        let base_dir = env::current_dir()?;
        Self::from_lookup(&base_dir, |key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source, resolving paths against `base_dir`.
    pub fn from_lookup(
        base_dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> color_eyre::eyre::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_base_url = var("SHADOWCHECK_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(eyre!("SHADOWCHECK_API_URL must be an http(s) URL: {api_base_url}"));
        }

        let db_name = var("DATABASE_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let database_url = sqlite_url(&base_dir.join(db_name))?;

        let export_dir = var("EXPORT_DIR").map_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR), PathBuf::from);

        let page_size = match var("PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout_secs = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| eyre!("REQUEST_TIMEOUT_SECS must be a positive integer: {raw}"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let log_path = var("SHADOWCHECK_LOG").map_or_else(|| PathBuf::from(DEFAULT_LOG_PATH), PathBuf::from);

        Ok(Self {
            api_base_url,
            database_url,
            export_dir,
            page_size,
            request_timeout: Duration::from_secs(timeout_secs),
            log_path,
        })
    }
}

pub fn parse_page_size(raw: &str) -> color_eyre::eyre::Result<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
        .ok_or_else(|| eyre!("PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}: {raw}"))
}

/// sqlx wants `sqlite:///abs/path` for absolute paths and `sqlite://rel/path` otherwise.
fn sqlite_url(database_path: &Path) -> color_eyre::eyre::Result<String> {
    let path_str = database_path
        .to_str()
        .ok_or_else(|| eyre!("Invalid database path"))?;

    let clean_path = path_str.trim_start_matches('/');

    let database_url = if database_path.is_absolute() {
        format!("sqlite:///{clean_path}")
    } else {
        format!("sqlite://{clean_path}")
    };
    Ok(database_url)
}
