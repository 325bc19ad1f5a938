#[allow(clippy::module_inception)]
mod config;

pub use config::{
    parse_page_size, AppConfig, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
