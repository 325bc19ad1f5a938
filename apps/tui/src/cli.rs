use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::eyre;

use crate::domain::ViewMode;
use crate::table::{FilterState, SortModel};

#[derive(Debug, Parser)]
#[command(name = "shadowcheck", version, about = "ShadowCheck wireless forensics dashboard")]
pub struct CliArgs {
    /// Print rows and exit instead of starting the dashboard
    #[arg(long)]
    pub headless: bool,

    /// Print headless rows as JSON
    #[arg(long)]
    pub json: bool,

    /// Write headless rows to a CSV file
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Override the backend base URL
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the preference database path
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Override the CSV export directory
    #[arg(long = "export-dir", value_name = "PATH")]
    pub export_dir: Option<String>,

    /// Rows per request (1-1000)
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<u64>,

    /// Starting view: access-points or observations
    #[arg(long, value_name = "VIEW", default_value = "access-points")]
    pub view: String,

    /// Filter as key=value, e.g. radio_types=wifi,ble or min_signal=-70 (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Sort key as column[:asc|desc] (repeatable, first is primary)
    #[arg(long = "sort", value_name = "COLUMN[:DIR]")]
    pub sorts: Vec<String>,

    /// Maximum rows to print in headless mode
    #[arg(long, value_name = "N", default_value_t = 100)]
    pub limit: usize,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("SHADOWCHECK_API_URL", url);
        }
        if let Some(db) = &self.db {
            std::env::set_var("DATABASE_NAME", db);
        }
        if let Some(dir) = &self.export_dir {
            std::env::set_var("EXPORT_DIR", dir);
        }
        if let Some(size) = self.page_size {
            std::env::set_var("PAGE_SIZE", size.to_string());
        }
    }

    pub fn view_mode(&self) -> color_eyre::Result<ViewMode> {
        ViewMode::parse(&self.view).ok_or_else(|| eyre!("unknown view: {}", self.view))
    }

    pub fn filter_state(&self) -> color_eyre::Result<FilterState> {
        let mut pairs = Vec::with_capacity(self.filters.len());
        for raw in &self.filters {
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| eyre!("filter must be key=value: {raw}"))?;
            pairs.push((key.trim(), value.trim()));
        }
        Ok(FilterState::from_query_params(pairs)?)
    }

    pub fn sort_model(&self) -> color_eyre::Result<SortModel> {
        SortModel::parse_specs(self.sorts.iter().map(String::as_str))
            .ok_or_else(|| eyre!("sort must be column[:asc|desc]: {}", self.sorts.join(" ")))
    }

    pub const fn wants_headless(&self) -> bool {
        self.headless || self.json || self.csv.is_some()
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RadioType;
    use crate::table::SortDirection;

    fn parse(args: &[&str]) -> CliArgs {
        let argv = std::iter::once("shadowcheck").chain(args.iter().copied());
        match CliArgs::try_parse_from(argv) {
            Ok(args) => args,
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn filters_and_sorts_parse() -> color_eyre::Result<()> {
        let args = parse(&[
            "--headless",
            "--view",
            "obs",
            "--filter",
            "radio_types=wifi,ble",
            "--filter",
            "min_signal=-70",
            "--sort",
            "signal:desc",
        ]);

        assert_eq!(args.view_mode()?, ViewMode::Observations);
        let filters = args.filter_state()?;
        assert!(filters.radio_types.contains(&RadioType::Ble));
        assert_eq!(filters.min_signal, Some(-70));
        let sort = args.sort_model()?;
        assert_eq!(sort.direction_of("signal"), Some(SortDirection::Desc));
        Ok(())
    }

    #[test]
    fn malformed_filter_is_an_error() {
        let args = parse(&["--filter", "min_signal"]);
        assert!(args.filter_state().is_err());
        let args = parse(&["--filter", "min_signal=-500"]);
        assert!(args.filter_state().is_err());
    }

    #[test]
    fn output_flags_imply_headless() {
        assert!(parse(&["--json"]).wants_headless());
        assert!(parse(&["--csv", "out.csv"]).wants_headless());
        assert!(!parse(&[]).wants_headless());
    }

    #[test]
    fn help_mentions_filters() {
        assert!(CliArgs::help_text().contains("--filter"));
    }
}
