use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use super::columns::ColumnRegistry;
use crate::domain::{Record, ViewMode};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no rows loaded")]
    NoRows,
    #[error("no visible columns to export")]
    NoColumns,
    #[error("failed to prepare export directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn export_file_name(view: ViewMode, at: DateTime<Local>) -> String {
    format!(
        "shadowcheck-{}-{}.csv",
        view.as_str(),
        at.format("%Y%m%d-%H%M%S")
    )
}

/// Writes a header of column labels and one line per row, using each column's formatter.
pub fn write_csv<W: Write>(
    writer: W,
    rows: &[Record],
    column_ids: &[&str],
    registry: &ColumnRegistry,
    view: ViewMode,
) -> Result<usize, ExportError> {
    let columns: Vec<_> = column_ids.iter().filter_map(|id| registry.get(id)).collect();
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(columns.iter().map(|column| column.label))?;

    for row in rows {
        csv_writer.write_record(columns.iter().map(|column| column.display(row, view)))?;
    }

    csv_writer.flush()?;
    Ok(rows.len())
}

/// Exports to `<dir>/shadowcheck-<view>-<timestamp>.csv`, returning the written path.
pub fn export_to_dir(
    dir: &Path,
    rows: &[Record],
    column_ids: &[&str],
    registry: &ColumnRegistry,
    view: ViewMode,
) -> Result<PathBuf, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NoRows);
    }

    std::fs::create_dir_all(dir).map_err(|source| ExportError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(export_file_name(view, Local::now()));
    let file = std::fs::File::create(&path)?;
    let written = write_csv(file, rows, column_ids, registry, view)?;

    tracing::info!(path = %path.display(), rows = written, "exported table");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::columns::tests::sample_access_point;
    use chrono::TimeZone;

    #[test]
    fn file_name_includes_view_and_timestamp() {
        let at = Local
            .with_ymd_and_hms(2025, 3, 9, 14, 5, 7)
            .single()
            .map(|t| export_file_name(ViewMode::Observations, t));
        assert_eq!(at.as_deref(), Some("shadowcheck-observations-20250309-140507.csv"));
    }

    #[test]
    fn csv_uses_display_order_and_formatters() -> Result<(), Box<dyn std::error::Error>> {
        let registry = ColumnRegistry::standard();
        let rows = vec![
            sample_access_point("AA:AA", Some("Cafe, Main St"), Some(-42)),
            sample_access_point("BB:BB", None, None),
        ];

        let mut buffer = Vec::new();
        let written = write_csv(
            &mut buffer,
            &rows,
            &["signal", "bssid", "ssid", "security"],
            &registry,
            ViewMode::AccessPoints,
        )?;
        assert_eq!(written, 2);

        let text = String::from_utf8(buffer)?;
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Signal,BSSID,SSID,Security");
        assert_eq!(lines[1], "-42 dBm,AA:AA,\"Cafe, Main St\",WPA2-P");
        assert_eq!(lines[2], ",BB:BB,(hidden),WPA2-P");
        Ok(())
    }

    #[test]
    fn unknown_columns_are_skipped_and_empty_set_rejected() {
        let registry = ColumnRegistry::standard();
        let rows = vec![sample_access_point("AA", None, None)];
        let result = write_csv(
            Vec::new(),
            &rows,
            &["nope"],
            &registry,
            ViewMode::AccessPoints,
        );
        assert!(matches!(result, Err(ExportError::NoColumns)));
    }

    #[test]
    fn export_writes_into_new_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("exports");
        let registry = ColumnRegistry::standard();
        let rows = vec![sample_access_point("AA", Some("Home"), Some(-60))];

        let path = export_to_dir(&target, &rows, &["bssid", "ssid"], &registry, ViewMode::AccessPoints)?;

        assert!(path.starts_with(&target));
        let contents = std::fs::read_to_string(path)?;
        assert_eq!(contents, "BSSID,SSID\nAA,Home\n");
        Ok(())
    }

    #[test]
    fn export_without_rows_fails() {
        let dir = std::env::temp_dir();
        let result = export_to_dir(&dir, &[], &["bssid"], &ColumnRegistry::standard(), ViewMode::AccessPoints);
        assert!(matches!(result, Err(ExportError::NoRows)));
    }
}
