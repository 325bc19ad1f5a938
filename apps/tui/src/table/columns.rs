use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{channel_label, DataQuality, Record, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnGroup {
    Core,
    Network,
    Manufacturer,
    Statistics,
    Temporal,
    Location,
}

impl ColumnGroup {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Network => "Network",
            Self::Manufacturer => "Manufacturer",
            Self::Statistics => "Statistics",
            Self::Temporal => "Temporal",
            Self::Location => "Location",
        }
    }
}

/// A single extracted table value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Time(DateTime<Utc>),
}

impl CellValue {
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Int(_) | Self::Float(_) => 1,
            Self::Time(_) => 2,
            Self::Text(_) => 3,
        }
    }

    /// Total order over non-null values. Callers place nulls themselves.
    #[allow(clippy::cast_precision_loss)]
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).total_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.total_cmp(&(*b as f64)),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    fn from_opt_text(value: Option<&str>) -> Self {
        match value {
            Some(text) if !text.trim().is_empty() => Self::Text(text.to_string()),
            _ => Self::Null,
        }
    }
}

pub type Extractor = fn(&Record, ViewMode) -> CellValue;
pub type Formatter = fn(&CellValue, &Record) -> String;

#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub group: ColumnGroup,
    pub width: u16,
    pub sortable: bool,
    pub always_visible: bool,
    pub default_visible: bool,
    pub extract: Extractor,
    pub format: Formatter,
}

impl ColumnDescriptor {
    pub fn value(&self, record: &Record, view: ViewMode) -> CellValue {
        (self.extract)(record, view)
    }

    pub fn display(&self, record: &Record, view: ViewMode) -> String {
        let value = self.value(record, view);
        (self.format)(&value, record)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate column id: {0}")]
    DuplicateId(&'static str),
    #[error("column registry is empty")]
    Empty,
}

#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnRegistry {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self, RegistryError> {
        if columns.is_empty() {
            return Err(RegistryError::Empty);
        }
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.id) {
                return Err(RegistryError::DuplicateId(column.id));
            }
        }
        Ok(Self { columns })
    }

    /// The dashboard's column set, shared by both view modes.
    pub fn standard() -> Self {
        Self {
            columns: standard_columns(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.id)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn format_plain(value: &CellValue, _record: &Record) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Text(text) => text.clone(),
        CellValue::Int(n) => n.to_string(),
        CellValue::Float(f) => format!("{f:.2}"),
        CellValue::Time(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

fn format_time(value: &CellValue, record: &Record) -> String {
    match value {
        CellValue::Time(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        other => format_plain(other, record),
    }
}

fn format_signal(value: &CellValue, record: &Record) -> String {
    match value {
        CellValue::Int(dbm) => format!("{dbm} dBm"),
        other => format_plain(other, record),
    }
}

fn format_frequency(value: &CellValue, record: &Record) -> String {
    match value {
        CellValue::Int(mhz) => format!("{mhz} MHz"),
        other => format_plain(other, record),
    }
}

fn format_coordinate(value: &CellValue, record: &Record) -> String {
    match value {
        CellValue::Float(deg) => format!("{deg:.5}"),
        other => format_plain(other, record),
    }
}

fn format_security(_value: &CellValue, record: &Record) -> String {
    record.security().code().to_string()
}

fn format_data_quality(_value: &CellValue, record: &Record) -> String {
    match record {
        Record::AccessPoint(ap) => ap.data_quality.map_or("", DataQuality::label).to_string(),
        Record::Observation(_) => String::new(),
    }
}

fn format_ssid(value: &CellValue, _record: &Record) -> String {
    match value {
        CellValue::Text(text) => text.clone(),
        _ => "(hidden)".to_string(),
    }
}

fn extract_bssid(record: &Record, _view: ViewMode) -> CellValue {
    CellValue::Text(record.bssid().to_string())
}

fn extract_ssid(record: &Record, _view: ViewMode) -> CellValue {
    CellValue::from_opt_text(record.ssid())
}

fn extract_signal(record: &Record, _view: ViewMode) -> CellValue {
    record
        .signal()
        .map_or(CellValue::Null, |dbm| CellValue::Int(i64::from(dbm)))
}

fn extract_radio_type(record: &Record, _view: ViewMode) -> CellValue {
    CellValue::Text(record.radio_type().label().to_string())
}

fn extract_security(record: &Record, _view: ViewMode) -> CellValue {
    if record.capabilities().is_none() {
        return CellValue::Null;
    }
    CellValue::Int(record.security().risk())
}

fn extract_frequency(record: &Record, _view: ViewMode) -> CellValue {
    record
        .frequency()
        .map_or(CellValue::Null, |mhz| CellValue::Int(i64::from(mhz)))
}

fn extract_channel(record: &Record, _view: ViewMode) -> CellValue {
    CellValue::from_opt_text(channel_label(record.radio_type(), record.frequency()).as_deref())
}

fn extract_manufacturer(record: &Record, _view: ViewMode) -> CellValue {
    match record {
        Record::AccessPoint(ap) => CellValue::from_opt_text(ap.manufacturer.as_deref()),
        Record::Observation(_) => CellValue::Null,
    }
}

fn extract_observations(record: &Record, view: ViewMode) -> CellValue {
    match (record, view) {
        (Record::AccessPoint(ap), ViewMode::AccessPoints) => ap
            .observations
            .and_then(|n| i64::try_from(n).ok())
            .map_or(CellValue::Null, CellValue::Int),
        _ => CellValue::Null,
    }
}

fn extract_data_quality(record: &Record, _view: ViewMode) -> CellValue {
    match record {
        Record::AccessPoint(ap) => ap
            .data_quality
            .map_or(CellValue::Null, |q| CellValue::Int(q.rank())),
        Record::Observation(_) => CellValue::Null,
    }
}

fn extract_first_seen(record: &Record, _view: ViewMode) -> CellValue {
    record.first_seen().map_or(CellValue::Null, CellValue::Time)
}

fn extract_last_seen(record: &Record, _view: ViewMode) -> CellValue {
    record.last_seen().map_or(CellValue::Null, CellValue::Time)
}

fn extract_latitude(record: &Record, _view: ViewMode) -> CellValue {
    record.coordinates().0.map_or(CellValue::Null, CellValue::Float)
}

fn extract_longitude(record: &Record, _view: ViewMode) -> CellValue {
    record.coordinates().1.map_or(CellValue::Null, CellValue::Float)
}

#[allow(clippy::fn_params_excessive_bools)]
fn column(
    id: &'static str,
    label: &'static str,
    group: ColumnGroup,
    width: u16,
    sortable: bool,
    default_visible: bool,
    extract: Extractor,
    format: Formatter,
) -> ColumnDescriptor {
    ColumnDescriptor {
        id,
        label,
        group,
        width,
        sortable,
        always_visible: false,
        default_visible,
        extract,
        format,
    }
}

fn standard_columns() -> Vec<ColumnDescriptor> {
    use ColumnGroup::{Core, Location, Manufacturer, Network, Statistics, Temporal};

    vec![
        ColumnDescriptor {
            always_visible: true,
            ..column("bssid", "BSSID", Core, 17, true, true, extract_bssid, format_plain)
        },
        column("ssid", "SSID", Core, 24, true, true, extract_ssid, format_ssid),
        column("signal", "Signal", Core, 9, true, true, extract_signal, format_signal),
        column("radio_type", "Radio", Network, 9, true, true, extract_radio_type, format_plain),
        column("security", "Security", Network, 8, true, true, extract_security, format_security),
        column("frequency", "Freq", Network, 9, true, false, extract_frequency, format_frequency),
        column("channel", "Ch", Network, 8, false, true, extract_channel, format_plain),
        column(
            "manufacturer",
            "Manufacturer",
            Manufacturer,
            20,
            true,
            false,
            extract_manufacturer,
            format_plain,
        ),
        column(
            "observations",
            "Obs",
            Statistics,
            6,
            true,
            true,
            extract_observations,
            format_plain,
        ),
        column(
            "data_quality",
            "Quality",
            Statistics,
            7,
            true,
            false,
            extract_data_quality,
            format_data_quality,
        ),
        column(
            "first_seen",
            "First Seen",
            Temporal,
            16,
            true,
            false,
            extract_first_seen,
            format_time,
        ),
        column(
            "last_seen",
            "Last Seen",
            Temporal,
            16,
            true,
            true,
            extract_last_seen,
            format_time,
        ),
        column("latitude", "Lat", Location, 10, true, false, extract_latitude, format_coordinate),
        column("longitude", "Lon", Location, 10, true, false, extract_longitude, format_coordinate),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::AccessPoint;
    use crate::table::sort::{sort_records, SortEntry, SortModel};

    pub fn sample_access_point(bssid: &str, ssid: Option<&str>, signal: Option<i32>) -> Record {
        Record::AccessPoint(AccessPoint {
            bssid: bssid.to_string(),
            ssid: ssid.map(str::to_string),
            manufacturer: None,
            radio_type: Some("W".to_string()),
            frequency: Some(2437),
            capabilities: Some("[WPA2-PSK-CCMP][ESS]".to_string()),
            signal,
            observations: Some(3),
            first_seen: None,
            last_seen: None,
            latitude: Some(43.1),
            longitude: Some(-83.2),
            data_quality: None,
        })
    }

    #[test]
    fn standard_registry_has_unique_ids() {
        let registry = ColumnRegistry::standard();
        let rebuilt = ColumnRegistry::new(registry.iter().cloned().collect());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let registry = ColumnRegistry::standard();
        let mut columns: Vec<_> = registry.iter().cloned().collect();
        columns.push(columns[1].clone());
        let result = ColumnRegistry::new(columns);
        assert_eq!(result.err(), Some(RegistryError::DuplicateId("ssid")));
    }

    #[test]
    fn empty_registry_is_rejected() {
        assert_eq!(ColumnRegistry::new(Vec::new()).err(), Some(RegistryError::Empty));
    }

    #[test]
    fn bssid_is_the_only_always_visible_column() {
        let registry = ColumnRegistry::standard();
        let always: Vec<_> = registry
            .iter()
            .filter(|c| c.always_visible)
            .map(|c| c.id)
            .collect();
        assert_eq!(always, vec!["bssid"]);
    }

    #[test]
    fn formatters_render_units() {
        let registry = ColumnRegistry::standard();
        let record = sample_access_point("aa", None, Some(-55));
        let view = ViewMode::AccessPoints;

        let display = |id: &str| {
            registry
                .get(id)
                .map(|c| c.display(&record, view))
                .unwrap_or_default()
        };

        assert_eq!(display("signal"), "-55 dBm");
        assert_eq!(display("frequency"), "2437 MHz");
        assert_eq!(display("channel"), "6");
        assert_eq!(display("ssid"), "(hidden)");
        assert_eq!(display("security"), "WPA2-P");
        assert_eq!(display("latitude"), "43.10000");
    }

    #[test]
    fn observation_count_only_applies_to_access_point_view() {
        let registry = ColumnRegistry::standard();
        let record = sample_access_point("aa", None, None);
        let column = registry.get("observations");
        assert_eq!(
            column.map(|c| c.value(&record, ViewMode::AccessPoints)),
            Some(CellValue::Int(3))
        );
        assert_eq!(
            column.map(|c| c.value(&record, ViewMode::Observations)),
            Some(CellValue::Null)
        );
    }

    #[test]
    fn data_quality_sorts_by_rank_and_shows_label() {
        let registry = ColumnRegistry::standard();
        let view = ViewMode::AccessPoints;
        let with_quality = |bssid: &str, quality: Option<DataQuality>| {
            let mut record = sample_access_point(bssid, None, None);
            if let Record::AccessPoint(ap) = &mut record {
                ap.data_quality = quality;
            }
            record
        };
        let mut rows = vec![
            with_quality("a", Some(DataQuality::Medium)),
            with_quality("b", None),
            with_quality("c", Some(DataQuality::High)),
            with_quality("d", Some(DataQuality::Low)),
        ];

        let sort = SortModel::new(vec![SortEntry::asc("data_quality")]);
        sort_records(&mut rows, &sort, &registry, view);
        let order: Vec<&str> = rows.iter().map(Record::bssid).collect();
        assert_eq!(order, vec!["d", "a", "c", "b"]);

        let column = registry.get("data_quality");
        assert_eq!(column.map(|c| c.display(&rows[0], view)).as_deref(), Some("Low"));
        assert_eq!(column.map(|c| c.display(&rows[3], view)).as_deref(), Some(""));
    }

    #[test]
    fn text_comparison_ignores_case() {
        let a = CellValue::Text("alpha".into());
        let b = CellValue::Text("Beta".into());
        assert_eq!(a.compare(&b), Ordering::Less);
    }
}
