use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DataQuality, RadioType, SecurityClass};

pub const SIGNAL_FLOOR_DBM: i32 = -120;
pub const SIGNAL_CEILING_DBM: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusSearch {
    pub lat: f64,
    pub lng: f64,
    pub radius_meters: f64,
}

/// Active table constraints. `bbox` and `radius_search` are never both set.
///
/// Deserializing goes through [`StoredFilters`] and the validating mutators, so a stored
/// state that breaks a range or spatial rule is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredFilters")]
pub struct FilterState {
    pub search: Option<String>,
    pub radio_types: BTreeSet<RadioType>,
    pub min_signal: Option<i32>,
    pub max_signal: Option<i32>,
    pub encryption: BTreeSet<String>,
    pub data_quality: BTreeSet<DataQuality>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    bbox: Option<BoundingBox>,
    radius_search: Option<RadiusSearch>,
}

/// Unchecked filter fields as they are written to the preference table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoredFilters {
    pub search: Option<String>,
    pub radio_types: BTreeSet<RadioType>,
    pub min_signal: Option<i32>,
    pub max_signal: Option<i32>,
    pub encryption: BTreeSet<String>,
    pub data_quality: BTreeSet<DataQuality>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
    pub bbox: Option<BoundingBox>,
    pub radius_search: Option<RadiusSearch>,
}

impl TryFrom<StoredFilters> for FilterState {
    type Error = FilterError;

    fn try_from(stored: StoredFilters) -> Result<Self, Self::Error> {
        if stored.bbox.is_some() && stored.radius_search.is_some() {
            return Err(FilterError::SpatialConflict);
        }

        let mut filters = Self::default();
        filters.set_search(stored.search.as_deref().unwrap_or_default());
        filters.radio_types = stored.radio_types;
        filters.data_quality = stored.data_quality;
        for code in &stored.encryption {
            let class = SecurityClass::parse_code(code).ok_or_else(|| FilterError::InvalidParam {
                key: "encryption".to_string(),
                value: code.clone(),
            })?;
            filters.toggle_encryption(class);
        }
        filters.set_signal_range(stored.min_signal, stored.max_signal)?;
        filters.set_date_range(stored.date_start, stored.date_end)?;
        if let Some(bbox) = stored.bbox {
            filters.set_bbox(bbox)?;
        }
        if let Some(radius) = stored.radius_search {
            filters.set_radius_search(radius)?;
        }
        Ok(filters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Search,
    RadioTypes,
    MinSignal,
    MaxSignal,
    Encryption,
    DataQuality,
    DateStart,
    DateEnd,
    BoundingBox,
    RadiusSearch,
}

impl FilterField {
    pub const ALL: [Self; 10] = [
        Self::Search,
        Self::RadioTypes,
        Self::MinSignal,
        Self::MaxSignal,
        Self::Encryption,
        Self::DataQuality,
        Self::DateStart,
        Self::DateEnd,
        Self::BoundingBox,
        Self::RadiusSearch,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::RadioTypes => "Radio types",
            Self::MinSignal => "Min signal (dBm)",
            Self::MaxSignal => "Max signal (dBm)",
            Self::Encryption => "Security",
            Self::DataQuality => "Data quality",
            Self::DateStart => "Seen after",
            Self::DateEnd => "Seen before",
            Self::BoundingBox => "Bounding box",
            Self::RadiusSearch => "Radius search",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("{0}")]
    SignalRange(String),
    #[error("start date {start} is after end date {end}")]
    DateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("invalid bounding box: {0}")]
    BoundingBox(String),
    #[error("invalid radius search: {0}")]
    Radius(String),
    #[error("a bounding box and a radius search cannot both be active")]
    SpatialConflict,
    #[error("invalid value {value:?} for filter {key}")]
    InvalidParam { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRangeCheck {
    pub valid: bool,
    pub error: Option<String>,
}

impl SignalRangeCheck {
    const fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(message: String) -> Self {
        Self {
            valid: false,
            error: Some(message),
        }
    }
}

pub fn validate_signal_range(min: Option<i32>, max: Option<i32>) -> SignalRangeCheck {
    for (name, value) in [("minimum", min), ("maximum", max)] {
        if let Some(dbm) = value {
            if !(SIGNAL_FLOOR_DBM..=SIGNAL_CEILING_DBM).contains(&dbm) {
                return SignalRangeCheck::invalid(format!(
                    "{name} signal {dbm} dBm is outside {SIGNAL_FLOOR_DBM}..={SIGNAL_CEILING_DBM}"
                ));
            }
        }
    }

    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return SignalRangeCheck::invalid(format!(
                "minimum signal {min} dBm is greater than maximum {max} dBm"
            ));
        }
    }

    SignalRangeCheck::ok()
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

pub fn count_active_filters(filters: &FilterState) -> usize {
    [
        is_set(filters.search.as_deref()),
        !filters.radio_types.is_empty(),
        filters.min_signal.is_some(),
        filters.max_signal.is_some(),
        !filters.encryption.is_empty(),
        !filters.data_quality.is_empty(),
        filters.date_start.is_some(),
        filters.date_end.is_some(),
        filters.bbox.is_some(),
        filters.radius_search.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count()
}

fn join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join(",")
}

pub fn filters_to_query_params(filters: &FilterState) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();

    if let Some(search) = filters.search.as_deref().map(str::trim) {
        if !search.is_empty() {
            params.insert("search".to_string(), search.to_string());
        }
    }
    if !filters.radio_types.is_empty() {
        params.insert(
            "radio_types".to_string(),
            join(filters.radio_types.iter().map(|radio| radio.as_str())),
        );
    }
    if let Some(min) = filters.min_signal {
        params.insert("min_signal".to_string(), min.to_string());
    }
    if let Some(max) = filters.max_signal {
        params.insert("max_signal".to_string(), max.to_string());
    }
    if !filters.encryption.is_empty() {
        params.insert(
            "encryption".to_string(),
            join(filters.encryption.iter().map(String::as_str)),
        );
    }
    if !filters.data_quality.is_empty() {
        params.insert(
            "data_quality".to_string(),
            join(filters.data_quality.iter().map(|q| q.as_str())),
        );
    }
    if let Some(start) = filters.date_start {
        params.insert("date_start".to_string(), start.to_rfc3339());
    }
    if let Some(end) = filters.date_end {
        params.insert("date_end".to_string(), end.to_rfc3339());
    }
    if let Some(bbox) = filters.bbox {
        params.insert(
            "bbox".to_string(),
            format!(
                "{},{},{},{}",
                bbox.min_lng, bbox.min_lat, bbox.max_lng, bbox.max_lat
            ),
        );
    }
    if let Some(radius) = filters.radius_search {
        params.insert("lat".to_string(), radius.lat.to_string());
        params.insert("lng".to_string(), radius.lng.to_string());
        params.insert("radius".to_string(), radius.radius_meters.to_string());
    }

    params
}

fn parse_param<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, FilterError> {
    value.trim().parse().map_err(|_| FilterError::InvalidParam {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_list<T>(
    key: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<T>, FilterError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            parse(item).ok_or_else(|| FilterError::InvalidParam {
                key: key.to_string(),
                value: item.to_string(),
            })
        })
        .collect()
}

fn parse_date(key: &str, value: &str) -> Result<DateTime<Utc>, FilterError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        })
        .map_err(|_| FilterError::InvalidParam {
            key: key.to_string(),
            value: value.to_string(),
        })
}

impl FilterState {
    pub const fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub const fn radius_search(&self) -> Option<RadiusSearch> {
        self.radius_search
    }

    pub fn active_count(&self) -> usize {
        count_active_filters(self)
    }

    pub fn to_query_params(&self) -> BTreeMap<String, String> {
        filters_to_query_params(self)
    }

    pub fn set_search(&mut self, search: &str) {
        let trimmed = search.trim();
        self.search = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    pub fn toggle_radio_type(&mut self, radio: RadioType) {
        if !self.radio_types.remove(&radio) {
            self.radio_types.insert(radio);
        }
    }

    pub fn toggle_encryption(&mut self, class: SecurityClass) {
        let code = class.code().to_string();
        if !self.encryption.remove(&code) {
            self.encryption.insert(code);
        }
    }

    pub fn toggle_data_quality(&mut self, quality: DataQuality) {
        if !self.data_quality.remove(&quality) {
            self.data_quality.insert(quality);
        }
    }

    /// Sets both bounds at once; on error nothing changes.
    pub fn set_signal_range(&mut self, min: Option<i32>, max: Option<i32>) -> Result<(), FilterError> {
        let check = validate_signal_range(min, max);
        if !check.valid {
            return Err(FilterError::SignalRange(check.error.unwrap_or_default()));
        }
        self.min_signal = min;
        self.max_signal = max;
        Ok(())
    }

    pub fn set_min_signal(&mut self, min: Option<i32>) -> Result<(), FilterError> {
        self.set_signal_range(min, self.max_signal)
    }

    pub fn set_max_signal(&mut self, max: Option<i32>) -> Result<(), FilterError> {
        self.set_signal_range(self.min_signal, max)
    }

    pub fn set_date_range(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<(), FilterError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterError::DateRange { start, end });
            }
        }
        self.date_start = start;
        self.date_end = end;
        Ok(())
    }

    /// Replaces any radius search.
    pub fn set_bbox(&mut self, bbox: BoundingBox) -> Result<(), FilterError> {
        let lng_ok = |v: f64| (-180.0..=180.0).contains(&v);
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        if !(lng_ok(bbox.min_lng) && lng_ok(bbox.max_lng)) {
            return Err(FilterError::BoundingBox(
                "longitude must be within -180..=180".to_string(),
            ));
        }
        if !(lat_ok(bbox.min_lat) && lat_ok(bbox.max_lat)) {
            return Err(FilterError::BoundingBox(
                "latitude must be within -90..=90".to_string(),
            ));
        }
        if bbox.min_lng > bbox.max_lng || bbox.min_lat > bbox.max_lat {
            return Err(FilterError::BoundingBox(
                "minimum corner must not exceed maximum corner".to_string(),
            ));
        }
        self.bbox = Some(bbox);
        self.radius_search = None;
        Ok(())
    }

    /// Replaces any bounding box.
    pub fn set_radius_search(&mut self, radius: RadiusSearch) -> Result<(), FilterError> {
        if !(-90.0..=90.0).contains(&radius.lat) || !(-180.0..=180.0).contains(&radius.lng) {
            return Err(FilterError::Radius("center is not a valid coordinate".to_string()));
        }
        if radius.radius_meters.is_nan() || radius.radius_meters <= 0.0 {
            return Err(FilterError::Radius("radius must be positive".to_string()));
        }
        self.radius_search = Some(radius);
        self.bbox = None;
        Ok(())
    }

    pub fn clear_field(&mut self, field: FilterField) {
        match field {
            FilterField::Search => self.search = None,
            FilterField::RadioTypes => self.radio_types.clear(),
            FilterField::MinSignal => self.min_signal = None,
            FilterField::MaxSignal => self.max_signal = None,
            FilterField::Encryption => self.encryption.clear(),
            FilterField::DataQuality => self.data_quality.clear(),
            FilterField::DateStart => self.date_start = None,
            FilterField::DateEnd => self.date_end = None,
            FilterField::BoundingBox => self.bbox = None,
            FilterField::RadiusSearch => self.radius_search = None,
        }
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// Rebuilds a filter state from query parameters. Unknown keys are ignored.
    pub fn from_query_params<'a>(
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, FilterError> {
        let mut filters = Self::default();
        let mut min_signal = None;
        let mut max_signal = None;
        let mut date_start = None;
        let mut date_end = None;
        let (mut lat, mut lng, mut radius) = (None, None, None);

        for (key, value) in params {
            match key {
                "search" => filters.set_search(value),
                "radio_types" => {
                    filters.radio_types = parse_list(key, value, RadioType::parse)?
                        .into_iter()
                        .collect();
                }
                "min_signal" => min_signal = Some(parse_param(key, value)?),
                "max_signal" => max_signal = Some(parse_param(key, value)?),
                "encryption" => {
                    filters.encryption = parse_list(key, value, SecurityClass::parse_code)?
                        .into_iter()
                        .map(|class| class.code().to_string())
                        .collect();
                }
                "data_quality" => {
                    filters.data_quality = parse_list(key, value, DataQuality::parse)?
                        .into_iter()
                        .collect();
                }
                "date_start" => date_start = Some(parse_date(key, value)?),
                "date_end" => date_end = Some(parse_date(key, value)?),
                "bbox" => {
                    let parts: Vec<f64> = parse_list(key, value, |part| part.parse().ok())?;
                    let [min_lng, min_lat, max_lng, max_lat] = parts.as_slice() else {
                        return Err(FilterError::InvalidParam {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    };
                    filters.set_bbox(BoundingBox {
                        min_lng: *min_lng,
                        min_lat: *min_lat,
                        max_lng: *max_lng,
                        max_lat: *max_lat,
                    })?;
                }
                "lat" => lat = Some(parse_param(key, value)?),
                "lng" => lng = Some(parse_param(key, value)?),
                "radius" => radius = Some(parse_param(key, value)?),
                _ => {}
            }
        }

        filters.set_signal_range(min_signal, max_signal)?;
        filters.set_date_range(date_start, date_end)?;
        if let (Some(lat), Some(lng), Some(radius_meters)) = (lat, lng, radius) {
            filters.set_radius_search(RadiusSearch {
                lat,
                lng,
                radius_meters,
            })?;
        }

        Ok(filters)
    }
}
