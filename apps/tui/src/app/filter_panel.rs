use crate::domain::{DataQuality, RadioType, SecurityClass};
use crate::table::{FilterError, FilterField, FilterState};

/// Cursor and edit buffer for the filter screen.
#[derive(Debug, Clone, Default)]
pub struct FilterPanel {
    pub selected: usize,
    pub option: usize,
    pub editing: bool,
    pub input: String,
}

impl FilterPanel {
    pub fn field(&self) -> FilterField {
        FilterField::ALL[self.selected.min(FilterField::ALL.len() - 1)]
    }

    pub fn reset_cursor(&mut self) {
        self.option = 0;
        self.editing = false;
        self.input.clear();
    }
}

/// One toggleable member of a set-valued filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOption {
    Radio(RadioType),
    Security(SecurityClass),
    Quality(DataQuality),
}

impl FilterOption {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Radio(radio) => radio.label(),
            Self::Security(class) => class.code(),
            Self::Quality(quality) => quality.label(),
        }
    }

    pub fn is_active(self, filters: &FilterState) -> bool {
        match self {
            Self::Radio(radio) => filters.radio_types.contains(&radio),
            Self::Security(class) => filters.encryption.contains(class.code()),
            Self::Quality(quality) => filters.data_quality.contains(&quality),
        }
    }

    pub fn toggle(self, filters: &mut FilterState) {
        match self {
            Self::Radio(radio) => filters.toggle_radio_type(radio),
            Self::Security(class) => filters.toggle_encryption(class),
            Self::Quality(quality) => filters.toggle_data_quality(quality),
        }
    }
}

pub fn options_for(field: FilterField) -> Vec<FilterOption> {
    match field {
        FilterField::RadioTypes => RadioType::FILTERABLE.into_iter().map(FilterOption::Radio).collect(),
        FilterField::Encryption => SecurityClass::ALL
            .into_iter()
            .filter(|class| *class != SecurityClass::Unknown)
            .map(FilterOption::Security)
            .collect(),
        FilterField::DataQuality => DataQuality::ALL.into_iter().map(FilterOption::Quality).collect(),
        _ => Vec::new(),
    }
}

pub const fn is_text_field(field: FilterField) -> bool {
    !matches!(
        field,
        FilterField::RadioTypes | FilterField::Encryption | FilterField::DataQuality
    )
}

pub const fn input_hint(field: FilterField) -> &'static str {
    match field {
        FilterField::Search => "SSID, BSSID or manufacturer text",
        FilterField::MinSignal | FilterField::MaxSignal => "dBm between -120 and 0",
        FilterField::DateStart | FilterField::DateEnd => "YYYY-MM-DD or RFC 3339",
        FilterField::BoundingBox => "minLng,minLat,maxLng,maxLat",
        FilterField::RadiusSearch => "lat,lng,radius_m",
        FilterField::RadioTypes | FilterField::Encryption | FilterField::DataQuality => {
            "space toggles the highlighted option"
        }
    }
}

/// Current value of a field as text, used to prefill the edit buffer and for display.
pub fn current_text(filters: &FilterState, field: FilterField) -> String {
    let params = filters.to_query_params();
    let get = |key: &str| params.get(key).cloned().unwrap_or_default();
    match field {
        FilterField::Search => get("search"),
        FilterField::RadioTypes => get("radio_types"),
        FilterField::MinSignal => get("min_signal"),
        FilterField::MaxSignal => get("max_signal"),
        FilterField::Encryption => get("encryption"),
        FilterField::DataQuality => get("data_quality"),
        FilterField::DateStart => get("date_start"),
        FilterField::DateEnd => get("date_end"),
        FilterField::BoundingBox => get("bbox"),
        FilterField::RadiusSearch => {
            if params.contains_key("radius") {
                format!("{},{},{}", get("lat"), get("lng"), get("radius"))
            } else {
                String::new()
            }
        }
    }
}

fn invalid(key: &str, value: &str) -> FilterError {
    FilterError::InvalidParam {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_signal(key: &str, input: &str) -> Result<Option<i32>, FilterError> {
    if input.is_empty() {
        return Ok(None);
    }
    input.parse().map(Some).map_err(|_| invalid(key, input))
}

/// Applies an edited text value. Empty input clears the field. On error nothing changes.
pub fn apply_text(filters: &mut FilterState, field: FilterField, input: &str) -> Result<(), FilterError> {
    let input = input.trim();
    match field {
        FilterField::Search => {
            filters.set_search(input);
            Ok(())
        }
        FilterField::MinSignal => filters.set_min_signal(parse_signal("min_signal", input)?),
        FilterField::MaxSignal => filters.set_max_signal(parse_signal("max_signal", input)?),
        FilterField::DateStart => {
            let start = if input.is_empty() {
                None
            } else {
                FilterState::from_query_params([("date_start", input)])?.date_start
            };
            filters.set_date_range(start, filters.date_end)
        }
        FilterField::DateEnd => {
            let end = if input.is_empty() {
                None
            } else {
                FilterState::from_query_params([("date_end", input)])?.date_end
            };
            filters.set_date_range(filters.date_start, end)
        }
        FilterField::BoundingBox => {
            if input.is_empty() {
                filters.clear_field(field);
                return Ok(());
            }
            let parsed = FilterState::from_query_params([("bbox", input)])?;
            let bbox = parsed.bbox().ok_or_else(|| invalid("bbox", input))?;
            filters.set_bbox(bbox)
        }
        FilterField::RadiusSearch => {
            if input.is_empty() {
                filters.clear_field(field);
                return Ok(());
            }
            let parts: Vec<&str> = input.split(',').map(str::trim).collect();
            let [lat, lng, radius] = parts.as_slice() else {
                return Err(invalid("radius", input));
            };
            let parsed =
                FilterState::from_query_params([("lat", *lat), ("lng", *lng), ("radius", *radius)])?;
            let radius = parsed
                .radius_search()
                .ok_or_else(|| invalid("radius", input))?;
            filters.set_radius_search(radius)
        }
        FilterField::RadioTypes | FilterField::Encryption | FilterField::DataQuality => {
            Err(invalid(field.label(), input))
        }
    }
}
