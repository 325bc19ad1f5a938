mod channel;
mod radio;
mod records;
mod security;

pub use channel::{ble_channel, bt_classic_channel, channel_label, wifi_channel, BleChannel, WifiBand};
pub use radio::RadioType;
pub use records::{AccessPoint, Observation, Record};
pub use security::SecurityClass;

use serde::{Deserialize, Serialize};

/// Which backend collection a table is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    AccessPoints,
    Observations,
}

impl ViewMode {
    pub const ALL: [Self; 2] = [Self::AccessPoints, Self::Observations];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessPoints => "access-points",
            Self::Observations => "observations",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "access-points" | "access_points" | "accesspoints" | "ap" | "aps" => {
                Some(Self::AccessPoints)
            }
            "observations" | "observation" | "obs" | "networks" => Some(Self::Observations),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::AccessPoints => "Access Points",
            Self::Observations => "Observations",
        }
    }

    /// REST path serving this view's rows.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::AccessPoints => "/api/v1/access-points",
            Self::Observations => "/api/v1/networks",
        }
    }

    pub const fn toggle(self) -> Self {
        match self {
            Self::AccessPoints => Self::Observations,
            Self::Observations => Self::AccessPoints,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    /// Sort rank; higher is better.
    pub const fn rank(self) -> i64 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_mode_parses_aliases() {
        assert_eq!(ViewMode::parse("AP"), Some(ViewMode::AccessPoints));
        assert_eq!(ViewMode::parse(" networks "), Some(ViewMode::Observations));
        assert_eq!(ViewMode::parse("map"), None);
    }

    #[test]
    fn view_mode_toggle_round_trips() {
        for mode in ViewMode::ALL {
            assert_eq!(mode.toggle().toggle(), mode);
        }
    }

    #[test]
    fn data_quality_parse_matches_as_str() {
        for quality in DataQuality::ALL {
            assert_eq!(DataQuality::parse(quality.as_str()), Some(quality));
        }
    }
}
