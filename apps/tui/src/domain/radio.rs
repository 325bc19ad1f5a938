use serde::{Deserialize, Serialize};

use super::channel::wifi_channel;

/// Radio technology a record was captured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioType {
    Wifi,
    Bluetooth,
    Ble,
    Gsm,
    Cdma,
    Lte,
    Nr,
    Unknown,
}

impl RadioType {
    /// Selectable in the filter panel; `Unknown` is never a filter value.
    pub const FILTERABLE: [Self; 7] = [
        Self::Wifi,
        Self::Bluetooth,
        Self::Ble,
        Self::Gsm,
        Self::Cdma,
        Self::Lte,
        Self::Nr,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wifi => "wifi",
            Self::Bluetooth => "bluetooth",
            Self::Ble => "ble",
            Self::Gsm => "gsm",
            Self::Cdma => "cdma",
            Self::Lte => "lte",
            Self::Nr => "nr",
            Self::Unknown => "unknown",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Wifi => "Wi-Fi",
            Self::Bluetooth => "Bluetooth",
            Self::Ble => "BLE",
            Self::Gsm => "GSM",
            Self::Cdma => "CDMA",
            Self::Lte => "LTE",
            Self::Nr => "5G NR",
            Self::Unknown => "Unknown",
        }
    }

    /// Single-letter type codes used by WiGLE exports.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "W" | "w" => Some(Self::Wifi),
            "B" | "b" => Some(Self::Bluetooth),
            "E" | "e" => Some(Self::Ble),
            "G" | "g" => Some(Self::Gsm),
            "C" | "c" => Some(Self::Cdma),
            "L" | "l" => Some(Self::Lte),
            "N" | "n" => Some(Self::Nr),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        if let Some(radio) = Self::from_code(value) {
            return Some(radio);
        }
        match value.trim().to_lowercase().as_str() {
            "wifi" | "wi-fi" | "wlan" | "802.11" => Some(Self::Wifi),
            "bluetooth" | "bt" | "bredr" => Some(Self::Bluetooth),
            "ble" | "btle" | "bluetooth le" | "bluetooth-le" => Some(Self::Ble),
            "gsm" => Some(Self::Gsm),
            "cdma" => Some(Self::Cdma),
            "lte" => Some(Self::Lte),
            "nr" | "5g" | "5g nr" => Some(Self::Nr),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// An explicit type wins; otherwise a Wi-Fi band frequency implies Wi-Fi.
    pub fn infer(type_text: Option<&str>, frequency: Option<u32>) -> Self {
        if let Some(radio) = type_text.and_then(Self::parse) {
            return radio;
        }
        match frequency {
            Some(freq) if wifi_channel(freq).is_some() => Self::Wifi,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wigle_codes_map_to_radio_types() {
        assert_eq!(RadioType::from_code("W"), Some(RadioType::Wifi));
        assert_eq!(RadioType::from_code("E"), Some(RadioType::Ble));
        assert_eq!(RadioType::from_code("L"), Some(RadioType::Lte));
        assert_eq!(RadioType::from_code("X"), None);
    }

    #[test]
    fn explicit_type_wins_over_frequency() {
        assert_eq!(RadioType::infer(Some("B"), Some(2437)), RadioType::Bluetooth);
    }

    #[test]
    fn wifi_frequency_infers_wifi() {
        assert_eq!(RadioType::infer(None, Some(5180)), RadioType::Wifi);
        assert_eq!(RadioType::infer(Some("garbage"), Some(2412)), RadioType::Wifi);
    }

    #[test]
    fn nothing_known_is_unknown() {
        assert_eq!(RadioType::infer(None, None), RadioType::Unknown);
        assert_eq!(RadioType::infer(None, Some(900)), RadioType::Unknown);
    }
}
