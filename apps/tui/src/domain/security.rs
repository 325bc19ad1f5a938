use serde::{Deserialize, Serialize};

/// Security posture derived from a capabilities/encryption string.
///
/// This is the only place capability text is interpreted. Filters, the
/// security column and CSV export all go through [`SecurityClass::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityClass {
    Open,
    Wep,
    Wpa,
    Wpa2Personal,
    Wpa2Enterprise,
    Wpa3Personal,
    Wpa3Enterprise,
    Owe,
    Unknown,
}

const ENTERPRISE_MARKERS: [&str; 3] = ["EAP", "802.1X", "MGT"];

impl SecurityClass {
    pub const ALL: [Self; 9] = [
        Self::Open,
        Self::Wep,
        Self::Wpa,
        Self::Wpa2Personal,
        Self::Wpa2Enterprise,
        Self::Wpa3Personal,
        Self::Wpa3Enterprise,
        Self::Owe,
        Self::Unknown,
    ];

    pub fn classify(capabilities: &str) -> Self {
        let caps = capabilities.trim().to_uppercase();
        if caps.is_empty() {
            return Self::Unknown;
        }

        let enterprise = ENTERPRISE_MARKERS.iter().any(|marker| caps.contains(marker));

        if caps.contains("OWE") {
            Self::Owe
        } else if caps.contains("WPA3") || caps.contains("SAE") {
            if enterprise {
                Self::Wpa3Enterprise
            } else {
                Self::Wpa3Personal
            }
        } else if caps.contains("WPA2") || caps.contains("RSN") {
            if enterprise {
                Self::Wpa2Enterprise
            } else {
                Self::Wpa2Personal
            }
        } else if caps.contains("WPA") {
            Self::Wpa
        } else if caps.contains("WEP") {
            Self::Wep
        } else {
            Self::Open
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2Personal => "WPA2-P",
            Self::Wpa2Enterprise => "WPA2-E",
            Self::Wpa3Personal => "WPA3-P",
            Self::Wpa3Enterprise => "WPA3-E",
            Self::Owe => "OWE",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn parse_code(code: &str) -> Option<Self> {
        let code = code.trim().to_uppercase();
        Self::ALL.into_iter().find(|class| class.code() == code)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA",
            Self::Wpa2Personal => "WPA2 Personal",
            Self::Wpa2Enterprise => "WPA2 Enterprise",
            Self::Wpa3Personal => "WPA3 Personal",
            Self::Wpa3Enterprise => "WPA3 Enterprise",
            Self::Owe => "OWE",
            Self::Unknown => "Unknown",
        }
    }

    /// Higher is more exposed. Used when sorting the security column.
    pub const fn risk(self) -> i64 {
        match self {
            Self::Open => 6,
            Self::Wep => 5,
            Self::Wpa => 4,
            Self::Wpa2Personal | Self::Owe => 3,
            Self::Wpa3Personal | Self::Wpa2Enterprise => 2,
            Self::Wpa3Enterprise => 1,
            Self::Unknown => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_capability_strings() {
        let cases = [
            ("[WPA2-PSK-CCMP][ESS]", SecurityClass::Wpa2Personal),
            ("[WPA2-EAP-CCMP][ESS]", SecurityClass::Wpa2Enterprise),
            ("[RSN-SAE-CCMP][ESS]", SecurityClass::Wpa3Personal),
            ("[WPA3-EAP-SUITE-B-192]", SecurityClass::Wpa3Enterprise),
            ("[WPA-PSK-TKIP][ESS]", SecurityClass::Wpa),
            ("[WEP][ESS]", SecurityClass::Wep),
            ("[RSN-OWE-CCMP][ESS]", SecurityClass::Owe),
            ("[ESS]", SecurityClass::Open),
            ("[ESS][WPS]", SecurityClass::Open),
            ("", SecurityClass::Unknown),
            ("   ", SecurityClass::Unknown),
        ];

        for (caps, expected) in cases {
            assert_eq!(SecurityClass::classify(caps), expected, "capabilities {caps:?}");
        }
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            SecurityClass::classify("[wpa2-psk-ccmp]"),
            SecurityClass::Wpa2Personal
        );
    }

    #[test]
    fn mixed_wpa_wpa2_reports_strongest() {
        assert_eq!(
            SecurityClass::classify("[WPA-PSK-CCMP+TKIP][WPA2-PSK-CCMP+TKIP][ESS]"),
            SecurityClass::Wpa2Personal
        );
    }

    #[test]
    fn codes_parse_back() {
        for class in SecurityClass::ALL {
            assert_eq!(SecurityClass::parse_code(class.code()), Some(class));
        }
        assert_eq!(SecurityClass::parse_code("wpa2-p"), Some(SecurityClass::Wpa2Personal));
    }
}
