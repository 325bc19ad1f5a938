use super::radio::RadioType;

const BT_MIN_FREQ: u32 = 2402;
const BT_MAX_FREQ: u32 = 2480;
const BLE_SPACING: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiBand {
    Ghz2_4,
    Ghz5,
    Ghz6,
}

impl WifiBand {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ghz2_4 => "2.4 GHz",
            Self::Ghz5 => "5 GHz",
            Self::Ghz6 => "6 GHz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BleChannel {
    /// Physical channel index, 0-39.
    pub index: u32,
    /// Logical advertising channel (37, 38 or 39) if this is one.
    pub advertising: Option<u32>,
}

pub fn wifi_channel(freq: u32) -> Option<(WifiBand, u32)> {
    match freq {
        2412..=2472 if (freq - 2407) % 5 == 0 => Some((WifiBand::Ghz2_4, (freq - 2407) / 5)),
        2484 => Some((WifiBand::Ghz2_4, 14)),
        5150..=5895 if freq % 5 == 0 => Some((WifiBand::Ghz5, (freq - 5000) / 5)),
        5955..=7115 if (freq - 5950) % 5 == 0 => Some((WifiBand::Ghz6, (freq - 5950) / 5)),
        _ => None,
    }
}

/// BR/EDR: 79 channels, 1 MHz spacing.
pub const fn bt_classic_channel(freq: u32) -> Option<u32> {
    if freq < BT_MIN_FREQ || freq > BT_MAX_FREQ {
        return None;
    }
    Some(freq - BT_MIN_FREQ)
}

/// BLE: 40 channels, 2 MHz spacing, even frequencies only.
pub const fn ble_channel(freq: u32) -> Option<BleChannel> {
    if freq % 2 != 0 || freq < BT_MIN_FREQ || freq > BT_MAX_FREQ {
        return None;
    }
    let index = (freq - BT_MIN_FREQ) / BLE_SPACING;
    let advertising = match index {
        0 => Some(37),
        12 => Some(38),
        39 => Some(39),
        _ => None,
    };
    Some(BleChannel { index, advertising })
}

pub fn channel_label(radio: RadioType, freq: Option<u32>) -> Option<String> {
    let freq = freq?;
    match radio {
        RadioType::Bluetooth => bt_classic_channel(freq).map(|ch| ch.to_string()),
        RadioType::Ble => ble_channel(freq).map(|ch| match ch.advertising {
            Some(adv) => format!("{adv} (adv)"),
            None => ch.index.to_string(),
        }),
        _ => wifi_channel(freq).map(|(_, ch)| ch.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_channels_across_bands() {
        assert_eq!(wifi_channel(2412), Some((WifiBand::Ghz2_4, 1)));
        assert_eq!(wifi_channel(2437), Some((WifiBand::Ghz2_4, 6)));
        assert_eq!(wifi_channel(2484), Some((WifiBand::Ghz2_4, 14)));
        assert_eq!(wifi_channel(5180), Some((WifiBand::Ghz5, 36)));
        assert_eq!(wifi_channel(5955), Some((WifiBand::Ghz6, 1)));
        assert_eq!(wifi_channel(2413), None);
        assert_eq!(wifi_channel(900), None);
    }

    #[test]
    fn bt_classic_range() {
        assert_eq!(bt_classic_channel(2402), Some(0));
        assert_eq!(bt_classic_channel(2403), Some(1));
        assert_eq!(bt_classic_channel(2480), Some(78));
        assert_eq!(bt_classic_channel(2500), None);
    }

    #[test]
    fn ble_advertising_channels() {
        assert_eq!(
            ble_channel(2402),
            Some(BleChannel { index: 0, advertising: Some(37) })
        );
        assert_eq!(
            ble_channel(2426),
            Some(BleChannel { index: 12, advertising: Some(38) })
        );
        assert_eq!(
            ble_channel(2480),
            Some(BleChannel { index: 39, advertising: Some(39) })
        );
        assert_eq!(ble_channel(2450), Some(BleChannel { index: 24, advertising: None }));
    }

    #[test]
    fn ble_rejects_odd_frequencies() {
        assert_eq!(ble_channel(2403), None);
    }

    #[test]
    fn channel_label_depends_on_radio() {
        assert_eq!(channel_label(RadioType::Wifi, Some(2437)).as_deref(), Some("6"));
        assert_eq!(channel_label(RadioType::Ble, Some(2426)).as_deref(), Some("38 (adv)"));
        assert_eq!(channel_label(RadioType::Bluetooth, Some(2426)).as_deref(), Some("24"));
        assert_eq!(channel_label(RadioType::Wifi, None), None);
    }
}
