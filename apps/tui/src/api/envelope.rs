use serde::Deserialize;

use crate::table::PageMetadata;

/// Response body shared by every `/api/v1` endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_ok")]
    pub ok: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub metadata: Option<RawMetadata>,
    #[serde(default)]
    pub error: Option<String>,
}

const fn default_ok() -> bool {
    true
}

/// Backend paging metadata; every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct RawMetadata {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub returned: Option<u64>,
}

impl RawMetadata {
    /// Fills gaps from the request and the row count actually received.
    pub fn resolve(&self, offset: u64, limit: u64, received: u64) -> PageMetadata {
        let offset = self.offset.unwrap_or(offset);
        let limit = self.limit.unwrap_or(limit);
        let returned = self.returned.unwrap_or(received);
        let total = self
            .total
            .unwrap_or_else(|| synthesized_total(offset, limit, returned));
        PageMetadata {
            total,
            limit,
            offset,
            returned,
        }
    }
}

/// Without a server total, a full page implies at least one more.
pub const fn synthesized_total(offset: u64, limit: u64, returned: u64) -> u64 {
    if returned > 0 && returned >= limit {
        offset.saturating_add(returned).saturating_add(limit)
    } else {
        offset.saturating_add(returned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_page_without_total_implies_more() {
        let meta = RawMetadata::default().resolve(100, 50, 50);
        assert_eq!(meta.total, 200);
        assert!(meta.has_next_page());
    }

    #[test]
    fn short_page_without_total_is_last() {
        let meta = RawMetadata::default().resolve(100, 50, 10);
        assert_eq!(meta.total, 110);
        assert!(!meta.has_next_page());
    }

    #[derive(Debug, Deserialize)]
    struct Version {
        major: u32,
    }

    #[test]
    fn data_is_optional_for_any_payload_type() -> Result<(), serde_json::Error> {
        let failed: Envelope<Version> =
            serde_json::from_str(r#"{ "ok": false, "error": "not ready" }"#)?;
        assert!(!failed.ok);
        assert!(failed.data.is_none());
        assert_eq!(failed.error.as_deref(), Some("not ready"));

        let loaded: Envelope<Version> = serde_json::from_str(r#"{ "data": { "major": 3 } }"#)?;
        assert!(loaded.ok);
        assert_eq!(loaded.data.map(|v| v.major), Some(3));
        Ok(())
    }

    #[test]
    fn offsets_near_the_integer_limit_saturate() {
        let raw = RawMetadata {
            offset: Some(u64::MAX - 1),
            returned: Some(5),
            ..RawMetadata::default()
        };
        let meta = raw.resolve(0, 5, 5);
        assert_eq!(meta.total, u64::MAX);
        assert_eq!(meta.next_offset(), u64::MAX);
        assert!(!meta.has_next_page());

        let bogus_total = RawMetadata {
            total: Some(u64::MAX),
            offset: Some(u64::MAX - 1),
            returned: Some(5),
            ..RawMetadata::default()
        };
        assert!(!bogus_total.resolve(0, 5, 5).has_next_page());
    }

    #[test]
    fn server_values_win() {
        let raw = RawMetadata {
            total: Some(1234),
            limit: Some(25),
            offset: Some(0),
            returned: Some(25),
        };
        let meta = raw.resolve(0, 100, 25);
        assert_eq!(meta.total, 1234);
        assert_eq!(meta.limit, 25);
    }
}
