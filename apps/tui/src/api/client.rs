use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::envelope::Envelope;
use crate::domain::{Observation, Record, ViewMode};
use crate::table::Page;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("backend error: {0}")]
    Backend(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Thin REST client for the ShadowCheck backend. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Fails if `base_url` cannot carry a path, e.g. `mailto:` or a bare host without a scheme.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            base,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends percent-encoded `segments` to the base URL's path.
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                url: self.base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.url(endpoint.split('/').filter(|segment| !segment.is_empty()))
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> Result<Envelope<T>, ApiError> {
        tracing::debug!(%url, params = query.len(), "GET");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        if !envelope.ok {
            return Err(ApiError::Backend(
                envelope
                    .error
                    .unwrap_or_else(|| "request was not ok".to_string()),
            ));
        }

        Ok(envelope)
    }

    /// One page of rows for `view`. Rows are validated into typed records here.
    pub async fn fetch_page(
        &self,
        view: ViewMode,
        params: &BTreeMap<String, String>,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Record>, ApiError> {
        let mut query: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.push(("offset".to_string(), offset.to_string()));
        query.push(("limit".to_string(), limit.to_string()));

        let envelope = self
            .get_envelope::<Vec<Value>>(self.endpoint_url(view.endpoint())?, &query)
            .await?;

        let rows = envelope.data.unwrap_or_default();
        let data = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                Record::from_json(view, row)
                    .map_err(|e| ApiError::Decode(format!("row {}: {e}", offset.saturating_add(index as u64))))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let received = data.len() as u64;
        let metadata = envelope
            .metadata
            .unwrap_or_default()
            .resolve(offset, limit, received);

        tracing::debug!(
            view = view.as_str(),
            offset,
            returned = metadata.returned,
            total = metadata.total,
            "page loaded"
        );

        Ok(Page { data, metadata })
    }

    /// Every observation of one radio, oldest first.
    pub async fn network_timeline(&self, bssid: &str) -> Result<Vec<Observation>, ApiError> {
        let url = self.url(["api", "v1", "network-timeline", bssid])?;
        let envelope = self.get_envelope::<Vec<Value>>(url, &[]).await?;

        let mut observations = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(serde_json::from_value::<Observation>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        observations.sort_by_key(|obs| obs.observed_at);
        Ok(observations)
    }

    /// Backend configuration blob, used as a reachability check.
    pub async fn server_config(&self) -> Result<Value, ApiError> {
        let envelope = self
            .get_envelope::<Value>(self.endpoint_url("/api/v1/config")?, &[])
            .await?;
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}
