use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client, IntoUrl, StatusCode};
use serde_json::Value;
use shared::domain::{AccessToken, ApplianceId, SwitchAction};
use tracing::{debug, warn};
use url::Url;

use crate::{DownstreamError, RemoteDeviceClient, SwitchReply};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct DeviceApiConfig {
    /// Base of the REST surface, e.g. `https://host/almond/api`.
    pub base_url: String,
    /// Endpoint for name-addressed toggles. Defaults to `{base_url}/switches`.
    pub switch_url: Option<String>,
    pub request_timeout: Option<Duration>,
}

impl DeviceApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            switch_url: None,
            request_timeout: None,
        }
    }
}

#[derive(Clone)]
pub struct HttpDeviceClient {
    http: Client,
    base_url: Url,
    switch_url: Url,
}

impl HttpDeviceClient {
    pub fn new(config: DeviceApiConfig) -> Result<Self, DownstreamError> {
        let base_url = validate_url(&config.base_url)?;
        let switch_url = match config.switch_url.as_deref() {
            Some(url) => validate_url(url)?,
            None => join_segments(&base_url, &["switches"])?,
        };
        let http = Client::builder()
            .timeout(config.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
            .build()
            .map_err(DownstreamError::Client)?;
        Ok(Self {
            http,
            base_url,
            switch_url,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn switch_url(&self) -> &str {
        self.switch_url.as_str()
    }

    async fn get(
        &self,
        endpoint: &str,
        url: impl IntoUrl,
        query: &[(&str, &str)],
    ) -> Result<(StatusCode, String), DownstreamError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "*/*")
            .query(query)
            .send()
            .await
            .map_err(|source| DownstreamError::Transport {
                endpoint: endpoint.to_string(),
                source: source.without_url(),
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| DownstreamError::Transport {
                endpoint: endpoint.to_string(),
                source: source.without_url(),
            })?;
        debug!(endpoint, status = status.as_u16(), "device api: response received");
        Ok((status, body))
    }
}

#[async_trait]
impl RemoteDeviceClient for HttpDeviceClient {
    async fn list_appliances(&self, token: &AccessToken) -> Result<Vec<Value>, DownstreamError> {
        let endpoint = "/switches";
        let url = join_segments(&self.base_url, &["switches"])?;
        let (status, body) = self
            .get(endpoint, url, &[("access_token", token.as_str())])
            .await?;
        if !status.is_success() {
            return Err(DownstreamError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str::<Vec<Value>>(&body).map_err(|e| DownstreamError::MalformedBody {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn set_switch(
        &self,
        token: &AccessToken,
        appliance_id: &ApplianceId,
        action: SwitchAction,
    ) -> Result<SwitchReply, DownstreamError> {
        let endpoint = format!(
            "/switches/{}/{}",
            appliance_id.as_str(),
            action.path_segment()
        );
        // The id is opaque; it must land in one percent-encoded path segment.
        let url = join_segments(
            &self.base_url,
            &["switches", appliance_id.as_str(), action.path_segment()],
        )?;
        let (status, body) = self
            .get(&endpoint, url, &[("access_token", token.as_str())])
            .await?;
        if !status.is_success() {
            warn!(%endpoint, status = status.as_u16(), "device api: switch call rejected");
            return Err(DownstreamError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        Ok(SwitchReply {
            status: status.as_u16(),
            body,
        })
    }

    async fn toggle_by_name(
        &self,
        token: &str,
        device_name: &str,
        action: &str,
    ) -> Result<Value, DownstreamError> {
        let endpoint = "/switches";
        let (status, body) = self
            .get(
                endpoint,
                self.switch_url.clone(),
                &[
                    ("auth_token", token),
                    ("device_name", device_name),
                    ("action", action),
                ],
            )
            .await?;
        if status != StatusCode::OK {
            return Err(DownstreamError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        let value: Value =
            serde_json::from_str(&body).map_err(|e| DownstreamError::MalformedBody {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        if value.get("success").and_then(Value::as_bool) == Some(true) {
            Ok(value)
        } else {
            Err(DownstreamError::Rejected {
                endpoint: endpoint.to_string(),
                body: value,
            })
        }
    }
}

fn validate_url(raw: &str) -> Result<Url, DownstreamError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|source| DownstreamError::InvalidBaseUrl {
        url: trimmed.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(DownstreamError::NotABaseUrl {
            url: trimmed.to_string(),
        });
    }
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, DownstreamError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| DownstreamError::NotABaseUrl {
            url: base.to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
