//! Client for the Capture Backend device service.
//!
//! The device service proxies a physical USB scanner (or a fully
//! backend-managed device) behind two endpoints:
//!
//! - `GET {base}/device/status` - driver installation and connectivity
//! - `POST {base}/capture` - perform one physical capture (empty body; the
//!   server applies its own acquisition timeout)
//!
//! The capture call can legitimately take many seconds while the user places
//! a finger, so the client timeout sits just above the adapter's capture
//! window; the adapter's own deadline is the one that fires in practice.

use crate::error::{BackendError, BackendResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout for the status endpoint and other control calls.
const DEFAULT_CONTROL_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout for the capture endpoint.
///
/// Slightly above the adapter's 30s capture window so the adapter cancels
/// first and the HTTP layer never races it.
const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(35);

/// Configuration for [`DeviceServiceClient`].
#[derive(Debug, Clone)]
pub struct DeviceServiceConfig {
    /// Base URL of the device service, e.g. `http://127.0.0.1:8900`.
    pub base_url: String,

    /// Timeout for status/control requests.
    pub control_timeout: Duration,

    /// Timeout for the capture request.
    pub capture_timeout: Duration,
}

impl DeviceServiceConfig {
    /// Create a configuration with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            control_timeout: DEFAULT_CONTROL_TIMEOUT,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    /// Set the control request timeout.
    #[must_use]
    pub fn control_timeout(mut self, timeout: Duration) -> Self {
        self.control_timeout = timeout;
        self
    }

    /// Set the capture request timeout.
    #[must_use]
    pub fn capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }
}

/// Response of `GET device/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusResponse {
    /// Whether the vendor SDK/driver is installed on the bridge host.
    pub installed: bool,

    /// Whether a scanner is currently connected.
    pub is_connected: bool,

    /// Optional vendor/model description of the connected device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfoPayload>,
}

/// Vendor/model strings reported by the device service. Informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoPayload {
    pub vendor: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
}

/// Response of `POST capture`.
///
/// `quality_score` is passed through untouched here, including the vendor's
/// -1 sentinel; normalization belongs to the capture layer so every consumer
/// of this client sees the same raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    /// Whether the physical capture succeeded.
    pub success: bool,

    /// Opaque template produced by the vendor SDK.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_data: Option<String>,

    /// Vendor quality estimate; may be absent or a sentinel value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,

    /// Human-readable failure description from the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// HTTP client for the Capture Backend device service.
#[derive(Debug, Clone)]
pub struct DeviceServiceClient {
    client: reqwest::Client,
    config: DeviceServiceConfig,
}

impl DeviceServiceClient {
    /// Create a new device service client.
    ///
    /// # Errors
    /// Returns `BackendError::InvalidBaseUrl` if the base URL is empty and
    /// `BackendError::Http` if the underlying client cannot be built.
    pub fn new(config: DeviceServiceConfig) -> BackendResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(BackendError::InvalidBaseUrl(
                "device service base URL is empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.capture_timeout)
            .build()?;

        debug!("Created device service client for {}", config.base_url);

        Ok(Self { client, config })
    }

    /// Query driver installation and scanner connectivity.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn status(&self) -> BackendResult<DeviceStatusResponse> {
        let url = format!("{}/device/status", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(self.config.control_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Device status request failed: {} {}", status, body);
            return Err(BackendError::status(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }

    /// Ask the service to perform one physical capture.
    ///
    /// The request has no body; the server blocks until a finger is placed
    /// or its own acquisition timeout expires. A `success: false` payload is
    /// returned as-is so the capture layer can classify the failure.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-success status.
    pub async fn capture(&self) -> BackendResult<CaptureResponse> {
        let url = format!("{}/capture", self.config.base_url);

        debug!("Requesting capture from device service");
        let response = self
            .client
            .post(&url)
            .timeout(self.config.capture_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Capture request failed: {} {}", status, body);
            return Err(BackendError::status(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}
