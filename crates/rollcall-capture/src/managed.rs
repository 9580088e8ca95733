//! Backend-managed capture device.
//!
//! The device service owns the device end to end here: there is no local
//! driver concept, so only connectivity matters for availability, and the
//! service is expected to report sane quality values. A missing quality
//! still falls back (some managed devices simply do not estimate quality),
//! but an out-of-range value is treated as a backend bug rather than a
//! vendor quirk.

use crate::error::{CaptureError, Result};
use crate::sample::EnrollmentSample;
use crate::traits::CaptureModality;
use crate::types::CaptureDevice;
use rollcall_backend::DeviceServiceClient;
use rollcall_core::Modality;
use rollcall_core::constants::{MAX_QUALITY_SCORE, QUALITY_FALLBACK};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Capture modality for a device fully driven by the backend.
#[derive(Debug, Clone)]
pub struct BackendManagedModality {
    client: DeviceServiceClient,
}

impl BackendManagedModality {
    /// Create a modality over an existing device service client.
    pub fn new(client: DeviceServiceClient) -> Self {
        Self { client }
    }
}

impl CaptureModality for BackendManagedModality {
    fn modality(&self) -> Modality {
        Modality::BackendManaged
    }

    async fn probe(&self) -> CaptureDevice {
        match self.client.status().await {
            Ok(status) if status.is_connected => {
                let (vendor, model) = status
                    .device_info
                    .map(|info| (info.vendor, info.model))
                    .unwrap_or_default();
                CaptureDevice::connected(Modality::BackendManaged, vendor, model)
            }
            Ok(_) => CaptureDevice::disconnected(Modality::BackendManaged),
            Err(e) => {
                warn!("Managed device probe failed: {}", e);
                CaptureDevice::disconnected(Modality::BackendManaged)
            }
        }
    }

    async fn acquire(&self, cancel: &CancellationToken) -> Result<EnrollmentSample> {
        let response = tokio::select! {
            response = self.client.capture() => response?,
            _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "capture rejected by device service".to_string());
            return Err(CaptureError::capture_failed(message));
        }

        let template = response
            .template_data
            .ok_or_else(|| CaptureError::invalid_sample("missing template payload"))?;

        let (quality, quality_unavailable) = match response.quality_score {
            None => (QUALITY_FALLBACK, true),
            Some(value)
                if value.is_finite() && (0.0..=f64::from(MAX_QUALITY_SCORE)).contains(&value) =>
            {
                (value.round() as u8, false)
            }
            Some(value) => {
                return Err(CaptureError::invalid_sample(format!(
                    "managed device reported quality {value}"
                )));
            }
        };

        EnrollmentSample::new(template, quality, quality_unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_backend::DeviceServiceConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn modality_for(server: &MockServer) -> BackendManagedModality {
        let client = DeviceServiceClient::new(DeviceServiceConfig::new(server.uri())).unwrap();
        BackendManagedModality::new(client)
    }

    #[tokio::test]
    async fn test_probe_ignores_installed_flag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/device/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "installed": false,
                "isConnected": true
            })))
            .mount(&server)
            .await;

        let device = modality_for(&server).await.probe().await;
        assert!(device.connected);
        assert_eq!(device.modality, Modality::BackendManaged);
    }

    #[tokio::test]
    async fn test_acquire_missing_quality_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/capture"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "templateData": "dGVtcGxhdGU="
            })))
            .mount(&server)
            .await;

        let sample = modality_for(&server)
            .await
            .acquire(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(sample.quality, QUALITY_FALLBACK);
        assert!(sample.quality_unavailable);
    }

    #[tokio::test]
    async fn test_acquire_out_of_range_quality_is_invalid_sample() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/capture"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "templateData": "dGVtcGxhdGU=",
                "qualityScore": 240
            })))
            .mount(&server)
            .await;

        let error = modality_for(&server)
            .await
            .acquire(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(error.is_data_error());
    }
}
