//! Vendor scanner bridged through the backend device service.
//!
//! This is the authoritative modality of the system: a physical USB scanner
//! driven by the vendor SDK on a bridge host, reached over HTTP. It is also
//! the only modality with the -1 quality sentinel quirk, so normalization
//! lives here and nowhere else.

use crate::error::{CaptureError, Result};
use crate::sample::{EnrollmentSample, normalize_quality};
use crate::traits::CaptureModality;
use crate::types::CaptureDevice;
use rollcall_backend::DeviceServiceClient;
use rollcall_core::Modality;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Capture modality backed by a vendor USB scanner behind the bridge.
#[derive(Debug, Clone)]
pub struct VendorBridgedModality {
    client: DeviceServiceClient,
}

impl VendorBridgedModality {
    /// Create a modality over an existing device service client.
    pub fn new(client: DeviceServiceClient) -> Self {
        Self { client }
    }
}

impl CaptureModality for VendorBridgedModality {
    fn modality(&self) -> Modality {
        Modality::VendorBridged
    }

    async fn probe(&self) -> CaptureDevice {
        match self.client.status().await {
            Ok(status) if status.installed && status.is_connected => {
                let (vendor, model) = status
                    .device_info
                    .map(|info| (info.vendor, info.model))
                    .unwrap_or_default();
                CaptureDevice::connected(Modality::VendorBridged, vendor, model)
            }
            Ok(status) => {
                debug!(
                    installed = status.installed,
                    connected = status.is_connected,
                    "Bridged scanner unavailable"
                );
                CaptureDevice::disconnected(Modality::VendorBridged)
            }
            Err(e) => {
                warn!("Device service probe failed: {}", e);
                CaptureDevice::disconnected(Modality::VendorBridged)
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

        let (quality, quality_unavailable) = normalize_quality(response.quality_score);
        if quality_unavailable {
            debug!("Vendor quality unavailable, substituted fallback");
        }

        EnrollmentSample::new(template, quality, quality_unavailable)
    }
}
