//! Mock capture modality for testing and development.
//!
//! Simulates a capture source that can be driven programmatically: tests
//! queue samples or failures on the handle, and `acquire` consumes them in
//! order. With nothing queued, `acquire` blocks until something is pushed,
//! which makes timeout and cancellation paths easy to exercise.

use crate::error::{CaptureError, Result};
use crate::sample::EnrollmentSample;
use crate::traits::CaptureModality;
use crate::types::CaptureDevice;
use rollcall_core::Modality;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

const SOURCE_NAME: &str = "mock scanner";

#[derive(Debug, Clone)]
enum MockEvent {
    Sample {
        template: String,
        quality: u8,
        quality_unavailable: bool,
    },
    Failure(String),
}

/// Mock capture modality.
///
/// # Examples
///
/// ```
/// use rollcall_capture::mock::MockModality;
/// use rollcall_capture::traits::CaptureModality;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() -> rollcall_capture::Result<()> {
///     let (modality, handle) = MockModality::new();
///
///     handle.queue_sample("dGVtcGxhdGU=", 75).await?;
///
///     let sample = modality.acquire(&CancellationToken::new()).await?;
///     assert_eq!(sample.quality, 75);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockModality {
    event_rx: Mutex<mpsc::Receiver<MockEvent>>,
    connected: Arc<AtomicBool>,
    reported_modality: Modality,
}

impl MockModality {
    /// Create a mock modality reporting as [`Modality::VendorBridged`],
    /// starting connected.
    pub fn new() -> (Self, MockModalityHandle) {
        Self::with_modality(Modality::VendorBridged)
    }

    /// Create a mock modality reporting a specific modality tag.
    pub fn with_modality(reported_modality: Modality) -> (Self, MockModalityHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let connected = Arc::new(AtomicBool::new(true));

        let modality = Self {
            event_rx: Mutex::new(event_rx),
            connected: Arc::clone(&connected),
            reported_modality,
        };

        let handle = MockModalityHandle {
            event_tx,
            connected,
        };

        (modality, handle)
    }
}

impl CaptureModality for MockModality {
    fn modality(&self) -> Modality {
        self.reported_modality
    }

    async fn probe(&self) -> CaptureDevice {
        if self.connected.load(Ordering::Acquire) {
            CaptureDevice::connected(self.reported_modality, "Mock", "Mock Scanner v1.0")
        } else {
            CaptureDevice::disconnected(self.reported_modality)
        }
    }

    async fn acquire(&self, cancel: &CancellationToken) -> Result<EnrollmentSample> {
        let mut rx = self.event_rx.lock().await;

        let event = tokio::select! {
            event = rx.recv() => event.ok_or_else(|| CaptureError::source_closed(SOURCE_NAME))?,
            _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
        };

        match event {
            MockEvent::Sample {
                template,
                quality,
                quality_unavailable,
            } => EnrollmentSample::new(template, quality, quality_unavailable),
            MockEvent::Failure(message) => Err(CaptureError::capture_failed(message)),
        }
    }
}

/// Handle for controlling a [`MockModality`].
#[derive(Debug, Clone)]
pub struct MockModalityHandle {
    event_tx: mpsc::Sender<MockEvent>,
    connected: Arc<AtomicBool>,
}

impl MockModalityHandle {
    /// Queue a sample for the next `acquire` call.
    ///
    /// # Errors
    /// Returns `CaptureError::SourceClosed` if the modality was dropped.
    pub async fn queue_sample(&self, template: impl Into<String>, quality: u8) -> Result<()> {
        self.event_tx
            .send(MockEvent::Sample {
                template: template.into(),
                quality,
                quality_unavailable: false,
            })
            .await
            .map_err(|_| CaptureError::source_closed(SOURCE_NAME))
    }

    /// Queue a sample flagged as having substituted quality.
    ///
    /// # Errors
    /// Returns `CaptureError::SourceClosed` if the modality was dropped.
    pub async fn queue_fallback_sample(&self, template: impl Into<String>, quality: u8) -> Result<()> {
        self.event_tx
            .send(MockEvent::Sample {
                template: template.into(),
                quality,
                quality_unavailable: true,
            })
            .await
            .map_err(|_| CaptureError::source_closed(SOURCE_NAME))
    }

    /// Queue a capture failure.
    ///
    /// # Errors
    /// Returns `CaptureError::SourceClosed` if the modality was dropped.
    pub async fn queue_failure(&self, message: impl Into<String>) -> Result<()> {
        self.event_tx
            .send(MockEvent::Failure(message.into()))
            .await
            .map_err(|_| CaptureError::source_closed(SOURCE_NAME))
    }

    /// Flip the connectivity reported by `probe`.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_capture() {
        let (modality, handle) = MockModality::new();

        handle.queue_sample("dGVtcGxhdGU=", 75).await.unwrap();

        let sample = modality.acquire(&CancellationToken::new()).await.unwrap();
        assert_eq!(sample.template, "dGVtcGxhdGU=");
        assert_eq!(sample.quality, 75);
    }

    #[tokio::test]
    async fn test_mock_samples_consumed_in_order() {
        let (modality, handle) = MockModality::new();

        handle.queue_sample("first", 70).await.unwrap();
        handle.queue_sample("second", 95).await.unwrap();

        let token = CancellationToken::new();
        assert_eq!(modality.acquire(&token).await.unwrap().template, "first");
        assert_eq!(modality.acquire(&token).await.unwrap().template, "second");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let (modality, handle) = MockModality::new();

        handle.queue_failure("finger removed").await.unwrap();

        let error = modality.acquire(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(error, CaptureError::CaptureFailed { .. }));
    }

    #[tokio::test]
    async fn test_mock_connectivity_toggle() {
        let (modality, handle) = MockModality::new();

        assert!(modality.probe().await.connected);

        handle.set_connected(false);
        assert!(!modality.probe().await.connected);
    }

    #[tokio::test]
    async fn test_mock_empty_template_is_invalid_sample() {
        let (modality, handle) = MockModality::new();

        handle.queue_sample("", 75).await.unwrap();

        let error = modality.acquire(&CancellationToken::new()).await.unwrap_err();
        assert!(error.is_data_error());
    }
}
