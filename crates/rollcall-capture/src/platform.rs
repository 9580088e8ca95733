//! Platform authenticator capture source.
//!
//! Platform captures are completed by the user's browser authenticator and
//! pushed into the backend by the web layer (out of scope here). The vendor
//! event callbacks of that world are re-architected as an event-to-future
//! bridge: the web layer holds a [`PlatformCaptureHandle`] and pushes
//! completed results; `acquire` is a single future that resolves or fails
//! exactly once with the next pushed result.

use crate::error::{CaptureError, Result};
use crate::sample::EnrollmentSample;
use crate::traits::CaptureModality;
use crate::types::CaptureDevice;
use rollcall_core::Modality;
use rollcall_core::constants::QUALITY_FALLBACK;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

const SOURCE_NAME: &str = "platform authenticator";

/// Event pushed by the web layer when an authenticator interaction ends.
#[derive(Debug, Clone)]
enum PlatformEvent {
    Completed {
        template: String,
        quality: Option<u8>,
    },
    Failed {
        message: String,
    },
}

/// Capture modality fed by platform authenticator results.
#[derive(Debug)]
pub struct PlatformAuthenticatorModality {
    event_rx: Mutex<mpsc::Receiver<PlatformEvent>>,
    available: Arc<AtomicBool>,
}

impl PlatformAuthenticatorModality {
    /// Create a new platform modality.
    ///
    /// Returns the modality plus the handle the web layer uses to announce
    /// availability and push completed captures.
    pub fn new() -> (Self, PlatformCaptureHandle) {
        let (event_tx, event_rx) = mpsc::channel(8);
        let available = Arc::new(AtomicBool::new(false));

        let modality = Self {
            event_rx: Mutex::new(event_rx),
            available: Arc::clone(&available),
        };

        let handle = PlatformCaptureHandle {
            event_tx,
            available,
        };

        (modality, handle)
    }
}

impl CaptureModality for PlatformAuthenticatorModality {
    fn modality(&self) -> Modality {
        Modality::PlatformAuthenticator
    }

    async fn probe(&self) -> CaptureDevice {
        if self.available.load(Ordering::Acquire) {
            CaptureDevice::connected(
                Modality::PlatformAuthenticator,
                "platform",
                "Platform Authenticator",
            )
        } else {
            CaptureDevice::disconnected(Modality::PlatformAuthenticator)
        }
    }

    async fn acquire(&self, cancel: &CancellationToken) -> Result<EnrollmentSample> {
        let mut rx = self.event_rx.lock().await;

        let event = tokio::select! {
            event = rx.recv() => event.ok_or_else(|| CaptureError::source_closed(SOURCE_NAME))?,
            _ = cancel.cancelled() => return Err(CaptureError::Cancelled),
        };

        match event {
            PlatformEvent::Completed { template, quality } => {
                // Authenticators rarely report capture clarity; absent
                // values take the fallback like every other modality.
                let (quality, quality_unavailable) = match quality {
                    Some(q) => (q, false),
                    None => (QUALITY_FALLBACK, true),
                };
                EnrollmentSample::new(template, quality, quality_unavailable)
            }
            PlatformEvent::Failed { message } => Err(CaptureError::capture_failed(message)),
        }
    }
}

/// Handle for feeding platform authenticator results into the modality.
#[derive(Debug, Clone)]
pub struct PlatformCaptureHandle {
    event_tx: mpsc::Sender<PlatformEvent>,
    available: Arc<AtomicBool>,
}

impl PlatformCaptureHandle {
    /// Announce whether an authenticator is currently available.
    ///
    /// The web layer calls this when the client reports platform support,
    /// replacing the ambient "is connected" flag with explicit state.
    pub fn announce(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    /// Push a completed capture.
    ///
    /// # Errors
    /// Returns `CaptureError::SourceClosed` if the modality was dropped.
    pub async fn complete_capture(
        &self,
        template: impl Into<String>,
        quality: Option<u8>,
    ) -> Result<()> {
        self.event_tx
            .send(PlatformEvent::Completed {
                template: template.into(),
                quality,
            })
            .await
            .map_err(|_| CaptureError::source_closed(SOURCE_NAME))
    }

    /// Push a failed authenticator interaction.
    ///
    /// # Errors
    /// Returns `CaptureError::SourceClosed` if the modality was dropped.
    pub async fn fail_capture(&self, message: impl Into<String>) -> Result<()> {
        self.event_tx
            .send(PlatformEvent::Failed {
                message: message.into(),
            })
            .await
            .map_err(|_| CaptureError::source_closed(SOURCE_NAME))
    }
}
