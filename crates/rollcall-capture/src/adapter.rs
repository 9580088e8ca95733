//! Capture adapter: the single serialization point per device.
//!
//! The adapter wraps one modality and enforces the capture contract that
//! coordinators rely on:
//!
//! - **Exclusivity** - at most one outstanding capture per adapter. A
//!   second concurrent call fails fast with `AlreadyCapturing` instead of
//!   queuing, which bounds scanner contention when several UI panels could
//!   trigger capture.
//! - **Hard timeout** - a capture that exceeds its window is cancelled at
//!   the modality and reported as `Timeout`; the adapter is idle afterwards.
//! - **Explicit cancel** - `cancel()` aborts the in-flight capture; the
//!   adapter never ends up capturing forever.
//! - **Non-blocking status** - `status()` reads the descriptor last
//!   published by the health monitor; it never waits on a probe.
//!
//! Coordinators talk to devices only through this type.

use crate::error::{CaptureError, Result};
use crate::sample::EnrollmentSample;
use crate::traits::CaptureModality;
use crate::types::CaptureDevice;
use rollcall_core::constants::DEFAULT_CAPTURE_TIMEOUT_MS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Configuration for a [`CaptureAdapter`].
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Hard deadline for one capture operation.
    pub timeout: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_CAPTURE_TIMEOUT_MS),
        }
    }
}

impl CaptureConfig {
    /// Set the capture timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Uniform capture interface over one modality.
pub struct CaptureAdapter<M> {
    modality: Arc<M>,

    /// Exclusivity gate: held for the duration of one capture.
    gate: Mutex<()>,

    /// Cancellation token of the in-flight capture, if any.
    active: Mutex<Option<CancellationToken>>,

    health_tx: Arc<watch::Sender<CaptureDevice>>,
    health_rx: watch::Receiver<CaptureDevice>,

    config: CaptureConfig,
}

impl<M: CaptureModality> CaptureAdapter<M> {
    /// Create an adapter over a modality.
    ///
    /// The reported device state starts disconnected until the first probe
    /// (from the health monitor or [`refresh`](Self::refresh)) publishes a
    /// real descriptor.
    pub fn new(modality: M, config: CaptureConfig) -> Self {
        let initial = CaptureDevice::disconnected(modality.modality());
        let (health_tx, health_rx) = watch::channel(initial);

        Self {
            modality: Arc::new(modality),
            gate: Mutex::new(()),
            active: Mutex::new(None),
            health_tx: Arc::new(health_tx),
            health_rx,
            config,
        }
    }

    /// Last known device state.
    ///
    /// Returns immediately; if a fresh probe is in flight the previous
    /// descriptor is returned.
    #[must_use]
    pub fn status(&self) -> CaptureDevice {
        self.health_rx.borrow().clone()
    }

    /// Probe the modality now and publish the result.
    ///
    /// The health monitor does this periodically; coordinators can call it
    /// directly when they need a current answer before starting a flow.
    pub async fn refresh(&self) -> CaptureDevice {
        let device = self.modality.probe().await;
        let _ = self.health_tx.send(device.clone());
        device
    }

    /// Capture one sample using the configured timeout.
    ///
    /// # Errors
    /// See [`capture_with_timeout`](Self::capture_with_timeout).
    pub async fn capture(&self) -> Result<EnrollmentSample> {
        self.capture_with_timeout(self.config.timeout).await
    }

    /// Capture one sample with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another capture is outstanding on this adapter (`AlreadyCapturing`)
    /// - The deadline expires (`Timeout`; the underlying operation is
    ///   cancelled first)
    /// - `cancel()` was called (`Cancelled`)
    /// - The modality itself fails (device, backend, or sample errors)
    pub async fn capture_with_timeout(&self, timeout: Duration) -> Result<EnrollmentSample> {
        let Ok(_gate) = self.gate.try_lock() else {
            debug!("Rejecting concurrent capture attempt");
            return Err(CaptureError::AlreadyCapturing);
        };

        let token = CancellationToken::new();
        *self.active.lock().await = Some(token.clone());

        debug!("Starting capture with {}ms window", timeout.as_millis());
        let result = tokio::select! {
            result = self.modality.acquire(&token) => result,
            _ = token.cancelled() => Err(CaptureError::Cancelled),
            _ = tokio::time::sleep(timeout) => {
                warn!("Capture timed out after {}ms", timeout.as_millis());
                token.cancel();
                Err(CaptureError::timeout(timeout.as_millis() as u64))
            }
        };

        *self.active.lock().await = None;

        match &result {
            Ok(sample) => info!(
                quality = sample.quality,
                quality_unavailable = sample.quality_unavailable,
                "Capture completed"
            ),
            Err(CaptureError::Cancelled) => info!("Capture cancelled"),
            Err(e) => warn!("Capture failed: {}", e),
        }

        result
    }

    /// Cancel the in-flight capture, if any.
    ///
    /// The pending `capture` call returns `Cancelled` and the adapter is
    /// idle again. A no-op when nothing is in flight.
    pub async fn cancel(&self) {
        if let Some(token) = self.active.lock().await.as_ref() {
            info!("Cancelling in-flight capture");
            token.cancel();
        }
    }

    pub(crate) fn modality_handle(&self) -> Arc<M> {
        Arc::clone(&self.modality)
    }

    pub(crate) fn health_sender(&self) -> Arc<watch::Sender<CaptureDevice>> {
        Arc::clone(&self.health_tx)
    }
}
