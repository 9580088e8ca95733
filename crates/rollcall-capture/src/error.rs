//! Error types for capture operations.
//!
//! This module defines error types covering the failure scenarios of the
//! capture layer: disconnected or driverless devices, contention on the
//! single capture slot, timeouts, cancellation, and structurally invalid
//! samples coming back from a modality.

use rollcall_backend::BackendError;

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Errors that can occur during capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No scanner is connected for the active modality.
    #[error("Device not connected: {device}")]
    NotConnected { device: String },

    /// The vendor SDK/driver is not installed on the bridge host.
    #[error("Device driver not installed: {device}")]
    DriverMissing { device: String },

    /// A capture is already in flight on this adapter.
    ///
    /// The second caller fails fast; it is never queued behind the
    /// outstanding operation.
    #[error("A capture is already in progress")]
    AlreadyCapturing,

    /// The capture did not complete within the allowed window.
    #[error("Capture timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The capture was cancelled by an explicit `cancel()` call.
    #[error("Capture cancelled")]
    Cancelled,

    /// The modality completed the capture but reported failure.
    #[error("Capture failed: {message}")]
    CaptureFailed { message: String },

    /// The sample is structurally invalid (missing/empty template payload).
    #[error("Invalid sample: {message}")]
    InvalidSample { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The capture source channel closed (handle dropped).
    #[error("Capture source disconnected: {source_name}")]
    SourceClosed { source_name: String },

    /// Transport failure talking to the backend device service.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl CaptureError {
    /// Create a new not-connected error.
    pub fn not_connected(device: impl Into<String>) -> Self {
        Self::NotConnected {
            device: device.into(),
        }
    }

    /// Create a new driver-missing error.
    pub fn driver_missing(device: impl Into<String>) -> Self {
        Self::DriverMissing {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new capture-failed error.
    pub fn capture_failed(message: impl Into<String>) -> Self {
        Self::CaptureFailed {
            message: message.into(),
        }
    }

    /// Create a new invalid-sample error.
    pub fn invalid_sample(message: impl Into<String>) -> Self {
        Self::InvalidSample {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a new source-closed error.
    pub fn source_closed(source_name: impl Into<String>) -> Self {
        Self::SourceClosed {
            source_name: source_name.into(),
        }
    }

    /// True for device-side conditions the user can fix and retry
    /// (reconnect the scanner, try the capture again).
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(
            self,
            Self::NotConnected { .. }
                | Self::DriverMissing { .. }
                | Self::AlreadyCapturing
                | Self::Timeout { .. }
                | Self::CaptureFailed { .. }
                | Self::Backend(_)
        )
    }

    /// True for structural/data conditions that indicate a capture or
    /// backend bug; the surrounding flow must abort rather than continue
    /// with partial data.
    #[must_use]
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::InvalidSample { .. })
    }
}
