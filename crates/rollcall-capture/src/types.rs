//! Capability descriptors shared across capture modality implementations.

use rollcall_core::{Capability, Modality};
use serde::{Deserialize, Serialize};

/// Capability descriptor for a capture device.
///
/// A point-in-time view of one modality's device: what it is, whether it is
/// reachable, and which operations it supports. Refreshed by the health
/// monitor on a fixed interval and read through `CaptureAdapter::status()`;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDevice {
    /// The capture technology behind this device.
    pub modality: Modality,

    /// Whether the device is currently reachable.
    pub connected: bool,

    /// Vendor name (informational only).
    pub vendor: String,

    /// Model identifier (informational only).
    pub model: String,

    /// Operations the device supports.
    pub capabilities: Vec<Capability>,
}

impl CaptureDevice {
    /// Create a connected device descriptor with the given identity.
    pub fn connected(
        modality: Modality,
        vendor: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            modality,
            connected: true,
            vendor: vendor.into(),
            model: model.into(),
            capabilities: vec![Capability::Capture, Capability::Enroll, Capability::Verify],
        }
    }

    /// Create a disconnected descriptor for a modality.
    ///
    /// Used as the initial adapter state before the first probe completes
    /// and whenever a probe finds the device gone.
    pub fn disconnected(modality: Modality) -> Self {
        Self {
            modality,
            connected: false,
            vendor: String::new(),
            model: String::new(),
            capabilities: Vec::new(),
        }
    }

    /// Restrict the capability set.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<Capability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Whether the device reports support for an operation.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Connected and able to perform the given operation.
    #[must_use]
    pub fn available_for(&self, capability: Capability) -> bool {
        self.connected && self.supports(capability)
    }
}
