//! Enum wrapper for capture modality dispatch.
//!
//! Native `async fn` in traits (RPITIT) is not object-safe, so
//! `Box<dyn CaptureModality>` is unavailable. This enum provides concrete
//! type dispatch at compile time instead: one variant per modality, each
//! delegating through the trait.

use crate::bridged::VendorBridgedModality;
use crate::error::Result;
use crate::managed::BackendManagedModality;
use crate::mock::MockModality;
use crate::platform::PlatformAuthenticatorModality;
use crate::sample::EnrollmentSample;
use crate::traits::CaptureModality;
use crate::types::CaptureDevice;
use rollcall_core::Modality;
use tokio_util::sync::CancellationToken;

/// Enum wrapper for capture modality dispatch.
///
/// # Examples
///
/// ```
/// use rollcall_capture::devices::AnyModality;
/// use rollcall_capture::mock::MockModality;
/// use rollcall_capture::traits::CaptureModality;
///
/// #[tokio::main]
/// async fn main() {
///     let (mock, _handle) = MockModality::new();
///     let modality = AnyModality::Mock(mock);
///
///     let device = modality.probe().await;
///     assert!(device.connected);
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyModality {
    /// Browser platform authenticator, fed by the web layer.
    Platform(PlatformAuthenticatorModality),

    /// Vendor USB scanner behind the backend bridge.
    VendorBridged(VendorBridgedModality),

    /// Device fully managed by the backend.
    BackendManaged(BackendManagedModality),

    /// Mock source for development and testing.
    Mock(MockModality),
}

impl CaptureModality for AnyModality {
    fn modality(&self) -> Modality {
        match self {
            Self::Platform(m) => m.modality(),
            Self::VendorBridged(m) => m.modality(),
            Self::BackendManaged(m) => m.modality(),
            Self::Mock(m) => m.modality(),
        }
    }

    async fn probe(&self) -> CaptureDevice {
        match self {
            Self::Platform(m) => m.probe().await,
            Self::VendorBridged(m) => m.probe().await,
            Self::BackendManaged(m) => m.probe().await,
            Self::Mock(m) => m.probe().await,
        }
    }

    async fn acquire(&self, cancel: &CancellationToken) -> Result<EnrollmentSample> {
        match self {
            Self::Platform(m) => m.acquire(cancel).await,
            Self::VendorBridged(m) => m.acquire(cancel).await,
            Self::BackendManaged(m) => m.acquire(cancel).await,
            Self::Mock(m) => m.acquire(cancel).await,
        }
    }
}
