//! Capture modality trait definition.
//!
//! One trait covers the three capture transports (platform authenticator,
//! vendor scanner behind the backend bridge, backend-managed device) plus
//! the mock used in tests. The adapter and both coordinators are written
//! against this trait only; modality quirks such as the vendor quality
//! sentinel never escape the implementation that owns them.
//!
//! The trait uses native `async fn` methods (Edition 2024 RPITIT). It is
//! not object-safe; use generics, or the [`AnyModality`](crate::devices)
//! enum wrapper for dynamic dispatch.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::sample::EnrollmentSample;
use crate::types::CaptureDevice;
use rollcall_core::Modality;
use tokio_util::sync::CancellationToken;

/// A source of fingerprint captures.
///
/// Implementations must be cheap to probe: `probe` is called on a fixed
/// interval by the health monitor and must not interfere with an in-flight
/// `acquire` on the same instance (the adapter serializes `acquire` calls
/// separately).
pub trait CaptureModality: Send + Sync {
    /// The capture technology this modality represents.
    fn modality(&self) -> Modality;

    /// Check connectivity and return a fresh capability descriptor.
    ///
    /// Probe failures are not errors at this level: an unreachable device
    /// yields a disconnected descriptor. Implementations log the underlying
    /// cause.
    fn probe(&self) -> impl std::future::Future<Output = CaptureDevice> + Send;

    /// Acquire exactly one sample.
    ///
    /// Resolves or fails exactly once. Implementations must observe the
    /// cancellation token and return [`CaptureError::Cancelled`] promptly
    /// when it fires, leaving no acquisition running behind the caller's
    /// back.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The device is disconnected or the backend is unreachable
    /// - The modality reports a failed capture
    /// - The returned sample has no template payload
    /// - The token was cancelled
    ///
    /// [`CaptureError::Cancelled`]: crate::error::CaptureError::Cancelled
    async fn acquire(&self, cancel: &CancellationToken) -> Result<EnrollmentSample>;
}
