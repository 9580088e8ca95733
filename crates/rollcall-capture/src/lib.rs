//! Capture abstraction layer for the attendance system.
//!
//! This crate turns three very different capture transports into one
//! uniform capability the coordinators can rely on:
//!
//! - a browser **platform authenticator**, whose results are pushed in by
//!   the web layer,
//! - a **vendor USB scanner** bridged through the backend device service,
//! - a **backend-managed** device the service drives end to end.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all I/O is asynchronous using native `async fn` in
//!   traits (Edition 2024 RPITIT).
//! - **One serialization point**: [`CaptureAdapter`] is the only way to
//!   reach a device; it enforces capture exclusivity, the hard timeout, and
//!   explicit cancellation.
//! - **Quirks stay local**: the vendor quality sentinel is normalized
//!   inside the bridged modality; no caller ever sees it.
//! - **Explicit state**: connectivity is a [`CaptureDevice`] value flowing
//!   through a watch channel, refreshed by [`DeviceHealthMonitor`], not a
//!   shared mutable flag.
//!
//! # Capturing a sample
//!
//! ```no_run
//! use rollcall_capture::adapter::{CaptureAdapter, CaptureConfig};
//! use rollcall_capture::mock::MockModality;
//! use rollcall_capture::monitor::{DeviceHealthMonitor, MonitorConfig};
//!
//! # async fn example() -> rollcall_capture::Result<()> {
//! let (modality, _handle) = MockModality::new();
//! let adapter = CaptureAdapter::new(modality, CaptureConfig::default());
//! let monitor = DeviceHealthMonitor::start(&adapter, MonitorConfig::default());
//!
//! if adapter.status().connected {
//!     let sample = adapter.capture().await?;
//!     println!("quality {}", sample.quality);
//! }
//!
//! monitor.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod bridged;
pub mod devices;
pub mod envelope;
pub mod error;
pub mod managed;
pub mod mock;
pub mod monitor;
pub mod platform;
pub mod sample;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use adapter::{CaptureAdapter, CaptureConfig};
pub use devices::AnyModality;
pub use envelope::{EnvelopeMetadata, TemplateEnvelope};
pub use error::{CaptureError, Result};
pub use monitor::{DeviceHealthMonitor, MonitorConfig, MonitorHandle};
pub use sample::{EnrollmentSample, normalize_quality};
pub use traits::CaptureModality;
pub use types::CaptureDevice;
