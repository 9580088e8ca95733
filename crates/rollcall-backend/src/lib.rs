//! HTTP clients for the services the attendance core consumes.
//!
//! Two external collaborators sit behind plain HTTP:
//!
//! ```text
//! CaptureAdapter (vendor_bridged / backend_managed)
//!     │
//!     └─> DeviceServiceClient ───(HTTP)───> Capture Backend ──> USB scanner
//!
//! Enrollment / Verification coordinators
//!     │
//!     └─> TemplateStoreClient ───(HTTP)───> Template Store (encrypted templates,
//!                                           comparator)
//! ```
//!
//! # Design Principles
//!
//! Both clients are thin transport layers:
//! - **No automatic retry**: retry is an explicit caller decision
//! - **No connection pooling tuning**: reqwest defaults, one client per service
//! - **Simple error handling**: clear errors, no recovery
//!
//! This keeps the clients focused and testable, pushing business logic to the
//! coordinators above them.

pub mod device;
pub mod error;
pub mod templates;

pub use device::{CaptureResponse, DeviceServiceClient, DeviceServiceConfig, DeviceStatusResponse};
pub use error::{BackendError, BackendResult};
pub use templates::{
    EnrollRequest, EnrollmentStatusResponse, TemplateStoreClient, TemplateStoreConfig,
    VerifyRequest, VerifyResponse,
};
