//! Template Store contract and its HTTP implementation.
//!
//! The Template Store is the external owner of enrolled templates and of
//! the comparator. The coordinators depend on this trait only; the HTTP
//! client from `rollcall-backend` is wired in below, and
//! [`MemoryTemplateStore`](crate::memory) provides an in-process
//! implementation for development and tests.

#![allow(async_fn_in_trait)]

use crate::template::BiometricTemplate;
use chrono::{DateTime, Utc};
use rollcall_backend::{
    BackendError, EnrollRequest, TemplateStoreClient, VerifyRequest,
};
use rollcall_capture::CaptureError;
use rollcall_capture::envelope::TemplateEnvelope;
use rollcall_core::StudentId;
use tracing::debug;

/// Result type alias for template store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors from the Template Store boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport or service failure.
    #[error("Template store error: {0}")]
    Backend(#[from] BackendError),

    /// The payload could not be serialized/parsed as an envelope.
    #[error("Template payload error: {0}")]
    Payload(#[from] CaptureError),

    /// The comparator answered with an out-of-range confidence.
    #[error("Comparator returned invalid confidence: {0}")]
    InvalidConfidence(f64),
}

/// Enrollment lookup result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
    pub enrolled_at: Option<DateTime<Utc>>,
}

impl EnrollmentStatus {
    /// A student with no stored template.
    #[must_use]
    pub fn not_enrolled() -> Self {
        Self {
            enrolled: false,
            enrolled_at: None,
        }
    }
}

/// Raw comparator answer.
///
/// The store reports its own match opinion alongside the confidence; the
/// verification coordinator applies the configured threshold to the
/// confidence and treats the store's boolean as advisory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparatorScore {
    pub matched: bool,
    pub confidence: f64,
}

/// Persistence and comparison of enrolled templates.
pub trait TemplateStore: Send + Sync {
    /// Look up whether a student has a stored template.
    async fn enrollment(&self, student: &StudentId) -> StoreResult<EnrollmentStatus>;

    /// Commit a template, replacing any prior one for the student.
    async fn store_template(&self, template: &BiometricTemplate) -> StoreResult<()>;

    /// Score a live capture against the student's stored template.
    async fn compare(
        &self,
        student: &StudentId,
        live: &TemplateEnvelope,
    ) -> StoreResult<ComparatorScore>;

    /// Remove a student's enrollment.
    async fn remove(&self, student: &StudentId) -> StoreResult<()>;
}

impl TemplateStore for TemplateStoreClient {
    async fn enrollment(&self, student: &StudentId) -> StoreResult<EnrollmentStatus> {
        let response = self.enrollment_status(student).await?;
        Ok(EnrollmentStatus {
            enrolled: response.enrolled,
            enrolled_at: response.enrolled_at,
        })
    }

    async fn store_template(&self, template: &BiometricTemplate) -> StoreResult<()> {
        let request = EnrollRequest {
            student_id: template.student.as_str().to_string(),
            biometric_data: template.envelope.to_json()?,
            quality_score: template.quality,
            device_info: template.modality.as_str().to_string(),
        };

        self.enroll(&request).await?;
        debug!(
            "Template stored for {} (quality {})",
            template.student, template.quality
        );
        Ok(())
    }

    async fn compare(
        &self,
        student: &StudentId,
        live: &TemplateEnvelope,
    ) -> StoreResult<ComparatorScore> {
        let request = VerifyRequest {
            student_id: student.as_str().to_string(),
            biometric_data: live.to_json()?,
        };

        let response = self.verify(&request).await?;

        if !response.confidence.is_finite() || !(0.0..=100.0).contains(&response.confidence) {
            return Err(StoreError::InvalidConfidence(response.confidence));
        }

        Ok(ComparatorScore {
            matched: response.matched,
            confidence: response.confidence,
        })
    }

    async fn remove(&self, student: &StudentId) -> StoreResult<()> {
        self.delete(student).await?;
        Ok(())
    }
}
