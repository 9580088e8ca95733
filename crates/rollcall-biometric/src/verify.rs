//! Verification coordinator.
//!
//! Turns one live capture into an accept/reject decision. There is exactly
//! one capture per call and no internal retry; "try again" is an explicit
//! user action at the UI layer, bounded by the retry budget in
//! `rollcall_core::constants`.

use crate::store::{StoreError, TemplateStore};
use rollcall_capture::adapter::CaptureAdapter;
use rollcall_capture::envelope::TemplateEnvelope;
use rollcall_capture::error::CaptureError;
use rollcall_capture::traits::CaptureModality;
use rollcall_core::constants::DEFAULT_MATCH_THRESHOLD;
use rollcall_core::{Confidence, StudentId};
use tracing::{info, warn};

/// Configuration for verification decisions.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// Confidence threshold for a match; inclusive on the accept side.
    pub match_threshold: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl VerifyConfig {
    /// Set the match threshold.
    #[must_use]
    pub fn match_threshold(mut self, match_threshold: f64) -> Self {
        self.match_threshold = match_threshold;
        self
    }
}

/// Result of a completed verification attempt.
///
/// A confidence below the threshold is not an error: the outcome carries
/// `matched: false` together with the raw confidence so the UI can show
/// partial-match information on rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationOutcome {
    pub matched: bool,
    pub confidence: Confidence,
}

/// Errors ending a verification attempt before a decision was reached.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// The student has no stored template; route to manual marking.
    #[error("Student {student} is not enrolled")]
    NotEnrolled { student: StudentId },

    /// The single capture failed.
    #[error("Verification capture failed: {0}")]
    Capture(#[source] CaptureError),

    /// The attempt was cancelled through the adapter.
    #[error("Verification cancelled")]
    Cancelled,

    /// The Template Store or its comparator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives one capture into a match decision.
#[derive(Debug, Clone, Default)]
pub struct VerificationCoordinator {
    config: VerifyConfig,
}

impl VerificationCoordinator {
    /// Create a coordinator with the given configuration.
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    /// Verify a student's live capture against their stored template.
    ///
    /// Performs exactly one capture, submits it to the comparator, and
    /// applies the configured threshold to the returned confidence. Both
    /// the decision and the raw confidence are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the student is not enrolled, the capture fails
    /// or is cancelled, or the store/comparator fails. A sub-threshold
    /// confidence is **not** an error.
    pub async fn verify<M, S>(
        &self,
        adapter: &CaptureAdapter<M>,
        store: &S,
        student: &StudentId,
    ) -> Result<VerificationOutcome, VerificationError>
    where
        M: CaptureModality,
        S: TemplateStore,
    {
        let enrollment = store.enrollment(student).await?;
        if !enrollment.enrolled {
            warn!("Verification refused: {} is not enrolled", student);
            return Err(VerificationError::NotEnrolled {
                student: student.clone(),
            });
        }

        let sample = match adapter.capture().await {
            Ok(sample) => sample,
            Err(CaptureError::Cancelled) => {
                info!("Verification of {} cancelled", student);
                return Err(VerificationError::Cancelled);
            }
            Err(e) => {
                warn!("Verification capture for {} failed: {}", student, e);
                return Err(VerificationError::Capture(e));
            }
        };

        // Same envelope shape as enrollment, so the store parses one format
        let live = TemplateEnvelope::from_sample(&sample);
        let score = store.compare(student, &live).await?;

        let confidence =
            Confidence::new(score.confidence).map_err(|_| StoreError::InvalidConfidence(score.confidence))?;
        let matched = confidence.meets(self.config.match_threshold);

        info!(
            "Verification of {}: confidence {:.1}, threshold {:.1} => {}",
            student,
            confidence.value(),
            self.config.match_threshold,
            if matched { "match" } else { "no match" }
        );

        Ok(VerificationOutcome {
            matched,
            confidence,
        })
    }
}
