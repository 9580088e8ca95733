//! Capture sample type and quality normalization.

use crate::error::{CaptureError, Result};
use rollcall_core::constants::{MAX_QUALITY_SCORE, QUALITY_FALLBACK};

/// One raw capture result.
///
/// Ephemeral: held in a coordinator's working set during a single enrollment
/// or verification run and discarded afterwards. The template value is
/// opaque vendor/platform output, never raw imagery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSample {
    /// Opaque template payload.
    pub template: String,

    /// Quality score (0-100) after normalization.
    pub quality: u8,

    /// Set when the modality could not produce a usable quality estimate
    /// and the fallback value was substituted.
    pub quality_unavailable: bool,

    /// When the capture was acquired.
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl EnrollmentSample {
    /// Create a sample with the current timestamp.
    ///
    /// # Errors
    /// Returns `CaptureError::InvalidSample` if the template is empty or
    /// the quality exceeds 100.
    pub fn new(template: impl Into<String>, quality: u8, quality_unavailable: bool) -> Result<Self> {
        let template = template.into();

        if template.trim().is_empty() {
            return Err(CaptureError::invalid_sample("missing template payload"));
        }

        if quality > MAX_QUALITY_SCORE {
            return Err(CaptureError::invalid_sample(format!(
                "quality must be 0-{MAX_QUALITY_SCORE}, got {quality}"
            )));
        }

        Ok(Self {
            template,
            quality,
            quality_unavailable,
            captured_at: chrono::Utc::now(),
        })
    }
}

/// Normalize a raw vendor quality value.
///
/// The vendor SDK reports -1 (and some firmware revisions other junk) when
/// its quality estimator did not run. Anything outside 0-100, or an absent
/// value, becomes the fixed fallback with the `quality_unavailable` flag
/// set; callers never see the raw sentinel.
#[must_use]
pub fn normalize_quality(raw: Option<f64>) -> (u8, bool) {
    match raw {
        Some(value) if value.is_finite() && (0.0..=f64::from(MAX_QUALITY_SCORE)).contains(&value) => {
            (value.round() as u8, false)
        }
        _ => (QUALITY_FALLBACK, true),
    }
}
