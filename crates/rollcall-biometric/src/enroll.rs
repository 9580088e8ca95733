//! Enrollment coordinator.
//!
//! Drives repeated captures into one committed template. The run is all or
//! nothing: any capture failure aborts it, and nothing reaches the Template
//! Store until every sample has been collected and the best one chosen.

use crate::store::{StoreError, TemplateStore};
use crate::template::BiometricTemplate;
use rollcall_capture::adapter::CaptureAdapter;
use rollcall_capture::error::CaptureError;
use rollcall_capture::sample::EnrollmentSample;
use rollcall_capture::traits::CaptureModality;
use rollcall_core::constants::{DEFAULT_REQUIRED_SAMPLES, SETTLE_DELAY_MS};
use rollcall_core::{Capability, Modality, StudentId};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for an enrollment run.
#[derive(Debug, Clone)]
pub struct EnrollmentConfig {
    /// Samples collected per run.
    pub required_samples: u32,

    /// Pause between consecutive captures so the user can lift and replace
    /// the finger.
    pub settle_delay: Duration,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            required_samples: DEFAULT_REQUIRED_SAMPLES,
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
        }
    }
}

impl EnrollmentConfig {
    /// Set the number of samples per run.
    #[must_use]
    pub fn required_samples(mut self, required_samples: u32) -> Self {
        self.required_samples = required_samples;
        self
    }

    /// Set the settle delay between samples.
    #[must_use]
    pub fn settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

/// Errors ending an enrollment run.
///
/// Every variant means no template was committed; partial runs leave no
/// state behind.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    /// The device is disconnected or does not support enrollment.
    #[error("Capture device unavailable for enrollment ({modality})")]
    DeviceUnavailable { modality: Modality },

    /// A capture in the run failed; `sample_index` is zero-based.
    #[error("Enrollment failed at sample {sample_index}: {source}")]
    Failed {
        sample_index: u32,
        #[source]
        source: CaptureError,
    },

    /// A capture produced a structurally invalid sample.
    #[error("Invalid sample structure at sample {sample_index}: {source}")]
    InvalidSampleStructure {
        sample_index: u32,
        #[source]
        source: CaptureError,
    },

    /// The run was cancelled through the adapter.
    #[error("Enrollment cancelled")]
    Cancelled,

    /// The Template Store rejected the commit.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives N captures into one stored template.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentCoordinator {
    config: EnrollmentConfig,
}

impl EnrollmentCoordinator {
    /// Create a coordinator with the given configuration.
    pub fn new(config: EnrollmentConfig) -> Self {
        Self { config }
    }

    /// Enroll a student.
    ///
    /// Collects the configured number of samples through the adapter,
    /// selects the one with the maximum quality (earliest wins ties), and
    /// commits it to the Template Store, replacing any prior template for
    /// the student.
    ///
    /// # Errors
    ///
    /// Returns an error if the device is unavailable, any capture fails or
    /// is cancelled, a sample is structurally invalid, or the store rejects
    /// the commit. No partial enrollment is ever committed.
    pub async fn enroll<M, S>(
        &self,
        adapter: &CaptureAdapter<M>,
        store: &S,
        student: &StudentId,
    ) -> Result<BiometricTemplate, EnrollmentError>
    where
        M: CaptureModality,
        S: TemplateStore,
    {
        let device = adapter.refresh().await;
        if !device.available_for(Capability::Enroll) {
            warn!(
                "Enrollment refused for {}: device unavailable ({})",
                student, device.modality
            );
            return Err(EnrollmentError::DeviceUnavailable {
                modality: device.modality,
            });
        }

        info!(
            "Enrolling {} with {} samples via {}",
            student, self.config.required_samples, device.modality
        );

        let mut samples: Vec<EnrollmentSample> =
            Vec::with_capacity(self.config.required_samples as usize);

        for sample_index in 0..self.config.required_samples {
            if sample_index > 0 {
                tokio::time::sleep(self.config.settle_delay).await;
            }

            match adapter.capture().await {
                Ok(sample) => {
                    debug!(
                        "Sample {}/{} captured (quality {})",
                        sample_index + 1,
                        self.config.required_samples,
                        sample.quality
                    );
                    samples.push(sample);
                }
                Err(CaptureError::Cancelled) => {
                    info!("Enrollment of {} cancelled at sample {}", student, sample_index);
                    return Err(EnrollmentError::Cancelled);
                }
                Err(e) if e.is_data_error() => {
                    warn!("Enrollment of {} aborted: invalid sample: {}", student, e);
                    return Err(EnrollmentError::InvalidSampleStructure {
                        sample_index,
                        source: e,
                    });
                }
                Err(e) => {
                    warn!(
                        "Enrollment of {} failed at sample {}: {}",
                        student, sample_index, e
                    );
                    return Err(EnrollmentError::Failed {
                        sample_index,
                        source: e,
                    });
                }
            }
        }

        // Best-of-N: strict comparison keeps the earliest sample on ties.
        let mut best = 0;
        for (index, sample) in samples.iter().enumerate() {
            if sample.quality > samples[best].quality {
                best = index;
            }
        }

        let template =
            BiometricTemplate::from_run(student.clone(), device.modality, &samples, best);

        store.store_template(&template).await?;

        info!(
            "Enrollment committed for {} (best quality {} from sample {})",
            student, template.quality, best
        );

        Ok(template)
    }
}
