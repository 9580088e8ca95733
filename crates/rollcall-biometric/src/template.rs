//! The durable enrolled artifact.

use chrono::{DateTime, Utc};
use rollcall_capture::envelope::TemplateEnvelope;
use rollcall_capture::sample::EnrollmentSample;
use rollcall_core::{Modality, StudentId};

/// The template committed to the Template Store for one student.
///
/// Wraps the best sample of an enrollment run together with run metadata.
/// At most one template exists per student; re-enrollment replaces it. The
/// store owns persistence and encryption; this type only carries the value
/// from the coordinator to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct BiometricTemplate {
    /// Student the template belongs to.
    pub student: StudentId,

    /// Wire envelope of the chosen sample.
    pub envelope: TemplateEnvelope,

    /// Quality of the chosen sample.
    pub quality: u8,

    /// Qualities of every sample in the run, in capture order.
    pub sample_qualities: Vec<u8>,

    /// Modality that produced the run.
    pub modality: Modality,

    /// When the enrollment run completed.
    pub enrolled_at: DateTime<Utc>,
}

impl BiometricTemplate {
    /// Build a template from an enrollment run.
    ///
    /// `best` must index into `samples`; the coordinator selects it as the
    /// first sample reaching the maximum quality.
    pub(crate) fn from_run(
        student: StudentId,
        modality: Modality,
        samples: &[EnrollmentSample],
        best: usize,
    ) -> Self {
        let chosen = &samples[best];
        Self {
            student,
            envelope: TemplateEnvelope::from_sample(chosen),
            quality: chosen.quality,
            sample_qualities: samples.iter().map(|s| s.quality).collect(),
            modality,
            enrolled_at: Utc::now(),
        }
    }
}
