//! In-memory template store for development and testing.
//!
//! Implements [`TemplateStore`] without a backing service. The comparator
//! is a byte-equality check mapped to configurable confidence values, which
//! is enough to exercise every coordinator path including threshold edges.

use crate::store::{ComparatorScore, EnrollmentStatus, StoreError, StoreResult, TemplateStore};
use crate::template::BiometricTemplate;
use rollcall_capture::envelope::TemplateEnvelope;
use rollcall_core::StudentId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Comparator confidence reported when templates match byte-for-byte.
const DEFAULT_MATCH_CONFIDENCE: f64 = 95.0;

/// Comparator confidence reported when templates differ.
const DEFAULT_MISMATCH_CONFIDENCE: f64 = 20.0;

/// In-memory [`TemplateStore`] implementation.
///
/// # Examples
///
/// ```
/// use rollcall_biometric::memory::MemoryTemplateStore;
/// use rollcall_biometric::store::TemplateStore;
/// use rollcall_core::StudentId;
///
/// #[tokio::main]
/// async fn main() {
///     let store = MemoryTemplateStore::new();
///     let student = StudentId::new("S1001").unwrap();
///
///     let status = store.enrollment(&student).await.unwrap();
///     assert!(!status.enrolled);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: Mutex<HashMap<StudentId, BiometricTemplate>>,
    match_confidence: Mutex<f64>,
    mismatch_confidence: Mutex<f64>,
}

impl MemoryTemplateStore {
    /// Create an empty store with default comparator confidences.
    pub fn new() -> Self {
        Self {
            templates: Mutex::new(HashMap::new()),
            match_confidence: Mutex::new(DEFAULT_MATCH_CONFIDENCE),
            mismatch_confidence: Mutex::new(DEFAULT_MISMATCH_CONFIDENCE),
        }
    }

    /// Override the confidence reported for matching templates.
    pub fn set_match_confidence(&self, confidence: f64) {
        *lock(&self.match_confidence) = confidence;
    }

    /// Override the confidence reported for non-matching templates.
    pub fn set_mismatch_confidence(&self, confidence: f64) {
        *lock(&self.mismatch_confidence) = confidence;
    }

    /// Number of stored templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        lock(&self.templates).len()
    }

    /// Fetch a stored template (for assertions in tests).
    #[must_use]
    pub fn template_for(&self, student: &StudentId) -> Option<BiometricTemplate> {
        lock(&self.templates).get(student).cloned()
    }
}

/// Lock a std mutex, recovering the data on poisoning.
///
/// The store holds plain data, so a panicked writer cannot leave it in a
/// half-updated state worth propagating.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TemplateStore for MemoryTemplateStore {
    async fn enrollment(&self, student: &StudentId) -> StoreResult<EnrollmentStatus> {
        Ok(match lock(&self.templates).get(student) {
            Some(template) => EnrollmentStatus {
                enrolled: true,
                enrolled_at: Some(template.enrolled_at),
            },
            None => EnrollmentStatus::not_enrolled(),
        })
    }

    async fn store_template(&self, template: &BiometricTemplate) -> StoreResult<()> {
        // Replaces any prior template: at most one per student.
        lock(&self.templates).insert(template.student.clone(), template.clone());
        Ok(())
    }

    async fn compare(
        &self,
        student: &StudentId,
        live: &TemplateEnvelope,
    ) -> StoreResult<ComparatorScore> {
        let templates = lock(&self.templates);
        let stored = templates.get(student).ok_or_else(|| {
            StoreError::Backend(rollcall_backend::BackendError::status(
                404,
                format!("no template for {student}"),
            ))
        })?;

        let matched = stored.envelope.template == live.template;
        let confidence = if matched {
            *lock(&self.match_confidence)
        } else {
            *lock(&self.mismatch_confidence)
        };

        Ok(ComparatorScore {
            matched,
            confidence,
        })
    }

    async fn remove(&self, student: &StudentId) -> StoreResult<()> {
        lock(&self.templates).remove(student);
        Ok(())
    }
}
