//! Template wire envelope.
//!
//! The envelope is the JSON shape shared by enrollment and verification:
//! enrollment produces it when committing a template, verification
//! reproduces it identically for the live capture, and the Template Store
//! parses the same shape on both paths.
//!
//! ```json
//! { "template": "<opaque>", "format": "ANSI-378",
//!   "metadata": { "quality": 92, "qualityUnavailable": true,
//!                 "timestamp": "2026-03-10T09:30:00Z" } }
//! ```
//!
//! A `template` field is mandatory; its absence is a structural error, not a
//! low-quality result.

use crate::error::{CaptureError, Result};
use crate::sample::EnrollmentSample;
use chrono::{DateTime, Utc};
use rollcall_core::constants::TEMPLATE_FORMAT;
use serde::{Deserialize, Serialize};

/// Serialized form of a template as it travels to the Template Store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateEnvelope {
    /// Opaque template payload.
    pub template: String,

    /// Fixed-format identifier (currently always `"ANSI-378"`).
    pub format: String,

    /// Capture metadata carried alongside the template.
    pub metadata: EnvelopeMetadata,
}

/// Metadata block of the template envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    /// Quality score of the capture, after normalization.
    pub quality: u8,

    /// Present and true when the quality value is the substituted fallback.
    #[serde(default, skip_serializing_if = "is_false")]
    pub quality_unavailable: bool,

    /// Acquisition timestamp.
    pub timestamp: DateTime<Utc>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TemplateEnvelope {
    /// Build an envelope from a captured sample.
    pub fn from_sample(sample: &EnrollmentSample) -> Self {
        Self {
            template: sample.template.clone(),
            format: TEMPLATE_FORMAT.to_string(),
            metadata: EnvelopeMetadata {
                quality: sample.quality,
                quality_unavailable: sample.quality_unavailable,
                timestamp: sample.captured_at,
            },
        }
    }

    /// Serialize to the JSON wire form.
    ///
    /// # Errors
    /// Returns `CaptureError::InvalidSample` if serialization fails, which
    /// would indicate a bug in the envelope type itself.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CaptureError::invalid_sample(format!("envelope serialization: {e}")))
    }

    /// Parse an envelope from its JSON wire form.
    ///
    /// # Errors
    /// Returns `CaptureError::InvalidSample` if the JSON is malformed, the
    /// `template` field is missing, or the template payload is empty.
    pub fn parse(json: &str) -> Result<Self> {
        let envelope: TemplateEnvelope = serde_json::from_str(json)
            .map_err(|e| CaptureError::invalid_sample(format!("malformed envelope: {e}")))?;

        if envelope.template.trim().is_empty() {
            return Err(CaptureError::invalid_sample("missing template payload"));
        }

        Ok(envelope)
    }
}
