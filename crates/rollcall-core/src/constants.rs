//! Core constants for the attendance pipeline.
//!
//! This module centralizes the tunable values shared by the capture,
//! enrollment, verification and session crates. The defaults follow the
//! backend-bridged scanner deployment, which is the authoritative variant
//! of this system.

// ============================================================================
// Identifier Constraints
// ============================================================================

/// Minimum student/course identifier length (characters).
pub const MIN_ID_LENGTH: usize = 1;

/// Maximum student/course identifier length (characters).
///
/// Identifiers longer than this are rejected as invalid. The limit bounds
/// memory use on wire payloads and matches typical registrar id widths.
pub const MAX_ID_LENGTH: usize = 64;

// ============================================================================
// Quality Scores
// ============================================================================

/// Maximum quality score reported by any capture modality.
///
/// Quality scores range from 0 (lowest) to 100 (highest).
pub const MAX_QUALITY_SCORE: u8 = 100;

/// Substitute quality applied when a modality reports an unusable value.
///
/// The vendor SDK reports -1 when its quality estimator is unavailable.
/// The capture layer replaces the sentinel with this default and flags the
/// sample as `quality_unavailable`; callers never see the raw sentinel.
pub const QUALITY_FALLBACK: u8 = 85;

// ============================================================================
// Enrollment
// ============================================================================

/// Number of samples collected during one enrollment run.
pub const DEFAULT_REQUIRED_SAMPLES: u32 = 4;

/// Pause between consecutive enrollment captures (milliseconds).
///
/// Gives the user time to lift and replace the finger. This is a pacing
/// value, not a correctness requirement.
pub const SETTLE_DELAY_MS: u64 = 1_500;

/// Fixed-format identifier attached to every committed template.
pub const TEMPLATE_FORMAT: &str = "ANSI-378";

// ============================================================================
// Verification
// ============================================================================

/// Default match threshold for verification decisions.
///
/// A comparator confidence greater than or equal to this value counts as a
/// match. The threshold is inclusive on the accept side: exactly 75.0
/// matches, 74.9 does not.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 75.0;

/// Maximum confidence value reported by the comparator.
pub const MAX_CONFIDENCE: f64 = 100.0;

// ============================================================================
// Capture Timing
// ============================================================================

/// Hard timeout for a single capture operation (milliseconds).
///
/// When exceeded, the in-flight operation is cancelled and the adapter
/// returns to idle.
pub const DEFAULT_CAPTURE_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// Device Health Polling
// ============================================================================

/// Default interval between connectivity probes (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Minimum allowed polling interval (seconds).
///
/// Values below this hammer the backend bridge for no benefit.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// Maximum allowed polling interval (seconds).
///
/// Values above this leave the UI showing stale connectivity for too long.
pub const MAX_POLL_INTERVAL_SECS: u64 = 15;

// ============================================================================
// Retry Policy
// ============================================================================

/// Attempts the UI layer may offer before the flow must be restarted.
///
/// Neither enrollment nor verification retries internally; this budget is
/// surfaced to callers as the number of explicit "try again" actions.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;
