//! Engine failure surfaces.
//!
//! Three kinds: domain errors ([`RandoCoreError`], fatal), exhaustion
//! ([`OutOfLocationsError`], recovered by the randomizer's retry loop), and
//! post-run validation failures ([`ValidationError`], surfaced
//! unconditionally).

use randoforge_core::RandoCoreError;
use thiserror::Error;

/// A sphere builder could not make progress, or a selector cap went
/// negative. Recoverable: the randomizer resets and retries.
#[derive(Debug, Clone, Error)]
#[error("out of locations: {0}")]
pub struct OutOfLocationsError(pub String);

/// Post-run invariants were violated. Never recovered.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        ValidationError {
            reason: reason.into(),
        }
    }
}

/// Top-level error surface of a randomization run.
#[derive(Debug, Error)]
pub enum RandoError {
    #[error(transparent)]
    OutOfLocations(#[from] OutOfLocationsError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Cooperative cancellation was requested via the shared flag.
    #[error("randomization was cancelled")]
    Cancelled,

    #[error(transparent)]
    Domain(#[from] RandoCoreError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, RandoError>;
