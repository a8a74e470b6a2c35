//! Common error infrastructure for dice-core.
//!
//! Domain-specific errors (`PlayError`, `WithdrawError`, `ExecutorError`) live
//! next to the operations that produce them. This module provides the shared
//! classification every error in the workspace reports through.
//!
//! # Taxonomy
//!
//! - **Validation**: the request itself was malformed (wrong fee, bad proof).
//!   Detected before any state mutation; retrying unchanged will fail again.
//! - **Authorization**: a privileged action was attempted without the right
//!   (not the owner, no decrypt permission, expired window).
//! - **Availability**: an external service could not be reached or timed out.
//!   The caller may retry; nothing retries automatically.
//! - **Internal**: an invariant was violated. Indicates a bug.

/// Failure class used to report errors distinctly to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authorization,
    Availability,
    Internal,
}

impl ErrorKind {
    /// Returns true if the same call may succeed when retried later.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Availability)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all errors surfaced by the dice workspace.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify by who can fix the failure, not by how bad it is
/// - `error_code` must be stable; clients match on it
pub trait DiceError: core::fmt::Display + core::fmt::Debug {
    /// Returns the failure class of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns a stable identifier for this error variant.
    fn error_code(&self) -> &'static str;
}
