//! Errors reported by encrypted-computation backends.

use crate::error::{DiceError, ErrorKind};
use crate::handle::{CiphertextHandle, PlaintextKind};
use crate::identity::Scope;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error("input proof does not verify for handle {0}")]
    InvalidProof(CiphertextHandle),

    #[error("unknown ciphertext handle {0}")]
    UnknownHandle(CiphertextHandle),

    #[error("handle {0} was not verified for this scope")]
    NotVerified(CiphertextHandle),

    #[error("handle {handle} holds {found}, expected {expected}")]
    TypeMismatch {
        handle: CiphertextHandle,
        expected: PlaintextKind,
        found: PlaintextKind,
    },

    #[error("handle {handle} belongs to scope {found}, expected {expected}")]
    ScopeMismatch {
        handle: CiphertextHandle,
        expected: Scope,
        found: Scope,
    },

    #[error("modulus must be non-zero")]
    ZeroModulus,

    #[error("execution backend unavailable: {0}")]
    Unavailable(String),
}

impl ExecutorError {
    /// True when the failure means an operand was not a legitimately produced,
    /// correctly typed ciphertext of this scope.
    pub const fn is_operand_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidProof(_)
                | Self::UnknownHandle(_)
                | Self::NotVerified(_)
                | Self::TypeMismatch { .. }
                | Self::ScopeMismatch { .. }
        )
    }
}

impl DiceError for ExecutorError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) => ErrorKind::Availability,
            Self::ZeroModulus => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidProof(_) => "EXECUTOR_INVALID_PROOF",
            Self::UnknownHandle(_) => "EXECUTOR_UNKNOWN_HANDLE",
            Self::NotVerified(_) => "EXECUTOR_NOT_VERIFIED",
            Self::TypeMismatch { .. } => "EXECUTOR_TYPE_MISMATCH",
            Self::ScopeMismatch { .. } => "EXECUTOR_SCOPE_MISMATCH",
            Self::ZeroModulus => "EXECUTOR_ZERO_MODULUS",
            Self::Unavailable(_) => "EXECUTOR_UNAVAILABLE",
        }
    }
}
