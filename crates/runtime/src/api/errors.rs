//! Unified error types surfaced by the runtime API.
//!
//! Wraps ledger rejections and worker coordination failures so clients can
//! tell a refused call apart from a runtime that is no longer reachable.
use dice_core::{Address, DiceError, ErrorKind, PlayError, WithdrawError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Play(#[from] PlayError),

    #[error(transparent)]
    Withdraw(#[from] WithdrawError),

    #[error("{account} holds {available}, needs {required}")]
    InsufficientFunds {
        account: Address,
        available: u128,
        required: u128,
    },

    #[error("native balance of {0} would overflow")]
    AccountOverflow(Address),

    #[error("ledger worker command channel closed")]
    CommandChannelClosed,

    #[error("ledger worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("ledger worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires an owner before building")]
    MissingOwner,

    #[error("ledger scope must be a non-zero address")]
    InvalidScope,
}

impl DiceError for RuntimeError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Play(e) => e.kind(),
            Self::Withdraw(e) => e.kind(),
            Self::InsufficientFunds { .. } | Self::MissingOwner | Self::InvalidScope => {
                ErrorKind::Validation
            }
            Self::AccountOverflow(_) | Self::WorkerJoin(_) => ErrorKind::Internal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) => ErrorKind::Availability,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Play(e) => e.error_code(),
            Self::Withdraw(e) => e.error_code(),
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::AccountOverflow(_) => "ACCOUNT_OVERFLOW",
            Self::CommandChannelClosed => "COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "WORKER_JOIN",
            Self::MissingOwner => "MISSING_OWNER",
            Self::InvalidScope => "INVALID_SCOPE",
        }
    }
}
