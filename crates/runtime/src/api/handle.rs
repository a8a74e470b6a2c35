//! Cloneable façade for issuing ledger calls to the runtime.
//!
//! [`LedgerHandle`] hides channel plumbing and offers async helpers for
//! playing, withdrawing, funding identities and reading the ledger.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};

use dice_client_core::{EncryptedSnapshot, GameLedger, LedgerError, TransactionId};
use dice_core::{
    Address, EncryptedBool, EncryptedU32, ExternalInput, GameLedgerState, LatestPlay, Payout,
    PlayRequest, Scope,
};

use super::errors::{Result, RuntimeError};
use super::events::LedgerEvent;
use crate::workers::Command;

/// Immutable parameters of the ledger instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    pub owner: Address,
    pub scope: Scope,
    pub entry_fee: u128,
}

/// Outcome of an accepted play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayReceipt {
    pub transaction: TransactionId,
    pub play: LatestPlay,
}

/// Outcome of an accepted withdraw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub transaction: TransactionId,
    pub payout: Payout,
}

/// Client-facing handle to the ledger worker
#[derive(Clone)]
pub struct LedgerHandle {
    command_tx: mpsc::Sender<Command>,
    event_tx: broadcast::Sender<LedgerEvent>,
    info: LedgerInfo,
}

impl LedgerHandle {
    pub(crate) fn new(
        command_tx: mpsc::Sender<Command>,
        event_tx: broadcast::Sender<LedgerEvent>,
        info: LedgerInfo,
    ) -> Self {
        Self {
            command_tx,
            event_tx,
            info,
        }
    }

    pub fn info(&self) -> LedgerInfo {
        self.info
    }

    /// Submit a play. The attached value is taken from the player's native
    /// balance only if the ledger accepts the play.
    pub async fn play(&self, request: PlayRequest) -> Result<PlayReceipt> {
        self.request(|reply| Command::Play { request, reply })
            .await?
    }

    /// Move the whole ledger balance to the owner.
    pub async fn withdraw(&self, caller: Address) -> Result<WithdrawReceipt> {
        self.request(|reply| Command::Withdraw { caller, reply })
            .await?
    }

    /// Credit native value to `account` and return its new balance.
    pub async fn fund(&self, account: Address, amount: u128) -> Result<u128> {
        self.request(|reply| Command::Fund {
            account,
            amount,
            reply,
        })
        .await?
    }

    /// Native balance of `account` outside the ledger.
    pub async fn balance_of(&self, account: Address) -> Result<u128> {
        self.request(|reply| Command::QueryBalance { account, reply })
            .await
    }

    /// Query the current ledger state (read-only snapshot)
    pub async fn state(&self) -> Result<GameLedgerState> {
        self.request(|reply| Command::QueryState { reply }).await
    }

    /// Fees held by the ledger and not yet withdrawn.
    pub async fn contract_balance(&self) -> Result<u128> {
        Ok(self.state().await?.balance())
    }

    /// Subscribe to ledger events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}

impl From<RuntimeError> for LedgerError {
    fn from(error: RuntimeError) -> Self {
        match error {
            RuntimeError::Play(e) => LedgerError::Play(e),
            RuntimeError::Withdraw(e) => LedgerError::Withdraw(e),
            RuntimeError::InsufficientFunds {
                available,
                required,
                ..
            } => LedgerError::InsufficientFunds {
                available,
                required,
            },
            other => LedgerError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl GameLedger for LedgerHandle {
    async fn scope(&self) -> std::result::Result<Scope, LedgerError> {
        Ok(self.info.scope)
    }

    async fn owner(&self) -> std::result::Result<Address, LedgerError> {
        Ok(self.info.owner)
    }

    async fn entry_fee(&self) -> std::result::Result<u128, LedgerError> {
        Ok(self.info.entry_fee)
    }

    async fn play(
        &self,
        caller: Address,
        seed: ExternalInput,
        guess: ExternalInput,
        paid_value: u128,
    ) -> std::result::Result<TransactionId, LedgerError> {
        let request = PlayRequest {
            player: caller,
            seed,
            guess,
            paid_value,
        };
        Ok(LedgerHandle::play(self, request).await?.transaction)
    }

    async fn withdraw(&self, caller: Address) -> std::result::Result<TransactionId, LedgerError> {
        Ok(LedgerHandle::withdraw(self, caller).await?.transaction)
    }

    async fn last_dice_roll(&self) -> std::result::Result<EncryptedU32, LedgerError> {
        Ok(self.state().await?.last_dice_roll())
    }

    async fn player_guess(&self) -> std::result::Result<EncryptedU32, LedgerError> {
        Ok(self.state().await?.player_guess())
    }

    async fn winner_status(&self) -> std::result::Result<EncryptedBool, LedgerError> {
        Ok(self.state().await?.winner_status())
    }

    async fn latest_play(&self) -> std::result::Result<EncryptedSnapshot, LedgerError> {
        let state = self.state().await?;
        Ok(EncryptedSnapshot {
            dice_roll: state.last_dice_roll(),
            player_guess: state.player_guess(),
            winner_flag: state.winner_status(),
        })
    }
}
