//! Ledger worker that owns the authoritative [`GameLedgerState`].
//!
//! Receives commands from [`LedgerHandle`](crate::LedgerHandle) one at a
//! time, so every `play` and `withdraw` runs to completion before the next
//! begins. Each play is evaluated inside a coprocessor transaction that is
//! committed only if the engine accepted the play.

use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

use dice_client_core::TransactionId;
use dice_coprocessor::Coprocessor;
use dice_core::{Address, DiceError, GameEngine, GameLedgerState, PlayError, PlayRequest};

use super::accounts::NativeAccounts;
use crate::api::{LedgerEvent, PlayReceipt, Result, WithdrawReceipt};
use crate::utils::hash::hash_ledger_state;

/// Commands that can be sent to the ledger worker
pub enum Command {
    /// Apply a play paid by `request.player`.
    Play {
        request: PlayRequest,
        reply: oneshot::Sender<Result<PlayReceipt>>,
    },
    /// Drain the ledger balance to the owner.
    Withdraw {
        caller: Address,
        reply: oneshot::Sender<Result<WithdrawReceipt>>,
    },
    /// Add native value to an identity.
    Fund {
        account: Address,
        amount: u128,
        reply: oneshot::Sender<Result<u128>>,
    },
    /// Read-only snapshot of the ledger state.
    QueryState {
        reply: oneshot::Sender<GameLedgerState>,
    },
    /// Native balance of an identity.
    QueryBalance {
        account: Address,
        reply: oneshot::Sender<u128>,
    },
}

/// Background task that serializes ledger calls.
pub struct LedgerWorker {
    state: GameLedgerState,
    coprocessor: Coprocessor,
    accounts: NativeAccounts,
    transactions: u64,
    command_rx: mpsc::Receiver<Command>,
    shutdown_rx: oneshot::Receiver<()>,
    event_tx: broadcast::Sender<LedgerEvent>,
}

impl LedgerWorker {
    pub(crate) fn new(
        state: GameLedgerState,
        coprocessor: Coprocessor,
        accounts: NativeAccounts,
        command_rx: mpsc::Receiver<Command>,
        shutdown_rx: oneshot::Receiver<()>,
        event_tx: broadcast::Sender<LedgerEvent>,
    ) -> Self {
        info!(
            target: "runtime::ledger",
            owner = %state.owner(),
            scope = %state.scope(),
            entry_fee = state.entry_fee(),
            "ledger worker started"
        );
        Self {
            state,
            coprocessor,
            accounts,
            transactions: 0,
            command_rx,
            shutdown_rx,
            event_tx,
        }
    }

    /// Main worker loop
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                _ = &mut self.shutdown_rx => break,
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!(target: "runtime::ledger", transactions = self.transactions, "ledger worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Play { request, reply } => {
                let result = self.play(request);
                let _ = reply.send(result);
            }
            Command::Withdraw { caller, reply } => {
                let result = self.withdraw(caller);
                let _ = reply.send(result);
            }
            Command::Fund {
                account,
                amount,
                reply,
            } => {
                let _ = reply.send(self.accounts.credit(account, amount));
            }
            Command::QueryState { reply } => {
                let _ = reply.send(self.state.clone());
            }
            Command::QueryBalance { account, reply } => {
                let _ = reply.send(self.accounts.balance_of(account));
            }
        }
    }

    fn play(&mut self, request: PlayRequest) -> Result<PlayReceipt> {
        let player = request.player;
        // A wrong fee is reported as such even when the payer cannot cover it.
        let expected = self.state.entry_fee();
        if request.paid_value != expected {
            let error = PlayError::IncorrectEntryFee {
                expected,
                paid: request.paid_value,
            };
            warn!(
                target: "runtime::ledger",
                %player,
                code = error.error_code(),
                %error,
                "play rejected"
            );
            return Err(error.into());
        }
        self.accounts.ensure(player, request.paid_value)?;

        let mut tx = self.coprocessor.begin(self.state.scope());
        let outcome = GameEngine::new(&mut self.state, &mut tx).play(&request);
        let play = match outcome {
            Ok(play) => play,
            Err(error) => {
                // Dropping `tx` discards every ciphertext and grant it produced.
                warn!(
                    target: "runtime::ledger",
                    %player,
                    code = error.error_code(),
                    %error,
                    "play rejected"
                );
                return Err(error.into());
            }
        };
        tx.commit();
        self.accounts.debit(player, request.paid_value);

        let transaction = self.next_transaction(b"play", player);
        info!(
            target: "runtime::ledger",
            %player,
            %transaction,
            dice_roll = %play.dice_roll.handle(),
            plays = self.state.plays(),
            state = %hash_ledger_state(&self.state).unwrap_or_default(),
            "play recorded"
        );
        let _ = self.event_tx.send(LedgerEvent::DicePlayed {
            transaction: transaction.clone(),
            player,
            play,
        });
        Ok(PlayReceipt { transaction, play })
    }

    fn withdraw(&mut self, caller: Address) -> Result<WithdrawReceipt> {
        if caller == self.state.owner() {
            self.accounts.check_credit(caller, self.state.balance())?;
        }
        let mut tx = self.coprocessor.begin(self.state.scope());
        let payout = GameEngine::new(&mut self.state, &mut tx)
            .withdraw(caller)
            .inspect_err(|error| {
                warn!(target: "runtime::ledger", %caller, %error, "withdraw rejected");
            })?;
        self.accounts.credit(payout.recipient, payout.amount)?;

        let transaction = self.next_transaction(b"withdraw", caller);
        info!(
            target: "runtime::ledger",
            recipient = %payout.recipient,
            amount = payout.amount,
            %transaction,
            "funds withdrawn"
        );
        let _ = self.event_tx.send(LedgerEvent::FundsWithdrawn {
            transaction: transaction.clone(),
            payout,
        });
        Ok(WithdrawReceipt {
            transaction,
            payout,
        })
    }

    fn next_transaction(&mut self, kind: &[u8], caller: Address) -> TransactionId {
        self.transactions += 1;
        let mut hasher = Sha256::new();
        hasher.update(self.state.scope().address().as_bytes());
        hasher.update(self.transactions.to_be_bytes());
        hasher.update(kind);
        hasher.update(caller.as_bytes());
        TransactionId::from_bytes(hasher.finalize().to_vec())
    }
}
