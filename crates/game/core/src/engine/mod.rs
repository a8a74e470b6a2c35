//! Play and withdraw transitions.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameLedgerState`].
//! Each transition validates first, computes into locals, and writes the state
//! in a single step at the end, so a failed call never leaves a partial update
//! behind.

mod errors;

pub use errors::{InputRole, PlayError, WithdrawError};

use crate::arith::{ArithmeticEngine, FheExecutor, InputContext};
use crate::handle::ExternalInput;
use crate::identity::Address;
use crate::state::{GameLedgerState, LatestPlay};

/// Arguments of a `play` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayRequest {
    /// Transaction sender.
    pub player: Address,
    pub seed: ExternalInput,
    pub guess: ExternalInput,
    /// Native value attached to the call.
    pub paid_value: u128,
}

/// Native value leaving the ledger on withdraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payout {
    pub recipient: Address,
    pub amount: u128,
}

/// Game engine applying transitions to a ledger state.
pub struct GameEngine<'a, X: FheExecutor + ?Sized> {
    state: &'a mut GameLedgerState,
    executor: &'a mut X,
}

impl<'a, X: FheExecutor + ?Sized> GameEngine<'a, X> {
    pub fn new(state: &'a mut GameLedgerState, executor: &'a mut X) -> Self {
        Self { state, executor }
    }

    /// Plays one round.
    ///
    /// The fee is checked before any encrypted work. Both inputs are then
    /// verified against `(scope, player)`; the roll and win flag are derived;
    /// the player and the scope are granted decrypt permission on all three
    /// results; finally the latest-play slot and balance are updated together.
    pub fn play(&mut self, request: &PlayRequest) -> Result<LatestPlay, PlayError> {
        let expected = self.state.entry_fee();
        if request.paid_value != expected {
            return Err(PlayError::IncorrectEntryFee {
                expected,
                paid: request.paid_value,
            });
        }

        let scope = self.state.scope();
        let context = InputContext {
            scope,
            signer: request.player,
        };
        let mut arith = ArithmeticEngine::new(&mut *self.executor);

        let seed = arith.import(&request.seed, context).map_err(|source| {
            PlayError::InvalidCiphertextProof {
                role: InputRole::Seed,
                source,
            }
        })?;
        let guess = arith.import(&request.guess, context).map_err(|source| {
            PlayError::InvalidCiphertextProof {
                role: InputRole::Guess,
                source,
            }
        })?;

        let dice_roll = arith.derive_roll(seed).map_err(PlayError::Evaluation)?;
        let winner_flag = arith
            .derive_win_flag(dice_roll, guess)
            .map_err(PlayError::Evaluation)?;

        let readers = [request.player];
        arith
            .grant(dice_roll, scope, &readers)
            .map_err(PlayError::Evaluation)?;
        arith
            .grant(guess, scope, &readers)
            .map_err(PlayError::Evaluation)?;
        arith
            .grant(winner_flag, scope, &readers)
            .map_err(PlayError::Evaluation)?;

        let played = LatestPlay {
            dice_roll,
            player_guess: guess,
            winner_flag,
        };
        self.state
            .record_play(played, expected)
            .map_err(|_| PlayError::BalanceOverflow)?;

        Ok(played)
    }

    /// Moves the entire balance to the owner.
    pub fn withdraw(&mut self, caller: Address) -> Result<Payout, WithdrawError> {
        let owner = self.state.owner();
        if caller != owner {
            return Err(WithdrawError::OnlyOwnerCanWithdraw { caller });
        }
        Ok(Payout {
            recipient: owner,
            amount: self.state.drain_balance(),
        })
    }
}
