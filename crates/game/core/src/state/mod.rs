//! Authoritative ledger state for one dice game instance.
//!
//! The state is a fixed-size record: one owner, one fee, one balance and a
//! single slot for the latest play. There is no history; each successful play
//! replaces the slot wholesale. Runtime layers read this state but mutate it
//! exclusively through [`crate::engine::GameEngine`].

use crate::config::GameConfig;
use crate::handle::{EncryptedBool, EncryptedU32};
use crate::identity::{Address, Scope};

/// The three ciphertext handles produced by one play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatestPlay {
    /// Encrypted roll in `1..=6`.
    pub dice_roll: EncryptedU32,
    /// The guess handle exactly as submitted by the player.
    pub player_guess: EncryptedU32,
    /// Encrypted `dice_roll == player_guess`.
    pub winner_flag: EncryptedBool,
}

/// Observable play state of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PlayState {
    /// No play has succeeded yet; every handle reads as the zero sentinel.
    Uninitialized,
    /// The handles of the most recent play are available.
    HasResult,
}

/// Canonical snapshot of the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameLedgerState {
    /// Set once at creation.
    owner: Address,
    /// Ciphertext scope of this instance (its contract address).
    scope: Scope,
    entry_fee: u128,
    latest: Option<LatestPlay>,
    /// Accumulated fees not yet withdrawn.
    balance: u128,
    plays: u64,
}

impl GameLedgerState {
    /// Creates a fresh, uninitialized game owned by `owner`.
    pub fn new(owner: Address, scope: Scope, config: &GameConfig) -> Self {
        Self {
            owner,
            scope,
            entry_fee: config.entry_fee,
            latest: None,
            balance: 0,
            plays: 0,
        }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn entry_fee(&self) -> u128 {
        self.entry_fee
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Number of successful plays since creation.
    pub fn plays(&self) -> u64 {
        self.plays
    }

    pub fn play_state(&self) -> PlayState {
        match self.latest {
            Some(_) => PlayState::HasResult,
            None => PlayState::Uninitialized,
        }
    }

    pub fn latest(&self) -> Option<&LatestPlay> {
        self.latest.as_ref()
    }

    /// Roll handle of the latest play, or the zero sentinel.
    pub fn last_dice_roll(&self) -> EncryptedU32 {
        self.latest
            .map_or(EncryptedU32::UNSET, |played| played.dice_roll)
    }

    /// Guess handle of the latest play, or the zero sentinel.
    pub fn player_guess(&self) -> EncryptedU32 {
        self.latest
            .map_or(EncryptedU32::UNSET, |played| played.player_guess)
    }

    /// Win-flag handle of the latest play, or the zero sentinel.
    pub fn winner_status(&self) -> EncryptedBool {
        self.latest
            .map_or(EncryptedBool::UNSET, |played| played.winner_flag)
    }

    /// Replaces the latest-play slot and credits the fee in one step.
    ///
    /// Fails without touching any field if the balance would overflow.
    pub(crate) fn record_play(&mut self, play: LatestPlay, fee: u128) -> Result<(), BalanceOverflow> {
        let balance = self.balance.checked_add(fee).ok_or(BalanceOverflow)?;
        self.latest = Some(play);
        self.balance = balance;
        self.plays = self.plays.saturating_add(1);
        Ok(())
    }

    /// Empties the balance and returns what it held.
    pub(crate) fn drain_balance(&mut self) -> u128 {
        core::mem::take(&mut self.balance)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("balance overflow")]
pub struct BalanceOverflow;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{CiphertextHandle, HANDLE_LEN};

    fn state() -> GameLedgerState {
        GameLedgerState::new(
            Address::from_bytes([1; 20]),
            Scope::new(Address::from_bytes([2; 20])),
            &GameConfig::default(),
        )
    }

    fn play(tag: u8) -> LatestPlay {
        let h = |n: u8| CiphertextHandle::from_bytes([n; HANDLE_LEN]);
        LatestPlay {
            dice_roll: EncryptedU32::from_handle(h(tag)),
            player_guess: EncryptedU32::from_handle(h(tag + 1)),
            winner_flag: EncryptedBool::from_handle(h(tag + 2)),
        }
    }

    #[test]
    fn fresh_state_reads_zero_handles() {
        let state = state();
        assert_eq!(state.play_state(), PlayState::Uninitialized);
        assert!(state.last_dice_roll().is_unset());
        assert!(state.player_guess().is_unset());
        assert!(state.winner_status().is_unset());
        assert_eq!(state.balance(), 0);
        assert_eq!(state.entry_fee(), GameConfig::ENTRY_FEE_WEI);
    }

    #[test]
    fn record_replaces_the_whole_slot() {
        let mut state = state();
        state.record_play(play(10), 5).unwrap();
        state.record_play(play(20), 5).unwrap();

        assert_eq!(state.latest(), Some(&play(20)));
        assert_eq!(state.play_state(), PlayState::HasResult);
        assert_eq!(state.balance(), 10);
        assert_eq!(state.plays(), 2);
    }

    #[test]
    fn overflow_leaves_state_untouched() {
        let mut state = state();
        state.record_play(play(10), u128::MAX).unwrap();
        let before = state.clone();

        assert_eq!(state.record_play(play(20), 1), Err(BalanceOverflow));
        assert_eq!(state, before);
    }

    #[test]
    fn drain_empties_balance() {
        let mut state = state();
        state.record_play(play(1), 7).unwrap();
        assert_eq!(state.drain_balance(), 7);
        assert_eq!(state.balance(), 0);
        assert_eq!(state.drain_balance(), 0);
    }
}
