//! Events emitted by the ledger for observers.
//!
//! Events carry handles and amounts only. Subscribers learn that a play
//! happened and which ciphertexts now describe it, never what they contain.
use dice_client_core::TransactionId;
use dice_core::{Address, LatestPlay, Payout};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A play was recorded and replaced the previous latest game.
    DicePlayed {
        transaction: TransactionId,
        player: Address,
        play: LatestPlay,
    },
    /// The owner drained the ledger balance.
    FundsWithdrawn {
        transaction: TransactionId,
        payout: Payout,
    },
}
