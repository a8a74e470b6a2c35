/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Exact payment required by `play`, in the smallest native unit.
    pub entry_fee: u128,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Native units per whole coin (18 decimals).
    pub const WEI_PER_COIN: u128 = 1_000_000_000_000_000_000;
    /// 0.0002 coin.
    pub const ENTRY_FEE_WEI: u128 = 200_000_000_000_000;
    /// Number of faces on the die; rolls land in `1..=DIE_FACES`.
    pub const DIE_FACES: u32 = 6;

    pub fn new() -> Self {
        Self {
            entry_fee: Self::ENTRY_FEE_WEI,
        }
    }

    pub fn with_entry_fee(entry_fee: u128) -> Self {
        Self { entry_fee }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
