//! Client configuration loaded from the process environment.
use std::env;
use std::time::Duration;

use dice_client_core::ProtocolConfig;

/// Settings for one end-to-end run of the `dice` binary.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Secret seed to play with; derived from fresh entropy when unset.
    pub seed: Option<u32>,
    pub guess: u32,
    pub protocol: ProtocolConfig,
    pub command_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            seed: None,
            guess: 1,
            protocol: ProtocolConfig::default(),
            command_buffer: 32,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DICE_SEED` - Secret seed (default: derived from random entropy)
    /// - `DICE_GUESS` - Guess in 1..=6 (default: 1)
    /// - `DICE_DURATION_DAYS` - Decryption authorization lifetime (default: 10)
    /// - `DICE_REQUEST_TIMEOUT_MS` - Bound on each external call (default: 30000)
    /// - `DICE_COMMAND_BUFFER` - Ledger command queue size (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.seed = read_env::<u32>("DICE_SEED");

        if let Some(guess) = read_env::<u32>("DICE_GUESS") {
            config.guess = guess;
        }

        if let Some(days) = read_env::<u32>("DICE_DURATION_DAYS") {
            config.protocol = config.protocol.with_duration_days(days.max(1));
        }

        if let Some(millis) = read_env::<u64>("DICE_REQUEST_TIMEOUT_MS") {
            config.protocol = config
                .protocol
                .with_request_timeout(Duration::from_millis(millis.max(1)));
        }

        if let Some(capacity) = read_env::<usize>("DICE_COMMAND_BUFFER") {
            config.command_buffer = capacity.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
