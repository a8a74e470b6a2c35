//! Client protocol configuration.

use std::time::Duration;

/// Tunables for encryption and decryption round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Upper bound on any single external call.
    pub request_timeout: Duration,
    /// Length of the user-decryption authorization window.
    pub duration_days: u32,
}

impl ProtocolConfig {
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_DURATION_DAYS: u32 = 10;

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_duration_days(mut self, days: u32) -> Self {
        self.duration_days = days;
        self
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            duration_days: Self::DEFAULT_DURATION_DAYS,
        }
    }
}
