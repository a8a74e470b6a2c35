//! Account identities and ciphertext scopes.

use core::fmt;
use core::str::FromStr;

/// Width of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// 20-byte account address identifying a player, the owner, or a contract.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Builds an address from an arbitrary slice, failing on wrong length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressParseError> {
        let array: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| AddressParseError::Length(bytes.len()))?;
        Ok(Self(array))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|_| AddressParseError::Hex)?;
        Self::from_slice(&bytes)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    #[error("address must be {ADDRESS_LEN} bytes, got {0}")]
    Length(usize),

    #[error("address is not valid hex")]
    Hex,
}

/// The state-machine instance within which ciphertexts are combinable.
///
/// A scope is the address of the ledger contract that owns the ciphertexts.
/// Ciphertexts from different scopes are never mixed.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scope(Address);

impl Scope {
    pub const fn new(contract: Address) -> Self {
        Self(contract)
    }

    /// Address of the contract, used when the scope itself is granted access.
    pub const fn address(&self) -> Address {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scope({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_and_bare_hex() {
        let expected = Address::from_bytes([0xab; ADDRESS_LEN]);
        let prefixed = format!("0x{}", "ab".repeat(ADDRESS_LEN));
        assert_eq!(prefixed.parse::<Address>().unwrap(), expected);
        assert_eq!("ab".repeat(ADDRESS_LEN).parse::<Address>().unwrap(), expected);
        assert_eq!(expected.to_string(), prefixed);
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            "0xabcd".parse::<Address>(),
            Err(AddressParseError::Length(2))
        );
        assert_eq!("0xzz".parse::<Address>(), Err(AddressParseError::Hex));
    }
}
