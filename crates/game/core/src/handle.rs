//! Opaque ciphertext handles and their plaintext type tags.
//!
//! A ciphertext handle is a fixed-width identifier; its bits carry no
//! plaintext information. Ledger code may store, compare for identity, and
//! forward handles, but only the arithmetic backend and the decryption relay
//! ever interpret them.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// Width of a ciphertext handle in bytes.
pub const HANDLE_LEN: usize = 32;

/// Opaque, fixed-width reference to an encrypted value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CiphertextHandle([u8; HANDLE_LEN]);

impl CiphertextHandle {
    /// Reserved all-zero sentinel meaning "not yet set".
    pub const ZERO: Self = Self([0u8; HANDLE_LEN]);

    pub const fn from_bytes(bytes: [u8; HANDLE_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; HANDLE_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HANDLE_LEN]
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps logs readable.
        write!(
            f,
            "CiphertextHandle(0x{}..{})",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[HANDLE_LEN - 2..])
        )
    }
}

/// Declared plaintext type behind a ciphertext.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PlaintextKind {
    /// Unsigned 32-bit integer.
    U32,
    /// Boolean.
    Bool,
}

mod sealed {
    pub trait Sealed {}
}

/// Marker trait tying a Rust marker type to a [`PlaintextKind`].
pub trait PlaintextType: sealed::Sealed + Copy + Send + Sync + 'static {
    const KIND: PlaintextKind;
}

/// Marker for 32-bit unsigned plaintexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum U32 {}

/// Marker for boolean plaintexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bool {}

impl sealed::Sealed for U32 {}
impl sealed::Sealed for Bool {}

impl PlaintextType for U32 {
    const KIND: PlaintextKind = PlaintextKind::U32;
}

impl PlaintextType for Bool {
    const KIND: PlaintextKind = PlaintextKind::Bool;
}

/// A ciphertext handle tagged with its plaintext type.
///
/// The tag is compile-time only: an `Encrypted<U32>` can never be passed where
/// an `Encrypted<Bool>` is expected. Handles are scoped to a single ledger
/// instance; this crate assumes one scope per state machine.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent, bound = ""))]
pub struct Encrypted<T: PlaintextType> {
    handle: CiphertextHandle,
    #[cfg_attr(feature = "serde", serde(skip))]
    _kind: PhantomData<T>,
}

pub type EncryptedU32 = Encrypted<U32>;
pub type EncryptedBool = Encrypted<Bool>;

impl<T: PlaintextType> Encrypted<T> {
    /// The sentinel value returned before any play has happened.
    pub const UNSET: Self = Self {
        handle: CiphertextHandle::ZERO,
        _kind: PhantomData,
    };

    /// Wraps a raw handle. Callers are responsible for the type tag matching
    /// what the backend recorded for that handle.
    pub const fn from_handle(handle: CiphertextHandle) -> Self {
        Self {
            handle,
            _kind: PhantomData,
        }
    }

    pub const fn handle(&self) -> CiphertextHandle {
        self.handle
    }

    pub const fn kind(&self) -> PlaintextKind {
        T::KIND
    }

    pub fn is_unset(&self) -> bool {
        self.handle.is_zero()
    }
}

// Manual impls: derives would add `T: Clone` etc. bounds on the uninhabited markers.
impl<T: PlaintextType> Clone for Encrypted<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: PlaintextType> Copy for Encrypted<T> {}

impl<T: PlaintextType> PartialEq for Encrypted<T> {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl<T: PlaintextType> Eq for Encrypted<T> {}

impl<T: PlaintextType> Hash for Encrypted<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.handle.hash(state);
    }
}

impl<T: PlaintextType> fmt::Debug for Encrypted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encrypted<{}>({:?})", T::KIND, self.handle)
    }
}

/// Evidence that a ciphertext was produced for a specific (scope, signer) pair.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputProof(Vec<u8>);

impl InputProof {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for InputProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputProof({} bytes)", self.0.len())
    }
}

/// A client-encrypted value as submitted to the ledger: handle plus proof.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalInput {
    pub handle: CiphertextHandle,
    pub proof: InputProof,
}

impl ExternalInput {
    pub fn new(handle: CiphertextHandle, proof: InputProof) -> Self {
        Self { handle, proof }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_handle_is_sentinel() {
        assert!(CiphertextHandle::ZERO.is_zero());
        assert!(EncryptedU32::UNSET.is_unset());
        assert!(EncryptedBool::UNSET.is_unset());

        let mut bytes = [0u8; HANDLE_LEN];
        bytes[HANDLE_LEN - 1] = 1;
        assert!(!CiphertextHandle::from_bytes(bytes).is_zero());
    }

    #[test]
    fn typed_handles_report_kind() {
        let handle = CiphertextHandle::from_bytes([7u8; HANDLE_LEN]);
        assert_eq!(EncryptedU32::from_handle(handle).kind(), PlaintextKind::U32);
        assert_eq!(EncryptedBool::from_handle(handle).kind(), PlaintextKind::Bool);
        assert_eq!(PlaintextKind::Bool.to_string(), "bool");
    }

    #[test]
    fn debug_output_is_abbreviated() {
        let handle = CiphertextHandle::from_bytes([0xcd; HANDLE_LEN]);
        assert_eq!(format!("{handle:?}"), "CiphertextHandle(0xcdcdcdcd..cdcd)");
        assert_eq!(handle.to_string().len(), 2 + HANDLE_LEN * 2);
    }
}
