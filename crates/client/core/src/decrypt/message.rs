use dice_core::Scope;

use crate::types::{PublicKeyBytes, ValidityWindow};

const DOMAIN: &[u8] = b"UserDecryptRequestVerification/v1";

/// Canonical statement a holder signs to authorize one decryption request.
///
/// The encoding binds the one-time public key, the ordered scope list, and
/// the validity window. Equal inputs always encode to equal bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationMessage {
    public_key: PublicKeyBytes,
    scopes: Vec<Scope>,
    window: ValidityWindow,
}

impl AuthorizationMessage {
    pub fn new(public_key: &PublicKeyBytes, scopes: &[Scope], window: ValidityWindow) -> Self {
        Self {
            public_key: public_key.clone(),
            scopes: scopes.to_vec(),
            window,
        }
    }

    pub fn public_key(&self) -> &PublicKeyBytes {
        &self.public_key
    }

    pub fn window(&self) -> ValidityWindow {
        self.window
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let key = &self.public_key.0;
        let capacity = DOMAIN.len() + 4 + key.len() + 4 + 20 * self.scopes.len() + 12;
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(DOMAIN);
        out.extend_from_slice(&(key.len() as u32).to_be_bytes());
        out.extend_from_slice(key);
        out.extend_from_slice(&(self.scopes.len() as u32).to_be_bytes());
        for scope in &self.scopes {
            out.extend_from_slice(scope.address().as_bytes());
        }
        out.extend_from_slice(&self.window.start.to_be_bytes());
        out.extend_from_slice(&self.window.duration_days.to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_core::Address;

    fn scope(byte: u8) -> Scope {
        Scope::new(Address::from_bytes([byte; 20]))
    }

    #[test]
    fn encoding_is_deterministic() {
        let key = PublicKeyBytes(vec![2; 33]);
        let window = ValidityWindow::new(1_700_000_000, 10);
        let a = AuthorizationMessage::new(&key, &[scope(1)], window);
        let b = AuthorizationMessage::new(&key, &[scope(1)], window);
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn encoding_layout() {
        let key = PublicKeyBytes(vec![2; 33]);
        let bytes =
            AuthorizationMessage::new(&key, &[scope(9)], ValidityWindow::new(5, 10)).to_bytes();

        let mut offset = DOMAIN.len();
        assert_eq!(&bytes[..offset], DOMAIN);
        assert_eq!(&bytes[offset..offset + 4], &33u32.to_be_bytes());
        offset += 4 + 33;
        assert_eq!(&bytes[offset..offset + 4], &1u32.to_be_bytes());
        offset += 4;
        assert_eq!(&bytes[offset..offset + 20], &[9u8; 20]);
        offset += 20;
        assert_eq!(&bytes[offset..offset + 8], &5u64.to_be_bytes());
        offset += 8;
        assert_eq!(&bytes[offset..], &10u32.to_be_bytes());
    }

    #[test]
    fn every_field_is_bound() {
        let key = PublicKeyBytes(vec![2; 33]);
        let window = ValidityWindow::new(100, 10);
        let base = AuthorizationMessage::new(&key, &[scope(1), scope(2)], window).to_bytes();

        let other_key = PublicKeyBytes(vec![3; 33]);
        let variants = [
            AuthorizationMessage::new(&other_key, &[scope(1), scope(2)], window),
            AuthorizationMessage::new(&key, &[scope(2), scope(1)], window),
            AuthorizationMessage::new(&key, &[scope(1)], window),
            AuthorizationMessage::new(&key, &[scope(1), scope(2)], ValidityWindow::new(101, 10)),
            AuthorizationMessage::new(&key, &[scope(1), scope(2)], ValidityWindow::new(100, 11)),
        ];
        for variant in variants {
            assert_ne!(variant.to_bytes(), base);
        }
    }
}
