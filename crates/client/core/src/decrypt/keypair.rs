use std::fmt;

use k256::SecretKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;

use crate::types::PublicKeyBytes;

/// Single-use keypair that resolved values are sealed to.
///
/// Not `Clone`: a keypair lives for exactly one request and its secret is
/// zeroized when dropped.
pub struct DecryptionKeypair {
    secret: SecretKey,
    public: PublicKeyBytes,
}

impl DecryptionKeypair {
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut OsRng);
        let public = PublicKeyBytes(
            secret
                .public_key()
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
        );
        Self { secret, public }
    }

    pub fn public_key(&self) -> &PublicKeyBytes {
        &self.public
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for DecryptionKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptionKeypair")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}
