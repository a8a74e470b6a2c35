//! Client-facing capabilities: input encryption and user decryption.

use async_trait::async_trait;
use dice_client_core::{
    EncryptionCapability, EncryptionError, ResolutionCapability, ResolveError, SealedValue,
    UserDecryptRequest, crypto, verify_authorization,
};
use dice_core::{Address, ExternalInput, Scope};
use tracing::{debug, warn};

use crate::Coprocessor;
use crate::proof::input_proof;
use crate::store::Ciphertext;

#[async_trait]
impl EncryptionCapability for Coprocessor {
    async fn encrypt_u32(
        &self,
        value: u32,
        scope: Scope,
        signer: Address,
    ) -> Result<ExternalInput, EncryptionError> {
        if scope.is_zero() || signer.is_zero() {
            return Err(EncryptionError::InvalidScope { scope, signer });
        }
        let mut store = self.lock();
        if !store.available {
            return Err(EncryptionError::EncryptionUnavailable(
                "coprocessor offline".to_string(),
            ));
        }
        let handle = store.fresh_handle();
        store
            .entries
            .insert(handle, Ciphertext::input(value, scope, signer));
        drop(store);

        debug!(target: "coprocessor::relay", %handle, %scope, "issued input ciphertext");
        let proof = input_proof(&self.secret, &handle, scope, signer);
        Ok(ExternalInput::new(handle, proof))
    }
}

#[async_trait]
impl ResolutionCapability for Coprocessor {
    /// Checks, in order: every handle exists, the signature recovers the
    /// claimed signer, the window covers now, and every handle is readable by
    /// both the signer and a scope listed in the request.
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<Vec<SealedValue>, ResolveError> {
        let store = self.lock();
        if !store.available {
            return Err(ResolveError::Unavailable("coprocessor offline".to_string()));
        }

        let mut entries = Vec::with_capacity(request.handles.len());
        for item in &request.handles {
            let entry = store
                .entries
                .get(&item.handle)
                .filter(|_| !item.handle.is_zero())
                .ok_or(ResolveError::UnknownHandle(item.handle))?;
            entries.push((item, entry));
        }

        verify_authorization(&request, self.clock.now()).inspect_err(|e| {
            warn!(
                target: "coprocessor::relay",
                signer = %request.signer,
                error = %e,
                "rejected decryption request"
            );
        })?;

        let mut sealed = Vec::with_capacity(entries.len());
        for (item, entry) in entries {
            let readable = entry.scope == item.scope
                && request.scopes.contains(&item.scope)
                && entry.acl.contains(&request.signer)
                && entry.acl.contains(&item.scope.address());
            if !readable {
                warn!(
                    target: "coprocessor::relay",
                    signer = %request.signer,
                    handle = %item.handle,
                    "decryption not permitted"
                );
                return Err(ResolveError::UnauthorizedDecryption(format!(
                    "{} may not decrypt {}",
                    request.signer, item.handle
                )));
            }
            let value = crypto::seal(item.handle, entry.clear_value(), &request.public_key.0)
                .map_err(|e| ResolveError::MalformedRequest(e.to_string()))?;
            sealed.push(value);
        }

        debug!(
            target: "coprocessor::relay",
            signer = %request.signer,
            values = sealed.len(),
            "user decryption served"
        );
        Ok(sealed)
    }
}
