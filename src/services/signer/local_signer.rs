use std::fmt;

use alloy::{
    hex,
    primitives::Address,
    signers::{k256::ecdsa::SigningKey, local::LocalSigner as AlloyLocalSignerClient},
};
use zeroize::Zeroizing;

use crate::models::SignerError;

/// Signing identity of one wallet for the duration of its attempts.
///
/// The underlying `SigningKey` zeroizes itself on drop.
pub struct WalletSigner {
    local_signer_client: AlloyLocalSignerClient<SigningKey>,
}

impl WalletSigner {
    /// Builds a signer from a hex private key, with or without `0x` prefix.
    pub fn from_secret(secret: &str) -> Result<Self, SignerError> {
        let key_bytes = Zeroizing::new(
            hex::decode(secret.trim())
                .map_err(|e| SignerError::InvalidKey(format!("not valid hex: {e}")))?,
        );

        if key_bytes.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                key_bytes.len()
            )));
        }

        let local_signer_client = AlloyLocalSignerClient::from_slice(&key_bytes)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        Ok(Self {
            local_signer_client,
        })
    }

    pub fn address(&self) -> Address {
        self.local_signer_client.address()
    }

    pub fn local_signer(&self) -> &AlloyLocalSignerClient<SigningKey> {
        &self.local_signer_client
    }
}

impl fmt::Debug for WalletSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
