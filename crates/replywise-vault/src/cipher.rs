// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sealing of platform refresh tokens at rest.

use replywise_core::ReplywiseError;
use replywise_core::types::SealedToken;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::crypto;

/// Encrypts and decrypts refresh tokens with a single AES-256 key.
///
/// Tokens are bound to the account id they belong to. Decrypted tokens are
/// returned as [`SecretString`] and are meant to be dropped right after use.
#[derive(Clone)]
pub struct TokenCipher {
    key: Zeroizing<[u8; 32]>,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").field("key", &"[redacted]").finish()
    }
}

impl TokenCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Parses a 64-character hex key, as stored in `vault.token_key`.
    pub fn from_hex(hex_key: &str) -> Result<Self, ReplywiseError> {
        let bytes = Zeroizing::new(
            hex::decode(hex_key.trim())
                .map_err(|e| ReplywiseError::Vault(format!("token key is not valid hex: {e}")))?,
        );
        let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ReplywiseError::Vault(format!(
                "token key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(key))
    }

    /// A cipher with a fresh random key.
    pub fn generate() -> Result<Self, ReplywiseError> {
        crypto::generate_random_key().map(Self::new)
    }

    /// Hex form of the key, for writing into configuration.
    pub fn key_hex(&self) -> SecretString {
        SecretString::from(hex::encode(self.key.as_slice()))
    }

    pub fn seal_token(
        &self,
        account_id: &str,
        token: &SecretString,
    ) -> Result<SealedToken, ReplywiseError> {
        let (ciphertext, nonce) = crypto::seal(
            &self.key,
            account_id.as_bytes(),
            token.expose_secret().as_bytes(),
        )?;
        Ok(SealedToken { ciphertext, nonce })
    }

    pub fn open_token(
        &self,
        account_id: &str,
        sealed: &SealedToken,
    ) -> Result<SecretString, ReplywiseError> {
        let plaintext = Zeroizing::new(crypto::open(
            &self.key,
            account_id.as_bytes(),
            &sealed.nonce,
            &sealed.ciphertext,
        )?);
        let token = std::str::from_utf8(&plaintext)
            .map_err(|_| ReplywiseError::Vault("sealed token is not UTF-8".to_string()))?;
        Ok(SecretString::from(token.to_string()))
    }
}

/// Masks a secret for display: first and last four characters only.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 12 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
