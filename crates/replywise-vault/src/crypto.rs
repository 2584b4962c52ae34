// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.
//! The associated data binds a ciphertext to its owner, so a sealed value
//! copied onto another record fails to open.

use replywise_core::ReplywiseError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, ReplywiseError> {
    UnboundKey::new(&AES_256_GCM, key)
        .map(LessSafeKey::new)
        .map_err(|_| ReplywiseError::Vault("failed to create AES-256-GCM key".to_string()))
}

/// Encrypts `plaintext`, returning `(ciphertext_with_tag, nonce)`.
pub fn seal(
    key: &[u8; 32],
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; 12]), ReplywiseError> {
    let key = aead_key(key)?;

    let mut nonce_bytes = [0u8; 12];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| ReplywiseError::Vault("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::from(associated_data),
        &mut in_out,
    )
    .map_err(|_| ReplywiseError::Vault("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypts a value produced by [`seal`] with the same key and associated data.
pub fn open(
    key: &[u8; 32],
    associated_data: &[u8],
    nonce: &[u8; 12],
    ciphertext: &[u8],
) -> Result<Vec<u8>, ReplywiseError> {
    let key = aead_key(key)?;
    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(
            Nonce::assume_unique_for_key(*nonce),
            Aad::from(associated_data),
            &mut in_out,
        )
        .map_err(|_| {
            ReplywiseError::Vault(
                "AES-256-GCM decryption failed: wrong key, wrong owner or corrupted data"
                    .to_string(),
            )
        })?;
    Ok(plaintext.to_vec())
}

/// Generates a random 32-byte key suitable for AES-256-GCM.
pub fn generate_random_key() -> Result<[u8; 32], ReplywiseError> {
    let mut key = [0u8; 32];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| ReplywiseError::Vault("failed to generate random key".to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonces_are_fresh_per_seal() {
        let key = generate_random_key().unwrap();
        let (ct1, nonce1) = seal(&key, b"acct", b"same input").unwrap();
        let (ct2, nonce2) = seal(&key, b"acct", b"same input").unwrap();
        assert_ne!(nonce1, nonce2);
        assert_ne!(ct1, ct2);
    }

    #[test]
    fn wrong_key_fails() {
        let key1 = generate_random_key().unwrap();
        let key2 = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key1, b"acct", b"secret").unwrap();
        assert!(open(&key2, b"acct", &nonce, &ciphertext).is_err());
    }

    #[test]
    fn wrong_associated_data_fails() {
        let key = generate_random_key().unwrap();
        let (ciphertext, nonce) = seal(&key, b"account-1", b"secret").unwrap();
        assert!(open(&key, b"account-2", &nonce, &ciphertext).is_err());
        assert_eq!(open(&key, b"account-1", &nonce, &ciphertext).unwrap(), b"secret");
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = generate_random_key().unwrap();
        let (mut ciphertext, nonce) = seal(&key, b"acct", b"do not tamper").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(open(&key, b"acct", &nonce, &ciphertext).is_err());
    }
}
