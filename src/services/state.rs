// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encrypted OAuth `state` parameter.
//!
//! The phone number that started an authorization is carried through the
//! provider redirect inside the `state` parameter, sealed with an AEAD
//! cipher so the callback can recover it without server-side session
//! storage.
//!
//! Token layout (URL-safe base64, no padding):
//!
//! ```text
//! nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```
//!
//! The key is derived from the configured secret with HKDF-SHA256. The
//! HKDF info label differs per cipher, so a token sealed under one cipher
//! never opens under another even with the same secret.

use crate::error::AppError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hkdf::Hkdf;
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

const STATE_KEY_SALT: &[u8] = b"ride-relay/oauth-state";
const STATE_AAD: &[u8] = b"ride-relay/oauth-state/v1";

/// AEAD cipher used to seal the state parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCipher {
    Aes256Gcm,
    ChaCha20Poly1305,
}

impl StateCipher {
    fn algorithm(self) -> &'static aead::Algorithm {
        match self {
            StateCipher::Aes256Gcm => &aead::AES_256_GCM,
            StateCipher::ChaCha20Poly1305 => &aead::CHACHA20_POLY1305,
        }
    }

    fn info(self) -> &'static [u8] {
        match self {
            StateCipher::Aes256Gcm => b"state-key:aes-256-gcm",
            StateCipher::ChaCha20Poly1305 => b"state-key:chacha20-poly1305",
        }
    }
}

impl FromStr for StateCipher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes-256-gcm" => Ok(StateCipher::Aes256Gcm),
            "chacha20-poly1305" => Ok(StateCipher::ChaCha20Poly1305),
            other => Err(format!("unsupported state cipher: {}", other)),
        }
    }
}

impl fmt::Display for StateCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StateCipher::Aes256Gcm => "aes-256-gcm",
            StateCipher::ChaCha20Poly1305 => "chacha20-poly1305",
        })
    }
}

/// Data carried through the OAuth redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatePayload {
    pub phone: String,
}

/// Seals and opens [`StatePayload`]s. Holds no per-call state.
#[derive(Clone)]
pub struct StateCodec {
    key: Arc<LessSafeKey>,
    rng: SystemRandom,
}

impl StateCodec {
    /// Derive the state key from `secret` for the given cipher.
    pub fn new(secret: &[u8], cipher: StateCipher) -> Result<Self, AppError> {
        let hk = Hkdf::<Sha256>::new(Some(STATE_KEY_SALT), secret);
        let mut okm = [0u8; 32];
        hk.expand(cipher.info(), &mut okm)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("State key derivation failed: {}", e)))?;

        let unbound = UnboundKey::new(cipher.algorithm(), &okm)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("State key rejected: {}", e)))?;

        Ok(Self {
            key: Arc::new(LessSafeKey::new(unbound)),
            rng: SystemRandom::new(),
        })
    }

    /// Serialize and encrypt a payload into a URL-safe token.
    pub fn encode(&self, payload: &StatePayload) -> Result<String, AppError> {
        let plaintext = serde_json::to_vec(payload)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("State serialize failed: {}", e)))?;
        self.seal(plaintext)
    }

    /// Decrypt and parse a token produced by [`encode`](Self::encode).
    pub fn decode(&self, token: &str) -> Result<StatePayload, AppError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| AppError::StateDecode(format!("not base64: {}", e)))?;

        if bytes.len() < NONCE_LEN + self.key.algorithm().tag_len() {
            return Err(AppError::StateDecode("token too short".to_string()));
        }

        let (nonce_bytes, sealed) = bytes.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| AppError::StateDecode("bad nonce".to_string()))?;

        let mut in_out = sealed.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::from(STATE_AAD), &mut in_out)
            .map_err(|_| AppError::StateDecode("authentication failed".to_string()))?;

        serde_json::from_slice(plaintext)
            .map_err(|e| AppError::StateDecode(format!("payload is not valid JSON: {}", e)))
    }

    fn seal(&self, mut in_out: Vec<u8>) -> Result<String, AppError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Nonce generation failed")))?;

        self.key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(STATE_AAD),
                &mut in_out,
            )
            .map_err(|_| AppError::Internal(anyhow::anyhow!("State encryption failed")))?;

        let mut token = Vec::with_capacity(NONCE_LEN + in_out.len());
        token.extend_from_slice(&nonce_bytes);
        token.extend_from_slice(&in_out);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }
}
