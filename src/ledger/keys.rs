// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ed25519 key handling: credential parsing, address derivation and
//! transaction signing.
//!
//! Credentials are 32-byte secrets supplied as 64 hex characters with an
//! optional `0x` prefix. Addresses are the BLAKE2b-256 hash of the scheme
//! flag followed by the public key.

use std::fmt;

use base64ct::{Base64, Encoding};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

use super::transaction::TransactionBytes;
use super::types::SuiAddress;

type Blake2b256 = Blake2b<U32>;

/// Signature scheme flag for Ed25519.
pub const ED25519_FLAG: u8 = 0x00;

/// Expected length of a hex-encoded secret key (without `0x`).
pub const SECRET_KEY_HEX_LEN: usize = 64;

/// Intent prefix for transaction data: scope, version, app id.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Why a credential was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("Private key is required. Provide senderPrivateKey or set PRIVATE_KEY.")]
    Missing,

    #[error("Invalid private key length: {0} characters (expected 64)")]
    InvalidLength(usize),

    #[error("Invalid hex string in private key: {0}")]
    InvalidEncoding(String),

    /// Decoded to the wrong number of bytes; an encoding failure.
    #[error("Invalid private key byte length: {0} bytes (expected 32)")]
    InvalidByteLength(usize),
}

/// An Ed25519 key pair derived from a credential.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Parse a hex credential. `0x` is optional.
    pub fn from_hex(credential: &str) -> Result<Self, CredentialError> {
        let trimmed = credential.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Missing);
        }

        let normalized = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let length = normalized.chars().count();
        if length != SECRET_KEY_HEX_LEN {
            return Err(CredentialError::InvalidLength(length));
        }

        let bytes = hex::decode(normalized)
            .map_err(|e| CredentialError::InvalidEncoding(e.to_string()))?;
        let secret: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CredentialError::InvalidByteLength(bytes.len()))?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&secret),
        })
    }

    /// Like [`Keypair::from_hex`], but a missing credential is an error.
    pub fn from_optional(credential: Option<&str>) -> Result<Self, CredentialError> {
        Self::from_hex(credential.ok_or(CredentialError::Missing)?)
    }

    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn address(&self) -> SuiAddress {
        address_from_public_key(&self.public_key())
    }

    /// Secret key as 64 lowercase hex characters (no prefix).
    pub fn secret_hex(&self) -> String {
        hex::encode(self.signing_key.to_bytes())
    }

    /// Sign transaction bytes and return the serialized signature
    /// (`flag || signature || public key`, base64).
    pub fn sign_transaction(&self, tx: &TransactionBytes) -> String {
        let digest = transaction_digest_for_signing(tx);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());
        Base64::encode_string(&serialized)
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Derive the address owned by a hex credential.
pub fn derive_identity(credential: &str) -> Result<SuiAddress, CredentialError> {
    Keypair::from_hex(credential).map(|keypair| keypair.address())
}

/// `BLAKE2b-256(flag || public_key)`.
pub fn address_from_public_key(public_key: &[u8; 32]) -> SuiAddress {
    let hash = Blake2b256::new()
        .chain_update([ED25519_FLAG])
        .chain_update(public_key)
        .finalize();
    SuiAddress::new(hash.into())
}

/// Digest that is actually signed: `BLAKE2b-256(intent || tx_bytes)`.
fn transaction_digest_for_signing(tx: &TransactionBytes) -> [u8; 32] {
    Blake2b256::new()
        .chain_update(TRANSACTION_INTENT)
        .chain_update(tx.as_bytes())
        .finalize()
        .into()
}
