// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sui ledger integration.
//!
//! - [`types`] - addresses, object ids, effects and network presets
//! - [`keys`] - Ed25519 credentials, address derivation, signing
//! - [`transaction`] - instructions, amounts and gas policy
//! - [`client`] - the [`LedgerClient`] boundary and its JSON-RPC implementation

pub mod client;
pub mod keys;
#[cfg(test)]
pub mod mock;
pub mod transaction;
pub mod types;

pub use client::{LedgerClient, LedgerError, SuiRpcClient};
pub use keys::{derive_identity, CredentialError, Keypair};
pub use transaction::{
    build_transfer_instruction, Amount, AmountError, AmountUnit, GasPolicy, Instruction,
    MoveModule, TransactionBytes, TransferAction,
};
pub use types::{NetworkConfig, ObjectId, ObjectInfo, ObjectOwner, SuiAddress, MIST_PER_SUI};
