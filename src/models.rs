// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. Field names are camelCase on
//! the wire. Every type derives `ToSchema` for the OpenAPI document.
//!
//! ## Amounts
//!
//! Amounts are accepted as JSON numbers or decimal strings. Numbers are
//! converted through their shortest decimal rendering, so `0.006` means
//! exactly 0.006. The unit defaults to `sui` and can be overridden per
//! request with `unit`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ledger::{Amount, AmountError, AmountUnit};

// =============================================================================
// Amounts
// =============================================================================

/// An amount as a JSON number (`0.006`) or string (`"0.006"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AmountValue {
    Number(f64),
    Text(String),
}

impl AmountValue {
    /// Interpret in `unit`, or `default_unit` when none was given.
    pub fn to_amount(
        &self,
        unit: Option<&str>,
        default_unit: AmountUnit,
    ) -> Result<Amount, AmountError> {
        let unit = match unit.filter(|u| !u.trim().is_empty()) {
            Some(unit) => AmountUnit::from_str(unit)?,
            None => default_unit,
        };
        match self {
            AmountValue::Number(value) => Amount::from_f64(*value, unit),
            AmountValue::Text(text) => Amount::parse(text, unit),
        }
    }
}

// =============================================================================
// Addresses
// =============================================================================

/// A freshly generated key pair.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressResponse {
    pub success: bool,
    /// `0x` + 64 hex characters
    pub wallet_address: String,
    /// 64 hex characters, no prefix. Shown once; store it safely.
    pub private_key: String,
    pub message_for_user: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeriveAddressRequest {
    /// Falls back to the configured credential.
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeriveAddressResponse {
    pub success: bool,
    pub address: String,
}

// =============================================================================
// Transfers
// =============================================================================

/// Native SUI transfer (`/api/fund-sui-address`, `/api/expend-reward`).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NativeTransferRequest {
    pub sender_private_key: Option<String>,
    /// Recipient address (accepted under either name)
    #[serde(alias = "recipientWalletId")]
    pub recipient_address: String,
    pub amount: AmountValue,
    /// `sui` or `mist`
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferToWalletRequest {
    pub sender_private_key: Option<String>,
    /// Address owning the destination Wallet; used for discovery
    pub dest_wallet_id: Option<String>,
    pub source_wallet_object_id: Option<String>,
    pub dest_wallet_object_id: Option<String>,
    pub amount: AmountValue,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferToAddressRequest {
    pub sender_private_key: Option<String>,
    pub recipient_address: String,
    pub source_wallet_object_id: Option<String>,
    pub amount: AmountValue,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepositToWalletRequest {
    pub sender_private_key: Option<String>,
    /// Wallet object receiving the coin
    pub wallet_id: String,
    /// `0x2::coin::Coin<0x2::sui::SUI>` owned by the sender
    pub coin_object_id: String,
}

// =============================================================================
// Wallet objects
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletRequest {
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletResponse {
    pub success: bool,
    pub wallet_object_id: String,
    pub transaction_digest: String,
    /// Owner of the new Wallet
    pub address: String,
    pub message_for_user: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressOnChainRequest {
    pub derived_address: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAddressOnChainResponse {
    pub success: bool,
    pub wallet_object_id: String,
    pub wallet_address: String,
    pub transaction_digest: String,
    /// Address that paid for gas
    pub sender_address: String,
}

// =============================================================================
// Queries
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: String,
    /// Balance in MIST, as a decimal string
    pub total_balance: String,
    /// Balance in SUI
    pub balance: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletObjectResponse {
    pub address: String,
    pub wallet_object_id: Option<String>,
}
