// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use crate::ledger::types::{LedgerEvent, TransactionEffects};
use crate::ledger::{ObjectId, SuiAddress};

use super::error::TransferError;

/// Result of a funded operation as returned to clients.
///
/// Exactly one branch is populated: `transactionDigest` and
/// `senderAddress` on success, `error` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_address: Option<String>,
    /// Human-readable confirmation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TransferOutcome {
    pub fn succeeded(receipt: &TransferReceipt) -> Self {
        Self {
            success: true,
            transaction_digest: Some(receipt.digest.clone()),
            sender_address: Some(receipt.sender.to_string()),
            message: None,
            error: None,
        }
    }

    pub fn failed(error: &TransferError) -> Self {
        Self {
            success: false,
            transaction_digest: None,
            sender_address: None,
            message: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_result(result: &Result<TransferReceipt, TransferError>) -> Self {
        match result {
            Ok(receipt) => Self::succeeded(receipt),
            Err(err) => Self::failed(err),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if self.success {
            self.message = Some(message.into());
        }
        self
    }
}

/// A transaction the ledger executed successfully.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub digest: String,
    pub sender: SuiAddress,
    pub effects: TransactionEffects,
    pub events: Vec<LedgerEvent>,
}

/// A Wallet object created by `create_wallet`.
#[derive(Debug, Clone)]
pub struct WalletCreation {
    pub wallet_object_id: ObjectId,
    pub receipt: TransferReceipt,
}

/// An on-chain address record created by `create_address`.
#[derive(Debug, Clone)]
pub struct AddressRegistration {
    pub wallet_object_id: ObjectId,
    pub wallet_address: SuiAddress,
    pub receipt: TransferReceipt,
}

/// Steps of the funded-transfer workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Validating,
    Deriving,
    /// Looking up and checking Wallet objects
    Resolving,
    /// Dry-running to size the gas budget
    Estimating,
    CheckingBalance,
    Building,
    Submitting,
    Succeeded,
    Failed,
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferState::Validating => "validating",
            TransferState::Deriving => "deriving",
            TransferState::Resolving => "resolving",
            TransferState::Estimating => "estimating",
            TransferState::CheckingBalance => "checking_balance",
            TransferState::Building => "building",
            TransferState::Submitting => "submitting",
            TransferState::Succeeded => "succeeded",
            TransferState::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::ExecutionStatus;

    fn receipt() -> TransferReceipt {
        TransferReceipt {
            digest: "DIGEST".into(),
            sender: SuiAddress::new([7; 32]),
            effects: TransactionEffects {
                status: ExecutionStatus {
                    status: "success".into(),
                    error: None,
                },
                gas_used: None,
                created: Vec::new(),
            },
            events: Vec::new(),
        }
    }

    #[test]
    fn success_serializes_camel_case_without_error() {
        let outcome = TransferOutcome::succeeded(&receipt()).with_message("done");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["transactionDigest"], "DIGEST");
        assert_eq!(json["senderAddress"], format!("0x{}", "07".repeat(32)));
        assert_eq!(json["message"], "done");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_has_only_error() {
        let outcome = TransferOutcome::failed(&TransferError::validation("bad")).with_message("ignored");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "bad" }));
    }

    #[test]
    fn state_names() {
        assert_eq!(TransferState::CheckingBalance.to_string(), "checking_balance");
        assert_eq!(TransferState::Failed.to_string(), "failed");
    }
}
