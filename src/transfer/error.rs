// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::ledger::{AmountError, CredentialError, LedgerError};

/// Coarse classification of a transfer failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: malformed identifiers, amounts or credentials.
    Validation,
    InsufficientFunds,
    /// The ledger could not be reached or refused the request.
    LedgerTransport,
    /// The ledger executed the transaction and reported failure.
    TransactionRejected,
    /// The ledger answered with something we cannot interpret.
    Integration,
}

/// Errors produced by the funded-transfer workflow.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Insufficient balance: {balance} MIST available, {required} MIST required (amount + gas)")]
    InsufficientFunds { balance: u64, required: u64 },

    #[error("Ledger unavailable: {0}")]
    LedgerTransport(String),

    #[error("Transaction failed: {0}")]
    TransactionRejected(String),

    #[error("{0}")]
    Integration(String),
}

impl TransferError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn integration(message: impl Into<String>) -> Self {
        Self::Integration(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Validation(_)
            | TransferError::Credential(_)
            | TransferError::Amount(_) => ErrorKind::Validation,
            TransferError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            TransferError::LedgerTransport(_) => ErrorKind::LedgerTransport,
            TransferError::TransactionRejected(_) => ErrorKind::TransactionRejected,
            TransferError::Integration(_) => ErrorKind::Integration,
        }
    }
}

impl From<LedgerError> for TransferError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidRpcUrl(_) | LedgerError::Transport(_) | LedgerError::Rpc { .. } => {
                TransferError::LedgerTransport(err.to_string())
            }
            LedgerError::UnexpectedResponse(_) => TransferError::Integration(err.to_string()),
            LedgerError::NoGasCoins(_) => TransferError::TransactionRejected(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::SuiAddress;

    #[test]
    fn credential_and_amount_errors_are_validation() {
        assert_eq!(
            TransferError::from(CredentialError::Missing).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            TransferError::from(AmountError::NotPositive).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn insufficient_funds_message() {
        let err = TransferError::InsufficientFunds {
            balance: 105_000_000,
            required: 106_000_000,
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert!(err.to_string().starts_with("Insufficient balance"));
        assert!(err.to_string().contains("105000000"));
    }

    #[test]
    fn ledger_errors_are_classified() {
        let transport: TransferError = LedgerError::Transport("timeout".into()).into();
        assert_eq!(transport.kind(), ErrorKind::LedgerTransport);

        let rpc: TransferError = LedgerError::Rpc {
            code: -32000,
            message: "object locked".into(),
        }
        .into();
        assert_eq!(rpc.kind(), ErrorKind::LedgerTransport);

        let shape: TransferError = LedgerError::UnexpectedResponse("no digest".into()).into();
        assert_eq!(shape.kind(), ErrorKind::Integration);

        let coins: TransferError = LedgerError::NoGasCoins(SuiAddress::new([1; 32])).into();
        assert_eq!(coins.kind(), ErrorKind::TransactionRejected);
    }

    #[test]
    fn rejected_message_carries_detail() {
        let err = TransferError::TransactionRejected("InsufficientGas".into());
        assert_eq!(err.to_string(), "Transaction failed: InsufficientGas");
    }
}
