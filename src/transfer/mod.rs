// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Funded transfers: validation, sender derivation, Wallet resolution, gas
//! budgeting, balance checks and submission.

mod error;
mod orchestrator;
mod outcome;

pub use error::{ErrorKind, TransferError};
pub use orchestrator::{
    DepositRequest, TransferOrchestrator, TransferRequest, TransferSettings, TransferTarget,
};
pub use outcome::{
    AddressRegistration, TransferOutcome, TransferReceipt, TransferState, WalletCreation,
};
