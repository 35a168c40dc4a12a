// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Vomzer Wallet Gateway - Sui funded-transfer service
//!
//! HTTP gateway that derives Sui addresses from hex secret keys, checks
//! balances and gas, and submits native SUI and Wallet-module transfers
//! through a full node.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `ledger` - Sui JSON-RPC client, keys and transaction assembly
//! - `transfer` - The funded-transfer orchestrator
//! - `config` - Environment configuration

pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod state;
pub mod transfer;
