// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ledger::{LedgerClient, LedgerError, SuiRpcClient};
use crate::transfer::TransferOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub ledger: Arc<dyn LedgerClient>,
    pub orchestrator: TransferOrchestrator,
}

impl AppState {
    pub fn new(config: AppConfig, ledger: Arc<dyn LedgerClient>) -> Self {
        let orchestrator = TransferOrchestrator::new(ledger.clone(), config.transfer_settings());
        Self {
            config: Arc::new(config),
            ledger,
            orchestrator,
        }
    }

    /// State backed by the configured full node.
    pub fn connect(config: AppConfig) -> Result<Self, LedgerError> {
        let ledger = SuiRpcClient::new(&config.rpc_url, config.rpc_timeout)?;
        Ok(Self::new(config, Arc::new(ledger)))
    }
}
