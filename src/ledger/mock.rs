// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::client::{LedgerClient, LedgerError};
use super::transaction::{Instruction, InstructionKind, TransactionBytes};
use super::types::*;

/// Scriptable [`LedgerClient`].
///
/// Defaults describe a healthy ledger: every balance is zero, no objects
/// exist, dry runs succeed and executions succeed with digest `DIGEST`.
pub struct MockLedger {
    pub balances: Mutex<HashMap<SuiAddress, u64>>,
    pub objects: Mutex<HashMap<ObjectId, ObjectInfo>>,
    pub owned: Mutex<HashMap<(SuiAddress, String), ObjectId>>,
    pub simulation: Mutex<SimulationResult>,
    pub execution: Mutex<ExecutionResponse>,
    /// When set, every call fails with a transport error.
    pub transport_failure: Mutex<Option<String>>,
    /// Check gas budgets the way a full node does.
    pub gas_checks: AtomicBool,
    pub built: Mutex<Vec<Instruction>>,
    pub signatures: Mutex<Vec<String>>,
    pub balance_calls: AtomicUsize,
    pub simulate_calls: AtomicUsize,
    pub execute_calls: AtomicUsize,
}

pub const DIGEST: &str = "5xZx2qmPd6sGa3Ygf2cPWqgHUQnrYAQoRJwQCsCEA5qV";

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            objects: Mutex::new(HashMap::new()),
            owned: Mutex::new(HashMap::new()),
            simulation: Mutex::new(SimulationResult {
                status: success_status(),
                gas_used: GasCostSummary {
                    computation_cost: 1_000_000,
                    storage_cost: 2_000_000,
                    storage_rebate: 0,
                },
            }),
            execution: Mutex::new(ExecutionResponse {
                digest: Some(DIGEST.to_string()),
                effects: Some(TransactionEffects {
                    status: success_status(),
                    gas_used: None,
                    created: Vec::new(),
                }),
                events: Vec::new(),
            }),
            transport_failure: Mutex::new(None),
            gas_checks: AtomicBool::new(false),
            built: Mutex::new(Vec::new()),
            signatures: Mutex::new(Vec::new()),
            balance_calls: AtomicUsize::new(0),
            simulate_calls: AtomicUsize::new(0),
            execute_calls: AtomicUsize::new(0),
        }
    }
}

fn success_status() -> ExecutionStatus {
    ExecutionStatus {
        status: STATUS_SUCCESS.to_string(),
        error: None,
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, owner: SuiAddress, mist: u64) -> Self {
        self.balances.lock().unwrap().insert(owner, mist);
        self
    }

    pub fn with_object(
        self,
        id: ObjectId,
        object_type: &str,
        owner: ObjectOwner,
        balance: Option<u64>,
    ) -> Self {
        self.objects.lock().unwrap().insert(
            id,
            ObjectInfo {
                object_id: id,
                object_type: Some(object_type.to_string()),
                owner: Some(owner),
                balance,
            },
        );
        self
    }

    pub fn with_owned(self, owner: SuiAddress, struct_type: &str, id: ObjectId) -> Self {
        self.owned
            .lock()
            .unwrap()
            .insert((owner, struct_type.to_string()), id);
        self
    }

    pub fn with_simulation(self, status: &str, error: Option<&str>, gas: GasCostSummary) -> Self {
        *self.simulation.lock().unwrap() = SimulationResult {
            status: ExecutionStatus {
                status: status.to_string(),
                error: error.map(str::to_string),
            },
            gas_used: gas,
        };
        self
    }

    pub fn with_execution(self, response: ExecutionResponse) -> Self {
        *self.execution.lock().unwrap() = response;
        self
    }

    /// Executions report `failure` with `error`.
    pub fn with_failed_execution(self, error: &str) -> Self {
        let response = ExecutionResponse {
            digest: Some(DIGEST.to_string()),
            effects: Some(TransactionEffects {
                status: ExecutionStatus {
                    status: "failure".to_string(),
                    error: Some(error.to_string()),
                },
                gas_used: None,
                created: Vec::new(),
            }),
            events: Vec::new(),
        };
        self.with_execution(response)
    }

    /// Executions create `created` (owned by `owner`) and emit `events`.
    pub fn with_created(self, owner: SuiAddress, created: ObjectId, events: Vec<LedgerEvent>) -> Self {
        let response = ExecutionResponse {
            digest: Some(DIGEST.to_string()),
            effects: Some(TransactionEffects {
                status: success_status(),
                gas_used: None,
                created: vec![CreatedObject {
                    owner: Some(json!({ "AddressOwner": owner.to_string() })),
                    reference: ObjectReference {
                        object_id: created.to_string(),
                    },
                }],
            }),
            events,
        };
        self.with_execution(response)
    }

    pub fn with_transport_failure(self, message: &str) -> Self {
        *self.transport_failure.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Builds fail unless the sender's balance covers the gas budget plus
    /// any paid amount, and dry runs fail with `InsufficientGas` when the
    /// budget is below the simulated cost.
    pub fn with_node_gas_checks(self) -> Self {
        self.gas_checks.store(true, Ordering::SeqCst);
        self
    }

    pub fn built_instructions(&self) -> Vec<Instruction> {
        self.built.lock().unwrap().clone()
    }

    pub fn executions(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    fn check_transport(&self) -> Result<(), LedgerError> {
        match self.transport_failure.lock().unwrap().as_ref() {
            Some(message) => Err(LedgerError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, owner: &SuiAddress) -> Result<u64, LedgerError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(owner)
            .copied()
            .unwrap_or(0))
    }

    async fn get_object(&self, id: &ObjectId) -> Result<Option<ObjectInfo>, LedgerError> {
        self.check_transport()?;
        Ok(self.objects.lock().unwrap().get(id).cloned())
    }

    async fn find_owned_object(
        &self,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<Option<ObjectId>, LedgerError> {
        self.check_transport()?;
        Ok(self
            .owned
            .lock()
            .unwrap()
            .get(&(*owner, struct_type.to_string()))
            .copied())
    }

    async fn build(&self, instruction: &Instruction) -> Result<TransactionBytes, LedgerError> {
        self.check_transport()?;
        if self.gas_checks.load(Ordering::SeqCst) {
            let paid = match instruction.kind {
                InstructionKind::PaySui { amount, .. } => amount,
                InstructionKind::MoveCall(_) => 0,
            };
            let needed = u128::from(instruction.gas_budget) + u128::from(paid);
            let balance = self
                .balances
                .lock()
                .unwrap()
                .get(&instruction.sender)
                .copied()
                .unwrap_or(0);
            if u128::from(balance) < needed {
                return Err(LedgerError::Rpc {
                    code: -32002,
                    message: format!(
                        "Balance of gas object is lower than the needed amount: {needed}"
                    ),
                });
            }
        }
        let mut built = self.built.lock().unwrap();
        built.push(instruction.clone());
        Ok(TransactionBytes(vec![built.len() as u8]))
    }

    async fn simulate(&self, tx: &TransactionBytes) -> Result<SimulationResult, LedgerError> {
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;
        let mut simulation = self.simulation.lock().unwrap().clone();
        if self.gas_checks.load(Ordering::SeqCst) {
            let budget = tx
                .0
                .first()
                .and_then(|n| usize::from(*n).checked_sub(1))
                .and_then(|index| self.built.lock().unwrap().get(index).cloned())
                .map(|instruction| instruction.gas_budget)
                .unwrap_or(0);
            let cost = u128::from(simulation.gas_used.computation_cost)
                + u128::from(simulation.gas_used.storage_cost);
            if u128::from(budget) < cost {
                simulation.status = ExecutionStatus {
                    status: "failure".to_string(),
                    error: Some("InsufficientGas".to_string()),
                };
            }
        }
        Ok(simulation)
    }

    async fn execute(
        &self,
        _tx: &TransactionBytes,
        signature: &str,
    ) -> Result<ExecutionResponse, LedgerError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;
        self.signatures.lock().unwrap().push(signature.to_string());
        Ok(self.execution.lock().unwrap().clone())
    }

    async fn chain_identifier(&self) -> Result<String, LedgerError> {
        self.check_transport()?;
        Ok("4c78adac".to_string())
    }
}
