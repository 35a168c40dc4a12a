// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger client boundary and the Sui full-node JSON-RPC implementation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::transaction::{Instruction, InstructionKind, TransactionBytes};
use super::types::*;

/// Maximum number of gas coins merged into a native transfer.
const MAX_INPUT_COINS: usize = 256;

/// Page size for owned-object and coin queries.
const PAGE_LIMIT: usize = 50;

/// Errors that can occur while talking to the ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    /// The node could not be reached or did not answer with JSON-RPC.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node answered, but not with the shape we expected.
    #[error("Unexpected ledger response: {0}")]
    UnexpectedResponse(String),

    #[error("Sender {0} owns no SUI coins to pay for gas")]
    NoGasCoins(SuiAddress),
}

/// Capabilities the transfer workflow needs from a ledger.
///
/// `execute` is not idempotent: calling it twice with the same transaction
/// may be rejected by the ledger or, for freshly built bytes, move value
/// twice. Retrying is the caller's decision.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Native-token balance in MIST.
    async fn get_balance(&self, owner: &SuiAddress) -> Result<u64, LedgerError>;

    /// Object metadata, or `None` when the object does not exist.
    async fn get_object(&self, id: &ObjectId) -> Result<Option<ObjectInfo>, LedgerError>;

    /// First object of `struct_type` owned by `owner`.
    async fn find_owned_object(
        &self,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<Option<ObjectId>, LedgerError>;

    /// Turn an instruction into transaction bytes ready to sign.
    async fn build(&self, instruction: &Instruction) -> Result<TransactionBytes, LedgerError>;

    /// Execute speculatively without committing.
    async fn simulate(&self, tx: &TransactionBytes) -> Result<SimulationResult, LedgerError>;

    /// Submit signed bytes and wait for local execution.
    async fn execute(
        &self,
        tx: &TransactionBytes,
        signature: &str,
    ) -> Result<ExecutionResponse, LedgerError>;

    /// Identifier of the connected chain; used as a liveness probe.
    async fn chain_identifier(&self) -> Result<String, LedgerError>;
}

// =============================================================================
// JSON-RPC wire types
// =============================================================================

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResult {
    #[serde(deserialize_with = "de_u64")]
    total_balance: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<CoinEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinEntry {
    coin_object_id: String,
}

#[derive(Deserialize)]
struct ObjectResult {
    #[serde(default)]
    data: Option<ObjectData>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectData {
    object_id: String,
    #[serde(default, rename = "type")]
    object_type: Option<String>,
    #[serde(default)]
    owner: Option<Value>,
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Deserialize)]
struct OwnedObjectsPage {
    data: Vec<ObjectResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBlockBytes {
    tx_bytes: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DryRunResult {
    effects: DryRunEffects,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DryRunEffects {
    status: ExecutionStatus,
    gas_used: GasCostSummary,
}

impl ObjectData {
    fn into_info(self) -> Result<ObjectInfo, LedgerError> {
        let object_id = self.object_id.parse().map_err(|_| {
            LedgerError::UnexpectedResponse(format!("malformed object id `{}`", self.object_id))
        })?;

        let balance = self
            .content
            .as_ref()
            .and_then(|content| content.get("fields"))
            .and_then(|fields| fields.get("balance"))
            .and_then(|balance| match balance {
                Value::String(s) => s.parse().ok(),
                Value::Number(n) => n.as_u64(),
                _ => None,
            });

        Ok(ObjectInfo {
            object_id,
            object_type: self.object_type,
            owner: self.owner.as_ref().map(ObjectOwner::from_json),
            balance,
        })
    }
}

// =============================================================================
// Client
// =============================================================================

/// Sui full-node JSON-RPC client.
pub struct SuiRpcClient {
    rpc_url: url::Url,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    /// Create a client for the given endpoint.
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, LedgerError> {
        let rpc_url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            rpc_url,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a client for a well-known network.
    pub fn for_network(network: &NetworkConfig, timeout: Duration) -> Result<Self, LedgerError> {
        Self::new(network.rpc_url, timeout)
    }

    pub fn rpc_url(&self) -> &url::Url {
        &self.rpc_url
    }

    /// Make a JSON-RPC call and decode its `result`.
    async fn rpc_call<R>(&self, method: &str, params: Value) -> Result<R, LedgerError>
    where
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        tracing::debug!(method, "ledger rpc call");

        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| LedgerError::Transport(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(LedgerError::Transport(format!(
                "HTTP {} from {}",
                response.status(),
                method
            )));
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Transport(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = envelope.result.ok_or_else(|| {
            LedgerError::UnexpectedResponse(format!("no result in {} response", method))
        })?;

        serde_json::from_value(result)
            .map_err(|e| LedgerError::UnexpectedResponse(format!("{}: {}", method, e)))
    }

    /// SUI coins owned by `owner`, largest page first.
    async fn gas_coins(&self, owner: &SuiAddress) -> Result<Vec<String>, LedgerError> {
        let page: CoinPage = self
            .rpc_call(
                "suix_getCoins",
                json!([owner.to_string(), SUI_COIN_TYPE, Value::Null, MAX_INPUT_COINS]),
            )
            .await?;

        Ok(page.data.into_iter().map(|coin| coin.coin_object_id).collect())
    }

    fn decode_tx_bytes(block: TransactionBlockBytes) -> Result<TransactionBytes, LedgerError> {
        TransactionBytes::from_base64(&block.tx_bytes)
            .map_err(|e| LedgerError::UnexpectedResponse(format!("txBytes is not base64: {}", e)))
    }
}

#[async_trait]
impl LedgerClient for SuiRpcClient {
    async fn get_balance(&self, owner: &SuiAddress) -> Result<u64, LedgerError> {
        let balance: BalanceResult = self
            .rpc_call("suix_getBalance", json!([owner.to_string(), SUI_COIN_TYPE]))
            .await?;
        Ok(balance.total_balance)
    }

    async fn get_object(&self, id: &ObjectId) -> Result<Option<ObjectInfo>, LedgerError> {
        let result: ObjectResult = self
            .rpc_call(
                "sui_getObject",
                json!([
                    id.to_string(),
                    { "showType": true, "showOwner": true, "showContent": true }
                ]),
            )
            .await?;

        match (result.data, result.error) {
            (Some(data), _) => data.into_info().map(Some),
            (None, Some(error)) => {
                tracing::debug!(object_id = %id, %error, "object lookup returned error");
                Ok(None)
            }
            (None, None) => Err(LedgerError::UnexpectedResponse(format!(
                "object {} returned neither data nor error",
                id
            ))),
        }
    }

    async fn find_owned_object(
        &self,
        owner: &SuiAddress,
        struct_type: &str,
    ) -> Result<Option<ObjectId>, LedgerError> {
        let page: OwnedObjectsPage = self
            .rpc_call(
                "suix_getOwnedObjects",
                json!([
                    owner.to_string(),
                    {
                        "filter": { "StructType": struct_type },
                        "options": { "showType": true }
                    },
                    Value::Null,
                    PAGE_LIMIT
                ]),
            )
            .await?;

        for entry in page.data {
            let Some(data) = entry.data else { continue };
            if data.object_type.as_deref() == Some(struct_type) {
                return data.into_info().map(|info| Some(info.object_id));
            }
        }
        Ok(None)
    }

    async fn build(&self, instruction: &Instruction) -> Result<TransactionBytes, LedgerError> {
        let block: TransactionBlockBytes = match &instruction.kind {
            InstructionKind::PaySui { recipient, amount } => {
                let coins = self.gas_coins(&instruction.sender).await?;
                if coins.is_empty() {
                    return Err(LedgerError::NoGasCoins(instruction.sender));
                }
                self.rpc_call(
                    "unsafe_paySui",
                    json!([
                        instruction.sender.to_string(),
                        coins,
                        [recipient.to_string()],
                        [amount.to_string()],
                        instruction.gas_budget.to_string()
                    ]),
                )
                .await?
            }
            InstructionKind::MoveCall(call) => {
                let arguments: Vec<Value> = call.arguments.iter().map(|a| a.to_json()).collect();
                self.rpc_call(
                    "unsafe_moveCall",
                    json!([
                        instruction.sender.to_string(),
                        call.package.to_string(),
                        call.module,
                        call.function,
                        Vec::<String>::new(),
                        arguments,
                        Value::Null,
                        instruction.gas_budget.to_string(),
                        Value::Null
                    ]),
                )
                .await?
            }
        };

        Self::decode_tx_bytes(block)
    }

    async fn simulate(&self, tx: &TransactionBytes) -> Result<SimulationResult, LedgerError> {
        let dry_run: DryRunResult = self
            .rpc_call("sui_dryRunTransactionBlock", json!([tx.to_base64()]))
            .await?;

        Ok(SimulationResult {
            status: dry_run.effects.status,
            gas_used: dry_run.effects.gas_used,
        })
    }

    async fn execute(
        &self,
        tx: &TransactionBytes,
        signature: &str,
    ) -> Result<ExecutionResponse, LedgerError> {
        self.rpc_call(
            "sui_executeTransactionBlock",
            json!([
                tx.to_base64(),
                [signature],
                { "showEffects": true, "showEvents": true },
                "WaitForLocalExecution"
            ]),
        )
        .await
    }

    async fn chain_identifier(&self) -> Result<String, LedgerError> {
        self.rpc_call("sui_getChainIdentifier", json!([])).await
    }
}
