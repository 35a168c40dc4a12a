// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number of MIST in one SUI.
pub const MIST_PER_SUI: u64 = 1_000_000_000;

/// Decimals of the native token.
pub const SUI_DECIMALS: u32 = 9;

/// Coin type of the native token.
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Object type of a native-token coin.
pub const SUI_COIN_OBJECT_TYPE: &str = "0x2::coin::Coin<0x2::sui::SUI>";

/// Canonical execution status reported for a successful transaction.
pub const STATUS_SUCCESS: &str = "success";

/// Sui network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Full node JSON-RPC endpoint
    pub rpc_url: &'static str,
    /// Block explorer base URL
    pub explorer_url: &'static str,
}

/// Sui mainnet.
pub const SUI_MAINNET: NetworkConfig = NetworkConfig {
    name: "mainnet",
    rpc_url: "https://fullnode.mainnet.sui.io:443",
    explorer_url: "https://suiscan.xyz/mainnet",
};

/// Sui testnet.
pub const SUI_TESTNET: NetworkConfig = NetworkConfig {
    name: "testnet",
    rpc_url: "https://fullnode.testnet.sui.io:443",
    explorer_url: "https://suiscan.xyz/testnet",
};

/// Sui devnet.
pub const SUI_DEVNET: NetworkConfig = NetworkConfig {
    name: "devnet",
    rpc_url: "https://fullnode.devnet.sui.io:443",
    explorer_url: "https://suiscan.xyz/devnet",
};

/// Local validator started with `sui start`.
pub const SUI_LOCALNET: NetworkConfig = NetworkConfig {
    name: "localnet",
    rpc_url: "http://127.0.0.1:9000",
    explorer_url: "http://127.0.0.1:9000",
};

impl NetworkConfig {
    /// Look up a network by name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Some(SUI_MAINNET),
            "testnet" => Some(SUI_TESTNET),
            "devnet" => Some(SUI_DEVNET),
            "localnet" => Some(SUI_LOCALNET),
            _ => None,
        }
    }

    /// Explorer link for a transaction digest.
    pub fn transaction_url(&self, digest: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, digest)
    }
}

// =============================================================================
// Addresses and object IDs
// =============================================================================

/// Error returned when a string is not a `0x`-prefixed 32-byte hex identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("must be a 66-character hex string starting with 0x")]
pub struct IdentifierParseError;

fn parse_hex32(value: &str) -> Result<[u8; 32], IdentifierParseError> {
    let hex_part = value.strip_prefix("0x").ok_or(IdentifierParseError)?;
    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(IdentifierParseError);
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hex_part, &mut bytes).map_err(|_| IdentifierParseError)?;
    Ok(bytes)
}

/// A 32-byte account address, rendered as `0x` + 64 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SuiAddress([u8; 32]);

impl SuiAddress {
    pub const LENGTH: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({self})")
    }
}

impl FromStr for SuiAddress {
    type Err = IdentifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s).map(Self)
    }
}

/// A 32-byte on-chain object identifier (Wallet objects, coins, packages).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId([u8; 32]);

impl ObjectId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({self})")
    }
}

impl FromStr for ObjectId {
    type Err = IdentifierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex32(s).map(Self)
    }
}

// =============================================================================
// Ledger responses
// =============================================================================

/// Who owns an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOwner {
    Address(SuiAddress),
    Object(ObjectId),
    Shared,
    Immutable,
    /// Ownership kinds this gateway does not interpret.
    Other(String),
}

impl ObjectOwner {
    /// Interpret the JSON owner representation used by the full node.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) if s == "Immutable" => ObjectOwner::Immutable,
            Value::Object(map) => {
                if let Some(addr) = map.get("AddressOwner").and_then(Value::as_str) {
                    if let Ok(addr) = addr.parse() {
                        return ObjectOwner::Address(addr);
                    }
                }
                if let Some(id) = map.get("ObjectOwner").and_then(Value::as_str) {
                    if let Ok(id) = id.parse() {
                        return ObjectOwner::Object(id);
                    }
                }
                if map.contains_key("Shared") {
                    return ObjectOwner::Shared;
                }
                ObjectOwner::Other(value.to_string())
            }
            other => ObjectOwner::Other(other.to_string()),
        }
    }

    pub fn is_address(&self, address: &SuiAddress) -> bool {
        matches!(self, ObjectOwner::Address(owner) if owner == address)
    }
}

/// Object metadata returned by an object lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub object_id: ObjectId,
    /// Fully qualified Move type, e.g. `0x..::wallet::Wallet`
    pub object_type: Option<String>,
    pub owner: Option<ObjectOwner>,
    /// `balance` field of the object content, when it has one (coins, Wallets)
    pub balance: Option<u64>,
}

/// Execution status block of transaction effects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Ledger-provided failure detail.
    pub fn failure_detail(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// Gas cost breakdown in MIST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(deserialize_with = "de_u64")]
    pub computation_cost: u64,
    #[serde(deserialize_with = "de_u64")]
    pub storage_cost: u64,
    #[serde(default, deserialize_with = "de_u64")]
    pub storage_rebate: u64,
}

/// Reference to an object created by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedObject {
    #[serde(default)]
    pub owner: Option<Value>,
    pub reference: ObjectReference,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub object_id: String,
}

/// Transaction effects relevant to this gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    #[serde(default)]
    pub gas_used: Option<GasCostSummary>,
    #[serde(default)]
    pub created: Vec<CreatedObject>,
}

/// Move event emitted by a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
}

/// Result of a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    pub status: ExecutionStatus,
    pub gas_used: GasCostSummary,
}

/// Response of a transaction execution.
///
/// Fields are optional because the node omits them on some failure paths;
/// callers must validate presence before trusting the result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponse {
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

/// Accepts `"123"` or `123`; the full node encodes 64-bit integers as strings.
pub(crate) fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xb7cd2f1248678984499a78ee51e14a01d1a9efe4d23f11469c3c29a11e4fdf6f";

    #[test]
    fn address_parses_and_renders_lowercase() {
        let upper = ADDR.to_uppercase().replacen("0X", "0x", 1);
        let addr: SuiAddress = upper.parse().unwrap();
        assert_eq!(addr.to_string(), ADDR);
        assert_eq!(addr.to_string().len(), 66);
    }

    #[test]
    fn address_rejects_bad_shapes() {
        assert!("b7cd2f1248678984499a78ee51e14a01d1a9efe4d23f11469c3c29a11e4fdf6f"
            .parse::<SuiAddress>()
            .is_err());
        assert!("0x1234".parse::<SuiAddress>().is_err());
        assert!("0xzzcd2f1248678984499a78ee51e14a01d1a9efe4d23f11469c3c29a11e4fdf6f"
            .parse::<SuiAddress>()
            .is_err());
        assert!(format!("{ADDR}00").parse::<ObjectId>().is_err());
    }

    #[test]
    fn owner_from_json_variants() {
        let owner = ObjectOwner::from_json(&serde_json::json!({ "AddressOwner": ADDR }));
        assert!(owner.is_address(&ADDR.parse().unwrap()));

        let shared =
            ObjectOwner::from_json(&serde_json::json!({ "Shared": { "initial_shared_version": 3 } }));
        assert_eq!(shared, ObjectOwner::Shared);

        assert_eq!(
            ObjectOwner::from_json(&serde_json::json!("Immutable")),
            ObjectOwner::Immutable
        );
    }

    #[test]
    fn effects_deserialize_string_encoded_costs() {
        let effects: TransactionEffects = serde_json::from_value(serde_json::json!({
            "status": { "status": "failure", "error": "InsufficientGas" },
            "gasUsed": {
                "computationCost": "1000000",
                "storageCost": 1976000,
                "storageRebate": "978120"
            }
        }))
        .unwrap();

        assert!(!effects.status.is_success());
        assert_eq!(effects.status.failure_detail(), "InsufficientGas");
        let gas = effects.gas_used.unwrap();
        assert_eq!(gas.computation_cost, 1_000_000);
        assert_eq!(gas.storage_cost, 1_976_000);
        assert!(effects.created.is_empty());
    }

    #[test]
    fn network_lookup() {
        assert_eq!(NetworkConfig::from_name("TestNet"), Some(SUI_TESTNET));
        assert!(NetworkConfig::from_name("fuji").is_none());
        assert_eq!(
            SUI_TESTNET.transaction_url("abc"),
            "https://suiscan.xyz/testnet/tx/abc"
        );
    }
}
