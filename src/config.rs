// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and is
//! immutable afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3001` |
//! | `SUI_NETWORK` | `mainnet`, `testnet`, `devnet` or `localnet` | `testnet` |
//! | `SUI_RPC_URL` | Full node JSON-RPC URL | network default |
//! | `PACKAGE_ID` | Package of the Wallet module | Required for Wallet operations |
//! | `MODULE_NAME` | Name of the Wallet module | Required for Wallet operations |
//! | `PRIVATE_KEY` | Credential used when a request carries none | Optional |
//! | `SENDER_WALLET_OBJECT_ID` | Default source Wallet object | Optional |
//! | `RECIPIENT_WALLET_OBJECT_ID` | Default destination Wallet object | Optional |
//! | `GAS_POLICY` | `fixed` or `simulated` | `simulated` |
//! | `GAS_BUDGET` | Fixed budget, and ceiling for simulated budgets (MIST) | `100000000` |
//! | `GAS_MARGIN_PERCENT` | Margin added to simulated gas, at most 1000 | `20` |
//! | `MIN_FUND_AMOUNT_MIST` | Smallest amount `/api/fund-sui-address` accepts | `1000000` |
//! | `RPC_TIMEOUT_SECS` | Ledger HTTP timeout | `30` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; HTTPS when both are set | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::ledger::transaction::{
    DEFAULT_GAS_BUDGET, DEFAULT_GAS_MARGIN_PERCENT, MAX_GAS_MARGIN_PERCENT,
};
use crate::ledger::types::SUI_TESTNET;
use crate::ledger::{GasPolicy, Keypair, MoveModule, NetworkConfig, ObjectId};
use crate::transfer::TransferSettings;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SUI_NETWORK_ENV: &str = "SUI_NETWORK";
pub const SUI_RPC_URL_ENV: &str = "SUI_RPC_URL";
pub const PACKAGE_ID_ENV: &str = "PACKAGE_ID";
pub const MODULE_NAME_ENV: &str = "MODULE_NAME";
/// Never logged.
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const SENDER_WALLET_OBJECT_ID_ENV: &str = "SENDER_WALLET_OBJECT_ID";
pub const RECIPIENT_WALLET_OBJECT_ID_ENV: &str = "RECIPIENT_WALLET_OBJECT_ID";
pub const GAS_POLICY_ENV: &str = "GAS_POLICY";
pub const GAS_BUDGET_ENV: &str = "GAS_BUDGET";
pub const GAS_MARGIN_PERCENT_ENV: &str = "GAS_MARGIN_PERCENT";
pub const MIN_FUND_AMOUNT_MIST_ENV: &str = "MIN_FUND_AMOUNT_MIST";
pub const RPC_TIMEOUT_SECS_ENV: &str = "RPC_TIMEOUT_SECS";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;

/// 0.001 SUI.
pub const DEFAULT_MIN_FUND_AMOUNT_MIST: u64 = 1_000_000;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

fn invalid(name: &'static str, reason: impl fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown format `{other}` (expected `json` or `pretty`)")),
        }
    }
}

/// TLS certificate and key paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

/// Process configuration.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub module: Option<MoveModule>,
    pub private_key: Option<String>,
    pub sender_wallet: Option<ObjectId>,
    pub recipient_wallet: Option<ObjectId>,
    pub gas_policy: GasPolicy,
    pub min_fund_amount_mist: u64,
    pub rpc_timeout: Duration,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            network: SUI_TESTNET,
            rpc_url: SUI_TESTNET.rpc_url.to_string(),
            module: None,
            private_key: None,
            sender_wallet: None,
            recipient_wallet: None,
            gas_policy: GasPolicy::default(),
            min_fund_amount_mist: DEFAULT_MIN_FUND_AMOUNT_MIST,
            rpc_timeout: Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS),
            tls: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("network", &self.network.name)
            .field("rpc_url", &self.rpc_url)
            .field("module", &self.module)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("sender_wallet", &self.sender_wallet)
            .field("recipient_wallet", &self.recipient_wallet)
            .field("gas_policy", &self.gas_policy)
            .field("min_fund_amount_mist", &self.min_fund_amount_mist)
            .field("rpc_timeout", &self.rpc_timeout)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish()
    }
}

fn parse_number<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e| invalid(name, e)),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let network = match get(SUI_NETWORK_ENV) {
            Some(name) => NetworkConfig::from_name(&name)
                .ok_or_else(|| invalid(SUI_NETWORK_ENV, format!("unknown network `{name}`")))?,
            None => SUI_TESTNET,
        };

        let rpc_url = get(SUI_RPC_URL_ENV).unwrap_or_else(|| network.rpc_url.to_string());
        url::Url::parse(&rpc_url).map_err(|e| invalid(SUI_RPC_URL_ENV, e))?;

        let module = match (get(PACKAGE_ID_ENV), get(MODULE_NAME_ENV)) {
            (Some(package), Some(module)) => {
                let package = package.trim().parse().map_err(|e| invalid(PACKAGE_ID_ENV, e))?;
                Some(MoveModule::new(package, module.trim()))
            }
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(PACKAGE_ID_ENV, MODULE_NAME_ENV)),
        };

        let object_id = |name: &'static str| -> Result<Option<ObjectId>, ConfigError> {
            get(name)
                .map(|value| value.trim().parse().map_err(|e| invalid(name, e)))
                .transpose()
        };
        let sender_wallet = object_id(SENDER_WALLET_OBJECT_ID_ENV)?;
        let recipient_wallet = object_id(RECIPIENT_WALLET_OBJECT_ID_ENV)?;

        let private_key = get(PRIVATE_KEY_ENV);
        if let Some(key) = &private_key {
            Keypair::from_hex(key).map_err(|e| invalid(PRIVATE_KEY_ENV, e))?;
        }

        let gas_budget = parse_number(GAS_BUDGET_ENV, get(GAS_BUDGET_ENV), DEFAULT_GAS_BUDGET)?;
        if gas_budget == 0 {
            return Err(invalid(GAS_BUDGET_ENV, "must be positive"));
        }
        let margin_percent = parse_number(
            GAS_MARGIN_PERCENT_ENV,
            get(GAS_MARGIN_PERCENT_ENV),
            DEFAULT_GAS_MARGIN_PERCENT,
        )?;
        if margin_percent > MAX_GAS_MARGIN_PERCENT {
            return Err(invalid(
                GAS_MARGIN_PERCENT_ENV,
                format!("must be at most {MAX_GAS_MARGIN_PERCENT}"),
            ));
        }
        let gas_policy = match get(GAS_POLICY_ENV)
            .map(|p| p.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("simulated") => GasPolicy::Simulated {
                margin_percent,
                provisional_budget: gas_budget,
            },
            Some("fixed") => GasPolicy::Fixed(gas_budget),
            Some(other) => {
                return Err(invalid(
                    GAS_POLICY_ENV,
                    format!("unknown policy `{other}` (expected `fixed` or `simulated`)"),
                ))
            }
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert_path), Some(key_path)) => Some(TlsPaths {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(format) => format.parse().map_err(|e: String| invalid(LOG_FORMAT_ENV, e))?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_number(PORT_ENV, get(PORT_ENV), DEFAULT_PORT)?,
            network,
            rpc_url,
            module,
            private_key,
            sender_wallet,
            recipient_wallet,
            gas_policy,
            min_fund_amount_mist: parse_number(
                MIN_FUND_AMOUNT_MIST_ENV,
                get(MIN_FUND_AMOUNT_MIST_ENV),
                DEFAULT_MIN_FUND_AMOUNT_MIST,
            )?,
            rpc_timeout: Duration::from_secs(parse_number(
                RPC_TIMEOUT_SECS_ENV,
                get(RPC_TIMEOUT_SECS_ENV),
                DEFAULT_RPC_TIMEOUT_SECS,
            )?),
            tls,
            log_format,
        })
    }

    /// Settings handed to the transfer orchestrator.
    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            module: self.module.clone(),
            gas_policy: self.gas_policy,
            default_credential: self.private_key.clone(),
            sender_wallet: self.sender_wallet,
            recipient_wallet: self.recipient_wallet,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
