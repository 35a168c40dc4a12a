// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer instruction assembly, amount conversion and gas budgeting.
//!
//! Everything in this module is pure: instructions are descriptions that a
//! [`LedgerClient`](super::LedgerClient) turns into transaction bytes.

use std::fmt;
use std::str::FromStr;

use base64ct::{Base64, Encoding};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use super::types::{GasCostSummary, ObjectId, SuiAddress, MIST_PER_SUI, SUI_DECIMALS};

// =============================================================================
// Move targets
// =============================================================================

/// The on-chain Wallet module (`{package}::{module}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveModule {
    pub package: ObjectId,
    pub module: String,
}

impl MoveModule {
    pub fn new(package: ObjectId, module: impl Into<String>) -> Self {
        Self {
            package,
            module: module.into(),
        }
    }

    /// Fully qualified type of a struct declared by this module.
    pub fn struct_type(&self, name: &str) -> String {
        format!("{}::{}::{}", self.package, self.module, name)
    }

    /// Type of the contract-managed Wallet object.
    pub fn wallet_type(&self) -> String {
        self.struct_type("Wallet")
    }

    pub fn call(&self, function: &str, arguments: Vec<CallArg>) -> MoveCall {
        MoveCall {
            package: self.package,
            module: self.module.clone(),
            function: function.to_string(),
            arguments,
        }
    }
}

/// Pure or object argument of a Move call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Object(ObjectId),
    Address(SuiAddress),
    U64(u64),
}

impl CallArg {
    /// JSON form accepted by the full node transaction builder.
    pub fn to_json(&self) -> Value {
        match self {
            CallArg::Object(id) => Value::String(id.to_string()),
            CallArg::Address(addr) => Value::String(addr.to_string()),
            CallArg::U64(n) => Value::String(n.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub arguments: Vec<CallArg>,
}

impl MoveCall {
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

// =============================================================================
// Instructions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionKind {
    /// Split `amount` off the sender's gas coins and send it to `recipient`.
    PaySui { recipient: SuiAddress, amount: u64 },
    /// Invoke a Move function.
    MoveCall(MoveCall),
}

/// A transaction description annotated with its gas budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub sender: SuiAddress,
    pub kind: InstructionKind,
    pub gas_budget: u64,
}

impl Instruction {
    pub fn with_gas_budget(mut self, gas_budget: u64) -> Self {
        self.gas_budget = gas_budget;
        self
    }
}

/// What a funded operation does, with every identifier already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferAction {
    /// Native-unit transfer to a bare address.
    Native { recipient: SuiAddress },
    /// `transfer_to_wallet(source, destination, amount)`
    WalletToWallet {
        module: MoveModule,
        source: ObjectId,
        destination: ObjectId,
    },
    /// `transfer_to_address(source, recipient, amount)`
    WalletToAddress {
        module: MoveModule,
        source: ObjectId,
        recipient: SuiAddress,
    },
    /// `deposit(wallet, coin)`; the value moved is the coin itself.
    Deposit {
        module: MoveModule,
        wallet: ObjectId,
        coin: ObjectId,
    },
    /// Any other module call that moves no value (`create_wallet`, `create_address`).
    Call(MoveCall),
}

/// Assemble the instruction for `action`.
///
/// `amount` is ignored by actions whose value is implicit (`Deposit`, `Call`).
pub fn build_transfer_instruction(
    sender: SuiAddress,
    action: &TransferAction,
    amount: u64,
    gas_budget: u64,
) -> Instruction {
    let kind = match action {
        TransferAction::Native { recipient } => InstructionKind::PaySui {
            recipient: *recipient,
            amount,
        },
        TransferAction::WalletToWallet {
            module,
            source,
            destination,
        } => InstructionKind::MoveCall(module.call(
            "transfer_to_wallet",
            vec![
                CallArg::Object(*source),
                CallArg::Object(*destination),
                CallArg::U64(amount),
            ],
        )),
        TransferAction::WalletToAddress {
            module,
            source,
            recipient,
        } => InstructionKind::MoveCall(module.call(
            "transfer_to_address",
            vec![
                CallArg::Object(*source),
                CallArg::Address(*recipient),
                CallArg::U64(amount),
            ],
        )),
        TransferAction::Deposit {
            module,
            wallet,
            coin,
        } => InstructionKind::MoveCall(
            module.call("deposit", vec![CallArg::Object(*wallet), CallArg::Object(*coin)]),
        ),
        TransferAction::Call(call) => InstructionKind::MoveCall(call.clone()),
    };

    Instruction {
        sender,
        kind,
        gas_budget,
    }
}

/// Serialized transaction data produced by the ledger's transaction builder.
#[derive(Clone, PartialEq, Eq)]
pub struct TransactionBytes(pub Vec<u8>);

impl TransactionBytes {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, base64ct::Error> {
        Base64::decode_vec(encoded).map(Self)
    }
}

impl fmt::Debug for TransactionBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionBytes({} bytes)", self.0.len())
    }
}

// =============================================================================
// Gas
// =============================================================================

/// Default fixed gas budget: 0.1 SUI.
pub const DEFAULT_GAS_BUDGET: u64 = 100_000_000;

/// Default safety margin applied to simulated gas costs.
pub const DEFAULT_GAS_MARGIN_PERCENT: u64 = 20;

/// Largest accepted simulation margin (10x the simulated cost).
pub const MAX_GAS_MARGIN_PERCENT: u64 = 1000;

/// Full nodes refuse budgets below the base transaction cost
/// (1000 units at a reference gas price of up to 1000 MIST).
pub const MIN_GAS_BUDGET: u64 = 1_000_000;

/// How the gas budget of an instruction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPolicy {
    /// Reserve the same budget for every transaction.
    Fixed(u64),
    /// Dry-run the transaction (built with `provisional_budget`) and reserve
    /// computation + storage cost plus `margin_percent`.
    Simulated {
        margin_percent: u64,
        provisional_budget: u64,
    },
}

impl Default for GasPolicy {
    fn default() -> Self {
        GasPolicy::Simulated {
            margin_percent: DEFAULT_GAS_MARGIN_PERCENT,
            provisional_budget: DEFAULT_GAS_BUDGET,
        }
    }
}

impl GasPolicy {
    /// Budget used before (or instead of) simulation.
    pub fn base_budget(&self) -> u64 {
        match self {
            GasPolicy::Fixed(budget) => *budget,
            GasPolicy::Simulated {
                provisional_budget, ..
            } => *provisional_budget,
        }
    }
}

/// `floor((computation + storage) * (100 + margin) / 100)`, saturating.
pub fn budget_from_simulation(gas_used: &GasCostSummary, margin_percent: u64) -> u64 {
    let cost = u128::from(gas_used.computation_cost) + u128::from(gas_used.storage_cost);
    let budget = cost * (100 + u128::from(margin_percent)) / 100;
    u64::try_from(budget).unwrap_or(u64::MAX)
}

// =============================================================================
// Amounts
// =============================================================================

/// Unit an incoming amount is denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountUnit {
    /// Whole SUI; converted by ×10⁹ and truncation.
    Sui,
    /// Smallest indivisible unit; must already be an integer.
    Mist,
}

impl fmt::Display for AmountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountUnit::Sui => f.write_str("SUI"),
            AmountUnit::Mist => f.write_str("MIST"),
        }
    }
}

impl FromStr for AmountUnit {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sui" => Ok(AmountUnit::Sui),
            "mist" => Ok(AmountUnit::Mist),
            other => Err(AmountError::Invalid(format!(
                "unknown unit `{other}` (expected `sui` or `mist`)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Invalid amount: must be a positive number")]
    NotPositive,

    #[error("Amount must be an integer in MIST, got {0}")]
    NotInteger(Decimal),

    #[error("Amount too large")]
    Overflow,

    #[error("Amount too small: {amount} MIST, minimum {minimum} MIST ({minimum_sui} SUI)")]
    BelowMinimum {
        amount: u64,
        minimum: u64,
        minimum_sui: String,
    },
}

/// A requested amount before conversion to MIST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount {
    pub value: Decimal,
    pub unit: AmountUnit,
}

impl Amount {
    pub fn new(value: Decimal, unit: AmountUnit) -> Self {
        Self { value, unit }
    }

    /// Parse a decimal string such as `"0.006"`.
    pub fn parse(text: &str, unit: AmountUnit) -> Result<Self, AmountError> {
        let value = Decimal::from_str(text.trim())
            .map_err(|e| AmountError::Invalid(format!("`{}`: {}", text.trim(), e)))?;
        Ok(Self::new(value, unit))
    }

    /// Convert a JSON number via its shortest decimal rendering, so `0.006`
    /// stays `0.006` instead of its binary approximation.
    pub fn from_f64(value: f64, unit: AmountUnit) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotPositive);
        }
        Self::parse(&value.to_string(), unit)
    }

    /// Amount in MIST, truncated toward zero. Fails unless the result is a
    /// positive integer.
    pub fn to_mist(&self) -> Result<u64, AmountError> {
        if self.value <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }

        let mist = match self.unit {
            AmountUnit::Mist => {
                if !self.value.fract().is_zero() {
                    return Err(AmountError::NotInteger(self.value));
                }
                self.value
            }
            AmountUnit::Sui => self
                .value
                .checked_mul(Decimal::from(MIST_PER_SUI))
                .ok_or(AmountError::Overflow)?
                .trunc(),
        };

        let mist = mist.to_u64().ok_or(AmountError::Overflow)?;
        if mist == 0 {
            return Err(AmountError::NotPositive);
        }
        Ok(mist)
    }
}

/// Enforce a lower bound on a converted amount.
pub fn ensure_minimum(amount: u64, minimum: u64) -> Result<(), AmountError> {
    if amount < minimum {
        return Err(AmountError::BelowMinimum {
            amount,
            minimum,
            minimum_sui: format_sui(minimum),
        });
    }
    Ok(())
}

/// Format MIST as SUI without trailing zeros.
pub fn format_sui(mist: u64) -> String {
    if mist == 0 {
        return "0".to_string();
    }

    let whole = mist / MIST_PER_SUI;
    let remainder = mist % MIST_PER_SUI;

    if remainder == 0 {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = SUI_DECIMALS as usize);
        format!("{}.{}", whole, decimal_str.trim_end_matches('0'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> MoveModule {
        MoveModule::new(
            "0x03355332cb05eb346e8b71de30c374726bb703f00c15582b598e11a01693009e"
                .parse()
                .unwrap(),
            "wallet",
        )
    }

    fn addr(byte: u8) -> SuiAddress {
        SuiAddress::new([byte; 32])
    }

    fn sui(text: &str) -> Result<u64, AmountError> {
        Amount::parse(text, AmountUnit::Sui)?.to_mist()
    }

    #[test]
    fn test_sui_to_mist_conversion() {
        assert_eq!(sui("0.006").unwrap(), 6_000_000);
        assert_eq!(sui("0.0001").unwrap(), 100_000);
        assert_eq!(sui("1").unwrap(), MIST_PER_SUI);
        assert_eq!(sui("0.00015").unwrap(), 150_000);
    }

    #[test]
    fn test_conversion_truncates() {
        assert_eq!(sui("0.0000000015").unwrap(), 1);
        assert_eq!(sui("0.0000000019").unwrap(), 1);
    }

    #[test]
    fn test_from_f64_uses_shortest_rendering() {
        let amount = Amount::from_f64(0.006, AmountUnit::Sui).unwrap();
        assert_eq!(amount.to_mist().unwrap(), 6_000_000);

        let amount = Amount::from_f64(0.57, AmountUnit::Sui).unwrap();
        assert_eq!(amount.to_mist().unwrap(), 570_000_000);

        let amount = Amount::from_f64(0.0000000015, AmountUnit::Sui).unwrap();
        assert_eq!(amount.to_mist().unwrap(), 1);
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        assert_eq!(sui("0"), Err(AmountError::NotPositive));
        assert_eq!(sui("-1"), Err(AmountError::NotPositive));
        // Truncates to zero MIST
        assert_eq!(sui("0.0000000001"), Err(AmountError::NotPositive));
        assert_eq!(
            Amount::from_f64(f64::NAN, AmountUnit::Sui).unwrap_err(),
            AmountError::NotPositive
        );
    }

    #[test]
    fn test_mist_must_be_integer() {
        let amount = Amount::parse("12000000", AmountUnit::Mist).unwrap();
        assert_eq!(amount.to_mist().unwrap(), 12_000_000);

        let err = Amount::parse("1.5", AmountUnit::Mist)
            .unwrap()
            .to_mist()
            .unwrap_err();
        assert_eq!(err.to_string(), "Amount must be an integer in MIST, got 1.5");
    }

    #[test]
    fn test_overflow_and_garbage() {
        assert_eq!(sui("100000000000000000000"), Err(AmountError::Overflow));
        assert!(matches!(sui("abc"), Err(AmountError::Invalid(_))));
        assert!("gwei".parse::<AmountUnit>().is_err());
        assert_eq!("SUI".parse::<AmountUnit>().unwrap(), AmountUnit::Sui);
    }

    #[test]
    fn test_minimum() {
        assert!(ensure_minimum(1_000_000, 1_000_000).is_ok());
        let err = ensure_minimum(999_999, 1_000_000).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Amount too small: 999999 MIST, minimum 1000000 MIST (0.001 SUI)"
        );
    }

    #[test]
    fn test_format_sui() {
        assert_eq!(format_sui(0), "0");
        assert_eq!(format_sui(MIST_PER_SUI), "1");
        assert_eq!(format_sui(1_500_000_000), "1.5");
        assert_eq!(format_sui(12_000_000), "0.012");
        assert_eq!(format_sui(1), "0.000000001");
    }

    #[test]
    fn test_native_instruction() {
        let instruction = build_transfer_instruction(
            addr(1),
            &TransferAction::Native { recipient: addr(2) },
            5_000_000,
            DEFAULT_GAS_BUDGET,
        );

        assert_eq!(instruction.sender, addr(1));
        assert_eq!(instruction.gas_budget, DEFAULT_GAS_BUDGET);
        assert_eq!(
            instruction.kind,
            InstructionKind::PaySui {
                recipient: addr(2),
                amount: 5_000_000
            }
        );
    }

    #[test]
    fn test_wallet_to_wallet_instruction() {
        let source = ObjectId::new([3; 32]);
        let destination = ObjectId::new([4; 32]);
        let instruction = build_transfer_instruction(
            addr(1),
            &TransferAction::WalletToWallet {
                module: module(),
                source,
                destination,
            },
            15_000,
            42,
        );

        let InstructionKind::MoveCall(call) = instruction.kind else {
            panic!("expected a move call");
        };
        assert!(call.target().ends_with("::wallet::transfer_to_wallet"));
        assert_eq!(
            call.arguments,
            vec![
                CallArg::Object(source),
                CallArg::Object(destination),
                CallArg::U64(15_000)
            ]
        );
        assert_eq!(instruction.gas_budget, 42);
    }

    #[test]
    fn test_deposit_ignores_amount() {
        let instruction = build_transfer_instruction(
            addr(1),
            &TransferAction::Deposit {
                module: module(),
                wallet: ObjectId::new([5; 32]),
                coin: ObjectId::new([6; 32]),
            },
            999,
            1,
        );
        let InstructionKind::MoveCall(call) = instruction.kind else {
            panic!("expected a move call");
        };
        assert_eq!(call.function, "deposit");
        assert_eq!(call.arguments.len(), 2);
    }

    #[test]
    fn test_call_arg_json() {
        assert_eq!(CallArg::U64(7).to_json(), serde_json::json!("7"));
        assert_eq!(
            CallArg::Address(addr(0xab)).to_json(),
            serde_json::json!(format!("0x{}", "ab".repeat(32)))
        );
    }

    #[test]
    fn test_wallet_type() {
        assert_eq!(
            module().wallet_type(),
            "0x03355332cb05eb346e8b71de30c374726bb703f00c15582b598e11a01693009e::wallet::Wallet"
        );
    }

    #[test]
    fn test_budget_from_simulation_adds_margin() {
        let gas = GasCostSummary {
            computation_cost: 1_000_000,
            storage_cost: 2_000_000,
            storage_rebate: 500_000,
        };
        assert_eq!(budget_from_simulation(&gas, 20), 3_600_000);
        assert_eq!(budget_from_simulation(&gas, 0), 3_000_000);

        // Floors fractional results
        let odd = GasCostSummary {
            computation_cost: 7,
            storage_cost: 0,
            storage_rebate: 0,
        };
        assert_eq!(budget_from_simulation(&odd, 20), 8);
    }

    #[test]
    fn test_budget_from_simulation_never_overflows() {
        let gas = GasCostSummary {
            computation_cost: 1,
            storage_cost: 1,
            storage_rebate: 0,
        };
        assert!(budget_from_simulation(&gas, u64::MAX) > u64::MAX / 50);

        let huge = GasCostSummary {
            computation_cost: u64::MAX,
            storage_cost: u64::MAX,
            storage_rebate: 0,
        };
        assert_eq!(budget_from_simulation(&huge, MAX_GAS_MARGIN_PERCENT), u64::MAX);
    }

    #[test]
    fn test_transaction_bytes_base64() {
        let tx = TransactionBytes(vec![0, 1, 2, 250]);
        let encoded = tx.to_base64();
        assert_eq!(TransactionBytes::from_base64(&encoded).unwrap(), tx);
    }
}
