// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The funded-transfer workflow.
//!
//! Every value-moving operation goes through the same steps: validate the
//! request, derive the sender from its credential, resolve any Wallet
//! objects involved, size the gas budget, check that the sender can cover
//! amount plus gas, then build, sign and submit.

use std::sync::Arc;

use crate::ledger::transaction::{
    budget_from_simulation, ensure_minimum, CallArg, MIN_GAS_BUDGET,
};
use crate::ledger::types::{ObjectInfo, SUI_COIN_OBJECT_TYPE};
use crate::ledger::{
    build_transfer_instruction, Amount, GasPolicy, Instruction, Keypair, LedgerClient, MoveModule,
    ObjectId, ObjectOwner, SuiAddress, TransferAction,
};

use super::error::{ErrorKind, TransferError};
use super::outcome::{
    AddressRegistration, TransferOutcome, TransferReceipt, TransferState, WalletCreation,
};

/// Where a funded transfer sends value. Identifiers are unvalidated input.
#[derive(Debug, Clone)]
pub enum TransferTarget {
    /// Native SUI to a bare address.
    Address { recipient: String },
    /// Wallet object to Wallet object.
    ///
    /// `recipient_owner` is used to discover the destination Wallet when no
    /// object id is given or configured.
    WalletToWallet {
        source: Option<String>,
        destination: Option<String>,
        recipient_owner: Option<String>,
    },
    /// Wallet object to a bare address.
    WalletToAddress {
        source: Option<String>,
        recipient: String,
    },
}

/// Input of [`TransferOrchestrator::transfer`].
#[derive(Debug, Clone)]
pub struct TransferRequest {
    /// Hex secret key; falls back to the configured credential.
    pub credential: Option<String>,
    pub target: TransferTarget,
    pub amount: Amount,
    /// Lower bound on the converted amount, in MIST.
    pub min_amount_mist: Option<u64>,
}

/// Input of [`TransferOrchestrator::deposit`].
#[derive(Debug, Clone)]
pub struct DepositRequest {
    pub credential: Option<String>,
    pub wallet: String,
    pub coin: String,
}

/// Immutable settings resolved once at startup.
#[derive(Clone, Default)]
pub struct TransferSettings {
    /// Wallet module; required for every Wallet operation.
    pub module: Option<MoveModule>,
    pub gas_policy: GasPolicy,
    /// Credential used when a request does not carry one.
    pub default_credential: Option<String>,
    pub sender_wallet: Option<ObjectId>,
    pub recipient_wallet: Option<ObjectId>,
}

#[derive(Debug)]
enum ValidatedTarget {
    Native(SuiAddress),
    WalletToWallet {
        module: MoveModule,
        source: Option<ObjectId>,
        destination: Option<ObjectId>,
        recipient_owner: Option<SuiAddress>,
    },
    WalletToAddress {
        module: MoveModule,
        source: Option<ObjectId>,
        recipient: SuiAddress,
    },
}

/// Tracks and logs state transitions of one operation.
struct Progress {
    operation: &'static str,
    state: TransferState,
}

impl Progress {
    fn start(operation: &'static str) -> Self {
        tracing::debug!(operation, state = %TransferState::Validating, "operation started");
        Self {
            operation,
            state: TransferState::Validating,
        }
    }

    fn advance(&mut self, next: TransferState) {
        tracing::debug!(
            operation = self.operation,
            from = %self.state,
            to = %next,
            "state transition"
        );
        self.state = next;
    }

    fn finish<T>(mut self, result: Result<T, TransferError>) -> Result<T, TransferError> {
        match &result {
            Ok(_) => self.advance(TransferState::Succeeded),
            Err(err) => {
                let failed_in = self.state;
                self.advance(TransferState::Failed);
                if err.kind() == ErrorKind::Integration {
                    tracing::error!(
                        operation = self.operation,
                        state = %failed_in,
                        error = %err,
                        "ledger integration failure"
                    );
                } else {
                    tracing::warn!(
                        operation = self.operation,
                        state = %failed_in,
                        error = %err,
                        "operation failed"
                    );
                }
            }
        }
        result
    }
}

fn parse_address(field: &str, value: &str) -> Result<SuiAddress, TransferError> {
    value
        .trim()
        .parse()
        .map_err(|e| TransferError::validation(format!("Invalid {field}: {e}")))
}

fn parse_object_id(field: &str, value: &str) -> Result<ObjectId, TransferError> {
    value
        .trim()
        .parse()
        .map_err(|e| TransferError::validation(format!("Invalid {field}: {e}")))
}

fn parse_optional_object_id(
    field: &str,
    value: Option<&str>,
) -> Result<Option<ObjectId>, TransferError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_object_id(field, v))
        .transpose()
}

/// Validate an execution response and turn it into a receipt.
fn interpret_execution(
    response: crate::ledger::types::ExecutionResponse,
    sender: SuiAddress,
) -> Result<TransferReceipt, TransferError> {
    let effects = response
        .effects
        .ok_or_else(|| TransferError::integration("Ledger response is missing transaction effects"))?;

    if !effects.status.is_success() {
        return Err(TransferError::TransactionRejected(
            effects.status.failure_detail(),
        ));
    }

    let digest = response
        .digest
        .filter(|digest| !digest.is_empty())
        .ok_or_else(|| {
            TransferError::integration("Ledger response is missing the transaction digest")
        })?;

    Ok(TransferReceipt {
        digest,
        sender,
        effects,
        events: response.events,
    })
}

/// First created object, preferring one owned by `preferred_owner`.
fn created_object(
    receipt: &TransferReceipt,
    preferred_owner: &SuiAddress,
) -> Result<ObjectId, TransferError> {
    let created = &receipt.effects.created;
    let chosen = created
        .iter()
        .find(|object| {
            object
                .owner
                .as_ref()
                .map(ObjectOwner::from_json)
                .is_some_and(|owner| owner.is_address(preferred_owner))
        })
        .or_else(|| created.first())
        .ok_or_else(|| {
            TransferError::integration("Failed to extract Wallet object ID from transaction effects")
        })?;

    chosen.reference.object_id.parse().map_err(|_| {
        TransferError::integration(format!(
            "Malformed created object id `{}`",
            chosen.reference.object_id
        ))
    })
}

/// Runs funded operations against a ledger.
///
/// Holds only immutable settings and a shared client, so one instance
/// serves every request concurrently.
#[derive(Clone)]
pub struct TransferOrchestrator {
    ledger: Arc<dyn LedgerClient>,
    settings: TransferSettings,
}

impl TransferOrchestrator {
    pub fn new(ledger: Arc<dyn LedgerClient>, settings: TransferSettings) -> Self {
        Self { ledger, settings }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    // =========================================================================
    // Identity
    // =========================================================================

    fn keypair(&self, credential: Option<&str>) -> Result<Keypair, TransferError> {
        let credential = credential
            .filter(|c| !c.trim().is_empty())
            .or(self.settings.default_credential.as_deref());
        Ok(Keypair::from_optional(credential)?)
    }

    /// Address owned by `credential` (or the configured credential).
    pub fn derive_address(&self, credential: Option<&str>) -> Result<SuiAddress, TransferError> {
        self.keypair(credential).map(|keypair| keypair.address())
    }

    fn module(&self) -> Result<&MoveModule, TransferError> {
        self.settings.module.as_ref().ok_or_else(|| {
            TransferError::validation(
                "PACKAGE_ID and MODULE_NAME must be configured for Wallet operations",
            )
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Native balance of `address` in MIST.
    pub async fn balance(&self, address: &str) -> Result<u64, TransferError> {
        let address = parse_address("address", address)?;
        Ok(self.ledger.get_balance(&address).await?)
    }

    /// Wallet object owned by `owner`, if any.
    pub async fn find_wallet_object(&self, owner: &str) -> Result<Option<ObjectId>, TransferError> {
        let owner = parse_address("address", owner)?;
        let wallet_type = self.module()?.wallet_type();
        Ok(self.ledger.find_owned_object(&owner, &wallet_type).await?)
    }

    /// Fails with `InsufficientFunds` unless `balance >= amount + gas_budget`.
    /// Returns the balance.
    pub async fn check_sufficiency(
        &self,
        address: &SuiAddress,
        amount: u64,
        gas_budget: u64,
    ) -> Result<u64, TransferError> {
        let required = amount
            .checked_add(gas_budget)
            .ok_or_else(|| TransferError::validation("Amount plus gas budget is too large"))?;

        let balance = self.ledger.get_balance(address).await?;
        tracing::debug!(%address, balance, required, "balance check");

        if balance < required {
            return Err(TransferError::InsufficientFunds { balance, required });
        }
        Ok(balance)
    }

    // =========================================================================
    // Wallet objects
    // =========================================================================

    async fn verify_wallet(
        &self,
        module: &MoveModule,
        id: ObjectId,
    ) -> Result<ObjectInfo, TransferError> {
        let info = self
            .ledger
            .get_object(&id)
            .await?
            .ok_or_else(|| TransferError::validation(format!("Wallet object {id} does not exist")))?;

        let expected = module.wallet_type();
        if info.object_type.as_deref() != Some(expected.as_str()) {
            return Err(TransferError::validation(format!(
                "Object {id} is not a {expected}"
            )));
        }
        Ok(info)
    }

    async fn resolve_source_wallet(
        &self,
        module: &MoveModule,
        requested: Option<ObjectId>,
        sender: &SuiAddress,
    ) -> Result<ObjectId, TransferError> {
        let id = match requested.or(self.settings.sender_wallet) {
            Some(id) => id,
            None => self
                .ledger
                .find_owned_object(sender, &module.wallet_type())
                .await?
                .ok_or_else(|| {
                    TransferError::validation(format!("No Wallet object found for address {sender}"))
                })?,
        };

        let info = self.verify_wallet(module, id).await?;
        match info.owner {
            Some(ObjectOwner::Shared) => {}
            Some(ref owner) if owner.is_address(sender) => {}
            _ => {
                return Err(TransferError::validation(format!(
                    "Wallet object {id} is not owned by {sender}"
                )))
            }
        }
        Ok(id)
    }

    async fn resolve_destination_wallet(
        &self,
        module: &MoveModule,
        requested: Option<ObjectId>,
        recipient_owner: Option<SuiAddress>,
    ) -> Result<ObjectId, TransferError> {
        let id = match (requested.or(self.settings.recipient_wallet), recipient_owner) {
            (Some(id), _) => id,
            (None, Some(owner)) => self
                .ledger
                .find_owned_object(&owner, &module.wallet_type())
                .await?
                .ok_or_else(|| {
                    TransferError::validation(format!(
                        "Recipient ({owner}) does not have a Wallet object. A Wallet object is required to transfer funds."
                    ))
                })?,
            (None, None) => {
                return Err(TransferError::validation(
                    "Destination Wallet object ID is required",
                ))
            }
        };

        self.verify_wallet(module, id).await?;
        Ok(id)
    }

    // =========================================================================
    // Gas and submission
    // =========================================================================

    /// Size the gas budget from a dry run.
    ///
    /// A full node only builds a transaction whose gas coins cover its
    /// budget, so the dry run is built with what the sender can spare after
    /// `amount`, capped at `provisional_budget`. The estimate never exceeds
    /// that dry-run budget.
    async fn estimate_gas(
        &self,
        instruction: Instruction,
        amount: u64,
        margin_percent: u64,
        provisional_budget: u64,
    ) -> Result<Instruction, TransferError> {
        let balance = self.ledger.get_balance(&instruction.sender).await?;
        let floor = MIN_GAS_BUDGET.min(provisional_budget).max(1);
        let spare = balance.saturating_sub(amount);
        if spare < floor {
            return Err(TransferError::InsufficientFunds {
                balance,
                required: amount.saturating_add(floor),
            });
        }

        let ceiling = spare.min(provisional_budget);
        let instruction = instruction.with_gas_budget(ceiling);
        let tx = self.ledger.build(&instruction).await?;
        let simulation = self.ledger.simulate(&tx).await?;
        if !simulation.status.is_success() {
            let detail = simulation.status.failure_detail();
            if ceiling < provisional_budget && detail.contains("InsufficientGas") {
                return Err(TransferError::InsufficientFunds {
                    balance,
                    required: amount.saturating_add(provisional_budget),
                });
            }
            return Err(TransferError::TransactionRejected(format!(
                "Dry run failed: {detail}"
            )));
        }

        let budget = budget_from_simulation(&simulation.gas_used, margin_percent)
            .min(ceiling)
            .max(1);
        tracing::debug!(
            balance,
            dry_run_budget = ceiling,
            computation = simulation.gas_used.computation_cost,
            storage = simulation.gas_used.storage_cost,
            budget,
            "gas estimated"
        );
        Ok(instruction.with_gas_budget(budget))
    }

    /// Build, sign and execute `instruction`.
    ///
    /// Not idempotent: submitting the same instruction twice builds two
    /// transactions and may move value twice. Retrying is the caller's call.
    pub async fn submit(&self, instruction: Instruction, keypair: &Keypair) -> TransferOutcome {
        let mut progress = Progress::start("submit");
        let result = self.submit_instruction(&mut progress, instruction, keypair).await;
        TransferOutcome::from_result(&progress.finish(result))
    }

    async fn submit_instruction(
        &self,
        progress: &mut Progress,
        instruction: Instruction,
        keypair: &Keypair,
    ) -> Result<TransferReceipt, TransferError> {
        progress.advance(TransferState::Building);
        let tx = self.ledger.build(&instruction).await?;
        let signature = keypair.sign_transaction(&tx);

        progress.advance(TransferState::Submitting);
        // Once sent, execution runs to completion even if the caller goes away.
        let ledger = Arc::clone(&self.ledger);
        let response = tokio::spawn(async move { ledger.execute(&tx, &signature).await })
            .await
            .map_err(|e| TransferError::integration(format!("Submission task failed: {e}")))??;

        let receipt = interpret_execution(response, keypair.address())?;
        tracing::info!(
            operation = progress.operation,
            digest = %receipt.digest,
            sender = %receipt.sender,
            "transaction executed"
        );
        Ok(receipt)
    }

    async fn fund_and_submit(
        &self,
        progress: &mut Progress,
        keypair: &Keypair,
        action: &TransferAction,
        amount: u64,
    ) -> Result<TransferReceipt, TransferError> {
        let sender = keypair.address();
        let instruction = build_transfer_instruction(
            sender,
            action,
            amount,
            self.settings.gas_policy.base_budget(),
        );

        let instruction = match self.settings.gas_policy {
            GasPolicy::Fixed(_) => instruction,
            GasPolicy::Simulated {
                margin_percent,
                provisional_budget,
            } => {
                progress.advance(TransferState::Estimating);
                self.estimate_gas(instruction, amount, margin_percent, provisional_budget)
                    .await?
            }
        };

        progress.advance(TransferState::CheckingBalance);
        self.check_sufficiency(&sender, amount, instruction.gas_budget)
            .await?;

        self.submit_instruction(progress, instruction, keypair).await
    }

    // =========================================================================
    // Funded transfers
    // =========================================================================

    fn validate_target(&self, target: &TransferTarget) -> Result<ValidatedTarget, TransferError> {
        match target {
            TransferTarget::Address { recipient } => Ok(ValidatedTarget::Native(parse_address(
                "recipient address",
                recipient,
            )?)),
            TransferTarget::WalletToWallet {
                source,
                destination,
                recipient_owner,
            } => Ok(ValidatedTarget::WalletToWallet {
                module: self.module()?.clone(),
                source: parse_optional_object_id("source Wallet object ID", source.as_deref())?,
                destination: parse_optional_object_id(
                    "destination Wallet object ID",
                    destination.as_deref(),
                )?,
                recipient_owner: recipient_owner
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| parse_address("destination wallet address", v))
                    .transpose()?,
            }),
            TransferTarget::WalletToAddress { source, recipient } => {
                Ok(ValidatedTarget::WalletToAddress {
                    module: self.module()?.clone(),
                    source: parse_optional_object_id("source Wallet object ID", source.as_deref())?,
                    recipient: parse_address("recipient address", recipient)?,
                })
            }
        }
    }

    /// Run a funded transfer end to end.
    pub async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, TransferError> {
        let mut progress = Progress::start("transfer");
        let result = self.run_transfer(&mut progress, request).await;
        progress.finish(result)
    }

    /// [`TransferOrchestrator::transfer`], folded into an outcome.
    pub async fn execute(&self, request: TransferRequest) -> TransferOutcome {
        TransferOutcome::from_result(&self.transfer(request).await)
    }

    async fn run_transfer(
        &self,
        progress: &mut Progress,
        request: TransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let amount = request.amount.to_mist()?;
        if let Some(minimum) = request.min_amount_mist {
            ensure_minimum(amount, minimum)?;
        }
        let target = self.validate_target(&request.target)?;

        progress.advance(TransferState::Deriving);
        let keypair = self.keypair(request.credential.as_deref())?;
        let sender = keypair.address();

        let action = match target {
            ValidatedTarget::Native(recipient) => TransferAction::Native { recipient },
            ValidatedTarget::WalletToWallet {
                module,
                source,
                destination,
                recipient_owner,
            } => {
                progress.advance(TransferState::Resolving);
                let source = self.resolve_source_wallet(&module, source, &sender).await?;
                let destination = self
                    .resolve_destination_wallet(&module, destination, recipient_owner)
                    .await?;
                TransferAction::WalletToWallet {
                    module,
                    source,
                    destination,
                }
            }
            ValidatedTarget::WalletToAddress {
                module,
                source,
                recipient,
            } => {
                progress.advance(TransferState::Resolving);
                let source = self.resolve_source_wallet(&module, source, &sender).await?;
                TransferAction::WalletToAddress {
                    module,
                    source,
                    recipient,
                }
            }
        };

        self.fund_and_submit(progress, &keypair, &action, amount).await
    }

    // =========================================================================
    // Wallet module operations
    // =========================================================================

    /// Deposit a sender-owned SUI coin into a Wallet object.
    pub async fn deposit(&self, request: DepositRequest) -> Result<TransferReceipt, TransferError> {
        let mut progress = Progress::start("deposit");
        let result = self.run_deposit(&mut progress, request).await;
        progress.finish(result)
    }

    async fn run_deposit(
        &self,
        progress: &mut Progress,
        request: DepositRequest,
    ) -> Result<TransferReceipt, TransferError> {
        let module = self.module()?.clone();
        let wallet = parse_object_id("Wallet object ID", &request.wallet)?;
        let coin = parse_object_id("coin object ID", &request.coin)?;

        progress.advance(TransferState::Deriving);
        let keypair = self.keypair(request.credential.as_deref())?;
        let sender = keypair.address();

        progress.advance(TransferState::Resolving);
        self.verify_wallet(&module, wallet).await?;

        let coin_info = self
            .ledger
            .get_object(&coin)
            .await?
            .ok_or_else(|| TransferError::validation(format!("Coin object {coin} does not exist")))?;
        if coin_info.object_type.as_deref() != Some(SUI_COIN_OBJECT_TYPE) {
            return Err(TransferError::validation(format!(
                "Object {coin} is not a {SUI_COIN_OBJECT_TYPE}"
            )));
        }
        if !coin_info
            .owner
            .as_ref()
            .is_some_and(|owner| owner.is_address(&sender))
        {
            return Err(TransferError::validation(format!(
                "Coin object {coin} is not owned by {sender}"
            )));
        }
        let amount = coin_info.balance.ok_or_else(|| {
            TransferError::integration(format!("Coin object {coin} has no balance field"))
        })?;
        if amount == 0 {
            return Err(TransferError::validation(format!("Coin object {coin} is empty")));
        }

        let action = TransferAction::Deposit {
            module,
            wallet,
            coin,
        };
        self.fund_and_submit(progress, &keypair, &action, amount).await
    }

    /// Create a Wallet object owned by the credential's address.
    pub async fn create_wallet(
        &self,
        credential: Option<&str>,
    ) -> Result<WalletCreation, TransferError> {
        let mut progress = Progress::start("create_wallet");
        let result = self.run_create_wallet(&mut progress, credential).await;
        progress.finish(result)
    }

    async fn run_create_wallet(
        &self,
        progress: &mut Progress,
        credential: Option<&str>,
    ) -> Result<WalletCreation, TransferError> {
        let module = self.module()?;

        progress.advance(TransferState::Deriving);
        let keypair = self.keypair(credential)?;

        let action = TransferAction::Call(module.call("create_wallet", Vec::new()));
        let receipt = self.fund_and_submit(progress, &keypair, &action, 0).await?;
        let wallet_object_id = created_object(&receipt, &receipt.sender)?;

        Ok(WalletCreation {
            wallet_object_id,
            receipt,
        })
    }

    /// Register `derived_address` on chain, paid for by the configured
    /// credential.
    pub async fn create_address(
        &self,
        derived_address: &str,
    ) -> Result<AddressRegistration, TransferError> {
        let mut progress = Progress::start("create_address");
        let result = self.run_create_address(&mut progress, derived_address).await;
        progress.finish(result)
    }

    async fn run_create_address(
        &self,
        progress: &mut Progress,
        derived_address: &str,
    ) -> Result<AddressRegistration, TransferError> {
        let module = self.module()?;
        let wallet_address = parse_address("derived address", derived_address)?;

        progress.advance(TransferState::Deriving);
        let keypair = Keypair::from_optional(self.settings.default_credential.as_deref())?;

        let action = TransferAction::Call(
            module.call("create_address", vec![CallArg::Address(wallet_address)]),
        );
        let receipt = self.fund_and_submit(progress, &keypair, &action, 0).await?;
        let wallet_object_id = created_object(&receipt, &wallet_address)?;

        let event_type = module.struct_type("WalletCreatedEvent");
        let event = receipt
            .events
            .iter()
            .find(|event| event.event_type == event_type);
        let (wallet_id, owner) = match event {
            Some(event) => (
                event.parsed_json.get("wallet_id").and_then(|v| v.as_str()),
                event.parsed_json.get("owner").and_then(|v| v.as_str()),
            ),
            None => (None, None),
        };
        let (Some(_), Some(owner)) = (wallet_id, owner) else {
            return Err(TransferError::integration(format!(
                "Failed to extract WalletCreatedEvent, wallet_id, or owner (transaction {})",
                receipt.digest
            )));
        };

        if owner.parse::<SuiAddress>().ok() != Some(wallet_address) {
            return Err(TransferError::integration(format!(
                "On-chain owner ({owner}) does not match the derived address ({wallet_address})"
            )));
        }

        Ok(AddressRegistration {
            wallet_object_id,
            wallet_address,
            receipt,
        })
    }
}
