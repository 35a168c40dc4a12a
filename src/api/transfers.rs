// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Value-moving endpoints. All of them run through the transfer
//! orchestrator and answer with a [`TransferOutcome`].

use axum::{extract::State, Json};

use crate::{
    error::{ApiError, ApiJson},
    ledger::{Amount, AmountUnit},
    models::{
        AmountValue, DepositToWalletRequest, NativeTransferRequest, TransferToAddressRequest,
        TransferToWalletRequest,
    },
    state::AppState,
    transfer::{DepositRequest, TransferError, TransferOutcome, TransferRequest, TransferTarget},
};

fn amount(value: &AmountValue, unit: Option<&str>, default: AmountUnit) -> Result<Amount, ApiError> {
    Ok(value.to_amount(unit, default).map_err(TransferError::from)?)
}

fn transferred(amount: &Amount, to: &str) -> String {
    format!("Successfully transferred {} {} to {}", amount.value, amount.unit, to)
}

/// Send native SUI to an address. Amounts are in SUI unless `unit` says
/// otherwise and must be at least the configured minimum.
#[utoipa::path(
    post,
    path = "/api/fund-sui-address",
    tag = "Transfers",
    request_body = NativeTransferRequest,
    responses(
        (status = 200, description = "Transfer executed", body = TransferOutcome),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Transaction failed"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn fund_sui_address(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NativeTransferRequest>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let amount = amount(&request.amount, request.unit.as_deref(), AmountUnit::Sui)?;
    let message = transferred(&amount, &request.recipient_address);

    let receipt = state
        .orchestrator
        .transfer(TransferRequest {
            credential: request.sender_private_key,
            target: TransferTarget::Address {
                recipient: request.recipient_address,
            },
            amount,
            min_amount_mist: Some(state.config.min_fund_amount_mist),
        })
        .await?;

    Ok(Json(TransferOutcome::succeeded(&receipt).with_message(message)))
}

/// Pay a reward in native SUI. Amounts are in SUI unless `unit` says
/// otherwise; rewards have no minimum.
#[utoipa::path(
    post,
    path = "/api/expend-reward",
    tag = "Transfers",
    request_body = NativeTransferRequest,
    responses(
        (status = 200, description = "Reward paid", body = TransferOutcome),
        (status = 400, description = "Invalid request"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Transaction failed"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn expend_reward(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NativeTransferRequest>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let amount = amount(&request.amount, request.unit.as_deref(), AmountUnit::Sui)?;
    let message = transferred(&amount, &request.recipient_address);

    let receipt = state
        .orchestrator
        .transfer(TransferRequest {
            credential: request.sender_private_key,
            target: TransferTarget::Address {
                recipient: request.recipient_address,
            },
            amount,
            min_amount_mist: None,
        })
        .await?;

    Ok(Json(TransferOutcome::succeeded(&receipt).with_message(message)))
}

/// Move value between two Wallet objects.
#[utoipa::path(
    post,
    path = "/api/transfer-to-wallet",
    tag = "Transfers",
    request_body = TransferToWalletRequest,
    responses(
        (status = 200, description = "Transfer executed", body = TransferOutcome),
        (status = 400, description = "Invalid request or Wallet object"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Transaction failed"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn transfer_to_wallet(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransferToWalletRequest>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let amount = amount(&request.amount, request.unit.as_deref(), AmountUnit::Sui)?;
    let destination = request
        .dest_wallet_object_id
        .clone()
        .or_else(|| request.dest_wallet_id.clone())
        .unwrap_or_else(|| "the configured Wallet".to_string());
    let message = transferred(&amount, &destination);

    let receipt = state
        .orchestrator
        .transfer(TransferRequest {
            credential: request.sender_private_key,
            target: TransferTarget::WalletToWallet {
                source: request.source_wallet_object_id,
                destination: request.dest_wallet_object_id,
                recipient_owner: request.dest_wallet_id,
            },
            amount,
            min_amount_mist: None,
        })
        .await?;

    Ok(Json(TransferOutcome::succeeded(&receipt).with_message(message)))
}

/// Withdraw value from a Wallet object to an address.
#[utoipa::path(
    post,
    path = "/api/transfer-to-address",
    tag = "Transfers",
    request_body = TransferToAddressRequest,
    responses(
        (status = 200, description = "Transfer executed", body = TransferOutcome),
        (status = 400, description = "Invalid request or Wallet object"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Transaction failed"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn transfer_to_address(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TransferToAddressRequest>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let amount = amount(&request.amount, request.unit.as_deref(), AmountUnit::Sui)?;
    let message = transferred(&amount, &request.recipient_address);

    let receipt = state
        .orchestrator
        .transfer(TransferRequest {
            credential: request.sender_private_key,
            target: TransferTarget::WalletToAddress {
                source: request.source_wallet_object_id,
                recipient: request.recipient_address,
            },
            amount,
            min_amount_mist: None,
        })
        .await?;

    Ok(Json(TransferOutcome::succeeded(&receipt).with_message(message)))
}

/// Deposit a SUI coin owned by the sender into a Wallet object.
#[utoipa::path(
    post,
    path = "/api/deposit-to-wallet",
    tag = "Transfers",
    request_body = DepositToWalletRequest,
    responses(
        (status = 200, description = "Deposit executed", body = TransferOutcome),
        (status = 400, description = "Invalid request, Wallet or coin"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Transaction failed"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn deposit_to_wallet(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DepositToWalletRequest>,
) -> Result<Json<TransferOutcome>, ApiError> {
    let message = format!(
        "Successfully deposited coin {} into Wallet {}",
        request.coin_object_id, request.wallet_id
    );

    let receipt = state
        .orchestrator
        .deposit(DepositRequest {
            credential: request.sender_private_key,
            wallet: request.wallet_id,
            coin: request.coin_object_id,
        })
        .await?;

    Ok(Json(TransferOutcome::succeeded(&receipt).with_message(message)))
}
