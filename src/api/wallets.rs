// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet object management on the Wallet module.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{ApiError, ApiJson},
    models::{
        CreateAddressOnChainRequest, CreateAddressOnChainResponse, CreateWalletRequest,
        CreateWalletResponse, WalletObjectResponse,
    },
    state::AppState,
};

/// Create a Wallet object owned by the signer.
#[utoipa::path(
    post,
    path = "/api/create-wallet",
    tag = "Wallets",
    request_body = CreateWalletRequest,
    responses(
        (status = 200, description = "Wallet object created", body = CreateWalletResponse),
        (status = 400, description = "Invalid key or Wallet module not configured"),
        (status = 422, description = "Insufficient balance for gas"),
        (status = 500, description = "Transaction failed"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn create_wallet(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateWalletRequest>,
) -> Result<Json<CreateWalletResponse>, ApiError> {
    let creation = state
        .orchestrator
        .create_wallet(request.private_key.as_deref())
        .await?;

    let wallet_object_id = creation.wallet_object_id.to_string();
    let address = creation.receipt.sender.to_string();
    Ok(Json(CreateWalletResponse {
        success: true,
        message_for_user: format!(
            "Successfully created Wallet object {wallet_object_id} for address {address}"
        ),
        wallet_object_id,
        transaction_digest: creation.receipt.digest,
        address,
    }))
}

/// Register a derived address on chain. Gas is paid by the configured
/// credential.
#[utoipa::path(
    post,
    path = "/api/create-sui-address-on-chain",
    tag = "Wallets",
    request_body = CreateAddressOnChainRequest,
    responses(
        (status = 200, description = "Address registered", body = CreateAddressOnChainResponse),
        (status = 400, description = "Invalid address or missing configuration"),
        (status = 422, description = "Insufficient balance for gas"),
        (status = 500, description = "Transaction failed or unexpected event data"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn create_sui_address_on_chain(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAddressOnChainRequest>,
) -> Result<Json<CreateAddressOnChainResponse>, ApiError> {
    let registration = state
        .orchestrator
        .create_address(&request.derived_address)
        .await?;

    Ok(Json(CreateAddressOnChainResponse {
        success: true,
        wallet_object_id: registration.wallet_object_id.to_string(),
        wallet_address: registration.wallet_address.to_string(),
        transaction_digest: registration.receipt.digest,
        sender_address: registration.receipt.sender.to_string(),
    }))
}

/// Find the Wallet object owned by an address.
#[utoipa::path(
    get,
    path = "/api/wallet-object/{address}",
    tag = "Wallets",
    params(
        ("address" = String, Path, description = "Owner address (0x + 64 hex chars)")
    ),
    responses(
        (status = 200, description = "Lookup finished; walletObjectId is null when none exists", body = WalletObjectResponse),
        (status = 400, description = "Malformed address or Wallet module not configured"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn get_wallet_object(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletObjectResponse>, ApiError> {
    let wallet = state.orchestrator.find_wallet_object(&address).await?;

    Ok(Json(WalletObjectResponse {
        address: address.trim().to_ascii_lowercase(),
        wallet_object_id: wallet.map(|id| id.to_string()),
    }))
}
