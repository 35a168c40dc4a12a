// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key generation, address derivation and balance lookup.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{ApiError, ApiJson},
    ledger::{transaction::format_sui, Keypair},
    models::{BalanceResponse, CreateAddressResponse, DeriveAddressRequest, DeriveAddressResponse},
    state::AppState,
};

/// Generate a new key pair off chain.
///
/// The private key is returned once and never stored.
#[utoipa::path(
    post,
    path = "/api/create-sui-address",
    tag = "Addresses",
    responses(
        (status = 200, description = "Key pair generated", body = CreateAddressResponse)
    )
)]
pub async fn create_sui_address() -> Json<CreateAddressResponse> {
    let keypair = Keypair::generate();
    let address = keypair.address();
    tracing::info!(%address, "generated new address");

    Json(CreateAddressResponse {
        success: true,
        wallet_address: address.to_string(),
        private_key: keypair.secret_hex(),
        message_for_user: "Save your private key securely. It cannot be recovered if lost."
            .to_string(),
    })
}

/// Derive the address owned by a private key.
#[utoipa::path(
    post,
    path = "/api/derive-address",
    tag = "Addresses",
    request_body = DeriveAddressRequest,
    responses(
        (status = 200, description = "Address derived", body = DeriveAddressResponse),
        (status = 400, description = "Invalid or missing private key")
    )
)]
pub async fn derive_address(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DeriveAddressRequest>,
) -> Result<Json<DeriveAddressResponse>, ApiError> {
    let address = state
        .orchestrator
        .derive_address(request.private_key.as_deref())?;

    Ok(Json(DeriveAddressResponse {
        success: true,
        address: address.to_string(),
    }))
}

/// Native SUI balance of an address.
#[utoipa::path(
    get,
    path = "/api/balance/{address}",
    tag = "Addresses",
    params(
        ("address" = String, Path, description = "Address (0x + 64 hex chars)")
    ),
    responses(
        (status = 200, description = "Balance retrieved", body = BalanceResponse),
        (status = 400, description = "Malformed address"),
        (status = 503, description = "Full node unavailable")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let mist = state.orchestrator.balance(&address).await?;

    Ok(Json(BalanceResponse {
        address: address.trim().to_ascii_lowercase(),
        total_balance: mist.to_string(),
        balance: format_sui(mist),
    }))
}
