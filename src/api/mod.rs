// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        AmountValue, BalanceResponse, CreateAddressOnChainRequest, CreateAddressOnChainResponse,
        CreateAddressResponse, CreateWalletRequest, CreateWalletResponse, DepositToWalletRequest,
        DeriveAddressRequest, DeriveAddressResponse, NativeTransferRequest,
        TransferToAddressRequest, TransferToWalletRequest, WalletObjectResponse,
    },
    state::AppState,
    transfer::TransferOutcome,
};

pub mod address;
pub mod health;
pub mod transfers;
pub mod wallets;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/create-sui-address", post(address::create_sui_address))
        .route("/derive-address", post(address::derive_address))
        .route("/balance/{address}", get(address::get_balance))
        .route("/fund-sui-address", post(transfers::fund_sui_address))
        .route("/expend-reward", post(transfers::expend_reward))
        .route("/transfer-to-wallet", post(transfers::transfer_to_wallet))
        .route("/transfer-to-address", post(transfers::transfer_to_address))
        .route("/deposit-to-wallet", post(transfers::deposit_to_wallet))
        .route("/create-wallet", post(wallets::create_wallet))
        .route(
            "/create-sui-address-on-chain",
            post(wallets::create_sui_address_on_chain),
        )
        .route("/wallet-object/{address}", get(wallets::get_wallet_object));

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .fallback(not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    with_middleware(app)
}

/// Request ids, tracing, panic recovery and CORS.
pub fn with_middleware(app: Router) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        tracing::info_span!(
            "http",
            method = %request.method(),
            uri = %request.uri(),
            request_id
        )
    });

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(trace)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "handler panicked");
    ApiError::internal("Internal server error").into_response()
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        address::create_sui_address,
        address::derive_address,
        address::get_balance,
        transfers::fund_sui_address,
        transfers::expend_reward,
        transfers::transfer_to_wallet,
        transfers::transfer_to_address,
        transfers::deposit_to_wallet,
        wallets::create_wallet,
        wallets::create_sui_address_on_chain,
        wallets::get_wallet_object
    ),
    components(
        schemas(
            AmountValue,
            TransferOutcome,
            CreateAddressResponse,
            DeriveAddressRequest,
            DeriveAddressResponse,
            NativeTransferRequest,
            TransferToWalletRequest,
            TransferToAddressRequest,
            DepositToWalletRequest,
            CreateWalletRequest,
            CreateWalletResponse,
            CreateAddressOnChainRequest,
            CreateAddressOnChainResponse,
            BalanceResponse,
            WalletObjectResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Addresses", description = "Key generation, derivation and balances"),
        (name = "Transfers", description = "Funded native and Wallet transfers"),
        (name = "Wallets", description = "Wallet object management")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::MockLedger;
    use crate::ledger::{derive_identity, Keypair};
    use crate::state::test_support::{self, KEY, RECIPIENT};
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn fund_address_end_to_end() {
        let sender = derive_identity(KEY).unwrap();
        let ledger = Arc::new(MockLedger::new().with_balance(sender, 200_000_000));
        let app = router(test_support::state(&ledger));

        let body = json!({
            "senderPrivateKey": KEY,
            "recipientAddress": RECIPIENT,
            "amount": 0.006
        });
        let (status, body) = send(app, post_json("/api/fund-sui-address", &body.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(!body["transactionDigest"].as_str().unwrap().is_empty());
        assert_eq!(body["senderAddress"], sender.to_string());
    }

    #[tokio::test]
    async fn missing_credential_is_400_without_ledger_calls() {
        let ledger = Arc::new(MockLedger::new());
        let mut config = test_support::config();
        config.private_key = None;
        let app = router(AppState::new(config, ledger.clone()));

        let body = json!({ "recipientAddress": RECIPIENT, "amount": "0.006" });
        let (status, body) = send(app, post_json("/api/expend-reward", &body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Private key is required"));
        assert!(ledger.built_instructions().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_400_with_error_body() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let (status, body) = send(app, post_json("/api/fund-sui-address", "{not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_field_is_400() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let body = json!({ "recipientAddress": RECIPIENT });
        let (status, body) = send(app, post_json("/api/fund-sui-address", &body.to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn create_address_generates_usable_key() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let (status, body) = send(app, post_json("/api/create-sui-address", "")).await;

        assert_eq!(status, StatusCode::OK);
        let key = body["privateKey"].as_str().unwrap();
        let keypair = Keypair::from_hex(key).unwrap();
        assert_eq!(body["walletAddress"], keypair.address().to_string());
    }

    #[tokio::test]
    async fn balance_route_uses_path_parameter() {
        let owner = derive_identity(KEY).unwrap();
        let ledger = Arc::new(MockLedger::new().with_balance(owner, 42));
        let app = router(test_support::state(&ledger));

        let (status, body) = send(app, get_request(&format!("/api/balance/{owner}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalBalance"], "42");
        assert_eq!(body["balance"], "0.000000042");
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let (status, body) = send(app, get_request("/api/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let response = app.oneshot(get_request("/health/live")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    async fn boom() -> &'static str {
        panic!("boom")
    }

    #[tokio::test]
    async fn panics_become_json_500() {
        let app = with_middleware(Router::new().route("/boom", get(boom)));
        let (status, body) = send(app, get_request("/boom")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let app = router(test_support::state(&Arc::new(MockLedger::new())));
        let (status, body) = send(app, get_request("/api-doc/openapi.json")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/fund-sui-address"].is_object());
    }
}
