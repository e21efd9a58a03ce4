//! HTTP server for the Haven recovery API.
//!
//! This module provides a minimal HTTP request layer over the recovery
//! engine: registration, backup lookup, and submission of signed emergency
//! withdraw authorizations.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use haven_config::ApiConfig;
use haven_core::{RecoveryEngine, WithdrawError};
use haven_types::{parse_address, with_0x_prefix, WithdrawAuthorization, WithdrawReceipt, B256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the recovery engine for processing requests.
	pub engine: Arc<RecoveryEngine>,
}

/// API error response carrying an HTTP status and message.
pub struct ApiError {
	status: StatusCode,
	message: String,
}

impl ApiError {
	fn bad_request(message: impl Into<String>) -> Self {
		Self {
			status: StatusCode::BAD_REQUEST,
			message: message.into(),
		}
	}
}

impl From<WithdrawError> for ApiError {
	fn from(err: WithdrawError) -> Self {
		// Every engine failure is caller-correctable input or state
		ApiError::bad_request(err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = Json(serde_json::json!({ "error": self.message }));
		(self.status, body).into_response()
	}
}

/// Request body for POST /api/register.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
	/// The holder registering a backup (hex address).
	pub caller: String,
	/// The backup address to register (hex address).
	pub backup: String,
}

/// Request body for POST /api/withdraw.
#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
	/// The account submitting the authorization (hex address).
	pub caller: String,
	/// The holder the signature claims to act for (hex address).
	pub holder: String,
	/// Expiration as Unix seconds.
	pub expiration: u64,
	/// Recovery value (27 or 28).
	pub v: u8,
	/// Signature r component (hex, 32 bytes).
	pub r: String,
	/// Signature s component (hex, 32 bytes).
	pub s: String,
}

/// Response body for GET /api/emergency-address/{holder}.
#[derive(Debug, Serialize)]
pub struct EmergencyAddressResponse {
	/// The registered backup, or the zero address when unset.
	pub backup: String,
}

/// Starts the HTTP server for the recovery API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<RecoveryEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app_state = AppState { engine };

	let app = Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/register", post(handle_register))
				.route("/withdraw", post(handle_withdraw))
				.route("/emergency-address/{holder}", get(handle_emergency_address)),
		)
		.route("/health", get(|| async { StatusCode::OK }))
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(app_state);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Haven recovery API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/register requests.
async fn handle_register(
	State(state): State<AppState>,
	Json(request): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
	let caller = parse_address(&request.caller)
		.map_err(|e| ApiError::bad_request(format!("Invalid caller address: {}", e)))?;
	let backup = parse_address(&request.backup)
		.map_err(|e| ApiError::bad_request(format!("Invalid backup address: {}", e)))?;

	state.engine.register_emergency_address(caller, backup).await?;
	Ok(StatusCode::NO_CONTENT)
}

/// Handles GET /api/emergency-address/{holder} requests.
async fn handle_emergency_address(
	Path(holder): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<EmergencyAddressResponse>, ApiError> {
	let holder = parse_address(&holder)
		.map_err(|e| ApiError::bad_request(format!("Invalid holder address: {}", e)))?;

	let backup = state.engine.get_emergency_address(holder).await?;
	Ok(Json(EmergencyAddressResponse {
		backup: with_0x_prefix(&hex::encode(backup.as_slice())),
	}))
}

/// Handles POST /api/withdraw requests.
async fn handle_withdraw(
	State(state): State<AppState>,
	Json(request): Json<WithdrawRequest>,
) -> Result<Json<WithdrawReceipt>, ApiError> {
	let caller = parse_address(&request.caller)
		.map_err(|e| ApiError::bad_request(format!("Invalid caller address: {}", e)))?;
	let holder = parse_address(&request.holder)
		.map_err(|e| ApiError::bad_request(format!("Invalid holder address: {}", e)))?;

	let auth = WithdrawAuthorization {
		holder,
		expiration: request.expiration,
		v: request.v,
		r: parse_b256(&request.r)
			.map_err(|e| ApiError::bad_request(format!("Invalid r component: {}", e)))?,
		s: parse_b256(&request.s)
			.map_err(|e| ApiError::bad_request(format!("Invalid s component: {}", e)))?,
	};

	let receipt = state.engine.emergency_withdraw_with_sig(caller, &auth).await?;
	Ok(Json(receipt))
}

/// Parses a 32-byte hex value, with or without 0x prefix.
fn parse_b256(input: &str) -> Result<B256, String> {
	let bytes = hex::decode(haven_types::without_0x_prefix(input)).map_err(|e| e.to_string())?;
	if bytes.len() != 32 {
		return Err(format!("expected 32 bytes, got {}", bytes.len()));
	}
	Ok(B256::from_slice(&bytes))
}
