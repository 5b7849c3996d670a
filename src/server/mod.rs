//! Server-side code for Voice Bridge
//!
//! This module contains all backend functionality:
//! - Access tokens for the browser dialer (JWT voice grant)
//! - TwiML generation and call-status webhooks
//! - Twilio REST integration (call history, caller-ID verification)
//! - API routes

pub mod auth;
pub mod config;
pub mod phone;
pub mod twilio;
pub mod twiml;
pub mod voice;

#[cfg(test)]
mod tests;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::models::*;
use config::ServerConfig;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub twilio: twilio::TwilioClient,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let twilio = twilio::TwilioClient::new(&config.twilio);
        Self { config, twilio }
    }
}

/// Create the Axum router with all API routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.frontend_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // Health check
        .route("/api/health", get(health_check))

        // Access tokens
        .route("/token", post(auth::issue_token))
        .route("/get-twilio-token", get(auth::legacy_token))

        // Twilio webhooks
        .route("/voice", post(voice::voice))
        .route(voice::DIAL_STATUS_PATH, post(voice::dial_status))
        .route("/call-status", post(voice::call_status))

        // Twilio REST pass-through
        .route("/calls", get(list_calls))
        .route("/verify-number", post(verify_number))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

// Health check
async fn health_check() -> &'static str {
    "OK"
}

// ============== Twilio REST Routes ==============

async fn list_calls(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CallSummary>>, (StatusCode, Json<ErrorBody>)> {
    state
        .twilio
        .list_calls(&CallStatus::history_filter(), twilio::CALL_HISTORY_LIMIT)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Error fetching calls: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch call history")),
            )
        })
}

/// Ask Twilio to phone a number with a verification code (trial accounts)
async fn verify_number(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyNumberRequest>,
) -> Result<Json<VerifyNumberResponse>, (StatusCode, Json<ErrorBody>)> {
    let phone_number = req
        .phone_number
        .as_deref()
        .map(phone::sanitize_number)
        .filter(|number| number.chars().any(|c| c.is_ascii_digit()))
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("Phone number is required")),
            )
        })?;

    let validation = state
        .twilio
        .create_validation_request(&phone_number, &format!("Customer {}", phone_number))
        .await
        .map_err(|e| {
            tracing::error!("Verification error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to send verification")),
            )
        })?;

    tracing::info!(
        phone_number = phone_number.as_str(),
        call_sid = validation.call_sid.as_deref().unwrap_or("-"),
        "Verification call sent"
    );

    Ok(Json(VerifyNumberResponse {
        success: true,
        message: "Verification call sent".to_string(),
        validation_request_sid: validation.call_sid,
        validation_code: validation.validation_code,
    }))
}

/// Initialize and start the server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let port = config.port;
    tracing::info!(
        "Twilio account {} with TwiML app {}",
        config.twilio.account_sid,
        config.twilio.twiml_app_sid
    );

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
