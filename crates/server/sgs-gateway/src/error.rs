//! Error responses returned by the gateway handlers.
//!
//! Every handler failure maps to a stable JSON body with an `error` code the
//! frontend can branch on. Upstream failures carry the upstream status and
//! sanitized details; misconfiguration names the missing environment
//! variables but never their values.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use sgs_billing_stripe::BillingError;
use sgs_media_insights::InsightsError;
use sgs_token_exchange::ExchangeError;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing authorization code")]
    MissingCode,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Server misconfigured, missing: {missing:?}")]
    ServerMisconfigured { missing: Vec<String> },

    #[error("Token exchange failed")]
    ExchangeFailed {
        status: Option<u16>,
        details: Value,
    },

    #[error("Checkout session creation failed")]
    CheckoutFailed {
        status: Option<u16>,
        details: Value,
    },

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Insights unavailable: {reason}")]
    InsightsUnavailable { reason: String },
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::MissingCode => (
                StatusCode::BAD_REQUEST,
                json!({"error": "missing_code"}),
            ),
            GatewayError::UnknownProvider(provider) => (
                StatusCode::NOT_FOUND,
                json!({"error": "unknown_provider", "provider": provider}),
            ),
            GatewayError::InvalidPrice(reason) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_price", "reason": reason}),
            ),
            GatewayError::ServerMisconfigured { missing } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "server_env_missing", "missing": missing}),
            ),
            GatewayError::ExchangeFailed { status, details } => (
                upstream_status(status),
                json!({"error": "exchange_failed", "details": details}),
            ),
            GatewayError::CheckoutFailed { status, details } => (
                upstream_status(status),
                json!({"error": "checkout_failed", "details": details}),
            ),
            GatewayError::InvalidSignature => (
                StatusCode::BAD_REQUEST,
                json!({"error": "invalid_signature"}),
            ),
            GatewayError::InsightsUnavailable { reason } => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "insights_unavailable", "reason": reason}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Echo the upstream status when it is a valid HTTP status, 502 otherwise.
fn upstream_status(status: Option<u16>) -> StatusCode {
    status
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl From<ExchangeError> for GatewayError {
    fn from(err: ExchangeError) -> Self {
        match err {
            ExchangeError::Misconfigured { missing } => {
                GatewayError::ServerMisconfigured { missing }
            }
            ExchangeError::ExchangeFailed { status, details } => {
                GatewayError::ExchangeFailed { status, details }
            }
            ExchangeError::InvalidTokenResponse(reason) => {
                debug!("Unusable token response from provider: {}", reason);
                GatewayError::ExchangeFailed {
                    status: None,
                    details: json!({}),
                }
            }
        }
    }
}

impl From<BillingError> for GatewayError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Misconfigured { missing } => {
                GatewayError::ServerMisconfigured { missing }
            }
            BillingError::CheckoutFailed { status, details } => {
                GatewayError::CheckoutFailed { status, details }
            }
            BillingError::InvalidCheckoutResponse(reason) => {
                debug!("Unusable checkout response from Stripe: {}", reason);
                GatewayError::CheckoutFailed {
                    status: None,
                    details: json!({}),
                }
            }
            BillingError::InvalidPrice(reason) => GatewayError::InvalidPrice(reason),
            BillingError::InvalidSignature(reason) => {
                // The rejection reason stays in the logs, not the response.
                debug!("Webhook signature rejected: {}", reason);
                GatewayError::InvalidSignature
            }
        }
    }
}

impl From<InsightsError> for GatewayError {
    fn from(err: InsightsError) -> Self {
        match err {
            InsightsError::Unavailable { reason } => GatewayError::InsightsUnavailable { reason },
        }
    }
}
