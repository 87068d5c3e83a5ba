//! HTTP routes and request handlers.

use crate::config::Config;
use crate::error::GatewayError;
use crate::state::AppState;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Json;
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::{Value, json};
use sgs_billing_stripe::{CheckoutRequest, WebhookEvent, dispatch_event, verify_signature};
use sgs_token_exchange::ProviderKind;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the gateway router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/token-exchange/{provider}", post(token_exchange))
        .route("/checkout-session", post(checkout_session))
        .route("/webhook", post(webhook))
        .route("/insights/instagram", post(instagram_insights))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.server.cors.allow_any_origin {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .server
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct TokenExchangeBody {
    #[serde(default)]
    code: Option<String>,
}

/// Exchange an authorization code for short- and long-lived tokens.
///
/// A request without a JSON body counts as a missing code, not a transport
/// error.
async fn token_exchange(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Option<Json<TokenExchangeBody>>,
) -> Result<Json<sgs_token_exchange::TokenExchange>, GatewayError> {
    let kind = ProviderKind::from_slug(&provider)
        .ok_or_else(|| GatewayError::UnknownProvider(provider.clone()))?;

    let code = body.and_then(|Json(body)| body.code);
    let code = code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or(GatewayError::MissingCode)?;

    info!("Token exchange requested for {}", kind);
    let exchange = state.exchanger.exchange(kind, code).await?;
    Ok(Json(exchange))
}

/// Create a Stripe Checkout session for a subscription purchase.
async fn checkout_session(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<sgs_billing_stripe::CheckoutSession>, GatewayError> {
    let session = state.checkout.create_session(&body).await?;
    Ok(Json(session))
}

/// Receive a Stripe webhook, verifying its signature over the raw body.
///
/// A verified event is always acknowledged; a body that does not parse as
/// an event is logged and skipped rather than rejected.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, GatewayError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    verify_signature(
        &body,
        signature,
        &state.config.stripe.webhook_secret,
        state.config.stripe.webhook_tolerance_seconds,
    )?;

    match serde_json::from_str::<WebhookEvent>(&body) {
        Ok(event) => dispatch_event(&event),
        Err(err) => warn!("Ignoring verified webhook with unreadable body: {}", err),
    }

    Ok(Json(json!({"received": true})))
}

/// Body fields mirror the Graph API parameter names.
#[derive(Debug, Deserialize)]
struct InsightsBody {
    access_token: String,
    user_id: String,
}

/// Fetch the Instagram account overview for a connected user.
async fn instagram_insights(
    State(state): State<AppState>,
    Json(body): Json<InsightsBody>,
) -> Result<Json<sgs_media_insights::AccountOverview>, GatewayError> {
    let overview = state
        .insights
        .account_overview(&body.access_token, &body.user_id)
        .await?;
    Ok(Json(overview))
}

async fn healthz() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
