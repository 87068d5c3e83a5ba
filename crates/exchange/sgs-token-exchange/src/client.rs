//! The two-step exchange client.

use crate::config::{ProviderCredentials, ProviderSettings};
use crate::descriptor::{ExchangeTransport, ProviderDescriptor, ProviderKind};
use crate::error::{ExchangeError, ExchangeResult};
use crate::types::{TokenExchange, TokenPayload};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timeout applied to every outbound provider call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Performs the short-lived exchange and the long-lived upgrade against a
/// provider, driven entirely by the provider's [`ProviderDescriptor`].
///
/// The exchanger holds no per-request state; one instance is built at
/// process start and shared across requests.
#[derive(Clone)]
pub struct TokenExchanger {
    http_client: Client,
    providers: HashMap<ProviderKind, ProviderSettings>,
}

impl TokenExchanger {
    pub fn new(
        providers: HashMap<ProviderKind, ProviderSettings>,
        http_timeout_seconds: u64,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(http_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            providers,
        }
    }

    fn settings(&self, kind: ProviderKind) -> ProviderSettings {
        self.providers.get(&kind).cloned().unwrap_or_default()
    }

    /// Run the full pipeline for one authorization code: resolve
    /// credentials, exchange for a short-lived token, then try the
    /// long-lived upgrade.
    ///
    /// An upgrade failure is not an error: the result carries
    /// `long_lived: None` and the short-lived token is still returned.
    pub async fn exchange(&self, kind: ProviderKind, code: &str) -> ExchangeResult<TokenExchange> {
        let descriptor = kind.descriptor();
        let settings = self.settings(kind);
        let credentials = settings.resolve(&descriptor)?;

        let short_lived = self
            .exchange_short_lived(&descriptor, &settings, &credentials, code)
            .await?;

        let long_lived = match self
            .upgrade_long_lived(&descriptor, &settings, &credentials, &short_lived.access_token)
            .await
        {
            Ok(payload) => Some(payload),
            Err(err) => {
                warn!("Long-lived upgrade unavailable for {}: {}", kind, err);
                None
            }
        };

        info!(
            "Token exchange complete for {} (long-lived: {})",
            kind,
            long_lived.is_some()
        );

        Ok(TokenExchange {
            provider: kind,
            short_lived,
            long_lived,
        })
    }

    /// Trade an authorization code for a short-lived access token.
    ///
    /// A single attempt; any failure is fatal for the request.
    pub async fn exchange_short_lived(
        &self,
        descriptor: &ProviderDescriptor,
        settings: &ProviderSettings,
        credentials: &ProviderCredentials,
        code: &str,
    ) -> ExchangeResult<TokenPayload> {
        let endpoint = settings
            .token_endpoint
            .clone()
            .unwrap_or_else(|| descriptor.default_token_endpoint(&credentials.api_version));

        let result = match descriptor.transport {
            ExchangeTransport::QueryGet => {
                let query = [
                    ("client_id", credentials.client_id.as_str()),
                    ("client_secret", credentials.client_secret.as_str()),
                    ("redirect_uri", credentials.redirect_uri.as_str()),
                    ("code", code),
                ];
                self.http_client.get(&endpoint).query(&query).send().await
            }
            ExchangeTransport::FormPost => {
                let mut params = HashMap::new();
                params.insert("grant_type", "authorization_code");
                params.insert("client_id", credentials.client_id.as_str());
                params.insert("client_secret", credentials.client_secret.as_str());
                params.insert("redirect_uri", credentials.redirect_uri.as_str());
                params.insert("code", code);
                self.http_client.post(&endpoint).form(&params).send().await
            }
        };

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "Short-lived exchange for {} got no response: {}",
                    descriptor.kind, err
                );
                return Err(ExchangeError::ExchangeFailed {
                    status: None,
                    details: empty_details(),
                });
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let details = parse_error_body(response).await;
            warn!(
                "Short-lived exchange rejected for {} with status {}",
                descriptor.kind, status
            );
            return Err(ExchangeError::ExchangeFailed {
                status: Some(status),
                details,
            });
        }

        let payload: TokenPayload = response.json().await.map_err(|err| {
            warn!("Token response from {} unusable: {}", descriptor.kind, err);
            ExchangeError::InvalidTokenResponse(err.to_string())
        })?;

        debug!("Short-lived exchange succeeded for {}", descriptor.kind);
        Ok(payload)
    }

    /// Upgrade a short-lived token to a long-lived one.
    ///
    /// The upgrade is always a GET with the descriptor's grant type; the
    /// short-lived token rides under the descriptor's parameter name.
    pub async fn upgrade_long_lived(
        &self,
        descriptor: &ProviderDescriptor,
        settings: &ProviderSettings,
        credentials: &ProviderCredentials,
        short_lived_token: &str,
    ) -> ExchangeResult<TokenPayload> {
        let endpoint = settings
            .upgrade_endpoint
            .clone()
            .unwrap_or_else(|| descriptor.default_upgrade_endpoint(&credentials.api_version));

        let mut query: Vec<(&str, &str)> = vec![("grant_type", descriptor.upgrade_grant_type)];
        if descriptor.upgrade_sends_client_id {
            query.push(("client_id", credentials.client_id.as_str()));
        }
        query.push(("client_secret", credentials.client_secret.as_str()));
        query.push((descriptor.upgrade_token_param, short_lived_token));

        let response = match self.http_client.get(&endpoint).query(&query).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "Long-lived upgrade for {} got no response: {}",
                    descriptor.kind, err
                );
                return Err(ExchangeError::ExchangeFailed {
                    status: None,
                    details: empty_details(),
                });
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let details = parse_error_body(response).await;
            return Err(ExchangeError::ExchangeFailed {
                status: Some(status),
                details,
            });
        }

        let payload: TokenPayload = response.json().await.map_err(|err| {
            warn!("Upgrade response from {} unusable: {}", descriptor.kind, err);
            ExchangeError::InvalidTokenResponse(err.to_string())
        })?;

        debug!("Long-lived upgrade succeeded for {}", descriptor.kind);
        Ok(payload)
    }
}

/// Best-effort parse of an upstream error body. Non-JSON bodies are logged
/// and replaced with an empty object so they are never echoed to clients.
async fn parse_error_body(response: reqwest::Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => {
            if !text.is_empty() {
                warn!("Provider error body was not JSON: {}", text);
            }
            empty_details()
        }
    }
}

fn empty_details() -> Value {
    Value::Object(serde_json::Map::new())
}
