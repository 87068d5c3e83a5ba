//! Per-provider OAuth application settings.

use crate::descriptor::ProviderDescriptor;
use crate::error::{ExchangeError, ExchangeResult};
use serde::{Deserialize, Serialize};

/// OAuth application settings for one provider, loaded once at process
/// start. Empty fields do not prevent startup; requests against a provider
/// with incomplete settings fail closed before any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,

    /// Graph API version used to build versioned endpoints.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Override the short-lived token endpoint. Tests point this at a local
    /// mock server.
    pub token_endpoint: Option<String>,

    /// Override the long-lived upgrade endpoint.
    pub upgrade_endpoint: Option<String>,
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            api_version: default_api_version(),
            token_endpoint: None,
            upgrade_endpoint: None,
        }
    }
}

/// Credentials resolved for a single exchange request.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_version: String,
}

impl ProviderSettings {
    /// Resolve the settings into request credentials, failing closed when a
    /// required field is empty. The error lists the environment variable
    /// names the missing values are normally supplied through.
    pub fn resolve(&self, descriptor: &ProviderDescriptor) -> ExchangeResult<ProviderCredentials> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push(descriptor.env.client_id.to_string());
        }
        if self.client_secret.trim().is_empty() {
            missing.push(descriptor.env.client_secret.to_string());
        }
        if self.redirect_uri.trim().is_empty() {
            missing.push(descriptor.env.redirect_uri.to_string());
        }

        if !missing.is_empty() {
            return Err(ExchangeError::Misconfigured { missing });
        }

        Ok(ProviderCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            api_version: self.api_version.clone(),
        })
    }
}
