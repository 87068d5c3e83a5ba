//! Stripe account settings.

use serde::{Deserialize, Serialize};

/// Stripe settings, loaded once at process start. Empty credentials do not
/// prevent startup; the operations needing them fail closed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeSettings {
    pub secret_key: String,
    pub webhook_secret: String,

    /// Where Stripe redirects after a completed checkout.
    #[serde(default = "default_success_url")]
    pub success_url: String,

    /// Where Stripe redirects when the user backs out.
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,

    /// Accepted clock skew for webhook timestamps, in seconds.
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_seconds: i64,

    /// Override the Stripe API base URL. Tests point this at a local mock
    /// server.
    pub api_base: Option<String>,
}

fn default_success_url() -> String {
    "http://localhost:3000/billing/success".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:3000/billing/cancel".to_string()
}

fn default_webhook_tolerance() -> i64 {
    300
}

impl Default for StripeSettings {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            webhook_secret: String::new(),
            success_url: default_success_url(),
            cancel_url: default_cancel_url(),
            webhook_tolerance_seconds: default_webhook_tolerance(),
            api_base: None,
        }
    }
}
