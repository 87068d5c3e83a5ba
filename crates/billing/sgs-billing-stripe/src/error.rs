//! Billing error types.

use thiserror::Error;

pub type BillingResult<T> = Result<T, BillingError>;

#[derive(Debug, Error)]
pub enum BillingError {
    /// Stripe credentials are absent from the process configuration.
    /// Carries the names of the missing variables, never their values.
    #[error("Missing Stripe credentials: {}", missing.join(", "))]
    Misconfigured { missing: Vec<String> },

    /// Stripe rejected the session, or could not be reached at all.
    #[error("Checkout session creation failed{}", fmt_status(status))]
    CheckoutFailed {
        status: Option<u16>,
        details: serde_json::Value,
    },

    #[error("Invalid checkout response: {0}")]
    InvalidCheckoutResponse(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// The `Stripe-Signature` header failed verification. The reason is for
    /// logs; responses carry only a generic rejection.
    #[error("Webhook signature rejected: {0}")]
    InvalidSignature(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => " (no upstream response)".to_string(),
    }
}
