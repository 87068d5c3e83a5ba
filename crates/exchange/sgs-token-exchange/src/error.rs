//! Token exchange error types.

use thiserror::Error;

pub type ExchangeResult<T> = Result<T, ExchangeError>;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// A required credential is absent from the process configuration.
    /// Carries the names of the missing variables, never their values.
    #[error("Missing provider credentials: {}", missing.join(", "))]
    Misconfigured { missing: Vec<String> },

    /// The provider rejected the exchange, or could not be reached at all.
    /// `status` is the upstream HTTP status when there was a response.
    #[error("Provider rejected the token exchange{}", fmt_status(status))]
    ExchangeFailed {
        status: Option<u16>,
        details: serde_json::Value,
    },

    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => " (no upstream response)".to_string(),
    }
}
