//! Two-step OAuth token exchange for social providers.
//!
//! This crate implements the authorization-code exchange used by the growth
//! dashboard: one call trades the code for a short-lived access token, a
//! second call upgrades it to a long-lived token. The upgrade is best-effort;
//! when it fails the short-lived token is still returned to the caller.
//!
//! The three supported providers (Facebook, Instagram Basic Display,
//! Instagram Business) differ only in endpoints, transport, and grant names.
//! Those differences live in a static [`ProviderDescriptor`] so the exchange
//! itself is a single generic code path.

mod client;
mod config;
mod descriptor;
mod error;
mod types;


pub use client::{DEFAULT_TIMEOUT_SECONDS, TokenExchanger};
pub use config::{ProviderCredentials, ProviderSettings};
pub use descriptor::{CredentialEnvVars, ExchangeTransport, ProviderDescriptor, ProviderKind};
pub use error::{ExchangeError, ExchangeResult};
pub use types::{TokenExchange, TokenPayload};
