//! Normalized token payloads.

use crate::descriptor::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token material returned by a provider.
///
/// Providers attach different extras (Basic Display adds `user_id`, the
/// Graph API sometimes omits `expires_in`); anything beyond the common
/// fields passes through unaltered in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPayload {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Result of the full two-step exchange, one shape for every provider.
///
/// `long_lived` is `null` when the upgrade call failed; the request as a
/// whole still succeeds with the short-lived token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchange {
    pub provider: ProviderKind,
    pub short_lived: TokenPayload,
    pub long_lived: Option<TokenPayload>,
}
