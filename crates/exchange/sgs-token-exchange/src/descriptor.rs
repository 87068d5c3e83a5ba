//! Static descriptions of the supported providers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport used for the short-lived exchange call.
///
/// Graph-style providers take the parameters in the query string of a GET;
/// Instagram Basic Display wants a form-encoded POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeTransport {
    QueryGet,
    FormPost,
}

/// Environment variable names a provider's credentials are supplied through.
///
/// Misconfiguration errors name these variables, never their values.
#[derive(Debug, Clone, Copy)]
pub struct CredentialEnvVars {
    pub client_id: &'static str,
    pub client_secret: &'static str,
    pub redirect_uri: &'static str,
}

/// The providers the exchange endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Facebook,
    InstagramBasic,
    InstagramBusiness,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Facebook,
        ProviderKind::InstagramBasic,
        ProviderKind::InstagramBusiness,
    ];

    /// Route segment and config key for this provider.
    pub fn slug(&self) -> &'static str {
        match self {
            ProviderKind::Facebook => "facebook",
            ProviderKind::InstagramBasic => "instagram-basic",
            ProviderKind::InstagramBusiness => "instagram-business",
        }
    }

    /// Parse a route segment into a provider, `None` for anything else.
    pub fn from_slug(slug: &str) -> Option<Self> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == slug)
    }

    /// The static wire-level description of this provider.
    pub fn descriptor(&self) -> ProviderDescriptor {
        match self {
            ProviderKind::Facebook => ProviderDescriptor {
                kind: *self,
                transport: ExchangeTransport::QueryGet,
                upgrade_grant_type: "fb_exchange_token",
                upgrade_token_param: "fb_exchange_token",
                upgrade_sends_client_id: true,
                env: CredentialEnvVars {
                    client_id: "FACEBOOK_APP_ID",
                    client_secret: "FACEBOOK_APP_SECRET",
                    redirect_uri: "FACEBOOK_REDIRECT_URI",
                },
            },
            ProviderKind::InstagramBasic => ProviderDescriptor {
                kind: *self,
                transport: ExchangeTransport::FormPost,
                upgrade_grant_type: "ig_exchange_token",
                upgrade_token_param: "access_token",
                upgrade_sends_client_id: false,
                env: CredentialEnvVars {
                    client_id: "INSTAGRAM_APP_ID",
                    client_secret: "INSTAGRAM_APP_SECRET",
                    redirect_uri: "INSTAGRAM_REDIRECT_URI",
                },
            },
            ProviderKind::InstagramBusiness => ProviderDescriptor {
                kind: *self,
                transport: ExchangeTransport::QueryGet,
                upgrade_grant_type: "fb_exchange_token",
                upgrade_token_param: "fb_exchange_token",
                upgrade_sends_client_id: true,
                env: CredentialEnvVars {
                    client_id: "INSTAGRAM_BUSINESS_APP_ID",
                    client_secret: "INSTAGRAM_BUSINESS_APP_SECRET",
                    redirect_uri: "INSTAGRAM_BUSINESS_REDIRECT_URI",
                },
            },
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Wire-level description of one provider: endpoints, transport, and the
/// grant/parameter names used by the long-lived upgrade.
#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub transport: ExchangeTransport,
    /// Grant type sent when upgrading to a long-lived token.
    pub upgrade_grant_type: &'static str,
    /// Parameter the short-lived token is sent under during the upgrade.
    pub upgrade_token_param: &'static str,
    /// Whether the upgrade call includes the client id. The Graph API wants
    /// it; Instagram Basic Display only takes the secret.
    pub upgrade_sends_client_id: bool,
    pub env: CredentialEnvVars,
}

impl ProviderDescriptor {
    /// Default short-lived token endpoint for the configured API version.
    pub fn default_token_endpoint(&self, api_version: &str) -> String {
        match self.kind {
            ProviderKind::Facebook | ProviderKind::InstagramBusiness => {
                format!("https://graph.facebook.com/{}/oauth/access_token", api_version)
            }
            ProviderKind::InstagramBasic => {
                "https://api.instagram.com/oauth/access_token".to_string()
            }
        }
    }

    /// Default long-lived upgrade endpoint for the configured API version.
    pub fn default_upgrade_endpoint(&self, api_version: &str) -> String {
        match self.kind {
            ProviderKind::Facebook | ProviderKind::InstagramBusiness => {
                format!("https://graph.facebook.com/{}/oauth/access_token", api_version)
            }
            ProviderKind::InstagramBasic => {
                "https://graph.instagram.com/access_token".to_string()
            }
        }
    }
}
