//! Instagram account metrics for dashboard widgets.
//!
//! One call fetches the profile counters the dashboard shows. When the
//! upstream call fails for any reason the caller gets
//! [`InsightsError::Unavailable`] and renders the failure; placeholder
//! numbers are never fabricated here.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub type InsightsResult<T> = Result<T, InsightsError>;

#[derive(Debug, Error)]
pub enum InsightsError {
    /// The metrics could not be fetched. The reason is safe to surface; it
    /// never contains the access token.
    #[error("Insights unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Profile counters shown on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOverview {
    pub username: String,
    pub followers_count: u64,
    pub media_count: u64,
}

pub const DEFAULT_GRAPH_BASE: &str = "https://graph.instagram.com";

const OVERVIEW_FIELDS: &str = "username,followers_count,media_count";

/// Fetches account counters from the Instagram Graph API.
#[derive(Clone)]
pub struct InsightsClient {
    http_client: Client,
    graph_base: String,
}

impl InsightsClient {
    pub fn new(graph_base: impl Into<String>, http_timeout_seconds: u64) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(http_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            graph_base: graph_base.into(),
        }
    }

    /// Fetch the profile counters for one account.
    pub async fn account_overview(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> InsightsResult<AccountOverview> {
        let url = format!("{}/{}", self.graph_base, user_id);

        let response = match self
            .http_client
            .get(&url)
            .query(&[("fields", OVERVIEW_FIELDS), ("access_token", access_token)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("Insights request got no response: {}", err);
                return Err(InsightsError::Unavailable {
                    reason: "instagram api unreachable".to_string(),
                });
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("Insights request rejected with status {}", status);
            return Err(InsightsError::Unavailable {
                reason: format!("instagram api returned status {}", status),
            });
        }

        let overview: AccountOverview = response.json().await.map_err(|err| {
            warn!("Insights response unusable: {}", err);
            InsightsError::Unavailable {
                reason: "malformed instagram response".to_string(),
            }
        })?;

        debug!("Fetched account overview for {}", overview.username);
        Ok(overview)
    }
}
