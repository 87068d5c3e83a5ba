//! Shared application state.

use crate::config::Config;
use sgs_billing_stripe::CheckoutClient;
use sgs_media_insights::InsightsClient;
use sgs_token_exchange::TokenExchanger;
use std::sync::Arc;

/// State shared across all request handlers.
///
/// The outbound clients are built once at startup from the loaded
/// configuration and are cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub exchanger: TokenExchanger,
    pub checkout: CheckoutClient,
    pub insights: InsightsClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let timeout = config.http.timeout_seconds;

        let exchanger = TokenExchanger::new(config.providers.to_map(), timeout);
        let checkout = CheckoutClient::new(config.stripe.clone(), timeout);
        let insights = InsightsClient::new(config.insights.graph_base.clone(), timeout);

        Self {
            config: Arc::new(config),
            exchanger,
            checkout,
            insights,
        }
    }
}
