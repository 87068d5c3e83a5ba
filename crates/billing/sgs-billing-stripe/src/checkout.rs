//! Stripe Checkout Session creation.

use crate::config::StripeSettings;
use crate::error::{BillingError, BillingResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";
pub const CHECKOUT_SESSIONS_PATH: &str = "/v1/checkout/sessions";

/// Billing cadence selected on the pricing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// The Stripe recurring interval this cadence maps to.
    pub fn interval(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "month",
            BillingCycle::Yearly => "year",
        }
    }
}

/// Checkout request as posted by the pricing page. `price` is in dollars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub plan: String,
    pub price: f64,
    pub billing_cycle: BillingCycle,
    pub user_id: String,
    pub user_email: String,
}

/// The subset of Stripe's session object the frontend needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Creates subscription Checkout Sessions against the Stripe API.
#[derive(Clone)]
pub struct CheckoutClient {
    http_client: Client,
    settings: StripeSettings,
}

impl CheckoutClient {
    pub fn new(settings: StripeSettings, http_timeout_seconds: u64) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(http_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            settings,
        }
    }

    /// Create a subscription session for the selected plan.
    ///
    /// One form-encoded POST authenticated with the secret key; a single
    /// attempt, no retry.
    pub async fn create_session(&self, request: &CheckoutRequest) -> BillingResult<CheckoutSession> {
        if self.settings.secret_key.trim().is_empty() {
            return Err(BillingError::Misconfigured {
                missing: vec!["STRIPE_SECRET_KEY".to_string()],
            });
        }

        let unit_amount = to_unit_amount(request.price)?;
        let base = self.settings.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let url = format!("{}{}", base, CHECKOUT_SESSIONS_PATH);

        let product_name = format!("{} plan", request.plan);
        let unit_amount_value = unit_amount.to_string();
        let form: Vec<(&str, &str)> = vec![
            ("mode", "subscription"),
            ("line_items[0][price_data][currency]", "usd"),
            (
                "line_items[0][price_data][product_data][name]",
                product_name.as_str(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                unit_amount_value.as_str(),
            ),
            (
                "line_items[0][price_data][recurring][interval]",
                request.billing_cycle.interval(),
            ),
            ("line_items[0][quantity]", "1"),
            ("customer_email", request.user_email.as_str()),
            ("client_reference_id", request.user_id.as_str()),
            ("metadata[plan]", request.plan.as_str()),
            ("metadata[user_id]", request.user_id.as_str()),
            ("success_url", self.settings.success_url.as_str()),
            ("cancel_url", self.settings.cancel_url.as_str()),
        ];

        let response = match self
            .http_client
            .post(&url)
            .basic_auth(&self.settings.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!("Checkout session request got no response: {}", err);
                return Err(BillingError::CheckoutFailed {
                    status: None,
                    details: empty_details(),
                });
            }
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let details = parse_error_body(response).await;
            warn!("Checkout session rejected with status {}", status);
            return Err(BillingError::CheckoutFailed {
                status: Some(status),
                details,
            });
        }

        let session: CheckoutSession = response.json().await.map_err(|err| {
            warn!("Checkout session response unusable: {}", err);
            BillingError::InvalidCheckoutResponse(err.to_string())
        })?;

        info!("Created checkout session {}", session.id);
        Ok(session)
    }
}

/// Convert a dollar price to integer cents, rejecting values Stripe cannot
/// represent as a unit amount.
fn to_unit_amount(price: f64) -> BillingResult<i64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(BillingError::InvalidPrice(
            "price must be a positive number".to_string(),
        ));
    }

    let cents = price * 100.0;
    let rounded = cents.round();
    if (cents - rounded).abs() > 1e-6 {
        return Err(BillingError::InvalidPrice(
            "price has sub-cent precision".to_string(),
        ));
    }

    Ok(rounded as i64)
}

async fn parse_error_body(response: reqwest::Response) -> Value {
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(_) => {
            if !text.is_empty() {
                warn!("Stripe error body was not JSON: {}", text);
            }
            empty_details()
        }
    }
}

fn empty_details() -> Value {
    Value::Object(serde_json::Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_dollar_prices_convert() {
        assert_eq!(to_unit_amount(9.0).unwrap(), 900);
        assert_eq!(to_unit_amount(29.99).unwrap(), 2999);
        assert_eq!(to_unit_amount(0.01).unwrap(), 1);
    }

    #[test]
    fn test_sub_cent_precision_rejected() {
        assert!(matches!(
            to_unit_amount(19.999),
            Err(BillingError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_non_positive_prices_rejected() {
        assert!(to_unit_amount(0.0).is_err());
        assert!(to_unit_amount(-5.0).is_err());
        assert!(to_unit_amount(f64::NAN).is_err());
        assert!(to_unit_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_billing_cycle_intervals() {
        assert_eq!(BillingCycle::Monthly.interval(), "month");
        assert_eq!(BillingCycle::Yearly.interval(), "year");
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let json = r#"{
            "plan": "growth",
            "price": 29.99,
            "billingCycle": "monthly",
            "userId": "user_42",
            "userEmail": "user@example.com"
        }"#;

        let request: CheckoutRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.plan, "growth");
        assert_eq!(request.billing_cycle, BillingCycle::Monthly);
        assert_eq!(request.user_id, "user_42");
    }
}
