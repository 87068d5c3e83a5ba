//! Integration tests for checkout-session creation, run against a mock
//! Stripe API.

#[cfg(test)]
mod integration_tests {
    use crate::{BillingCycle, BillingError, CheckoutClient, CheckoutRequest, StripeSettings};
    use base64::Engine;
    use wiremock::matchers::{any, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings(api_base: &str) -> StripeSettings {
        StripeSettings {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_test".to_string(),
            api_base: Some(api_base.to_string()),
            ..StripeSettings::default()
        }
    }

    fn test_request() -> CheckoutRequest {
        CheckoutRequest {
            plan: "growth".to_string(),
            price: 29.99,
            billing_cycle: BillingCycle::Monthly,
            user_id: "user_42".to_string(),
            user_email: "user@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_session_posts_expected_form() {
        let mock_server = MockServer::start().await;

        // Stripe authenticates with the secret key as basic-auth username.
        let expected_auth = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("sk_test_123:")
        );

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", expected_auth.as_str()))
            .and(body_string_contains("mode=subscription"))
            .and(body_string_contains("unit_amount%5D=2999"))
            .and(body_string_contains("interval%5D=month"))
            .and(body_string_contains("customer_email=user%40example.com"))
            .and(body_string_contains("client_reference_id=user_42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_a1b2c3",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_a1b2c3"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = CheckoutClient::new(test_settings(&mock_server.uri()), 5);
        let session = client.create_session(&test_request()).await.unwrap();

        assert_eq!(session.id, "cs_test_a1b2c3");
        assert_eq!(
            session.url,
            "https://checkout.stripe.com/c/pay/cs_test_a1b2c3"
        );
    }

    #[tokio::test]
    async fn test_yearly_cycle_maps_to_year_interval() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("interval%5D=year"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_yearly",
                "url": "https://checkout.stripe.com/c/pay/cs_test_yearly"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = CheckoutClient::new(test_settings(&mock_server.uri()), 5);
        let request = CheckoutRequest {
            billing_cycle: BillingCycle::Yearly,
            price: 299.0,
            ..test_request()
        };

        let session = client.create_session(&request).await;
        tokio_test::assert_ok!(session);
    }

    #[tokio::test]
    async fn test_upstream_rejection_surfaces_status_and_details() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": {
                    "message": "Your card was declined.",
                    "type": "card_error"
                }
            })))
            .mount(&mock_server)
            .await;

        let client = CheckoutClient::new(test_settings(&mock_server.uri()), 5);
        let err = client.create_session(&test_request()).await.unwrap_err();

        match err {
            BillingError::CheckoutFailed { status, details } => {
                assert_eq!(status, Some(402));
                assert_eq!(details["error"]["type"], "card_error");
            }
            other => panic!("expected CheckoutFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_secret_key_fails_before_any_call() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let settings = StripeSettings {
            secret_key: String::new(),
            ..test_settings(&mock_server.uri())
        };

        let client = CheckoutClient::new(settings, 5);
        let err = client.create_session(&test_request()).await.unwrap_err();

        match err {
            BillingError::Misconfigured { missing } => {
                assert_eq!(missing, vec!["STRIPE_SECRET_KEY"]);
            }
            other => panic!("expected Misconfigured, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_price_fails_before_any_call() {
        let mock_server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = CheckoutClient::new(test_settings(&mock_server.uri()), 5);
        let request = CheckoutRequest {
            price: 19.999,
            ..test_request()
        };

        let err = client.create_session(&request).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidPrice(_)));
    }

    #[tokio::test]
    async fn test_malformed_session_response_is_invalid() {
        let mock_server = MockServer::start().await;

        // A session without a url is unusable for redirecting the browser.
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_a1b2c3"
            })))
            .mount(&mock_server)
            .await;

        let client = CheckoutClient::new(test_settings(&mock_server.uri()), 5);
        let err = client.create_session(&test_request()).await.unwrap_err();
        assert!(matches!(err, BillingError::InvalidCheckoutResponse(_)));
    }
}
