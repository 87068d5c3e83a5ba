//! Webhook signature verification and event dispatch.

use crate::error::{BillingError, BillingResult};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Event types the receiver acts on. Anything else is acknowledged and
/// ignored.
pub const HANDLED_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "customer.subscription.updated",
    "customer.subscription.deleted",
    "invoice.payment_failed",
];

pub fn is_handled_event(event_type: &str) -> bool {
    HANDLED_EVENTS.contains(&event_type)
}

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// The header carries `t=<unix>,v1=<hex>` where the hex value is an
/// HMAC-SHA256 of `"{t}.{body}"` keyed with the webhook secret. Timestamps
/// outside `tolerance_seconds` are rejected even when the signature itself
/// matches, closing the replay window.
pub fn verify_signature(
    payload: &str,
    signature_header: &str,
    secret: &str,
    tolerance_seconds: i64,
) -> BillingResult<()> {
    if secret.trim().is_empty() {
        return Err(BillingError::Misconfigured {
            missing: vec!["STRIPE_WEBHOOK_SECRET".to_string()],
        });
    }

    let mut timestamp: Option<&str> = None;
    let mut signature: Option<&str> = None;
    for part in signature_header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| BillingError::InvalidSignature("missing timestamp".to_string()))?;
    let signature = signature
        .ok_or_else(|| BillingError::InvalidSignature("missing v1 signature".to_string()))?;

    let timestamp_value: i64 = timestamp
        .parse()
        .map_err(|_| BillingError::InvalidSignature("timestamp is not a number".to_string()))?;
    let age = (Utc::now().timestamp() - timestamp_value).abs();
    if age > tolerance_seconds {
        return Err(BillingError::InvalidSignature(
            "timestamp outside tolerance".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::InvalidSignature("secret unusable as HMAC key".to_string()))?;
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if expected.as_bytes().ct_eq(signature.as_bytes()).into() {
        Ok(())
    } else {
        Err(BillingError::InvalidSignature(
            "signature mismatch".to_string(),
        ))
    }
}

/// The slice of a Stripe event the receiver inspects.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

/// React to a verified event.
///
/// Subscription state lives with the payment provider, so handling here
/// means pulling out the identifiers worth logging. Unhandled types are
/// acknowledged without comment.
pub fn dispatch_event(event: &WebhookEvent) {
    if !is_handled_event(&event.event_type) {
        debug!("Ignoring webhook event type {}", event.event_type);
        return;
    }

    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let reference = field(event, "/object/client_reference_id");
            info!("Checkout completed for user {} ({})", reference, event.id);
        }
        "customer.subscription.updated" => {
            let subscription = field(event, "/object/id");
            let status = field(event, "/object/status");
            info!("Subscription {} now {}", subscription, status);
        }
        "customer.subscription.deleted" => {
            let subscription = field(event, "/object/id");
            info!("Subscription {} canceled", subscription);
        }
        "invoice.payment_failed" => {
            let customer = field(event, "/object/customer");
            warn!("Invoice payment failed for customer {}", customer);
        }
        _ => {}
    }
}

fn field<'a>(event: &'a WebhookEvent, pointer: &str) -> &'a str {
    event
        .data
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(payload: &str, secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        )
    }

    #[test]
    fn test_valid_signature_passes() {
        let payload = r#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, "whsec_test", Utc::now().timestamp());
        assert!(verify_signature(payload, &header, "whsec_test", 300).is_ok());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let header = sign(
            r#"{"amount":100}"#,
            "whsec_test",
            Utc::now().timestamp(),
        );
        let err = verify_signature(r#"{"amount":9999}"#, &header, "whsec_test", 300).unwrap_err();
        assert!(matches!(err, BillingError::InvalidSignature(_)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = r#"{"type":"test"}"#;
        let header = sign(payload, "whsec_other", Utc::now().timestamp());
        let err = verify_signature(payload, &header, "whsec_test", 300).unwrap_err();
        assert!(matches!(err, BillingError::InvalidSignature(_)));
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let payload = r#"{"type":"test"}"#;
        let header = sign(payload, "whsec_test", Utc::now().timestamp() - 400);
        let err = verify_signature(payload, &header, "whsec_test", 300).unwrap_err();
        match err {
            BillingError::InvalidSignature(reason) => {
                assert_eq!(reason, "timestamp outside tolerance");
            }
            other => panic!("expected InvalidSignature, got {other:?}"),
        }
    }

    #[test]
    fn test_recent_timestamp_within_tolerance_passes() {
        let payload = r#"{"type":"test"}"#;
        let header = sign(payload, "whsec_test", Utc::now().timestamp() - 100);
        assert!(verify_signature(payload, &header, "whsec_test", 300).is_ok());
    }

    #[test]
    fn test_missing_header_parts_rejected() {
        let payload = r#"{"type":"test"}"#;
        assert!(verify_signature(payload, "v1=abc", "whsec_test", 300).is_err());
        assert!(verify_signature(payload, "t=12345", "whsec_test", 300).is_err());
        assert!(verify_signature(payload, "", "whsec_test", 300).is_err());
        assert!(verify_signature(payload, "t=notanumber,v1=abc", "whsec_test", 300).is_err());
    }

    #[test]
    fn test_empty_secret_is_misconfiguration() {
        let err = verify_signature("{}", "t=1,v1=abc", "", 300).unwrap_err();
        match err {
            BillingError::Misconfigured { missing } => {
                assert_eq!(missing, vec!["STRIPE_WEBHOOK_SECRET"]);
            }
            other => panic!("expected Misconfigured, got {other:?}"),
        }
    }

    #[test]
    fn test_handled_event_list() {
        assert!(is_handled_event("checkout.session.completed"));
        assert!(is_handled_event("invoice.payment_failed"));
        assert!(!is_handled_event("customer.created"));
        assert!(!is_handled_event(""));
    }

    #[test]
    fn test_event_deserializes_stripe_shape() {
        let json = r#"{
            "id": "evt_1Nv8xK2eZvKYlo2C",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_a1b2c3",
                    "client_reference_id": "user_42"
                }
            }
        }"#;

        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(
            event.data.pointer("/object/client_reference_id"),
            Some(&serde_json::json!("user_42"))
        );

        // Dispatch must not panic on any shape.
        dispatch_event(&event);
        dispatch_event(&WebhookEvent {
            id: String::new(),
            event_type: "customer.subscription.updated".to_string(),
            data: Value::Null,
        });
    }
}
