//! Stripe billing collaborators for the growth gateway.
//!
//! Two concerns live here: creating Checkout Sessions for the pricing page,
//! and verifying/dispatching the webhook events Stripe sends back. Both are
//! stateless; persistence of subscription state is out of scope.

mod checkout;
mod config;
mod error;
mod webhook;

#[cfg(test)]
mod tests;

pub use checkout::{
    BillingCycle, CHECKOUT_SESSIONS_PATH, CheckoutClient, CheckoutRequest, CheckoutSession,
    DEFAULT_API_BASE,
};
pub use config::StripeSettings;
pub use error::{BillingError, BillingResult};
pub use webhook::{HANDLED_EVENTS, WebhookEvent, dispatch_event, is_handled_event, verify_signature};
