//! HTTP gateway for the growth dashboard's backend.
//!
//! One axum surface in front of three stateless clients: the social token
//! exchange, Stripe billing, and Instagram insights. Configuration is read
//! once at startup and injected through shared state; handlers never touch
//! the environment.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
