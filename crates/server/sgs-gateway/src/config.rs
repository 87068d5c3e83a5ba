//! Configuration module for the gateway
//!
//! Configuration is read once at process start from an optional config file
//! (config.toml), environment variables with the GATEWAY_ prefix, and a
//! handful of flat legacy variables (FACEBOOK_APP_ID, STRIPE_SECRET_KEY, ...)
//! that existing deployments already set. Handlers receive the resulting
//! struct through shared state.
//!
//! A provider with incomplete credentials does not prevent startup; requests
//! against it fail closed at request time.

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use sgs_billing_stripe::StripeSettings;
use sgs_token_exchange::{ProviderKind, ProviderSettings};
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::{debug, info};
use url::Url;

/// Main configuration struct for the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Per-provider OAuth application settings
    pub providers: ProvidersConfig,

    /// Stripe billing settings
    pub stripe: StripeSettings,

    /// Instagram insights settings
    pub insights: InsightsConfig,

    /// Outbound HTTP client configuration
    pub http: HttpClientConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Whether to allow any origin (default: true)
    #[serde(default = "default_true")]
    pub allow_any_origin: bool,

    /// Specific allowed origins (only used if allow_any_origin is false)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// OAuth application settings for each supported provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub facebook: ProviderSettings,
    pub instagram_basic: ProviderSettings,
    pub instagram_business: ProviderSettings,
}

/// Instagram insights settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Base URL of the Instagram Graph API
    #[serde(default = "default_graph_base")]
    pub graph_base: String,
}

/// Outbound HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Timeout for outbound provider and Stripe calls, in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter string
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_host() -> IpAddr {
    "127.0.0.1".parse().unwrap()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_graph_base() -> String {
    sgs_media_insights::DEFAULT_GRAPH_BASE.to_string()
}

fn default_http_timeout() -> u64 {
    sgs_token_exchange::DEFAULT_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            providers: ProvidersConfig::default(),
            stripe: StripeSettings::default(),
            insights: InsightsConfig::default(),
            http: HttpClientConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            allowed_origins: vec![],
        }
    }
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            graph_base: default_graph_base(),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::Facebook => &self.facebook,
            ProviderKind::InstagramBasic => &self.instagram_basic,
            ProviderKind::InstagramBusiness => &self.instagram_business,
        }
    }

    fn get_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::Facebook => &mut self.facebook,
            ProviderKind::InstagramBasic => &mut self.instagram_basic,
            ProviderKind::InstagramBusiness => &mut self.instagram_business,
        }
    }

    /// Settings map handed to the exchanger at startup.
    pub fn to_map(&self) -> HashMap<ProviderKind, ProviderSettings> {
        ProviderKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind).clone()))
            .collect()
    }
}

impl Config {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // Check for config file
        let config_path =
            std::env::var("GATEWAY_CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            info!("Loading configuration from {}", config_path);
            builder = builder.add_source(File::with_name(&config_path));
        } else {
            debug!("No config file found at {}, using defaults", config_path);
        }

        // Add environment variables with GATEWAY_ prefix
        builder = builder.add_source(
            Environment::with_prefix("GATEWAY")
                .separator("__") // Use __ for nested values, e.g., GATEWAY__SERVER__PORT
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut settings: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings.apply_env_overrides()?;
        settings.validate()?;

        Ok(settings)
    }

    /// Apply the flat environment variables existing deployments set
    fn apply_env_overrides(&mut self) -> Result<()> {
        for kind in ProviderKind::ALL {
            let env = kind.descriptor().env;
            let settings = self.providers.get_mut(kind);

            if let Ok(value) = std::env::var(env.client_id) {
                info!("Using {} environment variable", env.client_id);
                settings.client_id = value;
            }
            if let Ok(value) = std::env::var(env.client_secret) {
                info!("Using {} environment variable", env.client_secret);
                settings.client_secret = value;
            }
            if let Ok(value) = std::env::var(env.redirect_uri) {
                info!("Using {} environment variable", env.redirect_uri);
                settings.redirect_uri = value;
            }
        }

        if let Ok(value) = std::env::var("STRIPE_SECRET_KEY") {
            info!("Using STRIPE_SECRET_KEY environment variable");
            self.stripe.secret_key = value;
        }
        if let Ok(value) = std::env::var("STRIPE_WEBHOOK_SECRET") {
            info!("Using STRIPE_WEBHOOK_SECRET environment variable");
            self.stripe.webhook_secret = value;
        }

        if let Ok(host) = std::env::var("HOST") {
            info!("Using HOST environment variable");
            self.server.host = host.parse().context("Invalid HOST value")?;
        }
        if let Ok(port) = std::env::var("PORT") {
            info!("Using PORT environment variable");
            self.server.port = port.parse().context("Invalid PORT value")?;
        }
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            self.logging.level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.http.timeout_seconds == 0 {
            anyhow::bail!("Outbound HTTP timeout must be greater than 0");
        }

        if self.stripe.webhook_tolerance_seconds <= 0 {
            anyhow::bail!("Webhook timestamp tolerance must be positive");
        }

        // A full filter string is passed to tracing as-is
        if !self.logging.level.contains('=') && !self.logging.level.contains(',') {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            let level_lower = self.logging.level.to_lowercase();
            if !valid_levels.contains(&level_lower.as_str()) {
                anyhow::bail!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level,
                    valid_levels
                );
            }
        }

        let valid_formats = ["pretty", "json", "compact"];
        let format_lower = self.logging.format.to_lowercase();
        if !valid_formats.contains(&format_lower.as_str()) {
            anyhow::bail!(
                "Invalid log format '{}'. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            );
        }

        // Endpoint overrides must at least parse when present
        for kind in ProviderKind::ALL {
            let settings = self.providers.get(kind);
            for endpoint in [&settings.token_endpoint, &settings.upgrade_endpoint]
                .into_iter()
                .flatten()
            {
                Url::parse(endpoint)
                    .with_context(|| format!("Invalid endpoint override for provider {}", kind))?;
            }
        }

        if let Some(api_base) = &self.stripe.api_base {
            Url::parse(api_base).context("Invalid Stripe api_base")?;
        }
        Url::parse(&self.stripe.success_url).context("Invalid Stripe success_url")?;
        Url::parse(&self.stripe.cancel_url).context("Invalid Stripe cancel_url")?;
        Url::parse(&self.insights.graph_base).context("Invalid insights graph_base")?;

        if !self.server.cors.allow_any_origin {
            if self.server.cors.allowed_origins.is_empty() {
                anyhow::bail!(
                    "CORS: If allow_any_origin is false, allowed_origins must be specified"
                );
            }
            for origin in &self.server.cors.allowed_origins {
                Url::parse(origin).with_context(|| format!("Invalid CORS origin '{origin}'"))?;
            }
        }

        Ok(())
    }

    /// Get the socket address for the server
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from((self.server.host, self.server.port))
    }

    /// Get the log filter string for tracing
    pub fn log_filter(&self) -> String {
        // If it looks like a full filter string, use it as-is
        if self.logging.level.contains('=') || self.logging.level.contains(',') {
            self.logging.level.clone()
        } else {
            format!(
                "sgs_gateway={},sgs_token_exchange={},sgs_billing_stripe={},{}",
                self.logging.level, self.logging.level, self.logging.level, self.logging.level
            )
        }
    }
}
