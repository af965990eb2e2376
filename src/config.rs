use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEV_DEFAULT_JWT_SECRET: &str = "modas_pathy_development_secret_do_not_ship_0123456789";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT signing secret (HS256)
    #[validate(length(min = 32), custom = "validate_jwt_secret")]
    pub jwt_secret: String,

    /// JWT lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    #[validate(range(min = 300, max = 86400))]
    pub jwt_expiration: usize,

    #[serde(default = "default_auth_issuer")]
    pub auth_issuer: String,

    #[serde(default = "default_auth_audience")]
    pub auth_audience: String,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub environment: String,

    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Insert default themes, contact info and settings when tables are empty
    #[serde(default)]
    pub seed_defaults: bool,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    #[serde(default)]
    pub cors_allow_any_origin: bool,

    #[serde(default)]
    pub cors_allow_credentials: bool,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Root folder for product images
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Request body cap; also bounds decoded image size
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Public storefront URL used to build tracking links
    #[serde(default = "default_storefront_base_url")]
    pub storefront_base_url: String,

    #[serde(default = "default_event_channel_capacity")]
    #[validate(range(min = 1))]
    pub event_channel_capacity: usize,

    #[serde(default)]
    pub paypal_client_id: Option<String>,

    #[serde(default)]
    pub paypal_client_secret: Option<String>,

    #[serde(default = "default_paypal_base_url")]
    pub paypal_base_url: String,

    /// Settlement currency sent to the processor
    #[serde(default = "default_paypal_currency")]
    pub paypal_currency: String,

    /// Percentage fee charged by the processor, as a fraction (0.0349 = 3.49%)
    #[serde(default = "default_paypal_percent_fee")]
    #[validate(custom = "validate_percent_fee")]
    pub paypal_percent_fee: Decimal,

    /// Fixed fee per transaction in settlement currency
    #[serde(default = "default_paypal_fixed_fee")]
    pub paypal_fixed_fee: Decimal,

    #[serde(default = "default_payment_timeout_secs")]
    pub payment_timeout_secs: u64,

    /// Exchange rate used when site settings carry none
    #[serde(default = "default_fallback_exchange_rate")]
    pub fallback_exchange_rate: Decimal,

    #[serde(default)]
    pub bootstrap_admin_username: Option<String>,

    #[serde(default)]
    pub bootstrap_admin_password: Option<String>,
}

impl AppConfig {
    /// Builds a config with defaults for everything but the essentials.
    pub fn new(
        database_url: String,
        jwt_secret: String,
        host: String,
        port: u16,
        environment: String,
    ) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration: default_jwt_expiration(),
            auth_issuer: default_auth_issuer(),
            auth_audience: default_auth_audience(),
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            seed_defaults: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            cors_allow_credentials: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            storefront_base_url: default_storefront_base_url(),
            event_channel_capacity: default_event_channel_capacity(),
            paypal_client_id: None,
            paypal_client_secret: None,
            paypal_base_url: default_paypal_base_url(),
            paypal_currency: default_paypal_currency(),
            paypal_percent_fee: default_paypal_percent_fee(),
            paypal_fixed_fee: default_paypal_fixed_fee(),
            payment_timeout_secs: default_payment_timeout_secs(),
            fallback_exchange_rate: default_fallback_exchange_rate(),
            bootstrap_admin_username: None,
            bootstrap_admin_password: None,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn has_cors_allowed_origins(&self) -> bool {
        self.cors_allowed_origins
            .as_ref()
            .map(|raw| raw.split(',').any(|origin| !origin.trim().is_empty()))
            .unwrap_or(false)
    }

    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// True when both processor credentials are present and non-empty.
    pub fn paypal_configured(&self) -> bool {
        matches!(
            (&self.paypal_client_id, &self.paypal_client_secret),
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty()
        )
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS outside development or opt in with APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if !self.is_development() && self.jwt_secret.trim() == DEV_DEFAULT_JWT_SECRET {
            let mut err = ValidationError::new("jwt_secret_default_dev");
            err.message =
                Some("The development JWT secret must not be used outside development".into());
            errors.add("jwt_secret", err);
        }

        if self.fallback_exchange_rate <= Decimal::ZERO {
            let mut err = ValidationError::new("fallback_exchange_rate");
            err.message = Some("fallback_exchange_rate must be positive".into());
            errors.add("fallback_exchange_rate", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_jwt_expiration() -> usize {
    3600
}
fn default_auth_issuer() -> String {
    "modas-pathy-api".to_string()
}
fn default_auth_audience() -> String {
    "modas-pathy-admin".to_string()
}
fn default_db_max_connections() -> u32 {
    16
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_upload_dir() -> String {
    "static/uploads".to_string()
}
fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_storefront_base_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_event_channel_capacity() -> usize {
    256
}
fn default_paypal_base_url() -> String {
    "https://api-m.sandbox.paypal.com".to_string()
}
fn default_paypal_currency() -> String {
    "USD".to_string()
}
fn default_paypal_percent_fee() -> Decimal {
    dec!(0.0349)
}
fn default_paypal_fixed_fee() -> Decimal {
    dec!(0.30)
}
fn default_payment_timeout_secs() -> u64 {
    15
}
fn default_fallback_exchange_rate() -> Decimal {
    dec!(6.96)
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_jwt_secret(secret: &str) -> Result<(), ValidationError> {
    let trimmed = secret.trim();

    if let Some(first) = trimmed.chars().next() {
        if trimmed.chars().all(|c| c == first) {
            let mut err = ValidationError::new("jwt_secret");
            err.message = Some("JWT secret cannot be a repeated character sequence".into());
            return Err(err);
        }
    }

    let lower = trimmed.to_ascii_lowercase();
    if ["changeme", "your-secret-key", "default-secret-key"]
        .iter()
        .any(|bad| lower.contains(bad))
    {
        let mut err = ValidationError::new("jwt_secret");
        err.message = Some("JWT secret must be overridden with a random value".into());
        return Err(err);
    }

    Ok(())
}

fn validate_percent_fee(fee: &Decimal) -> Result<(), ValidationError> {
    if *fee < Decimal::ZERO || *fee >= Decimal::ONE {
        let mut err = ValidationError::new("paypal_percent_fee");
        err.message = Some("paypal_percent_fee must be in [0, 1)".into());
        return Err(err);
    }
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("modas_pathy_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt().with_env_filter(EnvFilter::new(filter_directive));
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads application configuration
///
/// Sources, later ones override earlier ones:
/// 1. Built-in defaults
/// 2. `config/default.toml`
/// 3. `config/{RUN_ENV}.toml`
/// 4. Environment variables (`APP__*`)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("database_url", "sqlite://modas_pathy.db?mode=rwc")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    if config.get_string("jwt_secret").is_err() {
        error!("JWT secret is not configured. Set APP__JWT_SECRET to a random string of at least 32 characters.");
        return Err(AppConfigError::Load(ConfigError::NotFound(
            "jwt_secret is required but not configured".into(),
        )));
    }

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig::new(
            "sqlite://modas.db?mode=memory".into(),
            "a_test_secret_with_enough_entropy_42xyz".into(),
            "127.0.0.1".into(),
            8080,
            "production".into(),
        )
    }

    #[test]
    fn non_dev_requires_cors_origins() {
        let cfg = base_config();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn non_dev_with_origins_passes() {
        let mut cfg = base_config();
        cfg.cors_allowed_origins = Some("https://modaspathy.com".into());
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn development_allows_permissive_cors() {
        let mut cfg = base_config();
        cfg.environment = "development".into();
        assert!(cfg.validate_additional_constraints().is_ok());
    }

    #[test]
    fn dev_secret_rejected_outside_development() {
        let mut cfg = base_config();
        cfg.cors_allow_any_origin = true;
        cfg.jwt_secret = DEV_DEFAULT_JWT_SECRET.into();
        assert!(cfg.validate_additional_constraints().is_err());
    }

    #[test]
    fn defaults_match_processor_fee_model() {
        let cfg = base_config();
        assert_eq!(cfg.paypal_percent_fee, dec!(0.0349));
        assert_eq!(cfg.paypal_fixed_fee, dec!(0.30));
        assert_eq!(cfg.fallback_exchange_rate, dec!(6.96));
        assert_eq!(cfg.max_upload_bytes, 16 * 1024 * 1024);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn paypal_requires_both_credentials() {
        let mut cfg = base_config();
        assert!(!cfg.paypal_configured());
        cfg.paypal_client_id = Some("id".into());
        assert!(!cfg.paypal_configured());
        cfg.paypal_client_secret = Some("  ".into());
        assert!(!cfg.paypal_configured());
        cfg.paypal_client_secret = Some("secret".into());
        assert!(cfg.paypal_configured());
    }

    #[test]
    fn percent_fee_must_be_a_fraction() {
        assert!(validate_percent_fee(&dec!(1)).is_err());
        assert!(validate_percent_fee(&dec!(-0.1)).is_err());
        assert!(validate_percent_fee(&dec!(0.0349)).is_ok());
    }
}
