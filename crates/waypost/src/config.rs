//! Configuration management for Waypost.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use waypost_common::constants::{
    ACCESS_TOKEN_EXPIRE_MINUTES, CAPTCHA_TTL_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_SLIDER_TOLERANCE,
    OTP_TTL_SECS, SWEEP_INTERVAL_SECS,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Slider CAPTCHA configuration
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// OTP configuration
    #[serde(default)]
    pub otp: OtpConfig,

    /// Access token configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// External user store (managed datastore)
    #[serde(default)]
    pub user_store: UserStoreConfig,

    /// Federated identity provider
    #[serde(default)]
    pub google: GoogleConfig,

    /// SMTP relay for OTP delivery
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Slider CAPTCHA configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    /// Challenge validity in seconds
    #[serde(default = "default_captcha_ttl")]
    pub challenge_ttl_secs: u64,

    /// Default verification tolerance in pixels
    #[serde(default = "default_tolerance")]
    pub default_tolerance: i64,

    /// Whether the generate response carries the cutout offset.
    /// The mobile client's contract expects it; disable for a hardened
    /// deployment where the client discovers the position visually.
    #[serde(default = "default_reveal_cutout")]
    pub reveal_cutout: bool,

    /// Base URL of the external placeholder image service
    #[serde(default = "default_puzzle_base_url")]
    pub puzzle_base_url: String,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            challenge_ttl_secs: default_captcha_ttl(),
            default_tolerance: default_tolerance(),
            reveal_cutout: default_reveal_cutout(),
            puzzle_base_url: default_puzzle_base_url(),
        }
    }
}

/// OTP configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// Code validity in seconds
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,

    /// Interval between expired-token sweeps in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Access token configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HS256 signing secret
    #[serde(default = "default_jwt_secret")]
    pub secret: String,

    /// Token validity in minutes
    #[serde(default = "default_jwt_expire")]
    pub expire_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            expire_minutes: default_jwt_expire(),
        }
    }
}

/// External user store configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserStoreConfig {
    /// Base URL of the managed datastore
    #[serde(default)]
    pub base_url: String,

    /// Service API key
    #[serde(default)]
    pub api_key: String,
}

/// Identity provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Token verification endpoint
    #[serde(default = "default_tokeninfo_url")]
    pub tokeninfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            tokeninfo_url: default_tokeninfo_url(),
        }
    }
}

/// SMTP relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// From address on outbound mail
    #[serde(default = "default_smtp_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_smtp_from(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_captcha_ttl() -> u64 { CAPTCHA_TTL_SECS }
fn default_tolerance() -> i64 { DEFAULT_SLIDER_TOLERANCE }
fn default_reveal_cutout() -> bool { true }
fn default_puzzle_base_url() -> String { "https://picsum.photos".to_string() }
fn default_otp_ttl() -> u64 { OTP_TTL_SECS }
fn default_sweep_interval() -> u64 { SWEEP_INTERVAL_SECS }
fn default_jwt_secret() -> String { "change-me".to_string() }
fn default_jwt_expire() -> i64 { ACCESS_TOKEN_EXPIRE_MINUTES }
fn default_tokeninfo_url() -> String {
    "https://oauth2.googleapis.com/tokeninfo".to_string()
}
fn default_smtp_host() -> String { "smtp.gmail.com".to_string() }
fn default_smtp_port() -> u16 { 587 }
fn default_smtp_from() -> String { "Waypost <no-reply@waypost.app>".to_string() }

impl AppConfig {
    /// Load configuration from file and environment, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .add_source(config::Environment::with_prefix("WAYPOST").separator("__"))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref secret) = args.jwt_secret {
            config.jwt.secret = secret.clone();
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            captcha: CaptchaConfig::default(),
            otp: OtpConfig::default(),
            jwt: JwtConfig::default(),
            user_store: UserStoreConfig::default(),
            google: GoogleConfig::default(),
            smtp: SmtpConfig::default(),
        }
    }
}
