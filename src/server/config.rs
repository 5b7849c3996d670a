//! Service configuration
//!
//! Everything comes from the environment (a `.env` file is loaded first by
//! `main`). Vendor credentials are required; the rest have defaults.

use axum::http::HeaderValue;
use thiserror::Error;

use crate::server::auth::MAX_TOKEN_TTL_SECS;

pub const DEFAULT_API_BASE: &str = "https://api.twilio.com/2010-04-01";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} must be {expected}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
    },
}

/// Twilio account and application settings
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Account SID (`AC...`), token subject and REST user
    pub account_sid: String,

    /// Auth token for the REST API
    pub auth_token: String,

    /// API key SID (`SK...`) that signs access tokens
    pub api_key: String,

    /// API key secret
    pub api_secret: String,

    /// TwiML application the browser's outgoing calls are routed to
    pub twiml_app_sid: String,

    /// Caller ID presented on outbound legs (e.g., "+15551234567")
    pub phone_number: String,

    /// REST API base URL
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,

    /// Origin allowed by CORS (credentialed, so never `*`)
    pub frontend_origin: HeaderValue,

    /// Access token lifetime in seconds
    pub token_ttl_secs: u64,

    pub twilio: TwilioConfig,
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a valid port number",
            })?,
            None => 3001,
        };

        let token_ttl_secs = match lookup("TOKEN_TTL_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ttl| (1..=MAX_TOKEN_TTL_SECS).contains(ttl))
                .ok_or(ConfigError::Invalid {
                    name: "TOKEN_TTL_SECS",
                    expected: "between 1 and 86400 seconds",
                })?,
            None => 3600,
        };

        let frontend_origin = match lookup("FRONTEND_URL") {
            Some(raw) => Some(raw.trim().to_string())
                .filter(|url| !url.is_empty() && url != "*")
                .and_then(|url| HeaderValue::from_str(&url).ok())
                .ok_or(ConfigError::Invalid {
                    name: "FRONTEND_URL",
                    expected: "a single origin such as http://localhost:3000",
                })?,
            None => HeaderValue::from_static(DEFAULT_FRONTEND_URL),
        };

        let twilio = TwilioConfig {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            api_key: required("TWILIO_API_KEY")?,
            api_secret: required("TWILIO_API_SECRET")?,
            twiml_app_sid: required("TWILIO_TWIML_APP_SID")?,
            phone_number: required("TWILIO_PHONE_NUMBER")?,
            api_base: lookup("TWILIO_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };

        Ok(Self {
            port,
            frontend_origin,
            token_ttl_secs,
            twilio,
        })
    }
}
