use serde::{Deserialize, Serialize};

/// Body of `POST /token`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenRequest {
    pub identity: Option<String>,
}

impl TokenRequest {
    /// The identity, if present and not blank
    pub fn identity(&self) -> Option<&str> {
        self.identity
            .as_deref()
            .map(str::trim)
            .filter(|identity| !identity.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub identity: String,
    pub token: String,
}

/// Query of the older `GET /get-twilio-token?emp=` route
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyTokenQuery {
    pub emp: Option<String>,
}

/// Error payload returned by the JSON routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
