//! Access tokens for the browser voice SDK
//!
//! Tokens are HS256 JWTs signed with an API key secret, carrying a voice
//! grant that lets the holder place calls through the TwiML app and receive
//! calls addressed to its identity.

use axum::{
    body::Bytes,
    extract::{FromRequest, Query, Request, State},
    http::{header, StatusCode},
    Form, Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{ErrorBody, LegacyTokenQuery, TokenRequest, TokenResponse};
use crate::server::AppState;

/// Content type Twilio expects in the token header
pub const TOKEN_CONTENT_TYPE: &str = "twilio-fpa;v=1";

/// Identity used by the older query-string route when none is given
pub const DEFAULT_IDENTITY: &str = "employee1";

/// Longest lifetime Twilio accepts for an access token (24 hours)
pub const MAX_TOKEN_TTL_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceGrant {
    pub outgoing_application_sid: Option<String>,
    pub incoming_allow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingClaim {
    pub allow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingClaim {
    pub application_sid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceClaim {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<IncomingClaim>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<OutgoingClaim>,
}

impl From<&VoiceGrant> for VoiceClaim {
    fn from(grant: &VoiceGrant) -> Self {
        Self {
            incoming: grant.incoming_allow.then_some(IncomingClaim { allow: true }),
            outgoing: grant
                .outgoing_application_sid
                .as_ref()
                .map(|sid| OutgoingClaim { application_sid: sid.clone() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grants {
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceClaim>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub jti: String,
    pub iss: String,      // API key SID
    pub sub: String,      // account SID
    pub iat: i64,
    pub exp: i64,
    pub grants: Grants,
}

/// An unsigned access token
#[derive(Debug, Clone)]
pub struct AccessToken {
    account_sid: String,
    api_key: String,
    api_secret: String,
    identity: String,
    ttl_secs: u64,
    voice: Option<VoiceGrant>,
}

impl AccessToken {
    pub fn new(account_sid: &str, api_key: &str, api_secret: &str, identity: &str) -> Self {
        Self {
            account_sid: account_sid.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            identity: identity.to_string(),
            ttl_secs: 3600,
            voice: None,
        }
    }

    /// Lifetimes above `MAX_TOKEN_TTL_SECS` are clamped to it
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs.min(MAX_TOKEN_TTL_SECS);
        self
    }

    pub fn add_grant(&mut self, grant: VoiceGrant) {
        self.voice = Some(grant);
    }

    /// Claims as of `issued_at` (unix seconds)
    pub fn claims(&self, issued_at: i64) -> Claims {
        let exp = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(|ttl| issued_at.checked_add(ttl))
            .unwrap_or(i64::MAX);

        Claims {
            jti: format!("{}-{}", self.api_key, issued_at),
            iss: self.api_key.clone(),
            sub: self.account_sid.clone(),
            iat: issued_at,
            exp,
            grants: Grants {
                identity: self.identity.clone(),
                voice: self.voice.as_ref().map(VoiceClaim::from),
            },
        }
    }

    /// Sign the token
    pub fn to_jwt(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let mut header = Header::new(Algorithm::HS256);
        header.cty = Some(TOKEN_CONTENT_TYPE.to_string());

        encode(
            &header,
            &self.claims(chrono::Utc::now().timestamp()),
            &EncodingKey::from_secret(self.api_secret.as_bytes()),
        )
    }
}

/// Validate a token and extract claims
pub fn decode_token(token: &str, api_secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(api_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}

/// Build and sign a voice token for `identity` from the service config
fn voice_token(state: &AppState, identity: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let twilio = &state.config.twilio;

    let mut token = AccessToken::new(
        &twilio.account_sid,
        &twilio.api_key,
        &twilio.api_secret,
        identity,
    )
    .with_ttl(state.config.token_ttl_secs);

    token.add_grant(VoiceGrant {
        outgoing_application_sid: Some(twilio.twiml_app_sid.clone()),
        incoming_allow: true,
    });

    token.to_jwt()
}

/// Token request body, sent as JSON or as a urlencoded form
///
/// A missing or unreadable body yields an empty request, which the handler
/// then rejects for lacking an identity.
impl<S> FromRequest<S> for TokenRequest
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorBody>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let parsed = if is_form {
            Form::<TokenRequest>::from_request(req, state)
                .await
                .ok()
                .map(|Form(body)| body)
        } else {
            Bytes::from_request(req, state)
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .and_then(|body| serde_json::from_slice::<TokenRequest>(&body).ok())
        };

        Ok(parsed.unwrap_or_default())
    }
}

/// Token handler
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    req: TokenRequest,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorBody>)> {
    let identity = req.identity().ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Identity is required")),
        )
    })?;

    let token = voice_token(&state, identity).map_err(|e| {
        tracing::error!("Token generation error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Failed to generate token")),
        )
    })?;

    tracing::info!(identity, "Issued voice access token");

    Ok(Json(TokenResponse {
        identity: identity.to_string(),
        token,
    }))
}

/// Query-string token handler kept for dialers that still call it
pub async fn legacy_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LegacyTokenQuery>,
) -> Result<Json<TokenResponse>, (StatusCode, Json<ErrorBody>)> {
    let identity = query
        .emp
        .filter(|emp| !emp.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_IDENTITY.to_string());

    let token = voice_token(&state, &identity).map_err(|e| {
        tracing::error!("Token generation error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("Failed to generate token")),
        )
    })?;

    Ok(Json(TokenResponse { identity, token }))
}
