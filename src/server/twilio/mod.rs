//! Twilio REST API client

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{CallStatus, CallSummary};
use crate::server::config::TwilioConfig;

/// Page size and cap for the call history
pub const CALL_HISTORY_LIMIT: usize = 50;

#[derive(Error, Debug)]
pub enum TwilioError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioClient {
    pub fn new(config: &TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            base_url: config.api_base.clone(),
        }
    }

    fn account_url(&self, path: &str) -> String {
        format!("{}/Accounts/{}{}", self.base_url, self.account_sid, path)
    }

    async fn parse<R: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<R, TwilioError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(TwilioError::Api { status: status.as_u16(), message });
        }

        Ok(response.json().await?)
    }

    async fn get<R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<R, TwilioError> {
        let response = self
            .client
            .get(self.account_url(path))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .query(query)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn post_form<R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<R, TwilioError> {
        let response = self
            .client
            .post(self.account_url(path))
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(form)
            .send()
            .await?;

        Self::parse(response).await
    }

    /// Most recent calls in any of `statuses`, newest first
    ///
    /// The list endpoint filters on a single status, so each status is a
    /// separate request and the pages are merged.
    pub async fn list_calls(
        &self,
        statuses: &[CallStatus],
        limit: usize,
    ) -> Result<Vec<CallSummary>, TwilioError> {
        let page_size = limit.to_string();
        let mut calls = Vec::new();

        for status in statuses {
            let page: CallsPage = self
                .get(
                    "/Calls.json",
                    &[("Status", status.as_str()), ("PageSize", page_size.as_str())],
                )
                .await?;
            calls.extend(page.calls.into_iter().map(CallRecord::into_summary));
        }

        Ok(merge_newest_first(calls, limit))
    }

    /// Start caller-ID verification; Twilio phones the number with a code
    pub async fn create_validation_request(
        &self,
        phone_number: &str,
        friendly_name: &str,
    ) -> Result<ValidationRequest, TwilioError> {
        self.post_form(
            "/OutgoingCallerIds.json",
            &[("PhoneNumber", phone_number), ("FriendlyName", friendly_name)],
        )
        .await
    }
}

fn merge_newest_first(mut calls: Vec<CallSummary>, limit: usize) -> Vec<CallSummary> {
    calls.sort_by(|a, b| b.date_created.cmp(&a.date_created));
    calls.truncate(limit);
    calls
}

// Response types

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallsPage {
    #[serde(default)]
    calls: Vec<CallRecord>,
}

#[derive(Debug, Deserialize)]
struct CallRecord {
    sid: String,
    to: Option<String>,
    from: Option<String>,
    status: String,
    duration: Option<String>,
    date_created: Option<String>,
}

impl CallRecord {
    fn into_summary(self) -> CallSummary {
        CallSummary {
            sid: self.sid,
            to: self.to,
            from: self.from,
            status: self.status,
            duration: self.duration,
            date_created: self.date_created.as_deref().and_then(parse_twilio_date),
        }
    }
}

/// Twilio REST dates are RFC 2822 ("Tue, 31 Aug 2010 20:36:28 +0000")
fn parse_twilio_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationRequest {
    pub call_sid: Option<String>,
    #[serde(default, deserialize_with = "code_as_string")]
    pub validation_code: Option<String>,
}

/// The validation code arrives as either a JSON string or number
fn code_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(code)) => Some(code),
        Some(serde_json::Value::Number(code)) => Some(code.to_string()),
        _ => None,
    })
}
