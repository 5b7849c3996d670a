use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Twilio call / dial status
///
/// Parsing never fails: values Twilio may add later land in `Unknown`.
/// Matching is exact, so `" busy"` or `"BUSY"` are unknown too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Queued,
    Ringing,
    InProgress,
    Answered,
    Completed,
    Busy,
    NoAnswer,
    Failed,
    Canceled,
    Unknown,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Queued => "queued",
            CallStatus::Ringing => "ringing",
            CallStatus::InProgress => "in-progress",
            CallStatus::Answered => "answered",
            CallStatus::Completed => "completed",
            CallStatus::Busy => "busy",
            CallStatus::NoAnswer => "no-answer",
            CallStatus::Failed => "failed",
            CallStatus::Canceled => "canceled",
            CallStatus::Unknown => "unknown",
        }
    }

    /// What the agent hears once the dialed leg has finished
    pub fn dial_outcome_message(status: Option<CallStatus>) -> &'static str {
        match status {
            Some(CallStatus::Completed) => "Call completed. Thank you.",
            Some(CallStatus::Busy) => "The customer line is busy. Please try again later.",
            Some(CallStatus::NoAnswer) => "The customer did not answer. Please try again later.",
            Some(CallStatus::Failed) => "The call failed. Please check the number and try again.",
            Some(CallStatus::Canceled) => "The call was canceled.",
            _ => "Call ended.",
        }
    }

    /// Statuses shown in the call history
    pub fn history_filter() -> [CallStatus; 3] {
        [CallStatus::Completed, CallStatus::InProgress, CallStatus::Ringing]
    }
}

impl From<&str> for CallStatus {
    fn from(value: &str) -> Self {
        match value {
            "queued" => CallStatus::Queued,
            "ringing" => CallStatus::Ringing,
            "in-progress" => CallStatus::InProgress,
            "answered" => CallStatus::Answered,
            "completed" => CallStatus::Completed,
            "busy" => CallStatus::Busy,
            "no-answer" => CallStatus::NoAnswer,
            "failed" => CallStatus::Failed,
            "canceled" => CallStatus::Canceled,
            _ => CallStatus::Unknown,
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form body Twilio posts to the TwiML app's voice URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoiceWebhook {
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
}

/// Form body posted to the `<Dial action>` URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DialStatusWebhook {
    #[serde(rename = "DialCallStatus")]
    pub dial_call_status: Option<String>,
    #[serde(rename = "DialCallDuration")]
    pub dial_call_duration: Option<String>,
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
}

impl DialStatusWebhook {
    pub fn status(&self) -> Option<CallStatus> {
        self.dial_call_status.as_deref().map(CallStatus::from)
    }
}

/// Form body posted to the status callback URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallStatusWebhook {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,
    #[serde(rename = "To")]
    pub to: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Direction")]
    pub direction: Option<String>,
}

impl CallStatusWebhook {
    pub fn status(&self) -> Option<CallStatus> {
        self.call_status.as_deref().map(CallStatus::from)
    }
}

/// One row of `GET /calls`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSummary {
    pub sid: String,
    pub to: Option<String>,
    pub from: Option<String>,
    /// Twilio's status string, passed through as sent
    pub status: String,
    pub duration: Option<String>,
    #[serde(rename = "dateCreated")]
    pub date_created: Option<DateTime<Utc>>,
}
