//! Voice webhooks: TwiML for outbound legs and call-status relays

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use std::sync::Arc;

use crate::models::{CallStatus, CallStatusWebhook, DialStatusWebhook, VoiceWebhook};
use crate::server::phone::{sanitize_number, strip_client_prefix};
use crate::server::twiml::{self, Dial, TwimlError, VoiceResponse};
use crate::server::AppState;

/// Where Twilio posts once the dialed leg ends
pub const DIAL_STATUS_PATH: &str = "/dial-status";

/// Seconds to ring the customer
pub const DIAL_TIMEOUT_SECS: u32 = 30;

const WELCOME_MESSAGE: &str = "Welcome to our calling system.";
const ERROR_MESSAGE: &str = "An error occurred. Please try again.";

fn xml_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], body).into_response()
}

/// Build the TwiML answering a browser-initiated call
pub fn outbound_twiml(to: Option<&str>, caller_id: &str) -> Result<String, TwimlError> {
    let mut response = VoiceResponse::new();

    match to {
        Some(to) if !to.is_empty() && to != "client" => {
            let number = sanitize_number(&strip_client_prefix(to));

            let mut dial = Dial::new()
                .caller_id(caller_id)
                .action(DIAL_STATUS_PATH)
                .timeout(DIAL_TIMEOUT_SECS)
                .record("do-not-record");

            if number.chars().any(|c| c.is_ascii_digit()) {
                dial = dial.number(&number);
            }

            response.dial(dial);
        }
        _ => {
            response.say(WELCOME_MESSAGE);
        }
    }

    response.to_xml()
}

/// TwiML app voice URL
pub async fn voice(
    State(state): State<Arc<AppState>>,
    Form(hook): Form<VoiceWebhook>,
) -> Response {
    tracing::info!(
        call_sid = hook.call_sid.as_deref().unwrap_or("-"),
        to = hook.to.as_deref().unwrap_or("-"),
        from = hook.from.as_deref().unwrap_or("-"),
        "Voice webhook"
    );

    match outbound_twiml(hook.to.as_deref(), &state.config.twilio.phone_number) {
        Ok(xml) => xml_response(xml),
        Err(e) => {
            tracing::error!("TwiML generation error: {}", e);
            xml_response(twiml::say_only(ERROR_MESSAGE))
        }
    }
}

/// `<Dial action>` callback: tell the agent how the dialed leg ended
pub async fn dial_status(Form(hook): Form<DialStatusWebhook>) -> Response {
    tracing::info!(
        call_sid = hook.call_sid.as_deref().unwrap_or("-"),
        status = hook.dial_call_status.as_deref().unwrap_or("-"),
        duration = hook.dial_call_duration.as_deref().unwrap_or("0"),
        "Dial completed"
    );

    xml_response(twiml::say_only(CallStatus::dial_outcome_message(hook.status())))
}

/// Status callback: log progress of the customer leg
pub async fn call_status(Form(hook): Form<CallStatusWebhook>) -> StatusCode {
    let call_sid = hook.call_sid.as_deref().unwrap_or("-");

    tracing::info!(
        call_sid,
        status = hook.call_status.as_deref().unwrap_or("-"),
        from = hook.from.as_deref().unwrap_or("-"),
        to = hook.to.as_deref().unwrap_or("-"),
        direction = hook.direction.as_deref().unwrap_or("-"),
        "Call status"
    );

    match hook.status() {
        Some(CallStatus::Ringing) => tracing::info!(call_sid, "Customer phone is ringing"),
        Some(CallStatus::InProgress) => tracing::info!(call_sid, "Customer answered, call in progress"),
        Some(CallStatus::Completed) => tracing::info!(call_sid, "Call completed successfully"),
        Some(CallStatus::Busy) => tracing::warn!(call_sid, "Customer line is busy"),
        Some(CallStatus::NoAnswer) => tracing::warn!(call_sid, "Customer did not answer"),
        Some(CallStatus::Failed) => tracing::warn!(call_sid, "Call failed"),
        Some(CallStatus::Canceled) => tracing::warn!(call_sid, "Call was canceled"),
        _ => {}
    }

    StatusCode::OK
}
