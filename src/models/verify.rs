use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyNumberRequest {
    #[serde(rename = "phoneNumber")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyNumberResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "validationRequestSid")]
    pub validation_request_sid: Option<String>,
    #[serde(rename = "validationCode")]
    pub validation_code: Option<String>,
}
