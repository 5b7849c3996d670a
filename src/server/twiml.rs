//! TwiML response builder

use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TwimlError {
    #[error("<Dial> needs at least one number")]
    EmptyDial,
    #[error("Failed to write document: {0}")]
    Write(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, Default)]
pub struct Dial {
    pub caller_id: Option<String>,
    pub action: Option<String>,
    pub timeout: Option<u32>,
    pub record: Option<String>, // e.g. "do-not-record"
    pub numbers: Vec<String>,
}

impl Dial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn caller_id(mut self, caller_id: &str) -> Self {
        self.caller_id = Some(caller_id.to_string());
        self
    }

    pub fn action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn timeout(mut self, seconds: u32) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn record(mut self, record: &str) -> Self {
        self.record = Some(record.to_string());
        self
    }

    pub fn number(mut self, number: &str) -> Self {
        self.numbers.push(number.to_string());
        self
    }
}

#[derive(Debug, Clone)]
enum Verb {
    Say(String),
    Dial(Dial),
}

/// A `<Response>` document
#[derive(Debug, Clone, Default)]
pub struct VoiceResponse {
    verbs: Vec<Verb>,
}

impl VoiceResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, text: &str) -> &mut Self {
        self.verbs.push(Verb::Say(text.to_string()));
        self
    }

    pub fn dial(&mut self, dial: Dial) -> &mut Self {
        self.verbs.push(Verb::Dial(dial));
        self
    }

    pub fn to_xml(&self) -> Result<String, TwimlError> {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");

        if self.verbs.is_empty() {
            xml.push_str("<Response/>");
            return Ok(xml);
        }

        xml.push_str("<Response>");
        for verb in &self.verbs {
            match verb {
                Verb::Say(text) => {
                    write!(xml, "<Say>{}</Say>", escape_xml(text))?;
                }
                Verb::Dial(dial) => {
                    if dial.numbers.is_empty() {
                        return Err(TwimlError::EmptyDial);
                    }

                    xml.push_str("<Dial");
                    if let Some(action) = &dial.action {
                        write!(xml, " action=\"{}\"", escape_xml(action))?;
                    }
                    if let Some(caller_id) = &dial.caller_id {
                        write!(xml, " callerId=\"{}\"", escape_xml(caller_id))?;
                    }
                    if let Some(record) = &dial.record {
                        write!(xml, " record=\"{}\"", escape_xml(record))?;
                    }
                    if let Some(timeout) = dial.timeout {
                        write!(xml, " timeout=\"{}\"", timeout)?;
                    }
                    xml.push('>');
                    for number in &dial.numbers {
                        write!(xml, "<Number>{}</Number>", escape_xml(number))?;
                    }
                    xml.push_str("</Dial>");
                }
            }
        }
        xml.push_str("</Response>");

        Ok(xml)
    }
}

/// Single `<Say>` document, used for spoken outcomes and fallbacks
pub fn say_only(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Say>{}</Say></Response>",
        escape_xml(text)
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
