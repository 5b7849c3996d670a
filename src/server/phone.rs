//! Dialed-number cleanup

use regex::Regex;
use std::sync::LazyLock;

static NON_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^0-9]").expect("static pattern")
});

/// Twilio prefixes browser-client addresses with this
const CLIENT_PREFIX: &str = "client:";

/// Keep only ASCII digits, plus a `+` when it is the first character
pub fn sanitize_number(raw: &str) -> String {
    let trimmed = raw.trim_start();
    let digits = NON_DIGITS.replace_all(trimmed, "");

    if trimmed.starts_with('+') {
        format!("+{}", digits)
    } else {
        digits.into_owned()
    }
}

/// Strip the first `client:` marker from a `To` parameter
pub fn strip_client_prefix(to: &str) -> String {
    to.replacen(CLIENT_PREFIX, "", 1)
}
