//! TwiML response rendering
//!
//! The engine produces plain reply text; this layer wraps it in the XML the
//! telephony provider expects. SMS replies end the exchange; voice replies
//! keep the call open with a gather so the caller can answer.

/// Wrap a reply in an SMS message response
pub fn sms_reply(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape(body)
    )
}

/// Wrap a reply in a voice response that speaks the text and gathers the
/// caller's next digit press or utterance
pub fn voice_reply(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Gather input=\"dtmf speech\" action=\"/webhooks/voice\" method=\"POST\" numDigits=\"1\" speechTimeout=\"auto\"><Say>{}</Say></Gather></Response>",
        escape(body)
    )
}

/// Escape text for embedding in an XML text node. Reply copy is ours, but
/// invalid-input re-prompts echo whatever the user sent.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
