//! Envelope fields of a raw message, as needed by the audit report

use crate::error::{AuditError, Result};
use chrono::{DateTime, FixedOffset};
use mailparse::{MailHeaderMap, ParsedMail};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Subject used when a message has none
pub const NO_SUBJECT: &str = "No subject";

/// The parts of one message the audit looks at
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEnvelope {
    pub subject: String,

    /// Date header exactly as sent
    pub date: String,

    pub from: String,

    /// List-Unsubscribe value with its folding intact, empty when absent
    pub list_unsubscribe: String,

    /// Body text after the header block
    pub body: String,
}

impl MessageEnvelope {
    /// Parse a raw RFC 5322 message
    ///
    /// A single-part body is decoded from its transfer encoding and charset;
    /// multipart bodies are kept raw so their html part can be located later.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let parsed =
            mailparse::parse_mail(raw).map_err(|e| AuditError::Structure(e.to_string()))?;
        let headers = &parsed.headers;

        let subject = headers
            .get_first_value("Subject")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_SUBJECT.to_string());
        let date = headers.get_first_value("Date").unwrap_or_default();
        let from = headers.get_first_value("From").unwrap_or_default();
        let list_unsubscribe = headers
            .get_first_header("List-Unsubscribe")
            .map(|h| String::from_utf8_lossy(h.get_value_raw()).into_owned())
            .unwrap_or_default();

        let body = extract_body(raw, &parsed);

        debug!("Parsed message: {subject} from {from}");

        Ok(Self {
            subject,
            date,
            from,
            list_unsubscribe,
            body,
        })
    }

    /// Build an envelope from fields already fetched by a mail client
    pub fn new(
        subject: impl Into<String>,
        date: impl Into<String>,
        from: impl Into<String>,
        list_unsubscribe: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            date: date.into(),
            from: from.into(),
            list_unsubscribe: list_unsubscribe.into(),
            body: body.into(),
        }
    }

    /// The Date header as an RFC 2822 timestamp, if it is one
    #[must_use]
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc2822(self.date.trim()).ok()
    }
}

fn extract_body(raw: &[u8], parsed: &ParsedMail) -> String {
    if parsed.ctype.mimetype.to_lowercase().starts_with("multipart/") {
        return raw_body(raw);
    }

    parsed.get_body().unwrap_or_else(|e| {
        debug!("Body decoding failed, keeping raw text: {e}");
        raw_body(raw)
    })
}

/// Body text after the header block, undecoded
fn raw_body(raw: &[u8]) -> String {
    let offset = mailparse::parse_headers(raw).map_or(0, |(_, offset)| offset);
    String::from_utf8_lossy(raw.get(offset..).unwrap_or_default()).into_owned()
}
