//! Audit report of unsubscribe options across many messages

use crate::error::Result;
use crate::message::MessageEnvelope;
use crate::resolver::{MessageText, Resolver};
use crate::types::{FoundIn, UnsubscribeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;

/// Column titles of the CSV report
pub const CSV_HEADER: [&str; 5] = ["Subject", "Date", "From", "UnsubscribeLink", "FoundIn"];

/// One message's line in the report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRow {
    pub subject: String,
    pub date: String,

    /// Date normalized to UTC, when the header parses as RFC 2822
    pub timestamp: Option<DateTime<Utc>>,

    pub from: String,
    pub unsubscribe: Option<String>,
    pub found_in: FoundIn,
}

impl ReportRow {
    #[must_use]
    pub fn new(envelope: &MessageEnvelope, result: &UnsubscribeResult) -> Self {
        Self {
            subject: envelope.subject.clone(),
            date: envelope.date.clone(),
            timestamp: envelope.parsed_date().map(|dt| dt.with_timezone(&Utc)),
            from: envelope.from.clone(),
            unsubscribe: result.uri().map(str::to_string),
            found_in: result.found_in(),
        }
    }

    /// The row as CSV fields, every one quoted
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        [
            escape_csv(Some(self.subject.as_str())),
            escape_csv(Some(self.date.as_str())),
            escape_csv(Some(self.from.as_str())),
            escape_csv(Some(self.unsubscribe.as_deref().unwrap_or_default())),
            escape_csv(Some(self.found_in.as_str())),
        ]
        .join(",")
    }
}

/// Count of rows per provenance
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub header: usize,
    pub body: usize,
    pub none: usize,
}

impl ReportSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.header + self.body + self.none
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    #[must_use]
    pub const fn new(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        self.rows
            .iter()
            .fold(ReportSummary::default(), |mut summary, row| {
                match row.found_in {
                    FoundIn::Header => summary.header += 1,
                    FoundIn::Body => summary.body += 1,
                    FoundIn::None => summary.none += 1,
                }
                summary
            })
    }

    /// Header line plus one line per row, joined by `\n`
    #[must_use]
    pub fn to_csv(&self) -> String {
        let header = CSV_HEADER
            .iter()
            .map(|title| escape_csv(Some(*title)))
            .collect::<Vec<_>>()
            .join(",");

        std::iter::once(header)
            .chain(self.rows.iter().map(ReportRow::to_csv_line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_csv().as_bytes())?;
        writer.flush()?;
        debug!("Wrote {} report rows", self.rows.len());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Quote a CSV field, doubling embedded quotes; `None` is an empty field
#[must_use]
pub fn escape_csv(value: Option<&str>) -> String {
    value.map_or_else(
        || "\"\"".to_string(),
        |v| format!("\"{}\"", v.replace('"', "\"\"")),
    )
}

/// Resolve every message and build the report, preserving message order
#[must_use]
pub fn audit(resolver: &Resolver, messages: &[MessageEnvelope]) -> Report {
    let texts: Vec<MessageText<'_>> = messages
        .iter()
        .map(|m| MessageText::new(&m.list_unsubscribe, &m.body))
        .collect();

    let rows = messages
        .iter()
        .zip(resolver.resolve_batch(&texts))
        .map(|(envelope, result)| ReportRow::new(envelope, &result))
        .collect();

    Report::new(rows)
}
