use unsubscribe_audit::*;

fn envelopes() -> Vec<MessageEnvelope> {
    vec![
        MessageEnvelope::new(
            "Weekly \"deals\"",
            "Wed, 01 Jan 2025 12:00:00 +0000",
            "Shop <news@shop.example>",
            "<https://shop.example/u>, <mailto:u@shop.example>",
            "",
        ),
        MessageEnvelope::new(
            "Newsletter",
            "not a date",
            "news@blog.example",
            "",
            "<a href=\"https://blog.example/optout\">here</a>",
        ),
        MessageEnvelope::new("Hi", "", "friend@example.com", "", "<p>see you</p>"),
    ]
}

#[test]
fn test_escape_csv() {
    assert_eq!(escape_csv(Some("plain")), "\"plain\"");
    assert_eq!(escape_csv(Some("say \"hi\"")), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_csv(Some("")), "\"\"");
    assert_eq!(escape_csv(None), "\"\"");
}

#[test]
fn test_audit_rows_in_order() {
    let report = audit(&Resolver::default(), &envelopes());

    assert_eq!(report.len(), 3);
    assert_eq!(report.rows[0].unsubscribe.as_deref(), Some("https://shop.example/u"));
    assert_eq!(report.rows[0].found_in, FoundIn::Header);
    assert_eq!(report.rows[1].unsubscribe.as_deref(), Some("https://blog.example/optout"));
    assert_eq!(report.rows[1].found_in, FoundIn::Body);
    assert!(report.rows[2].unsubscribe.is_none());
    assert_eq!(report.rows[2].found_in, FoundIn::None);
}

#[test]
fn test_timestamp_parsed_when_possible() {
    let report = audit(&Resolver::default(), &envelopes());

    let ts = report.rows[0].timestamp.unwrap();
    assert_eq!(ts.to_rfc3339(), "2025-01-01T12:00:00+00:00");
    assert!(report.rows[1].timestamp.is_none());
}

#[test]
fn test_csv_output() {
    let report = audit(&Resolver::default(), &envelopes());
    let csv = report.to_csv();
    let lines: Vec<&str> = csv.split('\n').collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[0],
        "\"Subject\",\"Date\",\"From\",\"UnsubscribeLink\",\"FoundIn\""
    );
    assert_eq!(
        lines[1],
        "\"Weekly \"\"deals\"\"\",\"Wed, 01 Jan 2025 12:00:00 +0000\",\"Shop <news@shop.example>\",\"https://shop.example/u\",\"header\""
    );
    assert_eq!(
        lines[3],
        "\"Hi\",\"\",\"friend@example.com\",\"\",\"none\""
    );
}

#[test]
fn test_write_csv() {
    let report = audit(&Resolver::default(), &envelopes());
    let mut out = Vec::new();
    report.write_csv(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), report.to_csv());
}

#[test]
fn test_empty_report_has_header_only() {
    let report = Report::default();
    assert!(report.is_empty());
    assert_eq!(report.to_csv().lines().count(), 1);
}

#[test]
fn test_summary() {
    let summary = audit(&Resolver::default(), &envelopes()).summary();
    assert_eq!(summary.header, 1);
    assert_eq!(summary.body, 1);
    assert_eq!(summary.none, 1);
    assert_eq!(summary.total(), 3);
}

#[test]
fn test_json_export() {
    let report = audit(&Resolver::default(), &envelopes());
    let json = report.to_json().unwrap();

    assert!(json.contains("\"found_in\": \"header\""));
    assert!(json.contains("\"found_in\": \"none\""));

    let back: Report = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
