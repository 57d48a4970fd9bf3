use unsubscribe_audit::*;

const BOUNDARY: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678";

#[test]
fn test_folded_header() {
    let result = resolve_unsubscribe("<https://ex.com/u>,\r\n <mailto:u@ex.com>", "");
    assert_eq!(result.uri(), Some("https://ex.com/u"));
    assert_eq!(result.found_in(), FoundIn::Header);
}

#[test]
fn test_body_fallback() {
    let body = "<a href=\"https://ex.com/out\" rel=\"unsubscribe\">click</a>";
    let result = resolve_unsubscribe("", body);
    assert_eq!(result.uri(), Some("https://ex.com/out"));
    assert_eq!(result.found_in(), FoundIn::Body);
}

#[test]
fn test_multilingual_body() {
    let result = resolve_unsubscribe("", "<a href=\"https://ex.com/x\">Se désabonner</a>");
    assert_eq!(result.uri(), Some("https://ex.com/x"));
    assert_eq!(result.found_in(), FoundIn::Body);
}

#[test]
fn test_no_match() {
    let result = resolve_unsubscribe("", "<p>hello</p>");
    assert_eq!(result, UnsubscribeResult::none());
    assert_eq!(result.uri(), None);
    assert_eq!(result.found_in(), FoundIn::None);
    assert_eq!(result.priority(), 0);
}

#[test]
fn test_header_precedence_over_body() {
    let body = "<a href=\"https://ex.com/body-unsubscribe\">Unsubscribe</a>";
    let result = resolve_unsubscribe("<mailto:leave@ex.com>", body);
    assert_eq!(result.uri(), Some("mailto:leave@ex.com"));
    assert_eq!(result.found_in(), FoundIn::Header);
}

#[test]
fn test_http_wins_over_mailto_in_header() {
    let result = resolve_unsubscribe("<mailto:leave@ex.com>, <http://ex.com/leave>", "");
    assert_eq!(result.uri(), Some("http://ex.com/leave"));
}

#[test]
fn test_blank_or_useless_header_falls_back_to_body() {
    let body = "<a href=\"https://ex.com/b\">Unsubscribe</a>";
    for header in ["", " \r\n ", "nothing useful"] {
        let result = resolve_unsubscribe(header, body);
        assert_eq!(result.found_in(), FoundIn::Body, "{header:?}");
        assert_eq!(result.uri(), Some("https://ex.com/b"));
    }
}

#[test]
fn test_multipart_quoted_printable_body() {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Type: text/plain; charset=utf-8\r\n\
         \r\n\
         Plain text, no links.\r\n\
         --{BOUNDARY}\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Transfer-Encoding: quoted-printable\r\n\
         \r\n\
         <html><body><p>News</p><a href=3D\"https://ex.com/y\" style=3D\"color:#999\">Se d=\r\n\
         =C3=A9sabonner</a></body></html>\r\n\
         --{BOUNDARY}--\r\n"
    );

    let result = resolve_unsubscribe("", &body);
    assert_eq!(result.uri(), Some("https://ex.com/y"));
    assert_eq!(result.found_in(), FoundIn::Body);
}

#[test]
fn test_idempotent() {
    let resolver = Resolver::default();
    let body = "<a href=\"mailto:x@ex.com\">opt out</a><a href=\"https://ex.com/o\">opt out</a>";
    let first = resolver.resolve("", body);
    let second = resolver.resolve("", body);
    assert_eq!(first, second);
    assert_eq!(first.uri(), Some("https://ex.com/o"));
}

#[test]
fn test_configured_boundary_length() {
    let body = "--0123456789abcdef\r\n\
                Content-Type: text/html\r\n\
                \r\n\
                <a href=3D\"https://ex.com/z\">Unsubscribe</a>\r\n\
                --0123456789abcdef--";

    let short = Resolver::new(ResolverConfig::default().with_min_boundary_hex_len(16));
    assert_eq!(short.resolve("", body).uri(), Some("https://ex.com/z"));

    let default = Resolver::default();
    assert_ne!(default.resolve("", body).uri(), Some("https://ex.com/z"));
}

#[test]
fn test_custom_terms() {
    let terms = TermTable::default()
        .with_locale(LocaleTerms::new("es", ["darse de baja"]))
        .unwrap();
    let resolver = Resolver::new(ResolverConfig::default().with_terms(terms));

    let result = resolver.resolve("", "<a href=\"https://ex.com/es\">Darse de baja</a>");
    assert_eq!(result.uri(), Some("https://ex.com/es"));
}

#[test]
fn test_batch_preserves_order() {
    let bodies: Vec<String> = (0..50)
        .map(|i| format!("<a href=\"https://ex.com/{i}\">unsubscribe</a>"))
        .collect();
    let mut messages: Vec<MessageText<'_>> =
        bodies.iter().map(|b| MessageText::new("", b)).collect();
    messages.push(MessageText::new("<mailto:h@ex.com>", ""));
    messages.push(MessageText::default());

    let results = Resolver::default().resolve_batch(&messages);

    assert_eq!(results.len(), 52);
    for (i, result) in results.iter().take(50).enumerate() {
        assert_eq!(result.uri(), Some(format!("https://ex.com/{i}").as_str()));
    }
    assert_eq!(results[50].found_in(), FoundIn::Header);
    assert_eq!(results[51].found_in(), FoundIn::None);
}

#[test]
fn test_result_invariant() {
    let found = UnsubscribeResult::from_candidate(UnsubscribeCandidate::new(
        "https://ex.com",
        Origin::Body,
    ));
    assert!(found.is_found());
    assert_eq!(found.found_in(), FoundIn::Body);
    assert_eq!(found.priority(), 3);

    let none = UnsubscribeResult::default();
    assert!(!none.is_found());
    assert_eq!(none.found_in(), FoundIn::None);
}

#[test]
fn test_scheme_priority() {
    assert_eq!(UriScheme::classify("https://x").priority(), 3);
    assert_eq!(UriScheme::classify("Http://x").priority(), 3);
    assert_eq!(UriScheme::classify("mailto:a@b").priority(), 2);
    assert_eq!(UriScheme::classify("/relative").priority(), 1);
    assert_eq!(UriScheme::classify("http:/broken"), UriScheme::Other);
}

#[test]
fn test_dedup_preserving_order() {
    let uris = vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()];
    assert_eq!(dedup_preserving_order(uris), ["b", "a", "c"]);
}

#[test]
fn test_unclosed_anchor_before_unsubscribe_link() {
    let body = "<a href=\"https://shop.example/\">Shop<a href=\"https://shop.example/unsub\">Unsubscribe</a>";
    let result = resolve_unsubscribe("", body);
    assert_eq!(result.uri(), Some("https://shop.example/unsub"));
}
