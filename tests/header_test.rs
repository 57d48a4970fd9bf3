use unsubscribe_audit::*;

fn uris(candidates: &[UnsubscribeCandidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.uri.as_str()).collect()
}

#[test]
fn test_unfold() {
    assert_eq!(unfold("<a>,\r\n <b>"), "<a>, <b>");
    assert_eq!(unfold("<a>,\n\t\t<b>"), "<a>, <b>");
    assert_eq!(unfold("  <a>  "), "<a>");
}

#[test]
fn test_folded_header_resolves_http_first() {
    let candidates = resolve_header("<https://ex.com/u>,\r\n <mailto:u@ex.com>");
    assert_eq!(uris(&candidates), ["https://ex.com/u", "mailto:u@ex.com"]);
    assert!(candidates.iter().all(|c| c.origin == Origin::Header));
}

#[test]
fn test_http_ranked_before_mailto() {
    let candidates =
        resolve_header("<mailto:list@ex.com?subject=unsubscribe>, <https://ex.com/1>, <https://ex.com/2>");
    assert_eq!(
        uris(&candidates),
        ["https://ex.com/1", "mailto:list@ex.com?subject=unsubscribe"]
    );
}

#[test]
fn test_duplicates_removed_in_order() {
    let found = extract_header_uris(
        "<https://ex.com/u>, <mailto:u@ex.com>, <https://ex.com/u>, <mailto:u@ex.com>",
    );
    assert_eq!(found, ["https://ex.com/u", "mailto:u@ex.com"]);
}

#[test]
fn test_mailto_only() {
    let candidates = resolve_header("<mailto:leave@ex.com>");
    assert_eq!(uris(&candidates), ["mailto:leave@ex.com"]);
}

#[test]
fn test_other_scheme_fallback() {
    let candidates = resolve_header("<ftp://ex.com/leave>, <urn:leave>");
    assert_eq!(uris(&candidates), ["ftp://ex.com/leave"]);
    assert_eq!(candidates[0].scheme(), UriScheme::Other);
}

#[test]
fn test_comma_fallback_without_brackets() {
    let found = extract_header_uris("https://ex.com/u, mailto:u@ex.com");
    assert_eq!(found, ["https://ex.com/u", "mailto:u@ex.com"]);
}

#[test]
fn test_comma_inside_quotes_not_split() {
    let found = extract_header_uris("\"https://ex.com/u?ids=1,2\", \"mailto:u@ex.com\"");
    assert_eq!(found, ["https://ex.com/u?ids=1,2", "mailto:u@ex.com"]);
}

#[test]
fn test_uppercase_scheme_classified() {
    let candidates = resolve_header("<MAILTO:u@ex.com>, <HTTPS://EX.COM/U>");
    assert_eq!(uris(&candidates), ["HTTPS://EX.COM/U", "MAILTO:u@ex.com"]);
}

#[test]
fn test_empty_or_garbage_header() {
    assert!(resolve_header("").is_empty());
    assert!(resolve_header("   ").is_empty());
    assert!(resolve_header("no uris in here").is_empty());
    assert!(resolve_header("<   >").is_empty());
}
