//! List-Unsubscribe header resolution

use crate::types::{
    Origin, UnsubscribeCandidate, UriScheme, dedup_preserving_order, first_of_scheme,
};
use regex::Regex;
use tracing::trace;

static FOLD_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\r?\n[ \t]+").unwrap());

static ANGLE_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"<([^>]+)>").unwrap());

static HTTP_URI_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>]+"#).unwrap());

static MAILTO_URI_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r#"(?i)mailto:[^\s"'<>]+"#).unwrap());

/// Undo header line folding: a line break followed by spaces or tabs becomes
/// one space
#[must_use]
pub fn unfold(value: &str) -> String {
    FOLD_REGEX.replace_all(value, " ").trim().to_string()
}

/// All URIs listed in the header value, deduplicated in order of appearance
#[must_use]
pub fn extract_header_uris(value: &str) -> Vec<String> {
    let text = unfold(value);

    let mut uris: Vec<String> = ANGLE_REGEX
        .captures_iter(&text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .collect();

    if uris.is_empty() {
        trace!("no bracketed URIs, splitting header on commas");
        uris = split_unquoted_commas(&text)
            .into_iter()
            .filter_map(|piece| {
                let piece = piece.trim();
                let piece = piece.strip_prefix('"').unwrap_or(piece);
                let piece = piece.strip_suffix('"').unwrap_or(piece);
                HTTP_URI_REGEX
                    .find(piece)
                    .or_else(|| MAILTO_URI_REGEX.find(piece))
                    .map(|m| m.as_str().to_string())
            })
            .collect();
    }

    dedup_preserving_order(uris)
}

/// Resolve a raw List-Unsubscribe value into at most two ranked candidates
///
/// The first http(s) URI comes first, then the first mailto URI. When the
/// header lists neither, the first URI of any kind is returned alone.
#[must_use]
pub fn resolve_header(value: &str) -> Vec<UnsubscribeCandidate> {
    let uris = extract_header_uris(value);
    if uris.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<UnsubscribeCandidate> = [UriScheme::Http, UriScheme::Mailto]
        .into_iter()
        .filter_map(|scheme| first_of_scheme(&uris, scheme))
        .map(|uri| UnsubscribeCandidate::new(uri.clone(), Origin::Header))
        .collect();

    if candidates.is_empty() {
        candidates.push(UnsubscribeCandidate::new(uris[0].clone(), Origin::Header));
    }

    trace!(
        "header listed {} URIs, kept {}",
        uris.len(),
        candidates.len()
    );
    candidates
}

/// Split on commas that are not inside a double-quoted run
fn split_unquoted_commas(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);

    pieces
}
