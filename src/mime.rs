//! HTML part extraction from raw multipart bodies

use crate::qp::decode_quoted_printable;
use regex::Regex;
use tracing::trace;

/// Shortest hexadecimal token accepted as a part boundary
pub const MIN_BOUNDARY_HEX_LEN: usize = 40;

static HTML_CONTENT_TYPE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)Content-Type:\s*text/html").unwrap());

/// Pulls the `text/html` part out of a multipart body
///
/// Boundaries are recognised heuristically as `--` followed by a long run of
/// hex digits, the shape most bulk mailers generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MimeHtmlExtractor {
    min_boundary_len: usize,
}

impl Default for MimeHtmlExtractor {
    fn default() -> Self {
        Self::new(MIN_BOUNDARY_HEX_LEN)
    }
}

impl MimeHtmlExtractor {
    #[must_use]
    pub const fn new(min_boundary_len: usize) -> Self {
        Self { min_boundary_len }
    }

    #[must_use]
    pub const fn min_boundary_len(&self) -> usize {
        self.min_boundary_len
    }

    /// Find the boundary token (without its leading hyphens)
    #[must_use]
    pub fn find_boundary<'a>(&self, body: &'a str) -> Option<&'a str> {
        let bytes = body.as_bytes();
        let min = self.min_boundary_len.max(1);
        let mut i = 0;

        while i + 2 <= bytes.len() {
            if bytes[i] == b'-' && bytes[i + 1] == b'-' {
                let start = i + 2;
                let len = bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_hexdigit())
                    .count();
                if len >= min {
                    return Some(&body[start..start + len]);
                }
            }
            i += 1;
        }

        None
    }

    /// Decoded HTML of the first `text/html` part, if the body has one
    #[must_use]
    pub fn extract_html(&self, body: &str) -> Option<String> {
        let Some(boundary) = self.find_boundary(body) else {
            trace!("no multipart boundary found");
            return None;
        };
        trace!("multipart boundary: {boundary}");

        let delimiter = format!("--{boundary}");
        let segments: Vec<&str> = body.split(delimiter.as_str()).collect();

        let part = segments
            .iter()
            .find(|segment| HTML_CONTENT_TYPE.is_match(split_part(segment).0))
            .or_else(|| {
                segments
                    .iter()
                    .find(|segment| HTML_CONTENT_TYPE.is_match(segment))
            })?;

        let (_, content) = split_part(part);
        Some(decode_quoted_printable(content.trim()))
    }
}

/// Split a part into its header block and the content after the first blank
/// line. A part without a blank line has no content.
fn split_part(segment: &str) -> (&str, &str) {
    let part = segment
        .strip_prefix("\r\n")
        .or_else(|| segment.strip_prefix('\n'))
        .unwrap_or(segment);

    let mut offset = 0;
    for line in part.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']).is_empty() {
            return (&part[..offset], &part[offset + line.len()..]);
        }
        offset += line.len();
    }

    (part, "")
}

/// Extract the HTML part with the default boundary heuristic
#[must_use]
pub fn extract_html_from_mime(body: &str) -> Option<String> {
    MimeHtmlExtractor::default().extract_html(body)
}
