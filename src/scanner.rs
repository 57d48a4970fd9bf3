//! Unsubscribe link detection in HTML bodies

use crate::html::{Element, HtmlNode, parse_fragment};
use crate::locale::TermTable;
use crate::types::{
    Origin, UnsubscribeCandidate, UriScheme, dedup_preserving_order, first_of_scheme,
};
use regex::Regex;
use tracing::trace;

static ANCHOR_OPEN_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"(?i)<a\s").unwrap());

/// Scans anchors for links whose target, text or labels read as unsubscribe
#[derive(Debug, Clone, Default)]
pub struct AnchorScanner {
    terms: TermTable,
}

impl AnchorScanner {
    #[must_use]
    pub const fn new(terms: TermTable) -> Self {
        Self { terms }
    }

    #[must_use]
    pub const fn terms(&self) -> &TermTable {
        &self.terms
    }

    /// Every matching link target in document order, deduplicated
    #[must_use]
    pub fn candidates(&self, html: &str) -> Vec<String> {
        if !ANCHOR_OPEN_REGEX.is_match(html) {
            trace!("no anchor tag, skipping parse");
            return Vec::new();
        }

        let root = parse_fragment(html);
        let mut found = Vec::new();
        self.visit(&root, &mut found);
        dedup_preserving_order(found)
    }

    /// The best unsubscribe link of the body
    ///
    /// http(s) links are preferred over mailto links, which are preferred over
    /// anything else.
    #[must_use]
    pub fn scan(&self, html: &str) -> Option<UnsubscribeCandidate> {
        let candidates = self.candidates(html);
        trace!("body anchors matched: {}", candidates.len());

        first_of_scheme(&candidates, UriScheme::Http)
            .or_else(|| first_of_scheme(&candidates, UriScheme::Mailto))
            .or_else(|| candidates.first())
            .map(|uri| UnsubscribeCandidate::new(uri.clone(), Origin::Body))
    }

    fn visit(&self, element: &Element, found: &mut Vec<String>) {
        if element.is("a")
            && let Some(target) = self.matching_target(element)
        {
            found.push(target.to_string());
        }

        for child in &element.children {
            if let HtmlNode::Element(child) = child {
                self.visit(child, found);
            }
        }
    }

    /// The anchor's target if the anchor reads as an unsubscribe link
    fn matching_target<'a>(&self, anchor: &'a Element) -> Option<&'a str> {
        let target = ["href", "src"]
            .into_iter()
            .filter_map(|name| anchor.attr(name))
            .map(str::trim)
            .find(|target| !target.is_empty())?;

        let combined = format!(
            "{} {} {}",
            anchor.attr("rel").unwrap_or_default(),
            anchor.attr("aria-label").unwrap_or_default(),
            anchor.inner_text()
        )
        .to_lowercase();

        (self.terms.is_match(&combined) || self.terms.is_match(target)).then_some(target)
    }
}
