//! Per-message unsubscribe resolution

use crate::header::resolve_header;
use crate::locale::TermTable;
use crate::mime::{MIN_BOUNDARY_HEX_LEN, MimeHtmlExtractor};
use crate::scanner::AnchorScanner;
use crate::types::{UnsubscribeCandidate, UnsubscribeResult};
use rayon::prelude::*;
use std::borrow::Cow;
use std::cmp::Reverse;
use tracing::{debug, trace};

/// Tunables of the resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Shortest hex token accepted as a multipart boundary
    pub min_boundary_hex_len: usize,

    /// Terms that mark an anchor as an unsubscribe link
    pub terms: TermTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_boundary_hex_len: MIN_BOUNDARY_HEX_LEN,
            terms: TermTable::default(),
        }
    }
}

impl ResolverConfig {
    #[must_use]
    pub const fn with_min_boundary_hex_len(mut self, len: usize) -> Self {
        self.min_boundary_hex_len = len;
        self
    }

    #[must_use]
    pub fn with_terms(mut self, terms: TermTable) -> Self {
        self.terms = terms;
        self
    }
}

/// One message's input to the resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageText<'a> {
    /// Raw List-Unsubscribe value, empty when absent
    pub list_unsubscribe: &'a str,

    /// Raw body text
    pub body: &'a str,
}

impl<'a> MessageText<'a> {
    #[must_use]
    pub const fn new(list_unsubscribe: &'a str, body: &'a str) -> Self {
        Self {
            list_unsubscribe,
            body,
        }
    }
}

enum Stage {
    TryHeader,
    TryBody,
    Resolved(Vec<UnsubscribeCandidate>),
}

/// Picks the single best unsubscribe action of a message
///
/// Header evidence wins outright; the body is only scanned when the
/// List-Unsubscribe header yields nothing.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    mime: MimeHtmlExtractor,
    scanner: AnchorScanner,
}

impl Resolver {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            mime: MimeHtmlExtractor::new(config.min_boundary_hex_len),
            scanner: AnchorScanner::new(config.terms),
        }
    }

    /// Resolve one message from its raw List-Unsubscribe value and raw body
    #[must_use]
    pub fn resolve(&self, list_unsubscribe: &str, body: &str) -> UnsubscribeResult {
        let mut stage = Stage::TryHeader;

        let candidates = loop {
            stage = match stage {
                Stage::TryHeader => {
                    let candidates = if list_unsubscribe.trim().is_empty() {
                        Vec::new()
                    } else {
                        resolve_header(list_unsubscribe)
                    };
                    if candidates.is_empty() {
                        Stage::TryBody
                    } else {
                        Stage::Resolved(candidates)
                    }
                }
                Stage::TryBody => {
                    Stage::Resolved(self.scan_body(body).into_iter().collect())
                }
                Stage::Resolved(candidates) => break candidates,
            };
        };

        let result = select_best(candidates);
        debug!("Resolved unsubscribe: {result}");
        result
    }

    /// Resolve many messages in parallel; results keep the input order
    #[must_use]
    pub fn resolve_batch(&self, messages: &[MessageText<'_>]) -> Vec<UnsubscribeResult> {
        messages
            .par_iter()
            .map(|message| self.resolve(message.list_unsubscribe, message.body))
            .collect()
    }

    /// HTML to scan: the decoded html part of a multipart body, or the body
    /// itself
    #[must_use]
    pub fn body_html<'a>(&self, body: &'a str) -> Cow<'a, str> {
        self.mime
            .extract_html(body)
            .map_or(Cow::Borrowed(body), Cow::Owned)
    }

    fn scan_body(&self, body: &str) -> Option<UnsubscribeCandidate> {
        if body.trim().is_empty() {
            trace!("empty body");
            return None;
        }
        self.scanner.scan(&self.body_html(body))
    }
}

/// Highest priority candidate; ties keep their original order
fn select_best(mut candidates: Vec<UnsubscribeCandidate>) -> UnsubscribeResult {
    candidates.sort_by_key(|candidate| Reverse(candidate.priority()));
    candidates
        .into_iter()
        .next()
        .map_or_else(UnsubscribeResult::none, UnsubscribeResult::from_candidate)
}

static DEFAULT_RESOLVER: std::sync::LazyLock<Resolver> = std::sync::LazyLock::new(Resolver::default);

/// Resolve one message with the default configuration
#[must_use]
pub fn resolve_unsubscribe(list_unsubscribe: &str, body: &str) -> UnsubscribeResult {
    DEFAULT_RESOLVER.resolve(list_unsubscribe, body)
}
