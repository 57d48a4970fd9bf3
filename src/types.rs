//! Core types for unsubscribe resolution

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where a candidate URI was extracted from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Header,
    Body,
}

/// A URI extracted from a header or body, not yet chosen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnsubscribeCandidate {
    pub uri: String,
    pub origin: Origin,
}

impl UnsubscribeCandidate {
    pub fn new(uri: impl Into<String>, origin: Origin) -> Self {
        Self {
            uri: uri.into(),
            origin,
        }
    }

    #[must_use]
    pub fn scheme(&self) -> UriScheme {
        UriScheme::classify(&self.uri)
    }

    /// Ranking score, higher wins
    #[must_use]
    pub fn priority(&self) -> u8 {
        self.scheme().priority()
    }
}

/// Scheme class of a candidate URI, used only for ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UriScheme {
    Http,
    Mailto,
    Other,
}

impl UriScheme {
    /// Classify a URI by its prefix, ignoring case
    #[must_use]
    pub fn classify(uri: &str) -> Self {
        if starts_with_ignore_case(uri, "http://") || starts_with_ignore_case(uri, "https://") {
            Self::Http
        } else if starts_with_ignore_case(uri, "mailto:") {
            Self::Mailto
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Http => 3,
            Self::Mailto => 2,
            Self::Other => 1,
        }
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Provenance of a resolved unsubscribe action
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FoundIn {
    Header,
    Body,
    #[default]
    None,
}

impl FoundIn {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Body => "body",
            Self::None => "none",
        }
    }
}

impl From<Origin> for FoundIn {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Header => Self::Header,
            Origin::Body => Self::Body,
        }
    }
}

impl fmt::Display for FoundIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of resolving one message
///
/// A URI is present exactly when `found_in` is not [`FoundIn::None`]; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnsubscribeResult {
    uri: Option<String>,
    found_in: FoundIn,
}

impl UnsubscribeResult {
    /// No unsubscribe action was found
    #[must_use]
    pub const fn none() -> Self {
        Self {
            uri: None,
            found_in: FoundIn::None,
        }
    }

    #[must_use]
    pub fn from_candidate(candidate: UnsubscribeCandidate) -> Self {
        Self {
            found_in: candidate.origin.into(),
            uri: Some(candidate.uri),
        }
    }

    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    #[must_use]
    pub const fn found_in(&self) -> FoundIn {
        self.found_in
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        self.uri.is_some()
    }

    /// Ranking score of the held URI, 0 when nothing was found
    #[must_use]
    pub fn priority(&self) -> u8 {
        self.uri
            .as_deref()
            .map_or(0, |uri| UriScheme::classify(uri).priority())
    }
}

impl fmt::Display for UnsubscribeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.uri {
            Some(uri) => write!(f, "{uri} ({})", self.found_in),
            None => write!(f, "({})", self.found_in),
        }
    }
}

/// Drop repeated URIs, keeping the first occurrence of each
#[must_use]
pub fn dedup_preserving_order(uris: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(uris.len());
    uris.into_iter()
        .filter(|uri| seen.insert(uri.clone()))
        .collect()
}

/// First URI of the given scheme class
pub(crate) fn first_of_scheme(uris: &[String], scheme: UriScheme) -> Option<&String> {
    uris.iter().find(|uri| UriScheme::classify(uri) == scheme)
}
