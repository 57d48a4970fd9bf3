//! Locale term table for the unsubscribe heuristic

use crate::error::{AuditError, Result};
use regex::Regex;

/// Terms that mark an unsubscribe link in one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleTerms {
    /// Language tag, e.g. `en`
    pub locale: String,

    /// Regex fragments, matched case-insensitively
    pub terms: Vec<String>,
}

impl LocaleTerms {
    pub fn new<I, S>(locale: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            locale: locale.into(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Every locale's terms compiled into one case-insensitive matcher
#[derive(Debug, Clone)]
pub struct TermTable {
    locales: Vec<LocaleTerms>,
    /// `None` when no locale has any term
    matcher: Option<Regex>,
}

impl Default for TermTable {
    /// English and French terms
    fn default() -> Self {
        let locales = vec![
            LocaleTerms::new("en", ["unsubscribe", "opt[- ]?out"]),
            LocaleTerms::new("fr", ["d[ée]sabonner", "d[ée]sinscrire"]),
        ];
        let matcher = compile(&locales).unwrap();
        Self { locales, matcher }
    }
}

impl TermTable {
    /// Build a table from an explicit list of locales
    pub fn new(locales: Vec<LocaleTerms>) -> Result<Self> {
        for locale in &locales {
            validate(locale)?;
        }
        let matcher = compile(&locales).map_err(|e| AuditError::InvalidPattern {
            locale: "*".into(),
            details: e.to_string(),
        })?;
        Ok(Self { locales, matcher })
    }

    /// Add a locale; terms for an existing tag are appended to it
    pub fn with_locale(mut self, locale: LocaleTerms) -> Result<Self> {
        validate(&locale)?;
        match self.locales.iter_mut().find(|l| l.locale == locale.locale) {
            Some(existing) => existing.terms.extend(locale.terms),
            None => self.locales.push(locale),
        }
        Self::new(self.locales)
    }

    #[must_use]
    pub fn locales(&self) -> &[LocaleTerms] {
        &self.locales
    }

    /// Whether the text contains any term of any locale
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(text))
    }
}

fn validate(locale: &LocaleTerms) -> Result<()> {
    for term in &locale.terms {
        Regex::new(term).map_err(|e| AuditError::InvalidPattern {
            locale: locale.locale.clone(),
            details: e.to_string(),
        })?;
    }
    Ok(())
}

fn compile(locales: &[LocaleTerms]) -> std::result::Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = locales
        .iter()
        .flat_map(|locale| &locale.terms)
        .map(|term| format!("(?:{term})"))
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }
    Regex::new(&format!("(?i){}", alternatives.join("|"))).map(Some)
}
