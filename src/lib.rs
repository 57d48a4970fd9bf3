// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Unsubscribe Audit
//!
//! Finds the single best unsubscribe action of a bulk mail message from its
//! raw `List-Unsubscribe` header and raw body, and records where it was
//! found.
//!
//! # Features
//!
//! - Folding-aware `List-Unsubscribe` parsing (http and mailto URIs)
//! - Multipart html extraction with quoted-printable decoding
//! - Lenient anchor scanning over malformed or fragment HTML
//! - Multilingual unsubscribe heuristic with a swappable term table
//! - CSV and JSON audit reports
//!
//! # Example
//!
//! ```rust
//! use unsubscribe_audit::{FoundIn, resolve_unsubscribe};
//!
//! let result = resolve_unsubscribe("<https://ex.com/u>,\r\n <mailto:u@ex.com>", "");
//!
//! assert_eq!(result.uri(), Some("https://ex.com/u"));
//! assert_eq!(result.found_in(), FoundIn::Header);
//! ```

mod error;
mod header;
mod html;
mod locale;
mod message;
mod mime;
mod qp;
mod report;
mod resolver;
mod scanner;
mod types;

pub use error::{AuditError, Result};
pub use header::{extract_header_uris, resolve_header, unfold};
pub use html::{Element, HtmlNode, MAX_NESTING_DEPTH, ROOT_TAG, decode_entities, parse_fragment};
pub use locale::{LocaleTerms, TermTable};
pub use message::{MessageEnvelope, NO_SUBJECT};
pub use mime::{MIN_BOUNDARY_HEX_LEN, MimeHtmlExtractor, extract_html_from_mime};
pub use qp::decode_quoted_printable;
pub use report::{CSV_HEADER, Report, ReportRow, ReportSummary, audit, escape_csv};
pub use resolver::{MessageText, Resolver, ResolverConfig, resolve_unsubscribe};
pub use scanner::AnchorScanner;
pub use types::*;
