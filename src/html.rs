//! Lenient HTML fragment parsing
//!
//! This is not a conforming HTML parser. It builds a plain tree from tags and
//! text, tolerating everything mail bodies throw at it: unclosed elements,
//! stray closing tags, unquoted attributes, comments and doctypes. It never
//! fails.

use std::borrow::Cow;
use std::collections::HashMap;

/// Tag of the synthetic element every fragment is wrapped in
pub const ROOT_TAG: &str = "root";

/// Deepest element nesting kept; past it, new elements become siblings of the
/// innermost open one
pub const MAX_NESTING_DEPTH: usize = 512;

/// Elements that never have content
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is text up to their closing tag
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Elements closed by the next sibling of the same tag when left open
const IMPLIED_END_TAGS: &[&str] = &["p", "li", "dt", "dd", "option", "a"];

/// Elements an implied end tag does not look past
const SCOPE_TAGS: &[&str] = &["table", "td", "th", "ul", "ol", "dl", "select", "button"];

/// A node of the parsed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Element(Element),
    Text(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source
    pub tag: String,

    /// Attributes as written; the first occurrence of a name wins
    pub attributes: HashMap<String, String>,

    pub children: Vec<HtmlNode>,

    /// Direct text content, whitespace-trimmed, if any
    pub text: Option<String>,
}

impl Element {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Attribute value by name, ignoring case
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .or_else(|| {
                self.attributes
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    /// All text below this element, concatenated in document order
    #[must_use]
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    fn finish(&mut self) {
        let direct: String = self
            .children
            .iter()
            .filter_map(|child| match child {
                HtmlNode::Text(text) => Some(text.as_str()),
                HtmlNode::Element(_) => None,
            })
            .collect();
        let direct = direct.trim();
        self.text = (!direct.is_empty()).then(|| direct.to_string());
    }
}

fn collect_text(nodes: &[HtmlNode], out: &mut String) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => out.push_str(text),
            HtmlNode::Element(element) => collect_text(&element.children, out),
        }
    }
}

/// Parse an HTML fragment into a tree under a synthetic [`ROOT_TAG`] element
#[must_use]
pub fn parse_fragment(input: &str) -> Element {
    let mut builder = TreeBuilder::new();
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut text_start = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            pos += 1;
            continue;
        }

        let rest = &input[pos..];
        let next = bytes.get(pos + 1).copied();

        let consumed = if rest.starts_with("<!--") {
            builder.text(&input[text_start..pos]);
            Some(rest.find("-->").map_or(rest.len(), |end| end + 3))
        } else if matches!(next, Some(b'!' | b'?')) {
            builder.text(&input[text_start..pos]);
            Some(rest.find('>').map_or(rest.len(), |end| end + 1))
        } else if next == Some(b'/') && bytes.get(pos + 2).is_some_and(u8::is_ascii_alphabetic) {
            builder.text(&input[text_start..pos]);
            let name = tag_name(&rest[2..]);
            builder.close(name);
            Some(rest.find('>').map_or(rest.len(), |end| end + 1))
        } else if next.is_some_and(|b| b.is_ascii_alphabetic()) {
            builder.text(&input[text_start..pos]);
            let tag = StartTag::parse(&rest[1..]);
            let mut consumed = tag.consumed + 1;

            if !tag.self_closing && RAW_TEXT_TAGS.iter().any(|t| tag.element.is(t)) {
                let body = &rest[consumed..];
                let (raw, skip) = raw_text(body, &tag.element.tag);
                let mut element = tag.element;
                if !raw.is_empty() {
                    element.children.push(HtmlNode::Text(raw.to_string()));
                }
                builder.void(element);
                consumed += skip;
            } else if tag.self_closing || VOID_TAGS.iter().any(|t| tag.element.is(t)) {
                builder.void(tag.element);
            } else {
                builder.open(tag.element);
            }
            Some(consumed)
        } else {
            None
        };

        match consumed {
            Some(consumed) => {
                pos += consumed;
                text_start = pos;
            }
            None => pos += 1,
        }
    }

    builder.text(&input[text_start..]);
    builder.finish()
}

/// Content of a raw text element up to its closing tag, and the number of
/// bytes consumed including that tag
fn raw_text<'a>(body: &'a str, tag: &str) -> (&'a str, usize) {
    let closing = format!("</{}", tag.to_ascii_lowercase());
    let lower = body.to_ascii_lowercase();

    lower.find(&closing).map_or((body, body.len()), |start| {
        let end = body[start..]
            .find('>')
            .map_or(body.len(), |gt| start + gt + 1);
        (&body[..start], end)
    })
}

fn tag_name(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

struct StartTag {
    element: Element,
    self_closing: bool,
    /// Bytes consumed after the opening `<`
    consumed: usize,
}

impl StartTag {
    /// Parse a start tag, `s` begins right after the `<`
    fn parse(s: &str) -> Self {
        let name = tag_name(s);
        let mut element = Element::new(name);
        let bytes = s.as_bytes();
        let mut pos = name.len();

        loop {
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }

            match bytes.get(pos) {
                None => {
                    return Self {
                        element,
                        self_closing: false,
                        consumed: pos,
                    };
                }
                Some(b'>') => {
                    return Self {
                        element,
                        self_closing: false,
                        consumed: pos + 1,
                    };
                }
                Some(b'/') if bytes.get(pos + 1) == Some(&b'>') => {
                    return Self {
                        element,
                        self_closing: true,
                        consumed: pos + 2,
                    };
                }
                Some(b'/' | b'=' | b'"' | b'\'') => {
                    pos += 1;
                    continue;
                }
                Some(_) => {}
            }

            let name_start = pos;
            while pos < bytes.len()
                && !bytes[pos].is_ascii_whitespace()
                && !matches!(bytes[pos], b'=' | b'>' | b'/')
            {
                pos += 1;
            }
            let name = &s[name_start..pos];

            let mut lookahead = pos;
            while lookahead < bytes.len() && bytes[lookahead].is_ascii_whitespace() {
                lookahead += 1;
            }

            let value = if bytes.get(lookahead) == Some(&b'=') {
                pos = lookahead + 1;
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                let (value, next) = attribute_value(s, pos);
                pos = next;
                decode_entities(value).into_owned()
            } else {
                String::new()
            };

            element
                .attributes
                .entry(name.to_string())
                .or_insert(value);
        }
    }
}

/// Read an attribute value starting at `pos`, returning it and the position
/// after it
fn attribute_value(s: &str, pos: usize) -> (&str, usize) {
    let bytes = s.as_bytes();
    match bytes.get(pos).copied() {
        Some(quote) if quote == b'"' || quote == b'\'' => {
            let start = pos + 1;
            bytes[start..]
                .iter()
                .position(|&b| b == quote)
                .map_or((&s[start..], s.len()), |len| {
                    (&s[start..start + len], start + len + 1)
                })
        }
        _ => {
            let len = bytes[pos..]
                .iter()
                .position(|&b| b.is_ascii_whitespace() || b == b'>')
                .unwrap_or(bytes.len() - pos);
            (&s[pos..pos + len], pos + len)
        }
    }
}

/// Decode the handful of character references common in mail markup
#[must_use]
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&rest[1..semi]).map(|c| (c, semi + 1)));

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

fn entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }

    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "eacute" => Some('é'),
        "Eacute" => Some('É'),
        _ => None,
    }
}

/// Stack of open elements; the bottom is always the synthetic root
struct TreeBuilder {
    stack: Vec<Element>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new(ROOT_TAG)],
        }
    }

    fn current(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn text(&mut self, raw: &str) {
        if !raw.is_empty() {
            let text = decode_entities(raw).into_owned();
            self.current().children.push(HtmlNode::Text(text));
        }
    }

    fn void(&mut self, mut element: Element) {
        element.finish();
        self.current().children.push(HtmlNode::Element(element));
    }

    fn open(&mut self, element: Element) {
        if IMPLIED_END_TAGS.iter().any(|t| element.is(t)) {
            self.close_implied(&element.tag);
        }
        if self.stack.len() > MAX_NESTING_DEPTH {
            self.pop();
        }
        self.stack.push(element);
    }

    /// Close an open element of this tag unless a scope boundary sits
    /// between it and the top of the stack
    fn close_implied(&mut self, tag: &str) {
        let open = self
            .stack
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .find(|(_, element)| element.is(tag) || SCOPE_TAGS.iter().any(|t| element.is(t)))
            .filter(|(_, element)| element.is(tag))
            .map(|(index, _)| index);

        if let Some(index) = open {
            while self.stack.len() > index {
                self.pop();
            }
        }
    }

    /// Close the innermost open element with this tag; a closing tag with no
    /// open match is ignored
    fn close(&mut self, tag: &str) {
        let Some(index) = self
            .stack
            .iter()
            .rposition(|element| element.is(tag))
            .filter(|&index| index > 0)
        else {
            return;
        };

        while self.stack.len() > index {
            self.pop();
        }
    }

    fn pop(&mut self) {
        if let Some(mut element) = self.stack.pop() {
            element.finish();
            self.current().children.push(HtmlNode::Element(element));
        }
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            self.pop();
        }
        let mut root = self.stack.pop().unwrap_or_else(|| Element::new(ROOT_TAG));
        root.finish();
        root
    }
}
