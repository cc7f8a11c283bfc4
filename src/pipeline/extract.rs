//! Record extraction from component source text.
//!
//! The website keeps its résumé data as array literals of object literals
//! inside `.tsx` components:
//!
//! ```text
//! const experiences: ExperienceItemProps[] = [
//!   { title: 'Datacenter Manager', skills: ['DNS', 'VPN'], ... },
//!   ...
//! ];
//! ```
//!
//! [`extract_records`] finds the named array, cuts it into top-level object
//! fragments and tokenizes each fragment into a [`Record`]. Nothing here
//! ever fails: an absent variable yields an empty sequence and a malformed
//! fragment yields whatever fields could be read.
//!
//! ## Scanner
//!
//! Brackets are counted only outside strings and comments. The scanner is a
//! [`ScanState`] value threaded through a `try_fold` over the characters;
//! each step returns the next state and, when the character is code, the
//! character itself.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::ControlFlow;
use tracing::{debug, warn};

// ── Record ───────────────────────────────────────────────────────────────

/// A field value recovered from an object literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// A quoted scalar, unescaped.
    Text(String),
    /// A bracketed list of quoted scalars.
    List(Vec<String>),
    /// A bare `true` / `false`.
    Flag(bool),
}

/// One object literal, field name → value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Text field, `None` when absent or of another shape.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// List field; empty when absent or of another shape.
    pub fn list(&self, key: &str) -> &[String] {
        match self.0.get(key) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.0.get(key) {
            Some(Value::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Record(iter.into_iter().collect())
    }
}

// ── Public API ───────────────────────────────────────────────────────────

/// Records of the array literal assigned to `var_name`, in source order.
///
/// Matches `const|let|var NAME [: Type] = [`. Returns an empty vector when
/// no such assignment exists.
pub fn extract_records(source: &str, var_name: &str) -> Vec<Record> {
    let pattern = format!(
        r"\b(?:const|let|var)\s+{}\s*(?::[^=;]*)?=\s*\[",
        regex::escape(var_name)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Invalid variable name '{}': {}", var_name, e);
            return Vec::new();
        }
    };
    let Some(m) = re.find(source) else {
        debug!("Array '{}' not found", var_name);
        return Vec::new();
    };

    let fragments = split_fragments(&source[m.end()..]);
    debug!("Array '{}': {} object fragments", var_name, fragments.len());
    fragments.into_iter().map(parse_fragment).collect()
}

/// Inner text of the first `<p className="PREFIX…">…</p>` element, with
/// runs of whitespace collapsed to single spaces.
pub fn extract_element_text(source: &str, class_prefix: &str) -> Option<String> {
    let pattern = format!(
        r#"(?s)<p\s+className="{}[^"]*"[^>]*>\s*(.+?)\s*</p>"#,
        regex::escape(class_prefix)
    );
    let re = Regex::new(&pattern).ok()?;
    let inner = re.captures(source)?.get(1)?.as_str();
    let text = collapse_whitespace(inner);
    (!text.is_empty()).then_some(text)
}

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(s: &str) -> String {
    RE_WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

// ── Scanner ──────────────────────────────────────────────────────────────

/// Lexical state of the bracket scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScanState {
    Normal,
    /// Inside a string opened by the given quote.
    InString(char),
    /// Right after a backslash inside a string.
    Escaped(char),
    /// A `/` was seen in code; a comment may follow.
    Slash,
    LineComment,
    BlockComment,
    /// A `*` was seen inside a block comment.
    BlockCommentStar,
}

impl ScanState {
    /// Advance by one character. The second element is `Some(c)` when `c`
    /// is code (not part of a string or comment).
    pub(crate) fn step(self, c: char) -> (ScanState, Option<char>) {
        use ScanState::*;
        match self {
            Normal => match c {
                '\'' | '"' | '`' => (InString(c), None),
                '/' => (Slash, None),
                _ => (Normal, Some(c)),
            },
            InString(q) => match c {
                '\\' => (Escaped(q), None),
                _ if c == q => (Normal, None),
                _ => (InString(q), None),
            },
            Escaped(q) => (InString(q), None),
            Slash => match c {
                '/' => (LineComment, None),
                '*' => (BlockComment, None),
                _ => Normal.step(c),
            },
            LineComment => match c {
                '\n' => (Normal, None),
                _ => (LineComment, None),
            },
            BlockComment => match c {
                '*' => (BlockCommentStar, None),
                _ => (BlockComment, None),
            },
            BlockCommentStar => match c {
                '/' => (Normal, None),
                '*' => (BlockCommentStar, None),
                _ => (BlockComment, None),
            },
        }
    }
}

struct Split<'a> {
    state: ScanState,
    depth: usize,
    start: Option<usize>,
    fragments: Vec<&'a str>,
}

/// Cut an array body (text right after the opening `[`) into its top-level
/// `{…}` fragments. Stops at the matching `]`.
fn split_fragments(body: &str) -> Vec<&str> {
    let init = Split {
        state: ScanState::Normal,
        depth: 0,
        start: None,
        fragments: Vec::new(),
    };

    let flow = body.char_indices().try_fold(init, |mut scan, (i, c)| {
        let (next, code) = scan.state.step(c);
        scan.state = next;
        match code {
            Some('{') | Some('[') => {
                if scan.depth == 0 && c == '{' {
                    scan.start = Some(i);
                }
                scan.depth += 1;
            }
            Some('}') | Some(']') => {
                if scan.depth == 0 {
                    return ControlFlow::Break(scan);
                }
                scan.depth -= 1;
                if scan.depth == 0 && c == '}' {
                    if let Some(start) = scan.start.take() {
                        scan.fragments.push(&body[start..=i]);
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue(scan)
    });

    match flow {
        ControlFlow::Break(scan) => scan.fragments,
        ControlFlow::Continue(scan) => {
            warn!(
                "Array literal is not terminated; keeping {} complete fragments",
                scan.fragments.len()
            );
            scan.fragments
        }
    }
}

// ── Fragment tokenizer ───────────────────────────────────────────────────

/// Shape of a field value as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueShape {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    /// Anything else (objects, lists of objects, JSX, calls, numbers).
    Other,
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, want: char) -> bool {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        loop {
            let rest = &self.src[self.pos..];
            if let Some(c) = rest.chars().next().filter(|c| c.is_whitespace()) {
                self.pos += c.len_utf8();
            } else if rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                self.pos += rest[2..].find("*/").map_or(rest.len(), |n| n + 4);
            } else {
                break;
            }
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Read a quoted string starting at the opening quote, unescaping it.
    fn string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '\\' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('u') => out.push(self.unicode_escape().unwrap_or('u')),
                    Some(other) => out.push(other),
                    None => break,
                },
                _ if c == quote => return Some(out),
                _ => out.push(c),
            }
        }
        debug!("Unterminated string literal in record");
        Some(out)
    }

    fn unicode_escape(&mut self) -> Option<char> {
        let hex = self.src.get(self.pos..self.pos + 4)?;
        let c = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)?;
        self.pos += 4;
        Some(c)
    }

    /// Skip one value of unknown shape, up to (not including) the next
    /// top-level `,` or the end of input.
    fn skip_value(&mut self) {
        let mut state = ScanState::Normal;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            let (next, code) = state.step(c);
            match code {
                Some('{' | '[' | '(') => depth += 1,
                Some('}' | ']' | ')') => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                Some(',') if depth == 0 => return,
                _ => {}
            }
            state = next;
            self.pos += c.len_utf8();
        }
    }

    fn value(&mut self) -> ValueShape {
        match self.peek() {
            Some('\'' | '"' | '`') => match self.string() {
                Some(s) => ValueShape::Text(s),
                None => ValueShape::Other,
            },
            Some('[') => self.list(),
            Some(c) if c.is_alphabetic() => {
                let start = self.pos;
                let word = self.ident();
                self.skip_trivia();
                let bare = matches!(self.peek(), None | Some(','));
                match word {
                    Some("true") if bare => ValueShape::Flag(true),
                    Some("false") if bare => ValueShape::Flag(false),
                    _ => {
                        self.pos = start;
                        self.skip_value();
                        ValueShape::Other
                    }
                }
            }
            _ => {
                self.skip_value();
                ValueShape::Other
            }
        }
    }

    /// A `[ 'a', "b", … ]` list. Any non-string item makes the whole list
    /// [`ValueShape::Other`]; the cursor still ends after the closing `]`.
    fn list(&mut self) -> ValueShape {
        let start = self.pos;
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(']') => {
                    self.bump();
                    return ValueShape::List(items);
                }
                Some(',') => {
                    self.bump();
                }
                Some('\'' | '"' | '`') => {
                    if let Some(s) = self.string() {
                        items.push(s);
                    }
                }
                _ => {
                    self.pos = start;
                    self.skip_value();
                    return ValueShape::Other;
                }
            }
        }
    }
}

/// Tokenize one `{…}` fragment into a [`Record`].
///
/// Fields of unsupported shape are dropped. A key that occurs more than
/// once is ambiguous and dropped entirely.
fn parse_fragment(fragment: &str) -> Record {
    let inner = fragment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(fragment);
    let mut cur = Cursor::new(inner);
    let mut fields: Vec<(String, ValueShape)> = Vec::new();

    loop {
        cur.skip_trivia();
        while cur.eat(',') {
            cur.skip_trivia();
        }
        let Some(c) = cur.peek() else { break };

        let key = match c {
            '\'' | '"' => cur.string(),
            _ => cur.ident().map(str::to_string),
        };
        let Some(key) = key else {
            // Spread or other non-property syntax.
            cur.skip_value();
            if cur.peek().is_some() && !cur.eat(',') {
                cur.bump();
            }
            continue;
        };

        cur.skip_trivia();
        if !cur.eat(':') {
            // Shorthand property or method; nothing to read.
            cur.skip_value();
            continue;
        }
        cur.skip_trivia();
        let shape = cur.value();
        fields.push((key, shape));
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for (key, _) in &fields {
        *counts.entry(key.as_str()).or_default() += 1;
    }
    let duplicated: Vec<String> = counts
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(k, _)| k.to_string())
        .collect();
    for key in &duplicated {
        warn!("Field '{}' occurs more than once in a record; dropped", key);
    }

    fields
        .into_iter()
        .filter(|(key, _)| !duplicated.contains(key))
        .filter_map(|(key, shape)| match shape {
            ValueShape::Text(s) => Some((key, Value::Text(s))),
            ValueShape::List(items) => Some((key, Value::List(items))),
            ValueShape::Flag(b) => Some((key, Value::Flag(b))),
            ValueShape::Other => {
                debug!("Field '{}' has an unsupported shape; dropped", key);
                None
            }
        })
        .collect()
}
