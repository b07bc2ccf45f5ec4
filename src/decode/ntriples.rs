//! N-Triples codec
//!
//! Statements are kept as their original text; only the line framing is
//! interpreted.

use super::types::{RecordDecoder, RecordEncoder};
use crate::error::{Error, Result};
use std::io::Write;

/// Media type for N-Triples
pub const NTRIPLES_MEDIA_TYPE: &str = "application/n-triples";

/// Number of characters of an offending line quoted in errors
const SNIPPET_LEN: usize = 80;

// ============================================================================
// Decoder
// ============================================================================

/// Splits an N-Triples body into statements
///
/// Blank lines and `#` comment lines are dropped, as is a comment after a
/// statement's final `.`. Every other line must have the shape
/// `subject predicate object .`; anything else (an HTML error page, an error
/// message, Turtle with prefixes or multi-line statements) is rejected
/// instead of being spooled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesDecoder;

impl NTriplesDecoder {
    /// Create a new N-Triples decoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordDecoder for NTriplesDecoder {
    fn accept(&self) -> &'static str {
        NTRIPLES_MEDIA_TYPE
    }

    fn decode(&self, body: &str) -> Result<Vec<String>> {
        let body = body.strip_prefix('\u{feff}').unwrap_or(body);

        let head: String = body.trim_start().chars().take(15).collect();
        let head = head.to_ascii_lowercase();
        if head.starts_with("<!doctype html") || head.starts_with("<html") {
            return Err(Error::decode("endpoint returned an HTML page, not N-Triples"));
        }

        let mut records = Vec::new();
        for (number, line) in body.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some(statement) = statement(line) else {
                let snippet: String = line.chars().take(SNIPPET_LEN).collect();
                return Err(Error::decode(format!(
                    "line {} is not an N-Triples statement: {snippet}",
                    number + 1
                )));
            };
            records.push(statement.to_string());
        }

        Ok(records)
    }
}

// ============================================================================
// Statement Shape
// ============================================================================

/// Check `subject predicate object .` and return the statement without any
/// trailing comment
fn statement(line: &str) -> Option<&str> {
    let rest = subject(line)?.trim_start();
    let rest = iri(rest)?.trim_start();
    let rest = object(rest)?.trim_start();
    let after_dot = rest.strip_prefix('.')?;

    let trailing = after_dot.trim_start();
    if !trailing.is_empty() && !trailing.starts_with('#') {
        return None;
    }
    Some(&line[..line.len() - after_dot.len()])
}

fn subject(s: &str) -> Option<&str> {
    if s.starts_with('<') {
        iri(s)
    } else {
        blank_node(s)
    }
}

fn object(s: &str) -> Option<&str> {
    match s.as_bytes().first()? {
        b'<' => iri(s),
        b'"' => literal(s),
        _ => blank_node(s),
    }
}

/// `<...>` with no whitespace or forbidden characters inside
fn iri(s: &str) -> Option<&str> {
    let body = s.strip_prefix('<')?;
    let end = body.find('>')?;
    let forbidden = |c: char| c.is_whitespace() || matches!(c, '<' | '"' | '{' | '}' | '|' | '^' | '`');
    if body[..end].contains(forbidden) {
        return None;
    }
    Some(&body[end + 1..])
}

/// `_:label`; a label cannot end in `.`
fn blank_node(s: &str) -> Option<&str> {
    let body = s.strip_prefix("_:")?;
    let mut end = body
        .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
        .unwrap_or(body.len());
    while body[..end].ends_with('.') {
        end -= 1;
    }
    if end == 0 {
        return None;
    }
    Some(&body[end..])
}

/// `"..."` with escapes, then an optional `@lang` or `^^<datatype>`
fn literal(s: &str) -> Option<&str> {
    let body = s.strip_prefix('"')?;
    let mut chars = body.char_indices();
    let close = loop {
        match chars.next()? {
            (_, '\\') => {
                chars.next()?;
            }
            (i, '"') => break i,
            _ => {}
        }
    };
    let rest = &body[close + 1..];

    if let Some(tag) = rest.strip_prefix('@') {
        let end = tag
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(tag.len());
        if end == 0 || !tag.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        return Some(&tag[end..]);
    }
    if let Some(datatype) = rest.strip_prefix("^^") {
        return iri(datatype);
    }
    Some(rest)
}

// ============================================================================
// Encoder
// ============================================================================

/// Writes statements one per line, `\n` terminated
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesEncoder;

impl NTriplesEncoder {
    /// Create a new N-Triples encoder
    pub fn new() -> Self {
        Self
    }
}

impl RecordEncoder for NTriplesEncoder {
    fn write(&self, records: &[String], out: &mut dyn Write) -> std::io::Result<()> {
        for record in records {
            out.write_all(record.as_bytes())?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
