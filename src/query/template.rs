//! Query template parsing and window binding
//!
//! A base query is scanned once to find where the `LIMIT`/`OFFSET` window
//! clause belongs. Binding afterwards is plain string assembly, so two
//! bindings of the same template differ only in the two integers.

use crate::error::{Error, Result};
use crate::types::PageWindow;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Regex for an IRI reference starting at the current position
///
/// A comparison such as `?x<3&&?y>` also matches; the scanner only tries it
/// where an IRI can start.
static IRI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^<[^<>"{}|^`\\\x00-\x20]*>"#).unwrap());

/// SPARQL query form of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    /// `CONSTRUCT { template } WHERE { pattern }`
    Construct,
    /// `DESCRIBE <iri> WHERE { pattern }`
    Describe,
    /// `SELECT ?vars WHERE { pattern }`
    Select,
    /// `ASK { pattern }`
    Ask,
}

impl QueryForm {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "CONSTRUCT" => Some(Self::Construct),
            "DESCRIBE" => Some(Self::Describe),
            "SELECT" => Some(Self::Select),
            "ASK" => Some(Self::Ask),
            _ => None,
        }
    }

    /// Whether this form yields an RDF graph
    pub fn produces_graph(&self) -> bool {
        matches!(self, Self::Construct | Self::Describe)
    }
}

impl fmt::Display for QueryForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Construct => "CONSTRUCT",
            Self::Describe => "DESCRIBE",
            Self::Select => "SELECT",
            Self::Ask => "ASK",
        };
        f.write_str(name)
    }
}

/// An immutable base query with `limit` and `offset` slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    form: QueryForm,
    /// Query text up to the window clause
    head: String,
    /// Trailing `VALUES` block, kept after the window clause
    tail: String,
}

impl QueryTemplate {
    /// Parse a base query into a template
    pub fn parse(text: &str) -> Result<Self> {
        let scan = scan_top_level(text)?;

        let form = scan
            .keywords
            .iter()
            .find_map(|(word, _)| QueryForm::from_keyword(word))
            .ok_or_else(|| {
                Error::template("no query form found (expected CONSTRUCT or DESCRIBE)")
            })?;

        if !form.produces_graph() {
            return Err(Error::template(format!(
                "{form} queries do not produce triples; use CONSTRUCT or DESCRIBE"
            )));
        }

        for clause in ["LIMIT", "OFFSET"] {
            if scan.keywords.iter().any(|(word, _)| word == clause) {
                return Err(Error::template(format!(
                    "base query already has a top-level {clause} clause"
                )));
            }
        }

        // A top-level VALUES block can only be the trailing ValuesClause,
        // which the grammar places after the solution modifiers.
        let split = scan
            .keywords
            .iter()
            .rev()
            .find(|(word, _)| word == "VALUES")
            .map(|(_, start)| *start);

        let (head, tail) = match split {
            Some(at) => (
                text[..at].trim_end().to_string(),
                format!("\n{}", text[at..].trim()),
            ),
            None => (text.trim_end().to_string(), String::new()),
        };

        Ok(Self { form, head, tail })
    }

    /// The query form of this template
    pub fn form(&self) -> QueryForm {
        self.form
    }

    /// Bind a window into an executable query
    pub fn bind(&self, window: PageWindow) -> String {
        format!(
            "{}\nLIMIT {}\nOFFSET {}{}",
            self.head, window.limit, window.offset, self.tail
        )
    }
}

/// Upper-cased keywords found outside any group, with their byte offsets
struct TopLevelScan {
    keywords: Vec<(String, usize)>,
}

/// Walk the query once, skipping comments, strings and IRIs, checking
/// bracket balance and collecting depth-zero keywords.
fn scan_top_level(text: &str) -> Result<TopLevelScan> {
    if text.trim().is_empty() {
        return Err(Error::template("query is empty"));
    }

    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut keywords = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'"' | b'\'' => {
                i = skip_string(bytes, i)?;
            }
            // Inside an expression, `<` right after an operand is a comparison
            b'<' if stack.last() == Some(&b'(') && follows_operand(bytes, i) => {
                i += 1;
            }
            b'<' => {
                i += IRI_REGEX
                    .find(&text[i..])
                    .map_or(1, |m| m.end());
            }
            b'{' | b'(' => {
                stack.push(c);
                i += 1;
            }
            b'}' | b')' => {
                let open = if c == b'}' { b'{' } else { b'(' };
                if stack.pop() != Some(open) {
                    return Err(Error::template(format!(
                        "unbalanced '{}' at byte {i}",
                        c as char
                    )));
                }
                i += 1;
            }
            b'?' | b'$' => {
                i += 1;
                while i < bytes.len() && is_name_byte(bytes[i]) {
                    i += 1;
                }
            }
            _ if c.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (is_name_byte(bytes[i]) || bytes[i] == b':') {
                    i += 1;
                }
                let word = &text[start..i];
                let local_name = start > 0 && bytes[start - 1] == b':';
                if stack.is_empty() && !local_name && !word.contains(':') {
                    keywords.push((word.to_ascii_uppercase(), start));
                }
            }
            _ => i += 1,
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::template(format!(
            "unclosed '{}' at end of query",
            *open as char
        )));
    }

    Ok(TopLevelScan { keywords })
}

/// Whether the last non-blank byte before `at` ends a value
fn follows_operand(bytes: &[u8], at: usize) -> bool {
    bytes[..at]
        .iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b')' | b'"' | b'\''))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.' || b >= 0x80
}

/// Skip a short or long string literal starting at `start`, returning the
/// index just past its closing quote.
fn skip_string(bytes: &[u8], start: usize) -> Result<usize> {
    let quote = bytes[start];
    let long = bytes.len() >= start + 3 && bytes[start + 1] == quote && bytes[start + 2] == quote;
    let mut i = if long { start + 3 } else { start + 1 };

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if !long => break,
            b if b == quote => {
                if !long {
                    return Ok(i + 1);
                }
                if bytes.len() >= i + 3 && bytes[i + 1] == quote && bytes[i + 2] == quote {
                    return Ok(i + 3);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    Err(Error::template(format!(
        "unterminated string literal starting at byte {start}"
    )))
}
