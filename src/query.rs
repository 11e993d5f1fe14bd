//! Attribution query construction.
//!
//! An attribution query asks the backend for an exact literal content match,
//! selected at repository granularity, answered from precomputed indexes
//! only, capped at `count` repositories:
//!
//! ```text
//! type:file select:repo index:only count:<limit> content:"<snippet>"
//! ```
//!
//! The snippet is embedded as a double-quoted literal with backslash escapes
//! so that query-syntax characters in the snippet are matched verbatim.

use std::fmt::Write as _;

use crate::error::BackendError;
use crate::types::{PatternType, Protocol, SearchMode};

/// Query language version understood by the backend.
pub const QUERY_VERSION: &str = "V3";

const QUERY_PREFIX: &str = "type:file select:repo index:only count:";
const CONTENT_FIELD: &str = " content:";

/// A structured query handed to [`crate::backend::SearchBackend::plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub version: String,
    pub pattern_type: PatternType,
    pub query: String,
    pub mode: SearchMode,
    pub protocol: Protocol,
}

impl QueryRequest {
    /// Build the attribution request for `snippet`, capped at `limit` repositories.
    pub fn attribution(snippet: &str, limit: usize) -> Self {
        Self {
            version: QUERY_VERSION.to_owned(),
            pattern_type: PatternType::Literal,
            query: attribution_query(snippet, limit),
            mode: SearchMode::Precise,
            protocol: Protocol::Batch,
        }
    }
}

/// Render the attribution query string for `snippet`.
pub fn attribution_query(snippet: &str, limit: usize) -> String {
    format!("{QUERY_PREFIX}{limit}{CONTENT_FIELD}{}", quote_literal(snippet))
}

/// The fields recovered from an attribution query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionQuery {
    pub count: usize,
    pub content: String,
}

/// Parse a query produced by [`attribution_query`].
///
/// # Errors
///
/// Returns [`BackendError::InvalidQuery`] if the query does not have the
/// attribution shape, the count is not a positive integer, or the content
/// literal is malformed.
pub fn parse_attribution_query(query: &str) -> Result<AttributionQuery, BackendError> {
    let rest = query
        .strip_prefix(QUERY_PREFIX)
        .ok_or_else(|| BackendError::InvalidQuery("not an attribution query".into()))?;
    let (count, quoted) = rest
        .split_once(CONTENT_FIELD)
        .ok_or_else(|| BackendError::InvalidQuery("missing content field".into()))?;
    let count: usize = count
        .parse()
        .map_err(|_| BackendError::InvalidQuery(format!("invalid count `{count}`")))?;
    if count == 0 {
        return Err(BackendError::InvalidQuery("count must be greater than 0".into()));
    }
    Ok(AttributionQuery {
        count,
        content: unquote_literal(quoted)?,
    })
}

/// Quote `s` as a double-quoted literal with backslash escapes.
///
/// Printable characters, including non-ASCII ones, are kept as is. Control
/// characters use their short escape when one exists. Other non-printable
/// characters (see [`is_unprintable`]) become `\xNN` for ASCII and
/// `\uNNNN` / `\UNNNNNNNN` beyond it, as Go's `%q` does.
pub fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if is_unprintable(c) => {
                let code = u32::from(c);
                // Writing to a String cannot fail.
                let _ = if code < 0x80 {
                    write!(out, "\\x{code:02x}")
                } else if code < 0x1_0000 {
                    write!(out, "\\u{code:04x}")
                } else {
                    write!(out, "\\U{code:08x}")
                };
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Characters [`quote_literal`] escapes numerically.
///
/// Covers control and format characters, every space separator except
/// U+0020, line and paragraph separators, and private-use code points.
/// Unassigned code points are not detected and pass through unescaped.
pub fn is_unprintable(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(
            c,
            '\u{ad}'
                | '\u{600}'..='\u{605}'
                | '\u{61c}'
                | '\u{6dd}'
                | '\u{70f}'
                | '\u{180e}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206f}'
                | '\u{feff}'
                | '\u{fff9}'..='\u{fffb}'
                | '\u{e000}'..='\u{f8ff}'
                | '\u{f0000}'..='\u{10ffff}'
        )
}

/// Reverse [`quote_literal`].
///
/// # Errors
///
/// Returns [`BackendError::InvalidQuery`] on a missing quote, an unescaped
/// quote inside the literal, or an unknown or truncated escape sequence.
pub fn unquote_literal(quoted: &str) -> Result<String, BackendError> {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| BackendError::InvalidQuery("content must be a quoted literal".into()))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                return Err(BackendError::InvalidQuery(
                    "unescaped quote in content literal".into(),
                ))
            }
            '\\' => {
                let escape = chars
                    .next()
                    .ok_or_else(|| BackendError::InvalidQuery("trailing backslash".into()))?;
                let decoded = match escape {
                    'a' => '\u{07}',
                    'b' => '\u{08}',
                    'f' => '\u{0c}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\u{0b}',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    'x' => hex_escape(&mut chars, 2)?,
                    'u' => hex_escape(&mut chars, 4)?,
                    'U' => hex_escape(&mut chars, 8)?,
                    other => {
                        return Err(BackendError::InvalidQuery(format!(
                            "unknown escape `\\{other}`"
                        )))
                    }
                };
                out.push(decoded);
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, BackendError> {
    let hex: String = chars.by_ref().take(digits).collect();
    if hex.len() != digits {
        return Err(BackendError::InvalidQuery("truncated escape sequence".into()));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| BackendError::InvalidQuery(format!("invalid escape value `{hex}`")))
}
