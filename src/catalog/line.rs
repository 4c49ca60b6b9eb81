//! Line grammar for the subset of the `.po` format the patcher understands.
//!
//! ```text
//! line         := keyword ws+ quoted ws* | quoted ws* | other
//! keyword      := "msgid" | "msgstr"
//! quoted       := '"' ( escape | [^"\\] )* '"'
//! escape       := '\' any-char
//! ```
//!
//! Anything that starts with another keyword (`msgctxt`, `msgid_plural`,
//! `msgstr[0]`), a comment, or whitespace only is classified without being
//! inspected further.

use std::fmt;

/// Classification of one catalog line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLine {
    /// `msgid "..."`, value still escaped.
    MsgId(String),
    /// `msgstr "..."`, value still escaped.
    MsgStr(String),
    /// A bare `"..."` line continuing the previous keyword.
    Continuation(String),
    /// `msgctxt`, which starts a new entry.
    Context,
    /// Empty or whitespace-only line.
    Blank,
    /// Comments, plural forms and anything else the patcher ignores.
    Other,
}

/// Reason a line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError(String);

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for LineError {}

/// What: Classify a single line (without its terminator).
///
/// Inputs:
/// - `line`: Line text; trailing `\r`/`\n` are ignored.
///
/// Output:
/// - `Ok(CatalogLine)` describing the line.
///
/// # Errors
/// - Returns `Err(LineError)` when a `msgid`, `msgstr` or continuation line
///   does not hold exactly one well-formed quoted string.
pub fn parse_line(line: &str) -> Result<CatalogLine, LineError> {
    let text = line.trim_end_matches(['\r', '\n']).trim();
    if text.is_empty() {
        return Ok(CatalogLine::Blank);
    }
    if text.starts_with('#') {
        return Ok(CatalogLine::Other);
    }
    if text.starts_with('"') {
        return parse_quoted_only(text).map(CatalogLine::Continuation);
    }

    let keyword_end = text
        .find(|c: char| c.is_whitespace() || c == '"')
        .unwrap_or(text.len());
    let (keyword, rest) = text.split_at(keyword_end);
    match keyword {
        "msgid" => parse_keyword_value(keyword, rest).map(CatalogLine::MsgId),
        "msgstr" => parse_keyword_value(keyword, rest).map(CatalogLine::MsgStr),
        "msgctxt" => Ok(CatalogLine::Context),
        _ => Ok(CatalogLine::Other),
    }
}

/// Parse the part after `msgid`/`msgstr`, requiring whitespace before the quote.
fn parse_keyword_value(keyword: &str, rest: &str) -> Result<String, LineError> {
    let value = rest.trim_start();
    if value.len() == rest.len() {
        return Err(LineError(format!(
            "expected whitespace after `{keyword}`"
        )));
    }
    parse_quoted_only(value).map_err(|e| LineError(format!("`{keyword}` {e}")))
}

/// Parse a quoted string followed only by whitespace, returning the escaped body.
fn parse_quoted_only(text: &str) -> Result<String, LineError> {
    let Some(body) = text.strip_prefix('"') else {
        return Err(LineError("expected an opening quote".to_string()));
    };
    let mut chars = body.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return Err(LineError("dangling backslash".to_string()));
                }
            }
            '"' => {
                let trailing = &body[idx + 1..];
                if !trailing.trim().is_empty() {
                    return Err(LineError(format!(
                        "unexpected text after closing quote: {trailing:?}"
                    )));
                }
                return Ok(body[..idx].to_string());
            }
            _ => {}
        }
    }
    Err(LineError("missing closing quote".to_string()))
}

/// What: Decode the C-style escapes used inside catalog strings.
///
/// Inputs:
/// - `escaped`: String body as it appears between the quotes.
///
/// Output:
/// - The text the escapes stand for.
///
/// Details:
/// - Single-pass so `\\n` decodes to a backslash followed by `n`.
/// - Octal (`\351`, up to three digits) and hex (`\x41`) escapes are byte
///   values. A run of them is read as UTF-8 when it forms valid UTF-8 and as
///   Latin-1 otherwise, so both `\303\251` and `\351` decode to `é`.
/// - Unknown escapes are kept verbatim.
#[must_use]
pub fn unescape(escaped: &str) -> String {
    let mut result = String::with_capacity(escaped.len());
    let mut bytes: Vec<u8> = Vec::new();
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_bytes(&mut bytes, &mut result);
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(first @ '0'..='7') => {
                let mut value = first.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                // Three octal digits top out at 0o777; only the low byte is meaningful
                bytes.extend(u8::try_from(value & 0xFF).ok());
            }
            Some('x') => {
                let mut digits = String::new();
                while let Some(d) = chars.peek().copied().filter(char::is_ascii_hexdigit) {
                    digits.push(d);
                    chars.next();
                }
                let value = u32::from_str_radix(&digits, 16).ok();
                if let Some(byte) = value.and_then(|v| u8::try_from(v).ok()) {
                    bytes.push(byte);
                } else {
                    flush_bytes(&mut bytes, &mut result);
                    if let Some(ch) = value.and_then(char::from_u32) {
                        result.push(ch);
                    } else {
                        result.push_str("\\x");
                        result.push_str(&digits);
                    }
                }
            }
            simple => {
                flush_bytes(&mut bytes, &mut result);
                match simple {
                    Some('n') => result.push('\n'),
                    Some('t') => result.push('\t'),
                    Some('r') => result.push('\r'),
                    Some('a') => result.push('\u{07}'),
                    Some('b') => result.push('\u{08}'),
                    Some('f') => result.push('\u{0C}'),
                    Some('v') => result.push('\u{0B}'),
                    Some('"') => result.push('"'),
                    Some('\\') => result.push('\\'),
                    Some(other) => {
                        result.push('\\');
                        result.push(other);
                    }
                    None => result.push('\\'),
                }
            }
        }
    }
    flush_bytes(&mut bytes, &mut result);
    result
}

/// Append pending escaped bytes: UTF-8 when valid, Latin-1 otherwise.
fn flush_bytes(bytes: &mut Vec<u8>, out: &mut String) {
    if bytes.is_empty() {
        return;
    }
    match String::from_utf8(std::mem::take(bytes)) {
        Ok(text) => out.push_str(&text),
        Err(err) => out.extend(err.into_bytes().into_iter().map(char::from)),
    }
}

/// What: Encode text for placement between catalog quotes.
///
/// Inputs:
/// - `text`: Plain text.
///
/// Output:
/// - Escaped string body (without the surrounding quotes).
#[must_use]
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            other => result.push(other),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Keyword lines yield their escaped bodies.
    fn classifies_keywords() {
        assert_eq!(
            parse_line("msgid \"Hello\"\n"),
            Ok(CatalogLine::MsgId("Hello".into()))
        );
        assert_eq!(
            parse_line("msgstr \"\"\r\n"),
            Ok(CatalogLine::MsgStr(String::new()))
        );
        assert_eq!(
            parse_line("msgstr\t\"Hi \\\"there\\\"\"  "),
            Ok(CatalogLine::MsgStr("Hi \\\"there\\\"".into()))
        );
        assert_eq!(
            parse_line("\"continued\\n\""),
            Ok(CatalogLine::Continuation("continued\\n".into()))
        );
    }

    #[test]
    /// What: Lines outside the two-field subset are never mistaken for it.
    fn ignores_other_keywords() {
        assert_eq!(parse_line("msgid_plural \"apples\""), Ok(CatalogLine::Other));
        assert_eq!(parse_line("msgstr[0] \"\""), Ok(CatalogLine::Other));
        assert_eq!(parse_line("msgctxt \"menu\""), Ok(CatalogLine::Context));
        assert_eq!(parse_line("#~ msgid \"old\""), Ok(CatalogLine::Other));
        assert_eq!(parse_line("#, fuzzy"), Ok(CatalogLine::Other));
        assert_eq!(parse_line("   \n"), Ok(CatalogLine::Blank));
    }

    #[test]
    /// What: Malformed quoted strings are rejected instead of misread.
    fn rejects_malformed() {
        assert!(parse_line("msgstr").is_err());
        assert!(parse_line("msgstr Hello").is_err());
        assert!(parse_line("msgstr\"x\"").is_err());
        assert!(parse_line("msgid \"unterminated").is_err());
        assert!(parse_line("msgid \"a\" trailing").is_err());
        assert!(parse_line("msgid \"a\\").is_err());
        assert!(parse_line("\"half").is_err());
    }

    #[test]
    /// What: Escapes decode in one pass and unknown escapes survive.
    fn unescape_sequences() {
        assert_eq!(unescape("a\\nb"), "a\nb");
        assert_eq!(unescape("\\\\n"), "\\n");
        assert_eq!(unescape("say \\\"hi\\\""), "say \"hi\"");
        assert_eq!(unescape("\\q"), "\\q");
    }

    #[test]
    /// What: Octal and hex escapes decode to the characters they encode.
    ///
    /// Details:
    /// - Valid UTF-8 byte runs decode as UTF-8, anything else as Latin-1.
    fn unescape_numeric_escapes() {
        assert_eq!(unescape("caf\\351 \\x41"), "caf\u{e9} A");
        assert_eq!(unescape("caf\\303\\251"), "caf\u{e9}");
        assert_eq!(unescape("\\xc3\\xa9!"), "\u{e9}!");
        assert_eq!(unescape("\\0619"), "19");
        assert_eq!(unescape("\\x"), "\\x");
        assert_eq!(unescape("\\x20AC"), "\u{20ac}");
    }

    #[test]
    /// What: Escaping reverses unescaping for the characters it covers.
    fn escape_reverses_unescape() {
        let text = "Line \"one\"\n\tback\\slash";
        assert_eq!(escape(text), "Line \\\"one\\\"\\n\\tback\\\\slash");
        assert_eq!(unescape(&escape(text)), text);
    }
}
