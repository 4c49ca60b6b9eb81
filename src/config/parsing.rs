//! Environment file parsing helpers.
//!
//! Line-level helpers for `.env` style files: comment skipping, `KEY=value`
//! splitting and quote stripping.

/// What: Check if a line should be skipped (empty or comment).
///
/// Inputs:
/// - `line`: Line to check
///
/// Output:
/// - `true` if the line should be skipped, `false` otherwise
///
/// Details:
/// - Skips empty lines and lines starting with `#`, `//`, or `;`
#[must_use]
pub fn skip_comment_or_empty(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with(';')
}

/// What: Parse a key-value pair from an environment file line.
///
/// Inputs:
/// - `line`: Line containing `KEY=value` (optionally prefixed with `export `)
///
/// Output:
/// - `Some((key, value))` if parsing succeeds, `None` otherwise
///
/// Details:
/// - Splits on the first `=` character and trims both sides.
/// - Drops a leading `export ` so shell-sourced files parse the same way.
/// - Strips one pair of matching single or double quotes from the value.
/// - A `#` preceded by whitespace starts a comment, except inside quotes.
/// - Returns `None` for an empty key.
#[must_use]
pub fn parse_key_value(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), clean_value(value.trim()).to_string()))
}

/// Remove surrounding quotes or, for unquoted values, a trailing comment.
fn clean_value(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(rest) = value.strip_prefix(quote)
            && let Some(end) = rest.find(quote)
        {
            let trailing = rest[end + 1..].trim_start();
            if trailing.is_empty() || trailing.starts_with('#') {
                return &rest[..end];
            }
        }
    }
    strip_inline_comment(value)
}

/// Cut an unquoted value at the first whitespace-preceded `#`.
fn strip_inline_comment(value: &str) -> &str {
    value
        .char_indices()
        .find(|&(idx, c)| c == '#' && value[..idx].ends_with(char::is_whitespace))
        .map_or(value, |(idx, _)| value[..idx].trim_end())
}
