//! Catalog patching: fill empty `msgstr` entries with machine translations.
//!
//! The patcher works on raw lines so everything it does not rewrite
//! (comments, headers, plural forms, line endings) survives byte for byte.

pub mod line;


use std::fmt;
use std::path::{Path, PathBuf};

use crate::translate::{TranslateError, Translator};
use line::{CatalogLine, LineError, escape, parse_line, unescape};

/// An untranslated entry found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    /// Zero-based index of the `msgstr` line to rewrite.
    pub line_index: usize,
    /// Unescaped `msgid` text to translate.
    pub source: String,
}

/// What: Result of a successful patch attempt.
///
/// Details:
/// - Only `Translated` means the file was rewritten.
#[derive(Debug)]
pub enum PatchOutcome {
    /// Nothing needed translating; the translator was not called.
    Unchanged,
    /// `count` entries were filled in and the file was rewritten.
    Translated {
        /// Number of rewritten `msgstr` lines.
        count: usize,
    },
    /// The translator returned a different number of strings; file untouched.
    LengthMismatch {
        /// Strings submitted.
        sent: usize,
        /// Strings received.
        received: usize,
    },
    /// The translator failed; file untouched.
    TranslatorFailed(TranslateError),
}

/// What: Fatal errors while reading, scanning or writing a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// Reading or writing the file failed.
    Io {
        /// Catalog path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// A line in the two-field subset is malformed.
    Parse {
        /// Catalog path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// What was wrong with it.
        source: LineError,
    },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, line, source } => {
                write!(f, "{}:{line}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Which keyword a continuation line extends.
#[derive(Clone, Copy)]
enum Field {
    /// Continuing a `msgid`.
    Id,
    /// Continuing the open `msgstr`.
    Str,
    /// Nothing the scanner tracks.
    None,
}

/// What: Split text into lines that keep their terminators.
///
/// Details:
/// - Joining the result reproduces the input exactly.
#[must_use]
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// What: Find every `msgstr` that is empty while its `msgid` is not.
///
/// Inputs:
/// - `lines`: Catalog lines from [`split_lines`].
///
/// Output:
/// - Pending entries in file order.
///
/// # Errors
/// - Returns `Err((line_number, LineError))` with a one-based line number for
///   the first malformed line.
///
/// Details:
/// - `msgid`/`msgstr` values include their continuation lines.
/// - A `msgstr` counts as empty only if it and all its continuations are empty.
/// - Blank lines and `msgctxt` reset the tracked `msgid`.
pub fn scan(lines: &[&str]) -> Result<Vec<PendingEntry>, (usize, LineError)> {
    let mut pending = Vec::new();
    let mut msgid = String::new();
    let mut open_msgstr: Option<(usize, String)> = None;
    let mut field = Field::None;

    // Decide on the msgstr currently being collected
    let mut flush = |open: &mut Option<(usize, String)>, msgid: &str| {
        if let Some((line_index, value)) = open.take()
            && value.is_empty()
            && !msgid.is_empty()
        {
            pending.push(PendingEntry {
                line_index,
                source: unescape(msgid),
            });
        }
    };

    for (idx, raw) in lines.iter().enumerate() {
        let parsed = parse_line(raw).map_err(|e| (idx + 1, e))?;
        match parsed {
            CatalogLine::MsgId(value) => {
                flush(&mut open_msgstr, &msgid);
                msgid = value;
                field = Field::Id;
            }
            CatalogLine::MsgStr(value) => {
                flush(&mut open_msgstr, &msgid);
                open_msgstr = Some((idx, value));
                field = Field::Str;
            }
            CatalogLine::Continuation(value) => match field {
                Field::Id => msgid.push_str(&value),
                Field::Str => {
                    if let Some((_, current)) = open_msgstr.as_mut() {
                        current.push_str(&value);
                    }
                }
                Field::None => {}
            },
            CatalogLine::Context | CatalogLine::Blank => {
                flush(&mut open_msgstr, &msgid);
                msgid.clear();
                field = Field::None;
            }
            CatalogLine::Other => {
                flush(&mut open_msgstr, &msgid);
                field = Field::None;
            }
        }
    }
    flush(&mut open_msgstr, &msgid);
    Ok(pending)
}

/// Replace the string on a `msgstr` line, keeping its terminator.
fn render_msgstr(original: &str, translation: &str) -> String {
    let terminator = if original.ends_with("\r\n") {
        "\r\n"
    } else if original.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    format!("msgstr \"{}\"{terminator}", escape(translation))
}

/// What: Write `contents` to `path` through a sibling temporary file.
///
/// Details:
/// - Readers see either the old or the new file, never a partial write.
fn write_replacing(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&tmp_path);
    })
}

/// What: Fill every empty translation in a catalog file.
///
/// Inputs:
/// - `path`: `.po` file to patch in place.
/// - `locale`: Target locale handed to the translator.
/// - `translator`: Backend producing the translations.
///
/// Output:
/// - `Ok(PatchOutcome)` describing what happened.
///
/// # Errors
/// - Returns `Err(CatalogError::Io)` when the file cannot be read or written.
/// - Returns `Err(CatalogError::Parse)` when a `msgid`, `msgstr` or
///   continuation line is malformed. The file is left untouched.
///
/// Details:
/// - All pending entries go to the translator as one batch.
/// - Translator failures and count mismatches are outcomes, not errors; the
///   file is only rewritten when every entry has a translation.
/// - Populated translations and entries with an empty `msgid` are never changed.
pub async fn auto_translate_file<T: Translator>(
    path: &Path,
    locale: &str,
    translator: &T,
) -> Result<PatchOutcome, CatalogError> {
    tracing::info!(locale, path = %path.display(), "translating catalog");
    let io_err = |source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };
    let text = std::fs::read_to_string(path).map_err(io_err)?;
    let lines = split_lines(&text);
    let pending = scan(&lines).map_err(|(line, source)| CatalogError::Parse {
        path: path.to_path_buf(),
        line,
        source,
    })?;

    if pending.is_empty() {
        tracing::debug!(locale, "no untranslated entries");
        return Ok(PatchOutcome::Unchanged);
    }

    let sources: Vec<String> = pending.iter().map(|p| p.source.clone()).collect();
    let translations = match translator.translate_batch(&sources, locale).await {
        Ok(translations) => translations,
        Err(err) => {
            tracing::warn!(locale, error = %err, "translation request failed");
            return Ok(PatchOutcome::TranslatorFailed(err));
        }
    };
    if translations.len() != sources.len() {
        tracing::warn!(
            locale,
            sent = sources.len(),
            received = translations.len(),
            "Did not receive the same length of data as we sent"
        );
        return Ok(PatchOutcome::LengthMismatch {
            sent: sources.len(),
            received: translations.len(),
        });
    }

    let mut output: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
    for (entry, translation) in pending.iter().zip(&translations) {
        output[entry.line_index] = render_msgstr(lines[entry.line_index], translation);
    }
    write_replacing(path, &output.concat()).map_err(io_err)?;

    tracing::info!(locale, count = pending.len(), "catalog translated");
    Ok(PatchOutcome::Translated {
        count: pending.len(),
    })
}
