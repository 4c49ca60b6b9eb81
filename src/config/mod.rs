//! Project settings loaded from a `.env` style file.
//!
//! The settings are read once at startup and then passed by reference to the
//! pipeline; nothing mutates them afterwards.

pub mod parsing;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use parsing::{parse_key_value, skip_comment_or_empty};

/// Default name of the environment file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Contents written by `--config`.
pub const DEFAULT_CONFIG: &str = "GENERATED_DIR=generated
LANGUAGES=en,de,ru
KEYWORD=_
LANGUAGE=C++
SOURCE_LOCALE=en
DOMAIN=messages
SOURCES=example.c
PACKAGE_NAME=Change Me
PACKAGE_VERSION=0.0.0
COPYRIGHT_HOLDER=Change Me
COMMENTS=
BUGS_ADDRESS=Change Me
DEEPL_KEY=
";

/// Resolved pipeline settings.
#[derive(Clone)]
pub struct Settings {
    /// Directory (relative to the project root) receiving compiled catalogs.
    pub generated_dir: PathBuf,
    /// Target locales, in configuration order.
    pub locales: Vec<String>,
    /// Extraction keyword passed to `xgettext -k`.
    pub keyword: String,
    /// Source language passed to `xgettext --language`, if configured.
    pub language: Option<String>,
    /// Locale the source strings are written in; never auto-translated.
    pub source_locale: String,
    /// Text domain; names the template, catalogs and compiled files.
    pub domain: String,
    /// Source files scanned by `xgettext`.
    pub sources: Vec<PathBuf>,
    /// Package name written into the template header.
    pub package_name: String,
    /// Package version written into the template header.
    pub package_version: String,
    /// Copyright holder written into the template header.
    pub copyright_holder: String,
    /// Comment tag passed to `xgettext --add-comments`.
    pub comments: String,
    /// Address for msgid bug reports.
    pub bugs_address: String,
    /// DeepL authentication key.
    pub deepl_key: Option<Zeroizing<String>>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("generated_dir", &self.generated_dir)
            .field("locales", &self.locales)
            .field("keyword", &self.keyword)
            .field("language", &self.language)
            .field("source_locale", &self.source_locale)
            .field("domain", &self.domain)
            .field("sources", &self.sources)
            .field("package_name", &self.package_name)
            .field("package_version", &self.package_version)
            .field("copyright_holder", &self.copyright_holder)
            .field("comments", &self.comments)
            .field("bugs_address", &self.bugs_address)
            .field("deepl_key", &self.deepl_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// What: Errors raised while loading or generating configuration.
///
/// Details:
/// - `MissingLocales` is the only fatal "missing key" case; every other key
///   has a default.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error while reading or writing the environment file.
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// `LANGUAGES` is absent or lists no locale.
    MissingLocales,
    /// `--config` was asked to write over an existing file.
    AlreadyExists(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::MissingLocales => write!(f, "Missing \"LANGUAGES\" from environment"),
            Self::AlreadyExists(path) => {
                write!(f, "{} already exists, refusing to overwrite", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::MissingLocales | Self::AlreadyExists(_) => None,
        }
    }
}

/// What: Parse environment file text into a key/value map.
///
/// Inputs:
/// - `text`: Whole file contents.
///
/// Output:
/// - Map of keys to values; later duplicates win.
#[must_use]
pub fn parse_env(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter(|line| !skip_comment_or_empty(line))
        .filter_map(parse_key_value)
        .collect()
}

/// Split a comma-separated list, dropping empty items.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl Settings {
    /// What: Build settings from a parsed key/value map.
    ///
    /// Inputs:
    /// - `values`: Map produced by [`parse_env`].
    ///
    /// Output:
    /// - `Ok(Settings)` with defaults applied to every missing or empty key.
    ///
    /// # Errors
    /// - Returns `Err(ConfigError::MissingLocales)` when `LANGUAGES` is missing or empty.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| get(key).unwrap_or(default).to_string();

        let locales = get("LANGUAGES").map(split_list).unwrap_or_default();
        if locales.is_empty() {
            return Err(ConfigError::MissingLocales);
        }

        Ok(Self {
            generated_dir: PathBuf::from(or("GENERATED_DIR", "")),
            locales,
            keyword: or("KEYWORD", "_"),
            language: get("LANGUAGE").map(ToString::to_string),
            source_locale: or("SOURCE_LOCALE", "en"),
            domain: or("DOMAIN", "messages"),
            sources: split_list(&or("SOURCES", "example.c"))
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            package_name: or("PACKAGE_NAME", "Change Me"),
            package_version: or("PACKAGE_VERSION", "0.0.0"),
            copyright_holder: or("COPYRIGHT_HOLDER", "Change Me"),
            comments: or("COMMENTS", ""),
            bugs_address: or("BUGS_ADDRESS", "email@email.com"),
            deepl_key: get("DEEPL_KEY").map(|k| Zeroizing::new(k.to_string())),
        })
    }

    /// What: Load settings from an environment file.
    ///
    /// Inputs:
    /// - `path`: Environment file location.
    ///
    /// Output:
    /// - `Ok(Settings)` on success.
    ///
    /// # Errors
    /// - Returns `Err(ConfigError::Io)` when the file exists but cannot be read.
    /// - Returns `Err(ConfigError::MissingLocales)` when no locale is configured,
    ///   including when the file does not exist.
    ///
    /// Details:
    /// - A missing file is not an error by itself; it behaves like an empty file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "environment file not found; using defaults");
                String::new()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_map(&parse_env(&text))
    }

    /// Human-readable configuration banner printed at startup.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Configuration:\n  Package: {} {}\n  Language: {}\n  Copyright Holder: {}\n  Languages: {}\n  Domain: {}\n  Keyword: {}\n",
            self.package_name,
            self.package_version,
            self.language.as_deref().unwrap_or("(auto)"),
            self.copyright_holder,
            self.locales.join(", "),
            self.domain,
            self.keyword,
        )
    }
}

/// What: Write [`DEFAULT_CONFIG`] to `path`.
///
/// Inputs:
/// - `path`: Destination environment file.
///
/// Output:
/// - `Ok(())` once the file is written.
///
/// # Errors
/// - Returns `Err(ConfigError::AlreadyExists)` when the file already exists.
/// - Returns `Err(ConfigError::Io)` when the file cannot be created or written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    use std::io::Write;

    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        Err(e) => return Err(io_err(e)),
    };
    file.write_all(DEFAULT_CONFIG.as_bytes()).map_err(io_err)?;
    tracing::info!(path = %path.display(), "default configuration written");
    Ok(())
}
