//! Machine translation backends.
//!
//! The pipeline only needs "translate this batch of strings into that
//! locale"; [`Translator`] captures exactly that so the DeepL client can be
//! swapped for a stub in tests.

pub mod deepl;

use std::fmt;
use std::future::Future;

pub use deepl::{DeeplTranslator, Usage};

/// What: Batch translation capability.
///
/// Inputs:
/// - `texts`: Source strings, unescaped, in catalog order.
/// - `target_locale`: Catalog locale code (for example `de` or `pt_BR`).
///
/// Output:
/// - Translations in the same order. Implementations should return one item
///   per input, but callers must verify the count.
///
/// # Errors
/// - Returns `Err(TranslateError)` when the backend cannot be reached or
///   rejects the request.
pub trait Translator {
    /// # Errors
    /// - Returns `Err(TranslateError)` when the backend cannot be reached or
    ///   rejects the request.
    fn translate_batch(
        &self,
        texts: &[String],
        target_locale: &str,
    ) -> impl Future<Output = Result<Vec<String>, TranslateError>> + Send;
}

/// What: Failures talking to a translation backend.
#[derive(Debug)]
pub enum TranslateError {
    /// Transport-level failure (DNS, TLS, timeout, body decoding).
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status {
        /// HTTP status code.
        code: u16,
        /// Short description of what the status means for this API.
        message: String,
    },
    /// Character quota exhausted.
    QuotaExceeded {
        /// Characters used so far.
        count: u64,
        /// Account limit.
        limit: u64,
    },
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "network error: {err}"),
            Self::Status { code, message } => write!(f, "HTTP {code}: {message}"),
            Self::QuotaExceeded { count: _, limit } => {
                write!(f, "reached maximum of {limit} characters")
            }
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Status { .. } | Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

/// What: Check that a DeepL client is usable before the pipeline starts.
///
/// Inputs:
/// - `client`: Configured DeepL client.
///
/// Output:
/// - `Ok(Usage)` when the key works and quota remains.
///
/// # Errors
/// - Returns `Err(TranslateError::QuotaExceeded)` when the character limit is reached.
/// - Returns the usage request's error when the key is rejected or the API is
///   unreachable.
pub async fn probe(client: &DeeplTranslator) -> Result<Usage, TranslateError> {
    let usage = client.usage().await?;
    if usage.any_limit_reached() {
        return Err(TranslateError::QuotaExceeded {
            count: usage.character_count.unwrap_or_default(),
            limit: usage.character_limit.unwrap_or_default(),
        });
    }
    Ok(usage)
}

/// What: Build and verify the DeepL translator for this run.
///
/// Inputs:
/// - `key`: `DEEPL_KEY`, if configured.
/// - `source_locale`: Locale the source strings are written in.
///
/// Output:
/// - `Some(DeeplTranslator)` when auto-translation can be used, `None` otherwise.
///
/// Details:
/// - Every failure is reported and disables auto-translation; none is fatal.
pub async fn connect_deepl(
    key: Option<&zeroize::Zeroizing<String>>,
    source_locale: &str,
) -> Option<DeeplTranslator> {
    let Some(key) = key else {
        tracing::warn!("auto-translation requested but DEEPL_KEY is not set");
        println!("Unable to use DeepL: DEEPL_KEY is not set");
        return None;
    };
    let client = match DeeplTranslator::new(key.clone()) {
        Ok(client) => client.with_source_locale(source_locale),
        Err(err) => {
            tracing::warn!(error = %err, "failed to build DeepL client");
            println!("Unable to use DeepL: {err}");
            return None;
        }
    };
    match probe(&client).await {
        Ok(usage) => {
            tracing::info!(
                used = ?usage.character_count,
                limit = ?usage.character_limit,
                "DeepL available"
            );
            match (usage.character_count, usage.character_limit) {
                (Some(count), Some(limit)) => {
                    println!("Using DeepL, used {count}/{limit} characters");
                }
                _ => println!("Using DeepL"),
            }
            Some(client)
        }
        Err(err @ TranslateError::QuotaExceeded { .. }) => {
            tracing::warn!(error = %err, "DeepL quota exhausted");
            println!("Unable to use DeepL, {err}");
            None
        }
        Err(err) => {
            tracing::warn!(error = %err, "DeepL unavailable");
            println!("Unable to use DeepL: {err}");
            None
        }
    }
}
