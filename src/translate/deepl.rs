//! DeepL REST client.
//!
//! Only the two endpoints the pipeline needs are covered: `/v2/usage` for the
//! startup quota check and `/v2/translate` for batches.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{TranslateError, Translator};

/// Endpoint for keys on the free plan (keys ending in `:fx`).
const FREE_API_URL: &str = "https://api-free.deepl.com";
/// Endpoint for paid keys.
const PRO_API_URL: &str = "https://api.deepl.com";
/// DeepL accepts at most 50 `text` items per request.
const MAX_TEXTS_PER_REQUEST: usize = 50;

/// Target codes DeepL accepts with a region or script suffix.
const REGIONAL_TARGETS: [&str; 7] = [
    "EN-GB", "EN-US", "ES-419", "PT-BR", "PT-PT", "ZH-HANS", "ZH-HANT",
];

/// Character usage reported by `/v2/usage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Usage {
    /// Characters translated in the current billing period.
    pub character_count: Option<u64>,
    /// Account limit for the period.
    pub character_limit: Option<u64>,
}

impl Usage {
    /// `true` when the character quota is used up.
    #[must_use]
    pub const fn any_limit_reached(&self) -> bool {
        match (self.character_count, self.character_limit) {
            (Some(count), Some(limit)) => limit > 0 && count >= limit,
            _ => false,
        }
    }
}

/// Body of `POST /v2/translate`.
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Source strings.
    text: &'a [String],
    /// DeepL target code.
    target_lang: &'a str,
    /// DeepL source code; omitted to let DeepL detect it.
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<&'a str>,
}

/// Body returned by `POST /v2/translate`.
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    /// One item per submitted text.
    translations: Vec<TranslatedText>,
}

/// Single translation item.
#[derive(Debug, Deserialize)]
struct TranslatedText {
    /// Translated string.
    text: String,
}

/// What: [`Translator`] backed by the DeepL API.
///
/// Details:
/// - The key is kept in a [`Zeroizing`] buffer and never logged.
/// - Requests use a 15s connect timeout and a 60s overall timeout.
pub struct DeeplTranslator {
    /// Shared HTTP client (connection pooling).
    client: reqwest::Client,
    /// API root without trailing slash.
    base_url: String,
    /// Authentication key.
    key: Zeroizing<String>,
    /// DeepL source language code, if fixed.
    source_lang: Option<String>,
}

impl std::fmt::Debug for DeeplTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeplTranslator")
            .field("base_url", &self.base_url)
            .field("source_lang", &self.source_lang)
            .finish_non_exhaustive()
    }
}

impl DeeplTranslator {
    /// What: Create a client for the endpoint matching the key's plan.
    ///
    /// # Errors
    /// - Returns `Err(TranslateError::Http)` when the HTTP client cannot be built.
    pub fn new(key: Zeroizing<String>) -> Result<Self, TranslateError> {
        let base_url = if key.trim_end().ends_with(":fx") {
            FREE_API_URL
        } else {
            PRO_API_URL
        };
        Self::with_base_url(key, base_url)
    }

    /// What: Create a client against an explicit API root.
    ///
    /// Inputs:
    /// - `key`: DeepL authentication key.
    /// - `base_url`: API root such as `https://api-free.deepl.com`.
    ///
    /// # Errors
    /// - Returns `Err(TranslateError::Http)` when the HTTP client cannot be built.
    pub fn with_base_url(key: Zeroizing<String>, base_url: &str) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("gen-localization/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            source_lang: None,
        })
    }

    /// Pin the source language instead of letting DeepL detect it.
    #[must_use]
    pub fn with_source_locale(mut self, locale: &str) -> Self {
        self.source_lang = Some(source_code(locale));
        self
    }

    /// API root this client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value of the `Authorization` header.
    fn auth_header(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("DeepL-Auth-Key {}", self.key.as_str()))
    }

    /// What: Query the account's character usage.
    ///
    /// # Errors
    /// - Returns `Err(TranslateError::Http)` on transport failure.
    /// - Returns `Err(TranslateError::Status)` on a non-success response (for
    ///   example an invalid key).
    pub async fn usage(&self) -> Result<Usage, TranslateError> {
        let response = self
            .client
            .get(format!("{}/v2/usage", self.base_url))
            .header(AUTHORIZATION, self.auth_header().as_str())
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.json::<Usage>().await?)
    }

    /// Send one request of at most [`MAX_TEXTS_PER_REQUEST`] texts.
    async fn translate_chunk(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Vec<String>, TranslateError> {
        let body = TranslateRequest {
            text: texts,
            target_lang,
            source_lang: self.source_lang.as_deref(),
        };
        let response = self
            .client
            .post(format!("{}/v2/translate", self.base_url))
            .header(AUTHORIZATION, self.auth_header().as_str())
            .json(&body)
            .send()
            .await?;
        let response = check_status(response)?;
        let parsed = response.json::<TranslateResponse>().await?;
        Ok(parsed.translations.into_iter().map(|t| t.text).collect())
    }
}

impl Translator for DeeplTranslator {
    async fn translate_batch(
        &self,
        texts: &[String],
        target_locale: &str,
    ) -> Result<Vec<String>, TranslateError> {
        let target_lang = target_code(target_locale);
        let mut translations = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_TEXTS_PER_REQUEST) {
            tracing::debug!(
                target_lang = %target_lang,
                count = chunk.len(),
                "sending DeepL translate request"
            );
            translations.extend(self.translate_chunk(chunk, &target_lang).await?);
        }
        Ok(translations)
    }
}

/// What: Map a non-success status to a descriptive error.
///
/// Details:
/// - 403 means a bad key, 456 an exhausted quota, 429 rate limiting.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TranslateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match status {
        StatusCode::FORBIDDEN => "authorization failed, check DEEPL_KEY".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "too many requests, rate limited by server".to_string(),
        StatusCode::PAYLOAD_TOO_LARGE => "request too large".to_string(),
        s if s.as_u16() == 456 => "quota exceeded".to_string(),
        s => s
            .canonical_reason()
            .map_or_else(|| "unexpected response".to_string(), ToString::to_string),
    };
    Err(TranslateError::Status {
        code: status.as_u16(),
        message,
    })
}

/// Split a locale such as `pt_BR.UTF-8@euro` into upper-cased language and region.
fn split_locale(locale: &str) -> (String, Option<String>) {
    let base = locale
        .split(['.', '@'])
        .next()
        .unwrap_or(locale)
        .trim();
    let mut parts = base.split(['_', '-']);
    let language = parts.next().unwrap_or_default().to_ascii_uppercase();
    let region = parts
        .next()
        .filter(|r| !r.is_empty())
        .map(str::to_ascii_uppercase);
    (language, region)
}

/// What: Convert a catalog locale into a DeepL target language code.
///
/// Inputs:
/// - `locale`: Locale such as `de`, `pt_BR`, `zh_TW` or `en`.
///
/// Output:
/// - DeepL code such as `DE`, `PT-BR`, `ZH-HANT` or `EN-US`.
///
/// Details:
/// - Regional variants are kept only where DeepL distinguishes them.
/// - Bare `en` and `pt` map to `EN-US` and `PT-PT`, since DeepL rejects the
///   bare codes as targets.
#[must_use]
pub fn target_code(locale: &str) -> String {
    let (language, region) = split_locale(locale);
    let regional = region.map(|region| {
        let region = match (language.as_str(), region.as_str()) {
            ("ZH", "CN" | "SG" | "HANS") => "HANS".to_string(),
            ("ZH", "TW" | "HK" | "MO" | "HANT") => "HANT".to_string(),
            _ => region,
        };
        format!("{language}-{region}")
    });
    if let Some(code) = regional
        && REGIONAL_TARGETS.contains(&code.as_str())
    {
        return code;
    }
    match language.as_str() {
        "EN" => "EN-US".to_string(),
        "PT" => "PT-PT".to_string(),
        _ => language,
    }
}

/// DeepL source codes never carry a region.
fn source_code(locale: &str) -> String {
    split_locale(locale).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Catalog locales map onto DeepL target codes.
    fn maps_target_codes() {
        assert_eq!(target_code("de"), "DE");
        assert_eq!(target_code("ru"), "RU");
        assert_eq!(target_code("de_DE.UTF-8"), "DE");
        assert_eq!(target_code("pt_BR"), "PT-BR");
        assert_eq!(target_code("pt"), "PT-PT");
        assert_eq!(target_code("en"), "EN-US");
        assert_eq!(target_code("en_GB"), "EN-GB");
        assert_eq!(target_code("zh_CN"), "ZH-HANS");
        assert_eq!(target_code("zh-TW"), "ZH-HANT");
        assert_eq!(target_code("zh"), "ZH");
        assert_eq!(target_code("es_419"), "ES-419");
        assert_eq!(target_code("sr@latin"), "SR");
    }

    #[test]
    /// What: Source codes drop the region.
    fn maps_source_codes() {
        assert_eq!(source_code("en"), "EN");
        assert_eq!(source_code("en_US"), "EN");
    }

    #[test]
    /// What: Free-plan keys use the free endpoint.
    fn picks_endpoint_from_key() {
        let free = DeeplTranslator::new(Zeroizing::new("abc:fx".to_string())).expect("client");
        assert_eq!(free.base_url(), FREE_API_URL);
        let pro = DeeplTranslator::new(Zeroizing::new("abc".to_string())).expect("client");
        assert_eq!(pro.base_url(), PRO_API_URL);
        let custom = DeeplTranslator::with_base_url(
            Zeroizing::new("abc".to_string()),
            "http://127.0.0.1:9/",
        )
        .expect("client");
        assert_eq!(custom.base_url(), "http://127.0.0.1:9");
    }

    #[test]
    /// What: The key never shows up in debug output.
    fn debug_hides_key() {
        let client = DeeplTranslator::new(Zeroizing::new("secret:fx".to_string())).expect("client");
        assert!(!format!("{client:?}").contains("secret"));
    }

    #[test]
    /// What: Quota detection only triggers with both numbers present.
    fn usage_limit_detection() {
        let usage: Usage =
            serde_json::from_str(r#"{"character_count":500000,"character_limit":500000}"#)
                .expect("usage");
        assert!(usage.any_limit_reached());
        let usage: Usage =
            serde_json::from_str(r#"{"character_count":10,"character_limit":500000}"#)
                .expect("usage");
        assert!(!usage.any_limit_reached());
        let usage: Usage = serde_json::from_str("{}").expect("usage");
        assert!(!usage.any_limit_reached());
    }

    #[test]
    /// What: Request bodies match the DeepL wire shape.
    fn request_body_shape() {
        let texts = vec!["Hello".to_string(), "Bye".to_string()];
        let body = TranslateRequest {
            text: &texts,
            target_lang: "DE",
            source_lang: None,
        };
        let json = serde_json::to_value(&body).expect("json");
        assert_eq!(
            json,
            serde_json::json!({"text": ["Hello", "Bye"], "target_lang": "DE"})
        );
        let parsed: TranslateResponse = serde_json::from_str(
            r#"{"translations":[{"detected_source_language":"EN","text":"Hallo"}]}"#,
        )
        .expect("response");
        assert_eq!(parsed.translations[0].text, "Hallo");
    }
}
