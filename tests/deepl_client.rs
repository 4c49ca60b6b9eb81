//! Integration tests for the DeepL client against a local axum stand-in.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use zeroize::Zeroizing;

use gen_localization::translate::{DeeplTranslator, TranslateError, Translator, probe};

/// A request as seen by the stand-in server.
#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    authorization: Option<String>,
    body: Value,
}

/// How the stand-in answers.
#[derive(Clone, Copy)]
enum Mode {
    /// Echo translations and report usage with the given numbers.
    Healthy { count: u64, limit: u64 },
    /// Reject everything with 403.
    Forbidden,
}

#[derive(Clone)]
struct Stub {
    mode: Mode,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Stub {
    fn record(&self, method: &Method, uri: &Uri, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let Ok(mut seen) = self.seen.lock() else {
            return;
        };
        seen.push(Seen {
            method: method.to_string(),
            path: uri.path().to_string(),
            authorization,
            body,
        });
    }
}

fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, axum::Json(json!({"message": "Forbidden"}))).into_response()
}

async fn usage(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    stub.record(&method, &uri, &headers, Value::Null);
    match stub.mode {
        Mode::Forbidden => forbidden(),
        Mode::Healthy { count, limit } => axum::Json(json!({
            "character_count": count,
            "character_limit": limit,
        }))
        .into_response(),
    }
}

async fn translate(
    State(stub): State<Stub>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    stub.record(&method, &uri, &headers, body.clone());
    if matches!(stub.mode, Mode::Forbidden) {
        return forbidden();
    }
    let target = body["target_lang"].as_str().unwrap_or_default();
    let translations: Vec<Value> = body["text"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|t| {
            json!({
                "detected_source_language": "EN",
                "text": format!("{target}:{}", t.as_str().unwrap_or_default()),
            })
        })
        .collect();
    axum::Json(json!({ "translations": translations })).into_response()
}

/// Start the stand-in server; returns its base URL and the request log.
async fn serve(mode: Mode) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        mode,
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/v2/usage", get(usage))
        .route("/v2/translate", post(translate))
        .with_state(stub);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), seen)
}

fn client(base_url: &str) -> DeeplTranslator {
    DeeplTranslator::with_base_url(Zeroizing::new("test-key:fx".to_string()), base_url)
        .expect("client")
        .with_source_locale("en")
}

#[tokio::test]
/// What: Usage is read with the DeepL auth header.
async fn usage_reports_character_counts() {
    let (url, seen) = serve(Mode::Healthy {
        count: 42,
        limit: 500_000,
    })
    .await;

    let usage = probe(&client(&url)).await.expect("usage");
    assert_eq!(usage.character_count, Some(42));
    assert_eq!(usage.character_limit, Some(500_000));

    let seen = seen.lock().expect("poisoned log").clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].path, "/v2/usage");
    assert_eq!(
        seen[0].authorization.as_deref(),
        Some("DeepL-Auth-Key test-key:fx")
    );
}

#[tokio::test]
/// What: An exhausted quota disables the translator at probe time.
async fn exhausted_quota_is_rejected() {
    let (url, _) = serve(Mode::Healthy {
        count: 500_000,
        limit: 500_000,
    })
    .await;

    let err = probe(&client(&url)).await.expect_err("should fail");
    assert!(matches!(
        err,
        TranslateError::QuotaExceeded {
            limit: 500_000,
            ..
        }
    ));
}

#[tokio::test]
/// What: A rejected key surfaces as a 403 status error.
async fn forbidden_key_is_reported() {
    let (url, _) = serve(Mode::Forbidden).await;

    let err = probe(&client(&url)).await.expect_err("should fail");
    assert!(matches!(err, TranslateError::Status { code: 403, .. }));

    let err = client(&url)
        .translate_batch(&["Hello".to_string()], "de")
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("DEEPL_KEY"));
}

#[tokio::test]
/// What: Large batches are split into requests of 50 and reassembled in order.
async fn large_batches_are_chunked_in_order() {
    let (url, seen) = serve(Mode::Healthy { count: 0, limit: 1 }).await;
    let texts: Vec<String> = (0..60).map(|i| format!("text {i}")).collect();

    let translations = client(&url)
        .translate_batch(&texts, "pt_BR")
        .await
        .expect("translations");

    assert_eq!(translations.len(), 60);
    assert_eq!(translations[0], "PT-BR:text 0");
    assert_eq!(translations[59], "PT-BR:text 59");

    let seen = seen.lock().expect("poisoned log").clone();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|s| s.method == "POST" && s.path == "/v2/translate"));
    assert_eq!(seen[0].body["text"].as_array().map(Vec::len), Some(50));
    assert_eq!(seen[1].body["text"].as_array().map(Vec::len), Some(10));
    assert_eq!(seen[0].body["target_lang"], "PT-BR");
    assert_eq!(seen[0].body["source_lang"], "EN");
}

#[tokio::test]
/// What: An empty batch makes no request at all.
async fn empty_batch_sends_nothing() {
    let (url, seen) = serve(Mode::Healthy { count: 0, limit: 1 }).await;

    let translations = client(&url)
        .translate_batch(&[], "de")
        .await
        .expect("translations");

    assert!(translations.is_empty());
    assert!(seen.lock().expect("poisoned log").is_empty());
}
