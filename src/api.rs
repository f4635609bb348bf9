//! HTTP surface for PromptGuard
//!
//! A thin axum router over the pipeline and the envelope cipher, for
//! dashboard, extension and desktop callers.
//!
//! ## Endpoint Map
//!
//! | Route                             | Description                          |
//! |-----------------------------------|--------------------------------------|
//! | `GET  /health`                    | Health probe                         |
//! | `GET  /api/v1/catalog`            | Detector catalog, in precedence order |
//! | `POST /api/v1/analyze`            | Full analysis of one prompt          |
//! | `POST /api/v1/redact`             | Redacted prompt and events only      |
//! | `POST /api/v1/optimize`           | Optimized prompt and suggestions     |
//! | `POST /api/v1/prompts/store`      | Encrypt a prompt for storage         |
//! | `POST /api/v1/prompts/retrieve`   | Decrypt a stored prompt              |
//! | `POST /api/v1/prompts/preview`    | Truncated decrypted preview          |

use crate::crypto::EnvelopeCipher;
use crate::pipeline::Pipeline;
use crate::redact::RedactionEvent;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<Pipeline>,
    pub cipher: Arc<EnvelopeCipher>,
    pub preview_len: usize,
}

/// Build the complete HTTP application with tracing and CORS layers
pub fn build_app(state: ApiState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(api_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(cors_origins))
}

/// Create the `/api/v1` router
pub fn api_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/catalog", get(list_catalog))
        .route("/api/v1/analyze", post(analyze))
        .route("/api/v1/redact", post(redact))
        .route("/api/v1/optimize", post(optimize))
        .route("/api/v1/prompts/store", post(store_prompt))
        .route("/api/v1/prompts/retrieve", post(retrieve_prompt))
        .route("/api/v1/prompts/preview", post(preview_prompt))
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// Request body carrying a raw prompt. A missing or null prompt is empty.
#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl PromptRequest {
    fn text(&self) -> &str {
        self.prompt.as_deref().unwrap_or_default()
    }
}

/// Request body carrying a stored blob
#[derive(Debug, Deserialize)]
pub struct BlobRequest {
    #[serde(default)]
    pub encrypted: String,
    /// Preview length override
    #[serde(default)]
    pub max_len: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RedactResponse {
    pub redacted_prompt: String,
    pub events: Vec<RedactionEvent>,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub optimized_prompt: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub encrypted: String,
    pub stored_at: DateTime<Utc>,
}

/// Decrypt outcome: `ok` with the prompt, or `unavailable`
#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview: String,
}

/// Catalog entry as listed by `GET /api/v1/catalog`
#[derive(Debug, Serialize)]
pub struct DetectorInfo {
    pub name: String,
    pub category: String,
    pub severity: String,
    pub rank: u16,
    pub description: String,
}

/// API error body
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: "INTERNAL_ERROR".to_string(),
                message: message.into(),
            },
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/v1/catalog
async fn list_catalog(State(state): State<ApiState>) -> impl IntoResponse {
    let detectors: Vec<DetectorInfo> = state
        .pipeline
        .catalog()
        .detectors()
        .iter()
        .map(|d| DetectorInfo {
            name: d.name().to_string(),
            category: d.category().to_string(),
            severity: d.severity().to_string(),
            rank: d.rank(),
            description: d.description().to_string(),
        })
        .collect();
    Json(detectors)
}

/// POST /api/v1/analyze
async fn analyze(
    State(state): State<ApiState>,
    Json(request): Json<PromptRequest>,
) -> impl IntoResponse {
    Json(state.pipeline.analyze(request.text()))
}

/// POST /api/v1/redact
async fn redact(
    State(state): State<ApiState>,
    Json(request): Json<PromptRequest>,
) -> impl IntoResponse {
    let redaction = state.pipeline.redact(request.text());
    Json(RedactResponse {
        redacted_prompt: redaction.text,
        events: redaction.events,
    })
}

/// POST /api/v1/optimize
async fn optimize(
    State(state): State<ApiState>,
    Json(request): Json<PromptRequest>,
) -> impl IntoResponse {
    let text = request.text();
    Json(OptimizeResponse {
        optimized_prompt: state.pipeline.optimize(text),
        suggestions: state.pipeline.optimizer().suggestions(text),
    })
}

/// POST /api/v1/prompts/store
async fn store_prompt(
    State(state): State<ApiState>,
    Json(request): Json<PromptRequest>,
) -> Response {
    match state.cipher.encrypt(request.text()) {
        Ok(encrypted) => Json(StoreResponse {
            encrypted,
            stored_at: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encrypt prompt");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::internal("Encryption failed")),
            )
                .into_response()
        }
    }
}

/// POST /api/v1/prompts/retrieve
async fn retrieve_prompt(
    State(state): State<ApiState>,
    Json(request): Json<BlobRequest>,
) -> impl IntoResponse {
    let response = match state.cipher.decrypt(&request.encrypted) {
        Ok(prompt) => RetrieveResponse {
            status: "ok",
            prompt: Some(prompt),
        },
        Err(_) => RetrieveResponse {
            status: "unavailable",
            prompt: None,
        },
    };
    Json(response)
}

/// POST /api/v1/prompts/preview
async fn preview_prompt(
    State(state): State<ApiState>,
    Json(request): Json<BlobRequest>,
) -> impl IntoResponse {
    let max_len = request.max_len.unwrap_or(state.preview_len);
    Json(PreviewResponse {
        preview: state.cipher.preview(&request.encrypted, max_len),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptGuardConfig;
    use crate::crypto::{EncryptionKey, PREVIEW_UNAVAILABLE};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn make_state() -> ApiState {
        let config = PromptGuardConfig::default();
        ApiState {
            pipeline: Arc::new(Pipeline::new(&config).unwrap()),
            cipher: Arc::new(EnvelopeCipher::new(&EncryptionKey::generate())),
            preview_len: config.server.preview_len,
        }
    }

    fn make_app() -> Router {
        build_app(make_state(), &[])
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let resp = make_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_catalog_in_rank_order() {
        let resp = make_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/catalog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let detectors = json.as_array().unwrap();
        assert_eq!(detectors[0]["name"], "api_key");
        let ranks: Vec<u64> = detectors
            .iter()
            .map(|d| d["rank"].as_u64().unwrap())
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_analyze_scenario() {
        let resp = post_json(
            make_app(),
            "/api/v1/analyze",
            serde_json::json!({"prompt": "Email me at john@company.com, SSN 123-45-6789"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["risk_level"], "critical");
        assert_eq!(json["pii_detected"], serde_json::json!(["email", "ssn"]));
        let redacted = json["redacted_prompt"].as_str().unwrap();
        assert!(redacted.contains("[REDACTED_EMAIL]"));
        assert!(redacted.contains("[REDACTED_SSN]"));
        assert!(!json.to_string().contains("john@company.com"));
    }

    #[tokio::test]
    async fn test_analyze_null_prompt_is_empty() {
        let resp = post_json(make_app(), "/api/v1/analyze", serde_json::json!({"prompt": null})).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["risk_level"], "low");
        assert_eq!(json["pii_detected"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_redact_endpoint() {
        let resp = post_json(
            make_app(),
            "/api/v1/redact",
            serde_json::json!({"prompt": "call 555-867-5309"}),
        )
        .await;
        let json = body_json(resp).await;
        assert_eq!(json["redacted_prompt"], "call [REDACTED_PHONE]");
        assert_eq!(json["events"][0]["category"], "phone");
        assert_eq!(json["events"][0]["start"], 5);
    }

    #[tokio::test]
    async fn test_optimize_endpoint() {
        let resp = post_json(
            make_app(),
            "/api/v1/optimize",
            serde_json::json!({"prompt": "please fix this thing"}),
        )
        .await;
        let json = body_json(resp).await;
        let optimized = json["optimized_prompt"].as_str().unwrap();
        assert!(!optimized.to_lowercase().contains("please"));
        assert!(!json["suggestions"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let state = make_state();

        let resp = post_json(
            build_app(state.clone(), &[]),
            "/api/v1/prompts/store",
            serde_json::json!({"prompt": "draft the merger memo"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert!(json["stored_at"].is_string());
        let encrypted = json["encrypted"].as_str().unwrap().to_string();
        assert_ne!(encrypted, "draft the merger memo");

        let resp = post_json(
            build_app(state.clone(), &[]),
            "/api/v1/prompts/retrieve",
            serde_json::json!({"encrypted": encrypted}),
        )
        .await;
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["prompt"], "draft the merger memo");

        let resp = post_json(
            build_app(state, &[]),
            "/api/v1/prompts/preview",
            serde_json::json!({"encrypted": encrypted, "max_len": 5}),
        )
        .await;
        assert_eq!(body_json(resp).await["preview"], "draft...");
    }

    #[tokio::test]
    async fn test_retrieve_tampered_is_unavailable() {
        let resp = post_json(
            make_app(),
            "/api/v1/prompts/retrieve",
            serde_json::json!({"encrypted": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "unavailable");
        assert!(json.get("prompt").is_none());
    }

    #[tokio::test]
    async fn test_preview_garbage_is_placeholder() {
        let resp = post_json(
            make_app(),
            "/api/v1/prompts/preview",
            serde_json::json!({"encrypted": "not a blob"}),
        )
        .await;
        assert_eq!(body_json(resp).await["preview"], PREVIEW_UNAVAILABLE);
    }

    async fn preflight(app: Router, origin: &str) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/analyze")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let origins = [
            "http://localhost:3000".to_string(),
            "https://dashboard.example.com".to_string(),
        ];
        let resp = preflight(
            build_app(make_state(), &origins),
            "https://dashboard.example.com",
        )
        .await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://dashboard.example.com"
        );

        let resp = preflight(build_app(make_state(), &origins), "https://evil.example.net").await;
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_cors_any_origin_by_default() {
        let resp = preflight(make_app(), "https://anywhere.example.org").await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }
}
