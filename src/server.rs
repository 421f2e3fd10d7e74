//! HTTP surface: one download route per document kind.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::documents::{self, DocumentKind, GeneratorOptions};
use crate::error::ApiError;
use crate::model::ShipmentDocument;
use crate::signature::{self, SignatureAsset};

#[derive(Clone)]
pub struct AppState {
    pub options: GeneratorOptions,
    /// Filled in by the startup prefetch; `None` until then or on failure.
    pub signature: Arc<RwLock<Option<SignatureAsset>>>,
}

impl AppState {
    pub fn new(options: GeneratorOptions) -> Self {
        AppState {
            options,
            signature: Arc::new(RwLock::new(None)),
        }
    }

    /// Load the signature in the background. Requests served before it
    /// completes use the text fallback.
    pub fn prefetch_signature(&self, source: String) -> tokio::task::JoinHandle<()> {
        let slot = self.signature.clone();
        tokio::spawn(async move {
            match signature::load(&source).await {
                Ok(asset) => {
                    info!(%source, "signature image loaded");
                    *slot.write().await = Some(asset);
                }
                Err(e) => warn!(%source, error = %e, "signature unavailable, using text fallback"),
            }
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub shipment: ShipmentDocument,
    /// Data URL or bare base64; overrides the configured signature.
    #[serde(default)]
    pub signature: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/shipments/documents/:kind", post(render_document))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// `attachment` disposition with both a plain and an RFC 5987 file name.
fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}

async fn render_document(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<RenderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = DocumentKind::from_slug(&kind).ok_or(ApiError::UnknownKind(kind))?;

    let signature = match request.signature.as_deref() {
        Some(data) if !data.trim().is_empty() => signature::decode_or_warn(data),
        _ => state.signature.read().await.clone(),
    };

    let file = documents::render(kind, &request.shipment, &state.options, signature.as_ref())?;
    info!(file = %file.file_name, bytes = file.bytes.len(), "document rendered");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file.file_name)),
        ],
        file.bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{sample_json, signature_png};
    use axum::body::Body;
    use axum::http::Request;
    use base64::Engine;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        router(AppState::new(GeneratorOptions::default()))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("SM-1_Combined.pdf"),
            "attachment; filename=\"SM-1_Combined.pdf\"; filename*=UTF-8''SM-1_Combined.pdf"
        );
        assert_eq!(
            content_disposition("수출_Packing_List.pdf"),
            "attachment; filename=\"___Packing_List.pdf\"; \
             filename*=UTF-8''%EC%88%98%EC%B6%9C_Packing_List.pdf"
        );
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_render_combined() {
        let req = post_json(
            "/api/shipments/documents/combined",
            json!({ "shipment": sample_json() }),
        );
        let response = app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "application/pdf");
        let disposition = response.headers()["content-disposition"].to_str().unwrap();
        assert!(disposition.contains("filename=\"SM-2024-0315_Combined.pdf\""));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let pdf = lopdf::Document::load_mem(&body).unwrap();
        assert_eq!(pdf.get_pages().len(), 2);
    }

    #[tokio::test]
    async fn test_request_signature_is_used() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(signature_png());
        let req = post_json(
            "/api/shipments/documents/packing-list",
            json!({
                "shipment": sample_json(),
                "signature": format!("data:image/png;base64,{encoded}"),
            }),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bad_signature_falls_back() {
        let req = post_json(
            "/api/shipments/documents/commercial-invoice",
            json!({ "shipment": sample_json(), "signature": "data:image/png;base64,AAAA" }),
        );
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let req = post_json(
            "/api/shipments/documents/proforma",
            json!({ "shipment": sample_json() }),
        );
        let response = app().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], 404);
        assert_eq!(value["error"], "Unknown document kind: proforma");
    }

    #[tokio::test]
    async fn test_prefetch_failure_leaves_fallback() {
        let state = AppState::new(GeneratorOptions::default());
        state
            .prefetch_signature("/nonexistent/signature.png".to_string())
            .await
            .unwrap();
        assert!(state.signature.read().await.is_none());
    }
}
