//! HTTP 서버 모듈 - 감사 API와 HTML 셸
//!
//! - `GET /` : HTML 셸 (로고 URL은 설정에서 주입)
//! - `GET /health` : 상태 확인
//! - `POST /api/extract` : `{"url"}` → 리포트
//! - `POST /api/export` : `{"headings": [...]}` → CSV 첨부파일
//!
//! 요청 처리 중 실패는 모두 `400 {"error": ...}`로 변환되며 서비스를 종료시키지 않습니다.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::export::{self, ExportError, RawHeadingRecord, EXPORT_FILENAME};
use crate::report::{Report, ReportError, ReportService};

const INDEX_TEMPLATE: &str = include_str!("index.html");

// ============================================================================
// State
// ============================================================================

/// 핸들러 공유 상태 (불변)
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let reports = ReportService::from_config(&config).context("ReportService 생성 실패")?;
        Ok(Self {
            config: Arc::new(config),
            reports: Arc::new(reports),
        })
    }
}

// ============================================================================
// Request / Error types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub headings: Vec<RawHeadingRecord>,
}

/// `400 {"error": message}` 응답
#[derive(Debug)]
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.0 }))).into_response()
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        Self(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

// ============================================================================
// Router
// ============================================================================

/// 라우터 구성
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/extract", post(extract))
        .route("/api/export", post(export_csv))
        .layer(cors)
        .with_state(state)
}

/// 서버 실행 (Ctrl+C로 종료)
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = SocketAddr::new(config.host, config.port);
    let state = AppState::new(config)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} 바인딩 실패"))?;
    tracing::info!("Audit server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 서버 오류")?;

    tracing::info!("Audit server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config.logo_url))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn extract(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExtractRequest>, JsonRejection>,
) -> std::result::Result<Json<Report>, ApiError> {
    let Json(request) = payload?;
    tracing::info!("Audit requested: {}", request.url);

    // 예상치 못한 패닉도 요청 경계에서 400으로 변환
    let reports = Arc::clone(&state.reports);
    let report = tokio::spawn(async move { reports.build_report(&request.url).await })
        .await
        .map_err(|e| ApiError::from(ReportError::Internal(format!("task panicked: {e}"))))??;

    Ok(Json(report))
}

async fn export_csv(
    payload: std::result::Result<Json<ExportRequest>, JsonRejection>,
) -> std::result::Result<Response, ApiError> {
    let Json(request) = payload?;
    let records = export::into_records(request.headings)?;
    let bytes = export::encode_csv(&records)?;
    tracing::info!("Exported {} heading records", records.len());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// HTML 셸 렌더링
pub fn render_index(logo_url: &str) -> String {
    let escaped = logo_url
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    INDEX_TEMPLATE.replace("{{ logo_url }}", &escaped)
}
