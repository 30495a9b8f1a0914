//! HTTP server for the scorecard API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/health`             | Health check                             |
//! | POST   | `/api/upload`         | Upload a workbook (multipart `file`)     |
//! | GET    | `/api/records`        | Current canonical records                |
//! | DELETE | `/api/records`        | Forget current records and stored copy   |
//! | GET    | `/api/dashboard`      | Every view (`metric`, `school`)          |
//! | GET    | `/api/quartile-gap`   | Quartile gap (`metric`, `school`, `quartile`) |
//! | GET    | `/api/logs`           | SSE stream for real-time logs            |
//!
//! The current record collection lives in [`AppState`]. An upload replaces
//! it wholesale; readers clone the inner `Arc` and compute views without
//! holding the lock.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::logs::{log_info, log_success, log_warning, LOG_BROADCASTER};
use super::types::{error_response, DashboardParams, QuartileGapParams, UploadResponse};
use crate::aggregate::{filter_by_school, quartile_gap, Dashboard, QuartileGap};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::models::Record;
use crate::store::SessionStore;
use crate::transform::normalizer::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
use crate::transform::pipeline::ingest_bytes;

const NO_DATA: &str = "No data loaded. Upload a workbook first.";

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    records: Arc<RwLock<Option<Arc<Vec<Record>>>>>,
    store: SessionStore,
}

impl AppState {
    pub fn new(store: SessionStore) -> Self {
        Self {
            records: Arc::new(RwLock::new(None)),
            store,
        }
    }

    /// Start from whatever the session store holds.
    pub fn restore(store: SessionStore) -> Self {
        let records = match store.load() {
            Ok(Some(records)) => {
                log_success(format!("Restored {} records from {}", records.len(), store.path().display()));
                Some(Arc::new(records))
            }
            Ok(None) => None,
            Err(e) => {
                log_warning(format!("Ignoring stored records: {}", e));
                None
            }
        };
        Self {
            records: Arc::new(RwLock::new(records)),
            store,
        }
    }

    pub async fn current(&self) -> Option<Arc<Vec<Record>>> {
        self.records.read().await.clone()
    }

    /// Current records, or `NotFound` when nothing is loaded.
    pub async fn require(&self) -> ServerResult<Arc<Vec<Record>>> {
        self.current()
            .await
            .ok_or_else(|| ServerError::NotFound(NO_DATA.to_string()))
    }

    /// Save `records` and make them current under one write lock, so the
    /// stored copy always matches what readers see. A failed save still
    /// swaps the records in and reports `false`.
    pub async fn replace_and_persist(&self, records: Vec<Record>) -> bool {
        let mut current = self.records.write().await;
        let persisted = match self.store.save(&records) {
            Ok(path) => {
                log_info(format!("💾 Saved to {}", path.display()));
                true
            }
            Err(e) => {
                log_warning(format!("Could not persist records: {}", e));
                false
            }
        };
        *current = Some(Arc::new(records));
        persisted
    }

    /// Drop current records and the stored copy.
    pub async fn clear(&self) -> ServerResult<bool> {
        let mut current = self.records.write().await;
        *current = None;
        Ok(self.store.clear()?)
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Ingest(e) if e.kind() == "io" => StatusCode::BAD_REQUEST,
            Self::Ingest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let body = error_response(self.kind(), &self.to_string());
        (self.status_code(), Json(body)).into_response()
    }
}

/// Build the router. Exposed separately from [`start_server`] for embedding.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/upload", post(upload_workbook))
        .route("/api/records", get(get_records).delete(delete_records))
        .route("/api/dashboard", get(dashboard))
        .route("/api/quartile-gap", get(quartile_gap_series))
        .route("/api/logs", get(sse_logs));

    // Layers only wrap what is registered before them
    let app = match &config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(health)),
    };

    app.layer(DefaultBodyLimit::max(config.max_upload_bytes()))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::restore(SessionStore::with_dir(&config.data_dir));
    let app = router(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 Scorecard server running on http://localhost:{}", config.port);
    println!("   POST   /api/upload       - Upload workbook");
    println!("   GET    /api/records      - Current records");
    println!("   DELETE /api/records      - Clear records");
    println!("   GET    /api/dashboard    - Dashboard views");
    println!("   GET    /api/quartile-gap - Quartile gap series");
    println!("   GET    /api/logs         - SSE log stream");
    println!("   GET    /health           - Health check");
    if let Some(dir) = &config.static_dir {
        println!("   Static files from {}", dir.display());
    }
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "scorecard",
        "version": env!("CARGO_PKG_VERSION"),
        "sheet": crate::parser::RAW_TABLE_SHEET,
        "requiredColumns": REQUIRED_COLUMNS,
        "optionalColumns": OPTIONAL_COLUMNS,
        "endpoints": {
            "upload": "POST /api/upload",
            "records": "GET|DELETE /api/records",
            "dashboard": "GET /api/dashboard",
            "quartileGap": "GET /api/quartile-gap",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn upload_workbook(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(String::from);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    );
    println!("{}\n", "=".repeat(70));

    let ingested = ingest_bytes(bytes)?;
    let mut response = UploadResponse::new(&ingested, file_name, false);
    response.persisted = state.replace_and_persist(ingested.records).await;
    Ok(Json(response))
}

async fn get_records(State(state): State<AppState>) -> ServerResult<Json<Vec<Record>>> {
    let records = state.require().await?;
    Ok(Json(records.to_vec()))
}

async fn delete_records(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    let removed = state.clear().await?;
    log_info("🗑️  Records cleared");
    Ok(Json(json!({ "status": "ok", "removed": removed })))
}

async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> ServerResult<Json<Dashboard>> {
    let query = params.into_query().map_err(ServerError::BadRequest)?;
    let records = state.require().await?;
    Ok(Json(Dashboard::build(&records, &query)))
}

async fn quartile_gap_series(
    State(state): State<AppState>,
    Query(params): Query<QuartileGapParams>,
) -> ServerResult<Json<QuartileGap>> {
    let (query, quartile) = params.into_parts().map_err(ServerError::BadRequest)?;
    let records = state.require().await?;
    let filtered = filter_by_school(&records, query.school_filter());
    Ok(Json(quartile_gap(&filtered, quartile, query.metric)))
}
