// SWIFT Codes REST API (axum)
//
// Thin transport over the registry operations. Handlers turn extractor
// rejections into validation errors, take the connection lock for one
// operation, and map error kinds to status codes.

use crate::config::Config;
use crate::entities::{CountryListing, NewSwiftCode, SwiftCodeView};
use crate::error::{IngestError, RegistryError};
use crate::import::import_file;
use crate::registry::{self, Page};
use crate::schema::{self, DEFAULT_PAGE_LIMIT};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    config: Arc<Config>,
}

impl AppState {
    pub fn new(conn: Connection, config: Config) -> Self {
        AppState {
            db: Arc::new(Mutex::new(conn)),
            config: Arc::new(config),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".to_string()))
    }
}

/// Simple status/success message body
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Message {
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    skip: Option<i64>,
    limit: Option<i64>,
}

impl From<PageParams> for Page {
    fn from(params: PageParams) -> Self {
        Page {
            skip: params.skip.unwrap_or(0),
            limit: params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    Ingest(IngestError),
    Internal(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        ApiError::Ingest(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Registry(err) => {
                let status = match &err {
                    RegistryError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                    RegistryError::Conflict(_) => StatusCode::CONFLICT,
                    RegistryError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::Ingest(err) => match err {
                IngestError::FileNotFound(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                IngestError::UnsupportedFormat(_)
                | IngestError::MissingColumns(_)
                | IngestError::Read(_) => (
                    StatusCode::BAD_REQUEST,
                    format!("Error processing file structure or content: {err}"),
                ),
            },
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

fn invalid(err: schema::ValidationError) -> ApiError {
    ApiError::Registry(RegistryError::Validation(vec![err]))
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET / - Welcome message
async fn root() -> impl IntoResponse {
    Message::new("Welcome to the SWIFT Codes API.")
}

/// GET /health - Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /v1/swift-codes/:swift_code - One code; HQ responses embed branches
async fn get_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Json<SwiftCodeView>, ApiError> {
    let conn = state.conn()?;
    let view = registry::get_swift_code(&*conn, &swift_code)?;
    Ok(Json(view))
}

/// GET /v1/swift-codes/country/:country_iso2 - Paginated country listing
async fn get_country(
    State(state): State<AppState>,
    Path(country_iso2): Path<String>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<CountryListing>, ApiError> {
    let Query(params) = params.map_err(|rejection| {
        invalid(schema::ValidationError::new("query", &rejection.body_text()))
    })?;

    let conn = state.conn()?;
    let listing = registry::list_country(&*conn, &country_iso2, params.into())?;
    Ok(Json(listing))
}

/// POST /v1/swift-codes - Create a record
async fn create_swift_code(
    State(state): State<AppState>,
    body: Result<Json<NewSwiftCode>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = body.map_err(|rejection| {
        invalid(schema::ValidationError::new("body", &rejection.body_text()))
    })?;

    let conn = state.conn()?;
    let created = registry::create_swift_code(&*conn, input)?;

    Ok((
        StatusCode::CREATED,
        Message::new(format!(
            "SWIFT code '{}' created successfully.",
            created.swift_code
        )),
    ))
}

/// DELETE /v1/swift-codes/:swift_code - Remove a record
async fn delete_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Json<Message>, ApiError> {
    let conn = state.conn()?;
    let deleted = registry::delete_swift_code(&*conn, &swift_code)?;

    Ok(Message::new(format!(
        "SWIFT code '{}' deleted successfully.",
        deleted.swift_code
    )))
}

/// POST /v1/load-data - Bulk import from the configured spreadsheet
async fn load_data(State(state): State<AppState>) -> Result<Json<Message>, ApiError> {
    let data_path = state.config.data_path.clone();

    let summary = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let conn = state.conn()?;
        import_file(&*conn, &data_path).map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("import task failed: {e}")))??;

    Ok(Message::new(summary.summary()))
}

// ============================================================================
// Router
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    let swift_routes = Router::new()
        .route("/", post(create_swift_code))
        .route(
            "/:swift_code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .route("/country/:country_iso2", get(get_country));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/v1/load-data", post(load_data))
        .nest("/v1/swift-codes", swift_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
