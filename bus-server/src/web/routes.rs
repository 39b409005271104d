//! HTTP route handlers.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::{BusId, TripId};
use crate::search::{SearchError, TripStore};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
///
/// `static_dir`, if given, is served under `/static`.
pub fn create_router<S>(state: AppState<S>, static_dir: Option<&str>) -> Router
where
    S: TripStore + 'static,
{
    let router = Router::new()
        .route("/health", get(health::<S>))
        .route("/api/search", get(search_query::<S>).post(search_body::<S>))
        .route("/api/stops", get(list_stops::<S>))
        .route("/api/buses", get(list_buses::<S>))
        .route("/api/buses/:id", get(get_bus::<S>))
        .route("/api/trips/:id", get(get_trip::<S>));

    let router = match static_dir {
        Some(dir) => router.nest_service("/static", ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint. Fails with 503 when the store cannot answer.
async fn health<S: TripStore>(State(state): State<AppState<S>>) -> Result<&'static str, AppError> {
    state.store.ping().await.map_err(|e| AppError::Unavailable {
        message: e.to_string(),
    })?;
    Ok("ok")
}

/// Search with query parameters.
async fn search_query<S: TripStore>(
    State(state): State<AppState<S>>,
    Query(req): Query<SearchTripsRequest>,
) -> Result<Json<Vec<TripResult>>, AppError> {
    search_trips(&state, &req, Utc::now()).await.map(Json)
}

/// Search with a JSON body.
async fn search_body<S: TripStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<Vec<TripResult>>, AppError> {
    // Parse JSON manually so the rejection carries our error shape
    let req: SearchTripsRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(&body), "invalid search body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    search_trips(&state, &req, Utc::now()).await.map(Json)
}

/// Run a search and render the results in the service offset.
pub(crate) async fn search_trips<S: TripStore>(
    state: &AppState<S>,
    req: &SearchTripsRequest,
    now: DateTime<Utc>,
) -> Result<Vec<TripResult>, AppError> {
    let results = state
        .finder()
        .search(
            req.from_stop.as_deref(),
            req.to_stop.as_deref(),
            req.boarding_time.as_deref(),
            now,
        )
        .await?;

    let offset = state.config.utc_offset;
    Ok(results
        .iter()
        .map(|r| TripResult::from_result(r, offset))
        .collect())
}

async fn list_stops<S: TripStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<StopResult>>, AppError> {
    let stops = state.finder().stops().await?;
    Ok(Json(stops.iter().map(StopResult::from).collect()))
}

async fn list_buses<S: TripStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<BusResult>>, AppError> {
    let buses = state.finder().buses().await?;
    Ok(Json(buses.iter().map(BusResult::from).collect()))
}

/// Unwrap a numeric path id, reporting a bad one with our error shape.
fn path_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    path.map(|Path(id)| id).map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })
}

async fn get_bus<S: TripStore>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<BusResult>, AppError> {
    let bus = state.finder().bus_by_id(BusId(path_id(path)?)).await?;
    Ok(Json(BusResult::from(&bus)))
}

async fn get_trip<S: TripStore>(
    State(state): State<AppState<S>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TripResult>, AppError> {
    let trip = state.finder().trip_by_id(TripId(path_id(path)?)).await?;
    Ok(Json(TripResult::from_result(&trip, state.config.utc_offset)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
    Unavailable { message: String },
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Validation(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            SearchError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            SearchError::Retrieval(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::BadRequest { message }
            | AppError::NotFound { message }
            | AppError::Internal { message }
            | AppError::Unavailable { message } => message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message().to_string();

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
