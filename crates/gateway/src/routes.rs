//! Route handlers
//!
//! | Method | Path | Success |
//! |--------|------|---------|
//! | POST | `/create` | 201, tx id |
//! | GET | `/read/:passport` | 200, record JSON |
//! | PUT | `/update` | 202, tx id |
//! | GET | `/history/:passport` | 200, version array |
//! | GET | `/healthz` | 200, or 503 once closed |
//!
//! Request bodies are parsed from raw bytes so that a malformed body is a
//! 400 with the parser's message, like every other rejection.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use idledger::{history, CallOptions, HistoryFormat, IdLedger, Record};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    service: Arc<IdLedger>,
    history_format: HistoryFormat,
}

impl AppState {
    /// State over a running service, using its configured history format
    pub fn new(service: Arc<IdLedger>) -> Self {
        let history_format = service.config().gateway.history_format;
        Self {
            service,
            history_format,
        }
    }

    /// Override the history wire format
    pub fn with_history_format(mut self, format: HistoryFormat) -> Self {
        self.history_format = format;
        self
    }
}

/// Body of `PUT /update`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    /// Record key; `phone` is accepted as a legacy name
    #[serde(alias = "phone")]
    pub passport: String,
    /// Field to change
    pub field: String,
    /// New value
    pub value: String,
}

/// Body of `GET /healthz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `closed`
    pub status: String,
    /// Committed transactions
    pub height: u64,
    /// Live commit subscriptions
    pub subscribers: usize,
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/create", post(create))
        .route("/read/:passport", get(read))
        .route("/update", put(update))
        .route("/history/:passport", get(history_of))
        .route("/healthz", get(healthz))
        .with_state(state)
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))
}

fn json_bytes(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// `POST /create`
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let record: Record = parse_body(&body)?;
    let tx_id = state
        .service
        .coordinator()
        .create(&record, CallOptions::new())
        .await?;
    tracing::info!(%tx_id, passport = %record.passport, "record created");
    Ok((StatusCode::CREATED, tx_id.to_string()).into_response())
}

/// `GET /read/:passport`
pub async fn read(
    State(state): State<AppState>,
    Path(passport): Path<String>,
) -> Result<Response, ApiError> {
    let bytes = state.service.coordinator().read_raw(&passport).await?;
    Ok(json_bytes(StatusCode::OK, bytes))
}

/// `PUT /update`
pub async fn update(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: UpdateRequest = parse_body(&body)?;
    let tx_id = state
        .service
        .coordinator()
        .update(
            &request.passport,
            &request.field,
            &request.value,
            CallOptions::new(),
        )
        .await?;
    tracing::info!(%tx_id, passport = %request.passport, field = %request.field, "record updated");
    Ok((StatusCode::ACCEPTED, tx_id.to_string()).into_response())
}

/// `GET /history/:passport`
pub async fn history_of(
    State(state): State<AppState>,
    Path(passport): Path<String>,
) -> Result<Response, ApiError> {
    let entries = state.service.coordinator().history(&passport).await?;
    let body = history::encode(&entries, state.history_format)?;
    Ok(json_bytes(StatusCode::OK, body))
}

/// `GET /healthz`
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let stats = state.service.stats();
    let (status, label) = if state.service.is_closed() {
        (StatusCode::SERVICE_UNAVAILABLE, "closed")
    } else {
        (StatusCode::OK, "ok")
    };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            height: stats.height,
            subscribers: stats.subscribers,
        }),
    )
}
