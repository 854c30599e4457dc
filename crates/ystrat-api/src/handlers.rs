//! Request handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use ystrat_ingest::CsvInput;
use ystrat_models::{Brief, Strategy, StrategySummary, Tone};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// `POST /analyze`: multipart with a `csv` file part and `goal`,
/// `audience`, `tone` fields (`language_hint` optional). Returns the
/// persisted strategy.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Strategy>> {
    let mut csv: Option<Vec<u8>> = None;
    let mut goal: Option<String> = None;
    let mut audience: Option<String> = None;
    let mut tone: Option<String> = None;
    let mut language_hint: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "csv" | "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("csv part unreadable: {e}")))?;
                csv = Some(bytes.to_vec());
            }
            "goal" => goal = Some(read_text_field(field).await?),
            "audience" => audience = Some(read_text_field(field).await?),
            "tone" => tone = Some(read_text_field(field).await?),
            "language_hint" => language_hint = Some(read_text_field(field).await?),
            other => {
                return Err(ApiError::bad_request(format!("unexpected field '{other}'")));
            }
        }
    }

    let csv = csv.ok_or_else(|| ApiError::bad_request("missing 'csv' file part"))?;
    let goal = goal.ok_or_else(|| ApiError::bad_request("missing 'goal' field"))?;
    let audience = audience.ok_or_else(|| ApiError::bad_request("missing 'audience' field"))?;
    let tone: Tone = tone
        .ok_or_else(|| ApiError::bad_request("missing 'tone' field"))?
        .parse()
        .map_err(|e| ApiError::bad_request(format!("{e}")))?;

    let mut brief = Brief::new(goal, audience, tone);
    if let Some(hint) = language_hint {
        brief = brief.with_language_hint(hint);
    }

    let cancel = CancellationToken::new();
    let (strategy, _path) = state
        .pipeline
        .run(&brief, CsvInput::Bytes(&csv), &[], &cancel)
        .await?;

    info!(id = %strategy.id, "analyze request complete");
    Ok(Json(strategy))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("field unreadable: {e}")))
}

/// `GET /strategies`: newest-first summaries.
pub async fn list_strategies(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<StrategySummary>>> {
    let summaries = state.store.list(100, 0).await?;
    Ok(Json(summaries))
}

/// `GET /strategies/:id`: one full record.
pub async fn get_strategy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Strategy>> {
    let strategy = state.store.get(&id).await?;
    Ok(Json(strategy))
}
