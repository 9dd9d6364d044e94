use axum::{
    body::Bytes,
    extract::{Query, State},
    response::{Html, IntoResponse},
    Json,
};
use log::{error, warn};
use serde::Deserialize;

use super::dto::{AllDataResponse, IngestResponse, RangeResponse};
use super::{ApiError, AppState};
use crate::error::SpeedSenseError;
use crate::types::IngestRequest;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

/// 请求体自行解析，保证格式错误也返回 400 和 `{"error": ...}`
pub async fn process_sensor_data(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let request: IngestRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Invalid payload: {}", e);
        SpeedSenseError::InvalidPayload(e.to_string())
    })?;

    let processed_count = state.db.ingest(request).await?;
    Ok(Json(IngestResponse::success(processed_count)))
}

pub async fn get_data(State(state): State<AppState>) -> Result<Json<AllDataResponse>, ApiError> {
    let all = state.db.list_all().await.map_err(|e| {
        error!("Failed to fetch records: {}", e);
        e
    })?;
    Ok(Json(AllDataResponse::from(&all)))
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

pub async fn get_data_between(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Result<Json<RangeResponse>, ApiError> {
    let report = state.db.query_range(params.start, params.end).await?;
    Ok(Json(RangeResponse::from(report)))
}
