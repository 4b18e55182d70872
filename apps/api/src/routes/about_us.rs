use axum::{
    extract::{rejection::BytesRejection, State},
    Json,
};
use bytes::Bytes;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::AboutUs;
use crate::routes::parse_json;
use crate::state::AppState;

/// GET /about-us
pub async fn handle_get(State(state): State<AppState>) -> Json<AboutUs> {
    Json(state.storage.get_about_us().await)
}

/// POST /about-us
///
/// Body: `{"content": "<non-empty string>"}`.
pub async fn handle_update(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AboutUs>, AppError> {
    let payload: Value = parse_json(&body?)?;
    let content = payload
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing content field".to_string()))?;

    let about_us = state.storage.update_about_us(content.to_string()).await?;
    tracing::info!("About Us content updated ({} chars)", about_us.content.len());
    Ok(Json(about_us))
}
