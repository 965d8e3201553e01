use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::evaluation::TargetingContext;
use crate::model::FeatureFlag;
use crate::state::AppState;

use super::{
    parse_variants, validate_flag_key, CreateFlagRequest, FlagResponse, UpdateEnabledRequest,
};

/// Create a new feature flag
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateFlagRequest>,
) -> Result<impl IntoResponse> {
    validate_flag_key(&payload.flag_key)?;

    let variants = match payload.variants_json.as_deref() {
        Some(json) => parse_variants(json)?,
        None => Vec::new(),
    };

    let flag = FeatureFlag::new(payload.flag_key, payload.enabled)
        .with_description(payload.description)
        .with_variants(variants);

    let created = state.store.create(flag).await?;
    tracing::info!(flag_key = %created.flag_key, "flag created");

    Ok((StatusCode::CREATED, Json(FlagResponse::from(created))))
}

/// List all flags
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let flags = state.store.list().await?;

    let response: Vec<FlagResponse> = flags.into_iter().map(FlagResponse::from).collect();
    Ok(Json(response))
}

/// Get a single flag by key
pub async fn get(
    State(state): State<AppState>,
    Path(flag_key): Path<String>,
) -> Result<impl IntoResponse> {
    let flag = state
        .store
        .get(&flag_key)
        .await?
        .ok_or(Error::NotFound(flag_key))?;

    Ok(Json(FlagResponse::from(flag)))
}

/// Set a flag's master switch by id
pub async fn update_enabled(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEnabledRequest>,
) -> Result<impl IntoResponse> {
    let flag = state.store.update_enabled(id, payload.enabled).await?;
    tracing::info!(flag_key = %flag.flag_key, enabled = flag.enabled, "flag toggled");

    Ok(Json(FlagResponse::from(flag)))
}

/// Delete a flag by key
pub async fn delete(
    State(state): State<AppState>,
    Path(flag_key): Path<String>,
) -> Result<impl IntoResponse> {
    state.store.delete(&flag_key).await?;
    tracing::info!(flag_key = %flag_key, "flag deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Evaluate a flag for the requesting context.
///
/// `userId` and `country` are lifted out of the query string; any remaining
/// query params ride along as custom context attributes.
pub async fn evaluate(
    State(state): State<AppState>,
    Path(flag_key): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse> {
    let context = TargetingContext {
        user_id: params.remove("userId"),
        country: params.remove("country"),
        attributes: params,
    };

    let result = state.evaluator.evaluate(&flag_key, &context).await?;
    tracing::debug!(
        flag_key = %result.flag_key,
        variant = result.variant.as_deref(),
        reason = ?result.reason,
        "flag evaluated"
    );

    Ok(Json(result))
}
