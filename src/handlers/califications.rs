//! Calification handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::extract::{JsonBody, PathParams};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::{
    Calification, CalificationView, CreateCalificationRequest, TargetCalifications, UpdateCalificationRequest,
};
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /califications
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<CreateCalificationRequest>,
) -> Result<(StatusCode, Json<Calification>)> {
    let calification = state
        .services
        .calification_service
        .create(&auth.actor, request)
        .await?;
    Ok((StatusCode::CREATED, Json(calification)))
}

/// GET /califications/:targetModel/:targetId
pub async fn handle_by_target(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    PathParams((model, target_id)): PathParams<(String, Uuid)>,
) -> Result<Json<TargetCalifications>> {
    Ok(Json(
        state
            .services
            .calification_service
            .by_target(caller.actor(), &model, target_id)
            .await?,
    ))
}

/// GET /califications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    PathParams(calification_id): PathParams<Uuid>,
) -> Result<Json<CalificationView>> {
    Ok(Json(
        state
            .services
            .calification_service
            .get(caller.actor(), calification_id)
            .await?,
    ))
}

/// PUT /califications/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(calification_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<UpdateCalificationRequest>,
) -> Result<Json<Calification>> {
    Ok(Json(
        state
            .services
            .calification_service
            .update(&auth.actor, calification_id, request)
            .await?,
    ))
}

/// DELETE /califications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(calification_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state
        .services
        .calification_service
        .delete(&auth.actor, calification_id)
        .await?;
    Ok(Json(json!({ "message": "Calification removed" })))
}
