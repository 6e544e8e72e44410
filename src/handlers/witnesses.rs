//! Witness handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::extract::{JsonBody, PathParams};
use crate::middleware::AuthUser;
use crate::models::{CreateWitnessRequest, Witness, WitnessView};
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /witnesses
pub async fn handle_list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<WitnessView>>> {
    Ok(Json(state.services.witness_service.list_all(&auth.actor).await?))
}

/// POST /witnesses
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<CreateWitnessRequest>,
) -> Result<(StatusCode, Json<Witness>)> {
    let record = state.services.witness_service.create(&auth.actor, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /witnesses/user/:userId
pub async fn handle_by_user(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(user_id): PathParams<Uuid>,
) -> Result<Json<Vec<Witness>>> {
    Ok(Json(state.services.witness_service.by_user(&auth.actor, user_id).await?))
}

/// GET /witnesses/:targetModel/:targetId
pub async fn handle_by_target(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams((model, target_id)): PathParams<(String, Uuid)>,
) -> Result<Json<Vec<WitnessView>>> {
    Ok(Json(
        state
            .services
            .witness_service
            .by_target(&auth.actor, &model, target_id)
            .await?,
    ))
}

/// DELETE /witnesses/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(witness_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state.services.witness_service.delete(&auth.actor, witness_id).await?;
    Ok(Json(json!({ "message": "Witness removed" })))
}
