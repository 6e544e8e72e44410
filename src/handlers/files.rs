//! File handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::extract::{JsonBody, PathParams, UploadForm};
use crate::middleware::AuthUser;
use crate::models::{FileRecord, FileView, UpdateFileRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /files, multipart field `file` plus optional text fields
pub async fn handle_upload(
    State(state): State<AppState>,
    auth: AuthUser,
    mut form: UploadForm,
) -> Result<(StatusCode, Json<FileRecord>)> {
    let fields = form.file_fields()?;
    let file = form.take_file("file")?;

    let record = state.services.file_service.upload(&auth.actor, file, fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /files
pub async fn handle_list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<FileView>>> {
    Ok(Json(state.services.file_service.list_all(&auth.actor).await?))
}

/// GET /files/owner/:userId
pub async fn handle_by_owner(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(owner): PathParams<Uuid>,
) -> Result<Json<Vec<FileView>>> {
    Ok(Json(state.services.file_service.by_owner(&auth.actor, owner).await?))
}

/// GET /files/target/:targetModel/:targetId
pub async fn handle_by_target(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams((model, target_id)): PathParams<(String, Uuid)>,
) -> Result<Json<Vec<FileView>>> {
    Ok(Json(
        state
            .services
            .file_service
            .by_target(&auth.actor, &model, target_id)
            .await?,
    ))
}

/// GET /files/:id
pub async fn handle_get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(file_id): PathParams<Uuid>,
) -> Result<Json<FileView>> {
    Ok(Json(state.services.file_service.get(&auth.actor, file_id).await?))
}

/// PUT /files/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(file_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<UpdateFileRequest>,
) -> Result<Json<FileRecord>> {
    Ok(Json(
        state
            .services
            .file_service
            .update(&auth.actor, file_id, request)
            .await?,
    ))
}

/// DELETE /files/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(file_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state.services.file_service.delete(&auth.actor, file_id).await?;
    Ok(Json(json!({ "message": "File removed" })))
}
