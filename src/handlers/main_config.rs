//! Main configuration handlers

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::extract::{JsonBody, UploadForm};
use crate::middleware::AuthUser;
use crate::models::{MainConfig, UpdateMainConfigRequest, WithHistory};
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /main
pub async fn handle_get(State(state): State<AppState>) -> Result<Json<WithHistory<MainConfig>>> {
    Ok(Json(state.services.main_config_service.get().await?))
}

/// PUT /main
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<UpdateMainConfigRequest>,
) -> Result<Json<WithHistory<MainConfig>>> {
    Ok(Json(state.services.main_config_service.update(&auth.actor, request).await?))
}

/// POST /main/logo, multipart field `logo`
pub async fn handle_upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    mut form: UploadForm,
) -> Result<Json<Value>> {
    let file = form.take_file("logo")?;
    let url = state.services.main_config_service.upload_logo(&auth.actor, file).await?;
    Ok(Json(json!({ "message": "Logo uploaded successfully", "logoUrl": url })))
}
