//! HTTP handlers module
//!
//! This module contains the request handlers for every API resource and the
//! router that mounts them under the configured API prefix:
//! - Users, events and activities
//! - Tickets, califications and witnesses
//! - Files and the main configuration

pub mod activities;
pub mod califications;
pub mod events;
pub mod extract;
pub mod files;
pub mod main_config;
pub mod tickets;
pub mod users;
pub mod witnesses;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};
use url::Url;

use crate::middleware::http_trace_layer;
use crate::services::ServiceHealthStatus;
use crate::state::AppState;

/// Multipart overhead allowed on top of the file payload limits
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// GET /
pub async fn handle_root() -> Json<Value> {
    Json(json!({ "message": "EventHub API is running" }))
}

/// GET /health
pub async fn handle_health(State(state): State<AppState>) -> (StatusCode, Json<ServiceHealthStatus>) {
    let status = state.services.health_check().await;
    if status.is_healthy() {
        (StatusCode::OK, Json(status))
    } else {
        for issue in status.get_issues() {
            warn!(issue = %issue, "Health check failed");
        }
        (StatusCode::SERVICE_UNAVAILABLE, Json(status))
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", post(users::handle_register).get(users::handle_list))
        .route("/users/login", post(users::handle_login))
        .route(
            "/users/profile",
            get(users::handle_profile).put(users::handle_update_profile),
        )
        .route(
            "/users/:id",
            get(users::handle_get)
                .put(users::handle_admin_update)
                .delete(users::handle_delete),
        )
        // Events
        .route("/events", get(events::handle_list).post(events::handle_create))
        .route(
            "/events/:id",
            get(events::handle_detail)
                .put(events::handle_update)
                .delete(events::handle_delete),
        )
        .route("/events/:id/logo", post(events::handle_upload_logo))
        .route("/events/:id/mainImage", post(events::handle_upload_main_image))
        .route("/events/:id/photos", post(events::handle_upload_photos))
        .route("/events/:id/operators", post(events::handle_add_operator))
        .route(
            "/events/:id/operators/:user_id",
            axum::routing::delete(events::handle_remove_operator),
        )
        .route("/events/:id/assistants", post(events::handle_add_assistant))
        .route(
            "/events/:id/assistants/:user_id",
            axum::routing::delete(events::handle_remove_assistant),
        )
        // Activities
        .route(
            "/events/:id/activities",
            get(activities::handle_list_for_event).post(activities::handle_create),
        )
        .route(
            "/activities/events/:id/activities",
            get(activities::handle_list_for_event).post(activities::handle_create),
        )
        .route(
            "/activities/:id",
            get(activities::handle_get)
                .put(activities::handle_update)
                .delete(activities::handle_delete),
        )
        .route("/activities/:id/witnesses", post(activities::handle_add_witness))
        .route(
            "/activities/:id/witnesses/:user_id",
            axum::routing::delete(activities::handle_remove_witness),
        )
        .route("/activities/:id/seats/increment", put(activities::handle_increment_seats))
        .route("/activities/:id/seats/decrement", put(activities::handle_decrement_seats))
        // Tickets
        .route("/tickets", get(tickets::handle_list).post(tickets::handle_create))
        .route("/tickets/user/:id", get(tickets::handle_by_user))
        .route("/tickets/event/:id", get(tickets::handle_by_event))
        .route(
            "/tickets/:id",
            get(tickets::handle_get)
                .put(tickets::handle_update)
                .delete(tickets::handle_delete),
        )
        // Califications
        .route("/califications", post(califications::handle_create))
        .route(
            "/califications/:id",
            get(califications::handle_get)
                .put(califications::handle_update)
                .delete(califications::handle_delete),
        )
        .route("/califications/:id/:target_id", get(califications::handle_by_target))
        // Witnesses
        .route("/witnesses", get(witnesses::handle_list).post(witnesses::handle_create))
        .route("/witnesses/user/:id", get(witnesses::handle_by_user))
        .route("/witnesses/:id", axum::routing::delete(witnesses::handle_delete))
        .route("/witnesses/:id/:target_id", get(witnesses::handle_by_target))
        // Files
        .route("/files", get(files::handle_list).post(files::handle_upload))
        .route("/files/owner/:id", get(files::handle_by_owner))
        .route("/files/target/:id/:target_id", get(files::handle_by_target))
        .route(
            "/files/:id",
            get(files::handle_get)
                .put(files::handle_update)
                .delete(files::handle_delete),
        )
        // Main configuration
        .route("/main", get(main_config::handle_get).put(main_config::handle_update))
        .route("/main/logo", post(main_config::handle_upload_logo))
}

/// Build the complete router: API routes under the configured prefix,
/// health endpoints, uploaded files, CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let settings = state.settings.clone();
    let limits = &settings.uploads;
    let body_limit = limits
        .file_max_bytes
        .max(limits.photo_max_bytes * limits.max_photos_per_request)
        + MULTIPART_OVERHEAD;

    let prefix = settings.server.api_prefix.trim_end_matches('/');
    let mut router = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health));
    router = if prefix.is_empty() {
        router.merge(api_routes())
    } else {
        router.nest(prefix, api_routes())
    };

    // Serve locally stored uploads at the path of their public URLs
    if let Ok(base) = Url::parse(&settings.storage.public_base_url) {
        let path = base.path().trim_end_matches('/');
        if !path.is_empty() && path != prefix {
            info!(path = %path, dir = %settings.storage.upload_dir, "Serving uploaded files");
            router = router.nest_service(path, ServeDir::new(&settings.storage.upload_dir));
        }
    }

    let cors = if settings.server.cors_permissive {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(http_trace_layer())
        .with_state(state)
}
