//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.
//! It is the control surface a front-end uses to render state and forward
//! user intents.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        // Queue editing, refused while a workout runs
        .route("/queue", get(queue_handler))
        .route("/queue/items", post(add_item_handler))
        .route(
            "/queue/items/:id",
            patch(update_item_handler).delete(remove_item_handler),
        )
        .route("/queue/move", post(move_item_handler))
        // Playback
        .route("/engine/start", post(start_handler))
        .route("/engine/pause", post(pause_handler))
        .route("/engine/resume", post(resume_handler))
        .route("/engine/stop", post(stop_handler))
        // Presets
        .route("/presets", get(list_presets_handler).post(save_preset_handler))
        .route(
            "/presets/:id",
            patch(rename_preset_handler).delete(delete_preset_handler),
        )
        .route("/presets/:id/load", post(load_preset_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
