//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{
    presets::Preset,
    queue::{ItemId, ItemPatch},
    state::{AppState, StateError},
};
use super::responses::{
    AddedResponse, EngineResponse, ErrorResponse, HealthResponse, MoveRequest, NameRequest,
    PresetListResponse, QueueResponse, StartRequest, StatusResponse,
};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn reject(error: StateError) -> ApiError {
    let status = match error {
        StateError::QueueLocked => StatusCode::CONFLICT,
        StateError::EmptyName | StateError::EmptyQueue => StatusCode::UNPROCESSABLE_ENTITY,
        StateError::PresetNotFound(_) => StatusCode::NOT_FOUND,
    };
    warn!("Request refused: {}", error);
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}

fn queue_response(state: &AppState) -> QueueResponse {
    QueueResponse::new(&state.queue(), state.is_running())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Handle GET /status - Return engine snapshot and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        engine: state.engine.snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

// ── Queue ────────────────────────────────────────────────────────────

/// Handle GET /queue
pub async fn queue_handler(State(state): State<Arc<AppState>>) -> Json<QueueResponse> {
    Json(queue_response(&state))
}

/// Handle POST /queue/items - Append a default item
pub async fn add_item_handler(State(state): State<Arc<AppState>>) -> ApiResult<AddedResponse> {
    let id = state.add_item().map_err(reject)?;
    Ok(Json(AddedResponse {
        id,
        queue: queue_response(&state),
    }))
}

/// Handle PATCH /queue/items/:id - Merge clamped fields into an item
pub async fn update_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(patch): Json<ItemPatch>,
) -> ApiResult<QueueResponse> {
    state.update_item(ItemId(id), patch).map_err(reject)?;
    Ok(Json(queue_response(&state)))
}

/// Handle DELETE /queue/items/:id
pub async fn remove_item_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<QueueResponse> {
    state.remove_item(ItemId(id)).map_err(reject)?;
    Ok(Json(queue_response(&state)))
}

/// Handle POST /queue/move - Swap an item with its neighbour
pub async fn move_item_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<QueueResponse> {
    state
        .move_item(request.index, request.direction)
        .map_err(reject)?;
    Ok(Json(queue_response(&state)))
}

// ── Engine ───────────────────────────────────────────────────────────

/// Handle POST /engine/start - Play from the given index
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> Json<EngineResponse> {
    let snapshot = state.start(request.index);
    Json(EngineResponse::new(
        format!("Start requested at index {}", request.index),
        snapshot,
    ))
}

/// Handle POST /engine/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<EngineResponse> {
    Json(EngineResponse::new("Pause requested", state.pause()))
}

/// Handle POST /engine/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<EngineResponse> {
    Json(EngineResponse::new("Resume requested", state.resume()))
}

/// Handle POST /engine/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<EngineResponse> {
    Json(EngineResponse::new("Stop requested", state.stop()))
}

// ── Presets ──────────────────────────────────────────────────────────

/// Handle GET /presets
pub async fn list_presets_handler(State(state): State<Arc<AppState>>) -> Json<PresetListResponse> {
    Json(PresetListResponse {
        presets: state.list_presets(),
    })
}

/// Handle POST /presets - Save the current queue
pub async fn save_preset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<Preset>), ApiError> {
    let preset = state.save_preset(&request.name).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(preset)))
}

/// Handle PATCH /presets/:id - Rename a preset
pub async fn rename_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<NameRequest>,
) -> ApiResult<Preset> {
    let preset = state.rename_preset(&id, &request.name).map_err(reject)?;
    info!("Preset {} renamed to '{}'", preset.id, preset.name);
    Ok(Json(preset))
}

/// Handle DELETE /presets/:id
pub async fn delete_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<PresetListResponse> {
    state.delete_preset(&id).map_err(reject)?;
    Ok(Json(PresetListResponse {
        presets: state.list_presets(),
    }))
}

/// Handle POST /presets/:id/load - Replace the queue with a preset
pub async fn load_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<QueueResponse> {
    let queue = state.load_preset(&id).map_err(reject)?;
    info!("Loaded preset {} ({} items)", id, queue.len());
    Ok(Json(QueueResponse::new(&queue, false)))
}

// ── Events ───────────────────────────────────────────────────────────

fn json_event(name: &str, value: &impl Serialize) -> Result<Event, Infallible> {
    Ok(match Event::default().event(name).json_data(value) {
        Ok(event) => event,
        Err(e) => Event::default()
            .event(name)
            .data(format!("encoding failed: {}", e)),
    })
}

/// Handle GET /events - Stream snapshots and completion notices
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshot_rx = state.engine.subscribe();
    let current = snapshot_rx.borrow().clone();

    let snapshots = stream::once(async move { json_event("snapshot", &current) }).chain(
        stream::unfold(snapshot_rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = rx.borrow_and_update().clone();
            Some((json_event("snapshot", &snapshot), rx))
        }),
    );

    let notices = stream::unfold(state.notice_tx.subscribe(), |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notice) => return Some((json_event("completed", &notice), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} notices", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream::select(snapshots, notices)).keep_alive(KeepAlive::default())
}
