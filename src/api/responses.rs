//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::EngineSnapshot,
    presets::Preset,
    queue::{format_time, ItemId, Queue, TimerItem},
};

/// Response for engine commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub engine: EngineSnapshot,
}

impl EngineResponse {
    pub fn new(message: impl Into<String>, engine: EngineSnapshot) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
            engine,
        }
    }
}

/// One queue row with derived display values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: TimerItem,
    pub duration: u64,
    pub display: String,
    pub playable: bool,
}

impl From<&TimerItem> for ItemView {
    fn from(item: &TimerItem) -> Self {
        Self {
            item: *item,
            duration: item.duration(),
            display: format_time(item.duration()),
            playable: item.fields.is_playable(),
        }
    }
}

/// The whole queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueResponse {
    pub items: Vec<ItemView>,
    pub total_duration: u64,
    pub total_display: String,
    /// True while edits are refused
    pub locked: bool,
}

impl QueueResponse {
    pub fn new(queue: &Queue, locked: bool) -> Self {
        Self {
            items: queue.items().iter().map(ItemView::from).collect(),
            total_duration: queue.total_duration(),
            total_display: format_time(queue.total_duration()),
            locked,
        }
    }
}

/// Status response with engine and server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub engine: EngineSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedResponse {
    pub id: ItemId,
    pub queue: QueueResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetListResponse {
    pub presets: Vec<Preset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub index: usize,
    /// -1 moves up, +1 moves down
    pub direction: isize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
