use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{claim::ClaimView, game::GameView};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Serialise `payload` into the SSE data field under the given event name.
    pub fn json<T>(event: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            event: Some(event.to_string()),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a game is created, edited, started, finished or reset.
pub struct GameChangedEvent {
    pub game: GameView,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
/// Broadcast after every committed draw.
pub struct NumberDrawnEvent {
    pub game_id: Uuid,
    pub number: u8,
    pub is_manual: bool,
    pub total_drawn: usize,
    pub remaining: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a claim is awarded.
pub struct ClaimValidatedEvent {
    pub claim: ClaimView,
    pub winner: String,
    pub prize: f64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the livestream link of a game changes.
pub struct LivestreamChangedEvent {
    pub game_id: Uuid,
    pub youtube_live_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after a game and its records were deleted.
pub struct GameDeletedEvent {
    pub game_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}
