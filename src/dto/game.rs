use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{DrawnNumberEntity, GameEntity, GameSettings, ParticipantEntity},
    dto::{
        draw::DrawnNumberView,
        format_optional_time, format_system_time,
        participant::ParticipantView,
        validation::{validate_not_blank, validate_optional_url, validate_youtube_url},
    },
};

/// Payload used to create a game; missing fields fall back to the configured defaults.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    #[validate(length(max = 120), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub prize_line: Option<f64>,
    #[validate(range(min = 0.0))]
    pub prize_column: Option<f64>,
    #[validate(range(min = 0.0))]
    pub prize_full: Option<f64>,
    #[validate(url)]
    pub prize_image_url: Option<String>,
    #[validate(custom(function = "validate_youtube_url"))]
    pub youtube_live_url: Option<String>,
}

/// Partial edit of a game's name and prize configuration. Omitted fields are kept; an empty
/// string clears the description, the prize image or the livestream link.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateGameRequest {
    #[validate(length(max = 120), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub prize_line: Option<f64>,
    #[validate(range(min = 0.0))]
    pub prize_column: Option<f64>,
    #[validate(range(min = 0.0))]
    pub prize_full: Option<f64>,
    #[validate(custom(function = "validate_optional_url"))]
    pub prize_image_url: Option<String>,
    #[validate(custom(function = "validate_youtube_url"))]
    pub youtube_live_url: Option<String>,
}

/// Body of `PUT /games/{id}/update-youtube`. Null or empty clears the link.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateYoutubeRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_youtube_url"))]
    pub youtube_live_url: Option<String>,
}

/// Query accepted by the reset route.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResetQuery {
    /// Put participants back to `waiting`; defaults to the configured behaviour.
    pub participants: Option<bool>,
}

/// Typed game settings as exposed on the wire.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSettingsView {
    pub description: Option<String>,
    pub prize_line: f64,
    pub prize_column: f64,
    pub prize_full: f64,
    pub prize_image_url: Option<String>,
    pub last_number: Option<u8>,
}

impl From<&GameSettings> for GameSettingsView {
    fn from(settings: &GameSettings) -> Self {
        Self {
            description: settings.description.clone(),
            prize_line: settings.prize_line,
            prize_column: settings.prize_column,
            prize_full: settings.prize_full,
            prize_image_url: settings.prize_image_url.clone(),
            last_number: settings.last_number,
        }
    }
}

/// Game row, optionally with its drawn numbers and participants embedded.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameView {
    pub id: Uuid,
    pub name: String,
    /// `waiting`, `active` or `finished`.
    pub status: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub youtube_live_url: Option<String>,
    pub settings: GameSettingsView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn_numbers: Option<Vec<DrawnNumberView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ParticipantView>>,
}

impl From<&GameEntity> for GameView {
    fn from(game: &GameEntity) -> Self {
        Self {
            id: game.id,
            name: game.name.clone(),
            status: game.status.as_str().to_string(),
            started_at: format_optional_time(game.started_at),
            finished_at: format_optional_time(game.finished_at),
            created_at: format_system_time(game.created_at),
            updated_at: format_system_time(game.updated_at),
            youtube_live_url: game.settings.youtube_live_url.clone(),
            settings: GameSettingsView::from(&game.settings),
            drawn_numbers: None,
            participants: None,
        }
    }
}

impl GameView {
    /// Embed the game's drawn numbers and participants.
    pub fn with_details(
        game: &GameEntity,
        drawn: &[DrawnNumberEntity],
        participants: &[ParticipantEntity],
    ) -> Self {
        Self {
            drawn_numbers: Some(drawn.iter().map(DrawnNumberView::from).collect()),
            participants: Some(participants.iter().map(ParticipantView::from).collect()),
            ..Self::from(game)
        }
    }
}

/// `{ "game": ... }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameEnvelope {
    pub game: GameView,
}

/// `{ "games": [...] }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListResponse {
    pub games: Vec<GameView>,
}

/// Result of a lifecycle operation (start, finish, reset).
#[derive(Debug, Serialize, ToSchema)]
pub struct GameActionResponse {
    pub game: GameView,
    pub message: String,
}

/// Confirmation returned after a game was deleted.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameDeletedResponse {
    pub message: String,
}

/// Result of a livestream link update.
#[derive(Debug, Serialize, ToSchema)]
pub struct YoutubeUpdateResponse {
    pub success: bool,
    pub game: GameView,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_rejects_bad_links_and_negative_prizes() {
        let request = CreateGameRequest {
            prize_line: Some(-1.0),
            youtube_live_url: Some("https://vimeo.com/1".into()),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("prize_line"));
        assert!(fields.contains_key("youtube_live_url"));
    }

    #[test]
    fn empty_create_request_is_valid() {
        assert!(CreateGameRequest::default().validate().is_ok());
    }

    #[test]
    fn update_request_rejects_blank_names_and_bad_images() {
        let request = UpdateGameRequest {
            name: Some("   ".into()),
            prize_image_url: Some("not a url".into()),
            ..Default::default()
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("prize_image_url"));

        let clearing = UpdateGameRequest {
            prize_image_url: Some(String::new()),
            youtube_live_url: Some(String::new()),
            ..Default::default()
        };
        assert!(clearing.validate().is_ok());
    }

    #[test]
    fn clearing_the_livestream_link_is_valid() {
        let cleared = UpdateYoutubeRequest {
            youtube_live_url: Some(String::new()),
        };
        assert!(cleared.validate().is_ok());
        let nulled = UpdateYoutubeRequest {
            youtube_live_url: None,
        };
        assert!(nulled.validate().is_ok());
    }
}
