//! Game records: creation, listing and livestream configuration.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameEntity, GameSettings, GameStatus},
    },
    dto::game::{
        CreateGameRequest, GameDeletedResponse, GameEnvelope, GameListResponse, GameView,
        UpdateGameRequest, UpdateYoutubeRequest, YoutubeUpdateResponse,
    },
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// Fetch a game or fail with the operator-facing not-found message.
pub(crate) async fn load_game(
    store: &dyn GameStore,
    game_id: Uuid,
) -> Result<GameEntity, ServiceError> {
    store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Jogo não encontrado".into()))
}

/// Empty strings clear optional text fields.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn invalid_input(err: validator::ValidationErrors) -> ServiceError {
    ServiceError::InvalidInput(err.to_string())
}

/// Create a game in `waiting`, filling omitted fields from the configured defaults.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameEnvelope, ServiceError> {
    request.validate().map_err(invalid_input)?;
    let store = state.require_game_store().await?;
    let defaults = &state.config().game_defaults;

    let now = SystemTime::now();
    let game = GameEntity {
        id: Uuid::new_v4(),
        name: non_blank(request.name).unwrap_or_else(|| defaults.name.clone()),
        status: GameStatus::Waiting,
        started_at: None,
        finished_at: None,
        created_at: now,
        updated_at: now,
        settings: GameSettings {
            description: non_blank(request.description)
                .or_else(|| Some(defaults.description.clone())),
            prize_line: request.prize_line.unwrap_or(defaults.prize_line),
            prize_column: request.prize_column.unwrap_or(defaults.prize_column),
            prize_full: request.prize_full.unwrap_or(defaults.prize_full),
            prize_image_url: non_blank(request.prize_image_url),
            youtube_live_url: non_blank(request.youtube_live_url),
            last_number: None,
        },
    };
    store.save_game(game.clone()).await?;

    sse_events::broadcast_game_created(state, &game);
    info!(game_id = %game.id, name = %game.name, "game created");

    Ok(GameEnvelope {
        game: GameView::from(&game),
    })
}

/// Every game, newest first, with its drawn numbers and participants.
pub async fn list_games(state: &SharedState) -> Result<GameListResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let games = store.list_games().await?;

    let mut views = Vec::with_capacity(games.len());
    for game in &games {
        views.push(detailed_view(store.as_ref(), game).await?);
    }

    Ok(GameListResponse { games: views })
}

/// One game with its drawn numbers and participants.
pub async fn get_game(state: &SharedState, game_id: Uuid) -> Result<GameEnvelope, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(store.as_ref(), game_id).await?;
    Ok(GameEnvelope {
        game: detailed_view(store.as_ref(), &game).await?,
    })
}

async fn detailed_view(
    store: &dyn GameStore,
    game: &GameEntity,
) -> Result<GameView, ServiceError> {
    let drawn = store.list_drawn_numbers(game.id).await?;
    let participants = store.list_participants(Some(game.id)).await?;
    Ok(GameView::with_details(game, &drawn, &participants))
}

/// Patch the name and prize configuration of a game. Status, timestamps and the last drawn
/// number are owned by the lifecycle operations and never change here.
pub async fn update_game(
    state: &SharedState,
    game_id: Uuid,
    request: UpdateGameRequest,
) -> Result<GameEnvelope, ServiceError> {
    request.validate().map_err(invalid_input)?;
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_game(game_id).await;

    let mut game = load_game(store.as_ref(), game_id).await?;
    if let Some(name) = request.name {
        game.name = name.trim().to_string();
    }
    let settings = &mut game.settings;
    if let Some(description) = request.description {
        settings.description = non_blank(Some(description));
    }
    if let Some(prize) = request.prize_line {
        settings.prize_line = prize;
    }
    if let Some(prize) = request.prize_column {
        settings.prize_column = prize;
    }
    if let Some(prize) = request.prize_full {
        settings.prize_full = prize;
    }
    if let Some(url) = request.prize_image_url {
        settings.prize_image_url = non_blank(Some(url));
    }
    if let Some(url) = request.youtube_live_url {
        settings.youtube_live_url = non_blank(Some(url));
    }
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;

    sse_events::broadcast_game_updated(state, &game);
    info!(%game_id, name = %game.name, "game updated");

    Ok(GameEnvelope {
        game: GameView::from(&game),
    })
}

/// Delete a game that is not running, together with its draws, participants and claims.
pub async fn delete_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameDeletedResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_all().await;

    let game = load_game(store.as_ref(), game_id).await?;
    if game.status == GameStatus::Active {
        return Err(ServiceError::InvalidState(
            "Não é possível excluir um jogo ativo".into(),
        ));
    }
    store.delete_game(game_id).await?;

    sse_events::broadcast_game_deleted(state, game_id);
    info!(%game_id, name = %game.name, "game deleted");

    Ok(GameDeletedResponse {
        message: "Jogo deletado com sucesso".into(),
    })
}

/// Replace or clear the livestream link of a game.
pub async fn update_youtube(
    state: &SharedState,
    game_id: Uuid,
    request: UpdateYoutubeRequest,
) -> Result<YoutubeUpdateResponse, ServiceError> {
    request
        .validate()
        .map_err(|_| ServiceError::InvalidInput("URL do YouTube inválida".into()))?;
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_game(game_id).await;

    let mut game = load_game(store.as_ref(), game_id).await?;
    game.settings.youtube_live_url = non_blank(request.youtube_live_url);
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;

    sse_events::broadcast_livestream(state, &game);
    info!(
        %game_id,
        youtube_live_url = game.settings.youtube_live_url.as_deref().unwrap_or(""),
        "livestream link updated"
    );

    let message = if game.settings.youtube_live_url.is_some() {
        "Link do YouTube atualizado com sucesso!"
    } else {
        "Link do YouTube removido com sucesso!"
    };
    Ok(YoutubeUpdateResponse {
        success: true,
        game: GameView::from(&game),
        message: message.into(),
    })
}
