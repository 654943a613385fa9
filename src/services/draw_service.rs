//! Game lifecycle and number drawing.
//!
//! Every read-decide-write sequence runs under the lock scopes of
//! [`GameLocks`](crate::state::locks::GameLocks); the store's unique constraint on
//! `(game_id, number)` backs them up across processes.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{DrawnNumberEntity, GameStatus},
    dto::{draw::DrawResponse, game::GameActionResponse, game::GameView},
    error::ServiceError,
    services::{game_service::load_game, sse_events},
    state::{
        SharedState,
        draw::{AllocationError, DrawRequest, DrawnSet, validate_number},
        state_machine::{GameEvent, next_status},
    },
};

const NOT_ACTIVE: &str = "Jogo não está ativo";

/// Activate a game, finishing every other active game and purging its drawn numbers.
pub async fn start_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameActionResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_all().await;

    let mut game = load_game(store.as_ref(), game_id).await?;
    let status = next_status(game.status, GameEvent::Start)?;

    let now = SystemTime::now();
    for mut other in store.list_games_by_status(vec![GameStatus::Active]).await? {
        if other.id == game_id {
            continue;
        }
        other.status = next_status(other.status, GameEvent::Supersede)?;
        other.finished_at = Some(now);
        other.updated_at = now;
        let other_id = other.id;
        store.save_game(other).await?;
        let purged = store.clear_drawn_numbers(other_id).await?;
        info!(game_id = %other_id, purged, "superseded active game");
    }

    game.status = status;
    game.started_at = Some(now);
    game.finished_at = None;
    game.updated_at = now;
    store.save_game(game.clone()).await?;

    sse_events::broadcast_game_started(state, &game);
    info!(game_id = %game.id, "game started");

    Ok(GameActionResponse {
        game: GameView::from(&game),
        message: "Jogo iniciado. Jogos anteriores finalizados e números limpos.".into(),
    })
}

/// Draw a random number that was not drawn yet.
pub async fn draw_number(state: &SharedState, game_id: Uuid) -> Result<DrawResponse, ServiceError> {
    allocate(state, game_id, DrawRequest::Random).await
}

/// Record an operator-supplied number under the same invariants as random draws.
pub async fn draw_manual_number(
    state: &SharedState,
    game_id: Uuid,
    request: DrawRequest,
) -> Result<DrawResponse, ServiceError> {
    if let DrawRequest::Manual(number) = request {
        validate_number(number)?;
    }
    allocate(state, game_id, request).await
}

async fn allocate(
    state: &SharedState,
    game_id: Uuid,
    request: DrawRequest,
) -> Result<DrawResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_game(game_id).await;

    let mut game = load_game(store.as_ref(), game_id).await?;
    if game.status != GameStatus::Active {
        return Err(ServiceError::InvalidState(NOT_ACTIVE.into()));
    }

    let mut drawn = DrawnSet::from_records(&store.list_drawn_numbers(game_id).await?);
    let number = drawn.allocate(request)?;

    let record = DrawnNumberEntity {
        id: Uuid::new_v4(),
        game_id,
        number,
        drawn_at: SystemTime::now(),
        is_manual: request.is_manual(),
    };
    store
        .insert_drawn_number(record.clone())
        .await
        .map_err(|err| {
            if err.is_conflict() {
                ServiceError::from(AllocationError::AlreadyDrawn(number))
            } else {
                ServiceError::from(err)
            }
        })?;
    drawn.insert(number);

    game.settings.last_number = Some(number);
    game.updated_at = record.drawn_at;
    if let Err(err) = store.save_game(game).await {
        warn!(%game_id, number, error = %err, "failed to record last number; undoing draw");
        if let Err(undo_err) = store.remove_drawn_number(game_id, number).await {
            warn!(%game_id, number, error = %undo_err, "failed to undo draw");
        }
        return Err(err.into());
    }

    sse_events::broadcast_number_drawn(state, &record, drawn.len(), drawn.remaining());
    info!(
        %game_id,
        number,
        manual = record.is_manual,
        total_drawn = drawn.len(),
        "number drawn"
    );

    Ok(DrawResponse::new(&record, drawn.len(), drawn.remaining()))
}

/// Close a game. Drawn numbers are kept.
pub async fn finish_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<GameActionResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_game(game_id).await;

    let mut game = load_game(store.as_ref(), game_id).await?;
    game.status = next_status(game.status, GameEvent::Finish)?;
    let now = SystemTime::now();
    game.finished_at = Some(now);
    game.updated_at = now;
    store.save_game(game.clone()).await?;

    sse_events::broadcast_game_finished(state, &game);
    info!(%game_id, "game finished");

    Ok(GameActionResponse {
        game: GameView::from(&game),
        message: "Jogo finalizado com sucesso!".into(),
    })
}

/// Return a game to `waiting`, dropping its drawn numbers. When `reset_participants` is
/// `None` the configured default applies.
pub async fn reset_game(
    state: &SharedState,
    game_id: Uuid,
    reset_participants: Option<bool>,
) -> Result<GameActionResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let _guard = state.locks().lock_game(game_id).await;

    let mut game = load_game(store.as_ref(), game_id).await?;
    game.status = next_status(game.status, GameEvent::Reset)?;

    let purged = store.clear_drawn_numbers(game_id).await?;
    let participants = if reset_participants.unwrap_or(state.config().reset_participants) {
        store.reset_participants(game_id).await?
    } else {
        0
    };

    game.started_at = None;
    game.finished_at = None;
    game.settings.last_number = None;
    game.updated_at = SystemTime::now();
    store.save_game(game.clone()).await?;

    sse_events::broadcast_game_reset(state, &game);
    info!(%game_id, purged, participants, "game reset");

    Ok(GameActionResponse {
        game: GameView::from(&game),
        message: "Jogo resetado com sucesso!".into(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::{GameStore, memory::InMemoryGameStore},
        dto::game::CreateGameRequest,
        services::game_service,
        state::{AppState, draw::TOTAL_NUMBERS},
    };

    async fn setup() -> (SharedState, Arc<InMemoryGameStore>, Uuid) {
        let store = Arc::new(InMemoryGameStore::new());
        let state = AppState::with_store(AppConfig::default(), store.clone()).await;
        let created = game_service::create_game(&state, CreateGameRequest::default())
            .await
            .unwrap();
        (state, store, created.game.id)
    }

    #[tokio::test]
    async fn drawing_requires_an_active_game() {
        let (state, _store, game_id) = setup().await;
        let err = draw_number(&state, game_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(message) if message == NOT_ACTIVE));

        let err = draw_number(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn draw_updates_last_number_and_counts() {
        let (state, store, game_id) = setup().await;
        start_game(&state, game_id).await.unwrap();

        let first = draw_number(&state, game_id).await.unwrap();
        assert_eq!(first.total_drawn, 1);
        assert_eq!(first.remaining, TOTAL_NUMBERS - 1);

        let pick = if first.number == 75 { 74 } else { 75 };
        let manual = draw_manual_number(&state, game_id, DrawRequest::Manual(pick))
            .await
            .unwrap();
        assert!(manual.is_manual);
        assert_eq!(manual.total_drawn, 2);

        let game = store.find_game(game_id).await.unwrap().unwrap();
        assert_eq!(game.settings.last_number, Some(manual.number));
    }

    #[tokio::test]
    async fn manual_out_of_range_is_rejected_before_the_game_is_read() {
        let (state, _store, game_id) = setup().await;
        let err = draw_manual_number(&state, game_id, DrawRequest::Manual(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn finishing_twice_is_a_conflict() {
        let (state, _store, game_id) = setup().await;
        start_game(&state, game_id).await.unwrap();
        finish_game(&state, game_id).await.unwrap();

        let err = finish_game(&state, game_id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidState(message) if message == "Jogo já foi finalizado"
        ));
        let err = start_game(&state, game_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn reset_without_participants_keeps_their_status() {
        let (state, store, game_id) = setup().await;
        start_game(&state, game_id).await.unwrap();
        draw_number(&state, game_id).await.unwrap();

        let response = reset_game(&state, game_id, Some(false)).await.unwrap();
        assert_eq!(response.game.status, "waiting");
        assert!(store.list_drawn_numbers(game_id).await.unwrap().is_empty());
        assert_eq!(response.game.settings.last_number, None);
    }
}
