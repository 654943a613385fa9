//! Read-only projections of game configuration served to the mobile client.

use uuid::Uuid;

use crate::{
    dao::models::GameStatus,
    dto::public::{
        DrawHistory, DrawHistoryResponse, PrizeTable, PrizesResponse, PublicGame,
        PublicGameEnvelope, PublicGameList, PublicGameRef,
    },
    error::ServiceError,
    services::game_service::load_game,
    state::SharedState,
};

/// Games players can still join or follow, newest first.
pub async fn list_open_games(state: &SharedState) -> Result<PublicGameList, ServiceError> {
    let store = state.require_game_store().await?;
    let games = store
        .list_games_by_status(vec![GameStatus::Waiting, GameStatus::Active])
        .await?;

    let mut items = Vec::with_capacity(games.len());
    for game in &games {
        let drawn = store.list_drawn_numbers(game.id).await?;
        items.push(PublicGame::summary(game, &drawn));
    }

    Ok(PublicGameList {
        success: true,
        games: items,
    })
}

/// One game with draw totals.
pub async fn get_game(
    state: &SharedState,
    game_id: Uuid,
) -> Result<PublicGameEnvelope, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(store.as_ref(), game_id).await?;
    let drawn = store.list_drawn_numbers(game_id).await?;
    Ok(PublicGameEnvelope {
        success: true,
        game: PublicGame::detail(&game, &drawn),
    })
}

/// Draw history of a game, newest first.
pub async fn get_history(
    state: &SharedState,
    game_id: Uuid,
) -> Result<DrawHistoryResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(store.as_ref(), game_id).await?;
    let drawn = store.list_drawn_numbers(game_id).await?;
    Ok(DrawHistoryResponse {
        success: true,
        game: PublicGameRef::from(&game),
        history: DrawHistory::new(&drawn),
    })
}

/// Prize table of a game.
pub async fn get_prizes(
    state: &SharedState,
    game_id: Uuid,
) -> Result<PrizesResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let game = load_game(store.as_ref(), game_id).await?;
    Ok(PrizesResponse {
        success: true,
        game: PublicGameRef::from(&game),
        prizes: PrizeTable::from(&game),
    })
}
