use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::public::{DrawHistoryResponse, PrizesResponse, PublicGameEnvelope, PublicGameList},
    error::{AppError, ErrorBody},
    services::public_service,
    state::SharedState,
};

/// Unauthenticated endpoints consumed by the mobile client.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/android/games", get(list_games))
        .route("/android/games/{id}", get(get_game))
        .route("/android/games/{id}/history", get(get_history))
        .route("/android/prizes/{game_id}", get(get_prizes))
}

/// Games that are waiting or active.
#[utoipa::path(
    get,
    path = "/api/android/games",
    operation_id = "android_list_games",
    tag = "android",
    responses((status = 200, description = "Open games", body = PublicGameList))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<PublicGameList>, AppError> {
    Ok(Json(public_service::list_open_games(&state).await?))
}

/// One game with draw totals.
#[utoipa::path(
    get,
    path = "/api/android/games/{id}",
    operation_id = "android_get_game",
    tag = "android",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game", body = PublicGameEnvelope),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicGameEnvelope>, AppError> {
    Ok(Json(public_service::get_game(&state, id).await?))
}

/// Drawn numbers of a game, newest first.
#[utoipa::path(
    get,
    path = "/api/android/games/{id}/history",
    operation_id = "android_get_history",
    tag = "android",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Draw history", body = DrawHistoryResponse),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_history(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DrawHistoryResponse>, AppError> {
    Ok(Json(public_service::get_history(&state, id).await?))
}

/// Prize table of a game.
#[utoipa::path(
    get,
    path = "/api/android/prizes/{game_id}",
    operation_id = "android_get_prizes",
    tag = "android",
    params(("game_id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Prizes", body = PrizesResponse),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_prizes(
    State(state): State<SharedState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<PrizesResponse>, AppError> {
    Ok(Json(public_service::get_prizes(&state, game_id).await?))
}
