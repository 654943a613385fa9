use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        claim::{ValidateBingoRequest, ValidateBingoResponse},
        draw::{DrawResponse, ManualDrawRequest},
        game::{
            CreateGameRequest, GameActionResponse, GameDeletedResponse, GameEnvelope,
            GameListResponse, ResetQuery, UpdateGameRequest, UpdateYoutubeRequest,
            YoutubeUpdateResponse,
        },
    },
    error::{AppError, ErrorBody},
    routes::extract::JsonBody,
    services::{claim_service, draw_service, game_service},
    state::SharedState,
};

/// Game management, lifecycle and draw endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/games", get(list_games).post(create_game))
        .route(
            "/admin/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
        .route("/admin/games/{id}/start", post(start_game))
        .route("/admin/games/{id}/draw", post(draw_number))
        .route("/admin/games/{id}/draw-manual", post(draw_manual))
        .route("/admin/games/{id}/finish", post(finish_game))
        .route("/admin/games/{id}/reset", post(reset_game))
        .route("/admin/games/{id}/update-youtube", put(update_youtube))
        .route("/admin/games/{id}/validate-bingo", post(validate_bingo))
}

/// List every game with its drawn numbers and participants.
#[utoipa::path(
    get,
    path = "/api/admin/games",
    tag = "games",
    responses((status = 200, description = "Games, newest first", body = GameListResponse))
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<GameListResponse>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// Create a game in the waiting status.
#[utoipa::path(
    post,
    path = "/api/admin/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameEnvelope),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameEnvelope>), AppError> {
    let created = game_service::create_game(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Retrieve a game with its drawn numbers and participants.
#[utoipa::path(
    get,
    path = "/api/admin/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game", body = GameEnvelope),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameEnvelope>, AppError> {
    Ok(Json(game_service::get_game(&state, id).await?))
}

/// Edit a game's name and prize configuration.
#[utoipa::path(
    put,
    path = "/api/admin/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = UpdateGameRequest,
    responses(
        (status = 200, description = "Game updated", body = GameEnvelope),
        (status = 400, description = "Invalid payload", body = ErrorBody),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateGameRequest>,
) -> Result<Json<GameEnvelope>, AppError> {
    Ok(Json(game_service::update_game(&state, id, payload).await?))
}

/// Delete a game that is not active, with its draws, participants and claims.
#[utoipa::path(
    delete,
    path = "/api/admin/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game deleted", body = GameDeletedResponse),
        (status = 404, description = "Unknown game", body = ErrorBody),
        (status = 409, description = "Game is active", body = ErrorBody)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameDeletedResponse>, AppError> {
    Ok(Json(game_service::delete_game(&state, id).await?))
}

/// Activate a game, finishing any other active game.
#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/start",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game started", body = GameActionResponse),
        (status = 404, description = "Unknown game", body = ErrorBody),
        (status = 409, description = "Game already active or finished", body = ErrorBody)
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameActionResponse>, AppError> {
    Ok(Json(draw_service::start_game(&state, id).await?))
}

/// Draw a random number.
#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/draw",
    tag = "draws",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Number drawn", body = DrawResponse),
        (status = 404, description = "Unknown game", body = ErrorBody),
        (status = 409, description = "Game not active or all numbers drawn", body = ErrorBody)
    )
)]
pub async fn draw_number(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DrawResponse>, AppError> {
    Ok(Json(draw_service::draw_number(&state, id).await?))
}

/// Record a number chosen by the operator.
#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/draw-manual",
    tag = "draws",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = ManualDrawRequest,
    responses(
        (status = 200, description = "Number recorded", body = DrawResponse),
        (status = 400, description = "Out of range or already drawn", body = ErrorBody),
        (status = 409, description = "Game not active or all numbers drawn", body = ErrorBody)
    )
)]
pub async fn draw_manual(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<ManualDrawRequest>,
) -> Result<Json<DrawResponse>, AppError> {
    let request = payload.to_draw_request();
    Ok(Json(
        draw_service::draw_manual_number(&state, id, request).await?,
    ))
}

/// Close a game.
#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/finish",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Game finished", body = GameActionResponse),
        (status = 409, description = "Game already finished", body = ErrorBody)
    )
)]
pub async fn finish_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameActionResponse>, AppError> {
    Ok(Json(draw_service::finish_game(&state, id).await?))
}

/// Return a game to the waiting status and drop its drawn numbers.
#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/reset",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier"), ResetQuery),
    responses(
        (status = 200, description = "Game reset", body = GameActionResponse),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn reset_game(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<GameActionResponse>, AppError> {
    Ok(Json(
        draw_service::reset_game(&state, id, query.participants).await?,
    ))
}

/// Replace or clear the livestream link.
#[utoipa::path(
    put,
    path = "/api/admin/games/{id}/update-youtube",
    tag = "games",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = UpdateYoutubeRequest,
    responses(
        (status = 200, description = "Link updated", body = YoutubeUpdateResponse),
        (status = 400, description = "Not a YouTube link", body = ErrorBody)
    )
)]
pub async fn update_youtube(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<UpdateYoutubeRequest>,
) -> Result<Json<YoutubeUpdateResponse>, AppError> {
    Ok(Json(game_service::update_youtube(&state, id, payload).await?))
}

/// Validate a participant's bingo claim and award the tier.
#[utoipa::path(
    post,
    path = "/api/admin/games/{id}/validate-bingo",
    tag = "claims",
    params(("id" = Uuid, Path, description = "Game identifier")),
    request_body = ValidateBingoRequest,
    responses(
        (status = 200, description = "Claim validated", body = ValidateBingoResponse),
        (status = 400, description = "Missing fields or pattern not complete", body = ErrorBody),
        (status = 404, description = "Unknown game or participant", body = ErrorBody),
        (status = 409, description = "Tier already awarded", body = ErrorBody)
    )
)]
pub async fn validate_bingo(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    JsonBody(payload): JsonBody<ValidateBingoRequest>,
) -> Result<Json<ValidateBingoResponse>, AppError> {
    Ok(Json(claim_service::validate_claim(&state, id, payload).await?))
}
