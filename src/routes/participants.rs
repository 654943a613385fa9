use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::participant::{
        CreateParticipantRequest, ParticipantEnvelope, ParticipantListResponse, ParticipantQuery,
    },
    error::{AppError, ErrorBody},
    routes::extract::JsonBody,
    services::participant_service,
    state::SharedState,
};

/// Participant registration and lookup.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/participants",
            get(list_participants).post(create_participant),
        )
        .route("/admin/participants/{id}", get(get_participant))
}

/// List participants with their awarded tiers.
#[utoipa::path(
    get,
    path = "/api/admin/participants",
    tag = "participants",
    params(ParticipantQuery),
    responses(
        (status = 200, description = "Participants, newest first", body = ParticipantListResponse)
    )
)]
pub async fn list_participants(
    State(state): State<SharedState>,
    Query(query): Query<ParticipantQuery>,
) -> Result<Json<ParticipantListResponse>, AppError> {
    Ok(Json(participant_service::list_participants(&state, query).await?))
}

/// Register a participant and generate their card.
#[utoipa::path(
    post,
    path = "/api/admin/participants",
    tag = "participants",
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant registered", body = ParticipantEnvelope),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn create_participant(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<CreateParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantEnvelope>), AppError> {
    let created = participant_service::create_participant(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Retrieve a participant.
#[utoipa::path(
    get,
    path = "/api/admin/participants/{id}",
    tag = "participants",
    params(("id" = Uuid, Path, description = "Participant identifier")),
    responses(
        (status = 200, description = "Participant", body = ParticipantEnvelope),
        (status = 404, description = "Unknown participant", body = ErrorBody)
    )
)]
pub async fn get_participant(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ParticipantEnvelope>, AppError> {
    Ok(Json(participant_service::get_participant(&state, id).await?))
}
