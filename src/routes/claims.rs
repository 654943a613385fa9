use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};

use crate::{
    dto::claim::{
        ApproveClaimRequest, ClaimEnvelope, ClaimListResponse, ClaimQuery, CreateClaimRequest,
    },
    error::{AppError, ErrorBody},
    routes::extract::JsonBody,
    services::claim_service,
    state::SharedState,
};

/// Claim feed and operator overrides.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/claims", get(list_claims).post(create_claim))
        .route("/admin/claims/validate", post(approve_claim))
}

/// Latest claims of a game.
#[utoipa::path(
    get,
    path = "/api/admin/claims",
    tag = "claims",
    params(ClaimQuery),
    responses(
        (status = 200, description = "Claims, newest first, at most 50", body = ClaimListResponse),
        (status = 400, description = "Missing game_id", body = ErrorBody)
    )
)]
pub async fn list_claims(
    State(state): State<SharedState>,
    Query(query): Query<ClaimQuery>,
) -> Result<Json<ClaimListResponse>, AppError> {
    Ok(Json(claim_service::list_claims(&state, query).await?))
}

/// Record a pending claim.
#[utoipa::path(
    post,
    path = "/api/admin/claims",
    tag = "claims",
    request_body = CreateClaimRequest,
    responses(
        (status = 200, description = "Claim recorded", body = ClaimEnvelope),
        (status = 400, description = "Missing fields", body = ErrorBody)
    )
)]
pub async fn create_claim(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<CreateClaimRequest>,
) -> Result<Json<ClaimEnvelope>, AppError> {
    Ok(Json(claim_service::create_claim(&state, payload).await?))
}

/// Validate a pending claim without checking the card.
#[utoipa::path(
    post,
    path = "/api/admin/claims/validate",
    tag = "claims",
    request_body = ApproveClaimRequest,
    responses(
        (status = 200, description = "Claim validated", body = ClaimEnvelope),
        (status = 404, description = "Unknown claim", body = ErrorBody),
        (status = 409, description = "Tier already awarded", body = ErrorBody)
    )
)]
pub async fn approve_claim(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<ApproveClaimRequest>,
) -> Result<Json<ClaimEnvelope>, AppError> {
    Ok(Json(claim_service::approve_claim(&state, payload).await?))
}
