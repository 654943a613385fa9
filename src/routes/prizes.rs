use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    dto::prize::{CatalogPrizeEnvelope, CatalogPrizeList, CreatePrizeRequest, UpdatePrizeRequest},
    error::{AppError, ErrorBody},
    routes::extract::JsonBody,
    services::prize_service,
    state::SharedState,
};

/// Prize catalog maintenance.
pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/admin/prizes",
        get(list_prizes).post(create_prize).put(update_prize),
    )
}

/// Every catalog prize, ordered by tier.
#[utoipa::path(
    get,
    path = "/api/admin/prizes",
    tag = "prizes",
    responses(
        (status = 200, description = "Catalog prizes", body = CatalogPrizeList),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn list_prizes(
    State(state): State<SharedState>,
) -> Result<Json<CatalogPrizeList>, AppError> {
    Ok(Json(prize_service::list_prizes(&state).await?))
}

/// Add a prize to the catalog.
#[utoipa::path(
    post,
    path = "/api/admin/prizes",
    tag = "prizes",
    request_body = CreatePrizeRequest,
    responses(
        (status = 201, description = "Prize created", body = CatalogPrizeEnvelope),
        (status = 400, description = "Missing type or title", body = ErrorBody)
    )
)]
pub async fn create_prize(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<CreatePrizeRequest>,
) -> Result<(StatusCode, Json<CatalogPrizeEnvelope>), AppError> {
    let created = prize_service::create_prize(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Patch a catalog prize.
#[utoipa::path(
    put,
    path = "/api/admin/prizes",
    tag = "prizes",
    request_body = UpdatePrizeRequest,
    responses(
        (status = 200, description = "Prize updated", body = CatalogPrizeEnvelope),
        (status = 400, description = "Missing id", body = ErrorBody),
        (status = 404, description = "Unknown prize", body = ErrorBody)
    )
)]
pub async fn update_prize(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<UpdatePrizeRequest>,
) -> Result<Json<CatalogPrizeEnvelope>, AppError> {
    Ok(Json(prize_service::update_prize(&state, payload).await?))
}
