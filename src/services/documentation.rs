use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for the bingo admin back-office.
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::sse::admin_events,
        crate::routes::game::list_games,
        crate::routes::game::create_game,
        crate::routes::game::get_game,
        crate::routes::game::update_game,
        crate::routes::game::delete_game,
        crate::routes::game::start_game,
        crate::routes::game::draw_number,
        crate::routes::game::draw_manual,
        crate::routes::game::finish_game,
        crate::routes::game::reset_game,
        crate::routes::game::update_youtube,
        crate::routes::game::validate_bingo,
        crate::routes::claims::list_claims,
        crate::routes::claims::create_claim,
        crate::routes::claims::approve_claim,
        crate::routes::participants::list_participants,
        crate::routes::participants::create_participant,
        crate::routes::participants::get_participant,
        crate::routes::prizes::list_prizes,
        crate::routes::prizes::create_prize,
        crate::routes::prizes::update_prize,
        crate::routes::public::list_games,
        crate::routes::public::get_game,
        crate::routes::public::get_history,
        crate::routes::public::get_prizes,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::dto::health::HealthResponse,
            crate::dto::sse::Handshake,
            crate::dto::sse::GameChangedEvent,
            crate::dto::sse::GameDeletedEvent,
            crate::dto::sse::NumberDrawnEvent,
            crate::dto::sse::ClaimValidatedEvent,
            crate::dto::sse::LivestreamChangedEvent,
            crate::dto::sse::SystemStatus,
            crate::dao::models::ClaimType,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Admin session management"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "games", description = "Game records and lifecycle"),
        (name = "draws", description = "Number drawing"),
        (name = "claims", description = "Bingo claims and prize awards"),
        (name = "participants", description = "Participant registration"),
        (name = "prizes", description = "Prize catalog per claim tier"),
        (name = "android", description = "Read-only configuration for the mobile client"),
    )
)]
pub struct ApiDoc;
