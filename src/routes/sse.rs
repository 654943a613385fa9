use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/api/admin/events",
    tag = "sse",
    responses((
        status = 200,
        description = "Admin event stream",
        content_type = "text/event-stream",
        body = String
    ))
)]
/// Stream lifecycle, draw and claim events to the admin panel.
pub async fn admin_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (receiver, greeting) = sse_service::subscribe_admin(&state);
    info!(
        subscribers = state.events().subscriber_count(),
        "new admin SSE connection"
    );
    sse_service::to_sse_stream(receiver, greeting)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/admin/events", get(admin_events))
}
