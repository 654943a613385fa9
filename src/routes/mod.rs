use axum::{Router, middleware};

use crate::state::SharedState;

pub mod auth;
pub mod claims;
pub mod docs;
pub mod extract;
pub mod game;
pub mod health;
pub mod participants;
pub mod prizes;
pub mod public;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let admin_router = game::router()
        .merge(claims::router())
        .merge(participants::router())
        .merge(prizes::router())
        .merge(auth::router())
        .merge(sse::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_session,
        ));

    let api_router = admin_router
        .merge(auth::public_router())
        .merge(public::router())
        .merge(health::router());

    Router::new()
        .nest("/api", api_router)
        .merge(docs::router())
        .with_state(state)
}
