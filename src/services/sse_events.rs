use crate::{
    dao::models::{ClaimEntity, DrawnNumberEntity, GameEntity},
    dto::{
        claim::ClaimView,
        game::GameView,
        sse::{
            ClaimValidatedEvent, GameChangedEvent, GameDeletedEvent, LivestreamChangedEvent,
            NumberDrawnEvent, SystemStatus,
        },
    },
    state::SharedState,
};

const EVENT_GAME_CREATED: &str = "game.created";
const EVENT_GAME_UPDATED: &str = "game.updated";
const EVENT_GAME_DELETED: &str = "game.deleted";
const EVENT_GAME_STARTED: &str = "game.started";
const EVENT_GAME_FINISHED: &str = "game.finished";
const EVENT_GAME_RESET: &str = "game.reset";
const EVENT_NUMBER_DRAWN: &str = "number.drawn";
const EVENT_CLAIM_VALIDATED: &str = "claim.validated";
const EVENT_GAME_LIVESTREAM: &str = "game.livestream";
const EVENT_SYSTEM_STATUS: &str = "system.status";

fn broadcast_game(state: &SharedState, event: &'static str, game: &GameEntity) {
    let payload = GameChangedEvent {
        game: GameView::from(game),
    };
    state.events().publish(event, &payload);
}

/// Announce a newly created game.
pub fn broadcast_game_created(state: &SharedState, game: &GameEntity) {
    broadcast_game(state, EVENT_GAME_CREATED, game);
}

/// Announce an edit of a game's name or prizes.
pub fn broadcast_game_updated(state: &SharedState, game: &GameEntity) {
    broadcast_game(state, EVENT_GAME_UPDATED, game);
}

/// Announce a deleted game.
pub fn broadcast_game_deleted(state: &SharedState, game_id: uuid::Uuid) {
    state
        .events()
        .publish(EVENT_GAME_DELETED, &GameDeletedEvent { game_id });
}

/// Announce the game that became active.
pub fn broadcast_game_started(state: &SharedState, game: &GameEntity) {
    broadcast_game(state, EVENT_GAME_STARTED, game);
}

/// Announce a game finished explicitly.
pub fn broadcast_game_finished(state: &SharedState, game: &GameEntity) {
    broadcast_game(state, EVENT_GAME_FINISHED, game);
}

/// Announce a game returned to `waiting`.
pub fn broadcast_game_reset(state: &SharedState, game: &GameEntity) {
    broadcast_game(state, EVENT_GAME_RESET, game);
}

/// Announce a committed draw together with the updated totals.
pub fn broadcast_number_drawn(
    state: &SharedState,
    record: &DrawnNumberEntity,
    total_drawn: usize,
    remaining: usize,
) {
    let payload = NumberDrawnEvent {
        game_id: record.game_id,
        number: record.number,
        is_manual: record.is_manual,
        total_drawn,
        remaining,
    };
    state.events().publish(EVENT_NUMBER_DRAWN, &payload);
}

/// Announce an awarded prize tier.
pub fn broadcast_claim_validated(
    state: &SharedState,
    claim: &ClaimEntity,
    winner: &str,
    prize: f64,
) {
    let payload = ClaimValidatedEvent {
        claim: ClaimView::from(claim),
        winner: winner.to_string(),
        prize,
    };
    state.events().publish(EVENT_CLAIM_VALIDATED, &payload);
}

/// Announce a livestream link change.
pub fn broadcast_livestream(state: &SharedState, game: &GameEntity) {
    let payload = LivestreamChangedEvent {
        game_id: game.id,
        youtube_live_url: game.settings.youtube_live_url.clone(),
    };
    state.events().publish(EVENT_GAME_LIVESTREAM, &payload);
}

/// Announce a change of the degraded flag.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    state
        .events()
        .publish(EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}
