use thiserror::Error;

use crate::dao::models::GameStatus;

/// Events that can be applied to a game's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Operator starts the game.
    Start,
    /// Operator closes the game.
    Finish,
    /// Another game was started while this one was active.
    Supersede,
    /// Operator returns the game to its pre-start condition.
    Reset,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {}", from.as_str())]
pub struct InvalidTransition {
    /// The status the game was in when the invalid event was received.
    pub from: GameStatus,
    /// The event that cannot be applied from this status.
    pub event: GameEvent,
}

impl InvalidTransition {
    /// Operator-facing explanation of the rejection.
    pub fn message(&self) -> String {
        match (self.event, self.from) {
            (GameEvent::Start, GameStatus::Active) => "Jogo já está ativo".into(),
            (GameEvent::Start | GameEvent::Finish, GameStatus::Finished) => {
                "Jogo já foi finalizado".into()
            }
            _ => self.to_string(),
        }
    }
}

/// Compute the status reached by applying `event` to `from`.
///
/// `waiting -> active -> finished`, with reset returning either state to `waiting`.
/// Resetting a waiting game is accepted so reset stays idempotent.
pub fn next_status(from: GameStatus, event: GameEvent) -> Result<GameStatus, InvalidTransition> {
    use GameEvent::*;
    use GameStatus::*;

    match (from, event) {
        (Waiting, Start) => Ok(Active),
        (Waiting | Active, Finish) => Ok(Finished),
        (Active, Supersede) => Ok(Finished),
        (_, Reset) => Ok(Waiting),
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(from: GameStatus, event: GameEvent) -> GameStatus {
        next_status(from, event).unwrap()
    }

    #[test]
    fn full_happy_path_through_game() {
        let mut status = GameStatus::Waiting;
        status = apply(status, GameEvent::Start);
        assert_eq!(status, GameStatus::Active);
        status = apply(status, GameEvent::Finish);
        assert_eq!(status, GameStatus::Finished);
        status = apply(status, GameEvent::Reset);
        assert_eq!(status, GameStatus::Waiting);
        assert_eq!(apply(status, GameEvent::Start), GameStatus::Active);
    }

    #[test]
    fn active_game_cannot_start_again() {
        let err = next_status(GameStatus::Active, GameEvent::Start).unwrap_err();
        assert_eq!(err.from, GameStatus::Active);
        assert_eq!(err.event, GameEvent::Start);
        assert_eq!(err.message(), "Jogo já está ativo");
    }

    #[test]
    fn finished_game_needs_reset_before_start() {
        assert!(next_status(GameStatus::Finished, GameEvent::Start).is_err());
        assert!(next_status(GameStatus::Finished, GameEvent::Finish).is_err());
    }

    #[test]
    fn waiting_game_can_be_finished_directly() {
        assert_eq!(apply(GameStatus::Waiting, GameEvent::Finish), GameStatus::Finished);
    }

    #[test]
    fn only_active_games_are_superseded() {
        assert_eq!(
            apply(GameStatus::Active, GameEvent::Supersede),
            GameStatus::Finished
        );
        assert!(next_status(GameStatus::Waiting, GameEvent::Supersede).is_err());
        assert!(next_status(GameStatus::Finished, GameEvent::Supersede).is_err());
    }

    #[test]
    fn reset_is_accepted_from_every_status() {
        for from in [GameStatus::Waiting, GameStatus::Active, GameStatus::Finished] {
            assert_eq!(apply(from, GameEvent::Reset), GameStatus::Waiting);
        }
    }
}
