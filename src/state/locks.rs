//! In-process serialization of read-decide-write sequences.
//!
//! Starting a game touches several games at once, so it takes the lifecycle lock exclusively.
//! Every other lifecycle operation and every draw holds the lifecycle lock shared plus the
//! mutex of its game. Claim decisions are serialized per `(game_id, claim_type)`, and win
//! bookkeeping per participant.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::dao::models::ClaimType;

/// Registry of per-game and per-tier locks.
#[derive(Default)]
pub struct GameLocks {
    lifecycle: RwLock<()>,
    games: DashMap<Uuid, Arc<Mutex<()>>>,
    claims: DashMap<(Uuid, ClaimType), Arc<Mutex<()>>>,
    participants: DashMap<Uuid, Arc<Mutex<()>>>,
}

/// Held while a single game is mutated.
pub struct GameGuard<'a> {
    _lifecycle: RwLockReadGuard<'a, ()>,
    _game: OwnedMutexGuard<()>,
}

impl GameLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive access to every game, used when switching the active game.
    pub async fn lock_all(&self) -> RwLockWriteGuard<'_, ()> {
        self.lifecycle.write().await
    }

    /// Exclusive access to one game.
    pub async fn lock_game(&self, game_id: Uuid) -> GameGuard<'_> {
        let lifecycle = self.lifecycle.read().await;
        let mutex = self.games.entry(game_id).or_default().clone();
        GameGuard {
            _lifecycle: lifecycle,
            _game: mutex.lock_owned().await,
        }
    }

    /// Exclusive right to award one prize tier of a game.
    pub async fn lock_claim(&self, game_id: Uuid, claim_type: ClaimType) -> OwnedMutexGuard<()> {
        let mutex = self.claims.entry((game_id, claim_type)).or_default().clone();
        mutex.lock_owned().await
    }

    /// Exclusive right to update one participant's win record.
    pub async fn lock_participant(&self, participant_id: Uuid) -> OwnedMutexGuard<()> {
        let mutex = self.participants.entry(participant_id).or_default().clone();
        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn same_game_is_exclusive() {
        let locks = GameLocks::new();
        let id = Uuid::new_v4();
        let _held = locks.lock_game(id).await;

        assert!(
            timeout(Duration::from_millis(50), locks.lock_game(id))
                .await
                .is_err()
        );
        // Other games stay available.
        assert!(
            timeout(Duration::from_millis(50), locks.lock_game(Uuid::new_v4()))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn lock_all_waits_for_game_guards() {
        let locks = GameLocks::new();
        let held = locks.lock_game(Uuid::new_v4()).await;
        assert!(
            timeout(Duration::from_millis(50), locks.lock_all())
                .await
                .is_err()
        );
        drop(held);
        assert!(
            timeout(Duration::from_millis(50), locks.lock_all())
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn claim_locks_are_per_tier() {
        let locks = GameLocks::new();
        let id = Uuid::new_v4();
        let _line = locks.lock_claim(id, ClaimType::Line).await;
        assert!(
            timeout(Duration::from_millis(50), locks.lock_claim(id, ClaimType::Line))
                .await
                .is_err()
        );
        assert!(
            timeout(Duration::from_millis(50), locks.lock_claim(id, ClaimType::Column))
                .await
                .is_ok()
        );
    }
}
