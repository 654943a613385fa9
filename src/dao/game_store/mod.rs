pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;
#[cfg(feature = "rest-store")]
pub mod postgrest;

use crate::dao::models::{
    ClaimEntity, ClaimFilter, ClaimType, DrawnNumberEntity, GameEntity, GameStatus,
    ParticipantEntity, PrizeEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for games, draws, participants and claims.
///
/// Implementations must enforce two unique constraints and report violations as
/// [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict):
/// `(game_id, number)` on drawn numbers, and `(game_id, claim_type)` across validated claims.
pub trait GameStore: Send + Sync {
    /// Insert or replace a game.
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// All games, newest first.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn list_games_by_status(
        &self,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Delete a game together with its drawn numbers, participants and claims.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>>;

    /// Drawn numbers of a game in draw order.
    fn list_drawn_numbers(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<DrawnNumberEntity>>>;
    fn insert_drawn_number(
        &self,
        drawn: DrawnNumberEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove a single drawn number, used to undo a partially applied draw.
    fn remove_drawn_number(&self, game_id: Uuid, number: u8)
    -> BoxFuture<'static, StorageResult<()>>;
    /// Delete every drawn number of a game, returning how many were removed.
    fn clear_drawn_numbers(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Participant lookup scoped to a game.
    fn find_participant(
        &self,
        game_id: Uuid,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>>;
    fn find_participant_by_id(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>>;
    /// Participants, newest first, optionally restricted to one game.
    fn list_participants(
        &self,
        game_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>>;
    /// Put every participant of a game back into the waiting status.
    fn reset_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>>;

    fn insert_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing claim.
    fn save_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_claim(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>>;
    fn find_validated_claim(
        &self,
        game_id: Uuid,
        claim_type: ClaimType,
    ) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>>;
    /// Claims matching the filter, newest first.
    fn list_claims(&self, filter: ClaimFilter)
    -> BoxFuture<'static, StorageResult<Vec<ClaimEntity>>>;

    /// Insert or replace a catalog prize.
    fn save_prize(&self, prize: PrizeEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_prize(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PrizeEntity>>>;
    /// Catalog prizes ordered by tier.
    fn list_prizes(&self) -> BoxFuture<'static, StorageResult<Vec<PrizeEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
