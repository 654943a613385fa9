//! Process-local [`GameStore`] used for development and tests.

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{
        ClaimEntity, ClaimFilter, ClaimType, DrawnNumberEntity, GameEntity, GameStatus,
        ParticipantEntity, ParticipantStatus, PrizeEntity,
    },
    storage::{StorageError, StorageResult},
};

#[derive(Default)]
struct Tables {
    games: HashMap<Uuid, GameEntity>,
    drawn_numbers: Vec<DrawnNumberEntity>,
    participants: HashMap<Uuid, ParticipantEntity>,
    claims: HashMap<Uuid, ClaimEntity>,
    prizes: HashMap<Uuid, PrizeEntity>,
}

impl Tables {
    fn validated_claim_conflict(&self, claim: &ClaimEntity) -> bool {
        claim.validated
            && self.claims.values().any(|existing| {
                existing.id != claim.id
                    && existing.validated
                    && existing.game_id == claim.game_id
                    && existing.claim_type == claim.claim_type
            })
    }
}

/// In-memory store enforcing the same unique constraints as the database backends.
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryGameStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_games_first(mut games: Vec<GameEntity>) -> Vec<GameEntity> {
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    games
}

impl GameStore for InMemoryGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.games.get(&id).cloned()) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let games = tables.read().await.games.values().cloned().collect();
            Ok(newest_games_first(games))
        })
    }

    fn list_games_by_status(
        &self,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let games = tables
                .read()
                .await
                .games
                .values()
                .filter(|game| statuses.contains(&game.status))
                .cloned()
                .collect();
            Ok(newest_games_first(games))
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            guard.games.remove(&id);
            guard.drawn_numbers.retain(|drawn| drawn.game_id != id);
            guard.participants.retain(|_, participant| participant.game_id != id);
            guard.claims.retain(|_, claim| claim.game_id != id);
            Ok(())
        })
    }

    fn list_drawn_numbers(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<DrawnNumberEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .drawn_numbers
                .iter()
                .filter(|drawn| drawn.game_id == game_id)
                .cloned()
                .collect())
        })
    }

    fn insert_drawn_number(
        &self,
        drawn: DrawnNumberEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if guard
                .drawn_numbers
                .iter()
                .any(|existing| {
                    existing.game_id == drawn.game_id && existing.number == drawn.number
                })
            {
                return Err(StorageError::conflict(format!(
                    "number {} already drawn for game {}",
                    drawn.number, drawn.game_id
                )));
            }
            guard.drawn_numbers.push(drawn);
            Ok(())
        })
    }

    fn remove_drawn_number(
        &self,
        game_id: Uuid,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .drawn_numbers
                .retain(|drawn| !(drawn.game_id == game_id && drawn.number == number));
            Ok(())
        })
    }

    fn clear_drawn_numbers(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let before = guard.drawn_numbers.len();
            guard.drawn_numbers.retain(|drawn| drawn.game_id != game_id);
            Ok((before - guard.drawn_numbers.len()) as u64)
        })
    }

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables
                .write()
                .await
                .participants
                .insert(participant.id, participant);
            Ok(())
        })
    }

    fn find_participant(
        &self,
        game_id: Uuid,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .participants
                .get(&id)
                .filter(|participant| participant.game_id == game_id)
                .cloned())
        })
    }

    fn find_participant_by_id(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.participants.get(&id).cloned()) })
    }

    fn list_participants(
        &self,
        game_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut participants: Vec<ParticipantEntity> = tables
                .read()
                .await
                .participants
                .values()
                .filter(|participant| game_id.is_none_or(|id| participant.game_id == id))
                .cloned()
                .collect();
            participants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(participants)
        })
    }

    fn reset_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let mut updated = 0;
            for participant in guard
                .participants
                .values_mut()
                .filter(|participant| participant.game_id == game_id)
            {
                participant.status = ParticipantStatus::Waiting;
                updated += 1;
            }
            Ok(updated)
        })
    }

    fn insert_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if guard.claims.contains_key(&claim.id) {
                return Err(StorageError::conflict(format!(
                    "claim {} already exists",
                    claim.id
                )));
            }
            if guard.validated_claim_conflict(&claim) {
                return Err(StorageError::conflict(format!(
                    "{} already awarded for game {}",
                    claim.claim_type.as_str(),
                    claim.game_id
                )));
            }
            guard.claims.insert(claim.id, claim);
            Ok(())
        })
    }

    fn save_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            if guard.validated_claim_conflict(&claim) {
                return Err(StorageError::conflict(format!(
                    "{} already awarded for game {}",
                    claim.claim_type.as_str(),
                    claim.game_id
                )));
            }
            guard.claims.insert(claim.id, claim);
            Ok(())
        })
    }

    fn find_claim(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.claims.get(&id).cloned()) })
    }

    fn find_validated_claim(
        &self,
        game_id: Uuid,
        claim_type: ClaimType,
    ) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            Ok(tables
                .read()
                .await
                .claims
                .values()
                .find(|claim| {
                    claim.validated && claim.game_id == game_id && claim.claim_type == claim_type
                })
                .cloned())
        })
    }

    fn list_claims(
        &self,
        filter: ClaimFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<ClaimEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut claims: Vec<ClaimEntity> = tables
                .read()
                .await
                .claims
                .values()
                .filter(|claim| filter.matches(claim))
                .cloned()
                .collect();
            claims.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if let Some(limit) = filter.limit {
                claims.truncate(limit);
            }
            Ok(claims)
        })
    }

    fn save_prize(&self, prize: PrizeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            tables.write().await.prizes.insert(prize.id, prize);
            Ok(())
        })
    }

    fn find_prize(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PrizeEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.prizes.get(&id).cloned()) })
    }

    fn list_prizes(&self) -> BoxFuture<'static, StorageResult<Vec<PrizeEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut prizes: Vec<PrizeEntity> =
                tables.read().await.prizes.values().cloned().collect();
            prizes.sort_by(|a, b| {
                a.prize_type
                    .as_str()
                    .cmp(b.prize_type.as_str())
                    .then(a.created_at.cmp(&b.created_at))
            });
            Ok(prizes)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    fn drawn(game_id: Uuid, number: u8) -> DrawnNumberEntity {
        DrawnNumberEntity {
            id: Uuid::new_v4(),
            game_id,
            number,
            drawn_at: SystemTime::now(),
            is_manual: false,
        }
    }

    fn claim(game_id: Uuid, claim_type: ClaimType, validated: bool) -> ClaimEntity {
        ClaimEntity {
            id: Uuid::new_v4(),
            game_id,
            participant_id: Uuid::new_v4(),
            claim_type,
            validated,
            created_at: SystemTime::now(),
            validated_at: validated.then(SystemTime::now),
        }
    }

    #[tokio::test]
    async fn duplicate_drawn_number_is_a_conflict() {
        let store = InMemoryGameStore::new();
        let game_id = Uuid::new_v4();

        store.insert_drawn_number(drawn(game_id, 7)).await.unwrap();
        let err = store
            .insert_drawn_number(drawn(game_id, 7))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Same number in another game is fine.
        store
            .insert_drawn_number(drawn(Uuid::new_v4(), 7))
            .await
            .unwrap();
        assert_eq!(store.list_drawn_numbers(game_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drawn_numbers_keep_insertion_order() {
        let store = InMemoryGameStore::new();
        let game_id = Uuid::new_v4();
        for number in [42, 3, 75] {
            store.insert_drawn_number(drawn(game_id, number)).await.unwrap();
        }

        let numbers: Vec<u8> = store
            .list_drawn_numbers(game_id)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.number)
            .collect();
        assert_eq!(numbers, vec![42, 3, 75]);

        store.remove_drawn_number(game_id, 3).await.unwrap();
        assert_eq!(store.clear_drawn_numbers(game_id).await.unwrap(), 2);
        assert!(store.list_drawn_numbers(game_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_validated_claim_per_tier_is_rejected() {
        let store = InMemoryGameStore::new();
        let game_id = Uuid::new_v4();

        store
            .insert_claim(claim(game_id, ClaimType::Line, true))
            .await
            .unwrap();
        // Unvalidated claims and other tiers are not constrained.
        store
            .insert_claim(claim(game_id, ClaimType::Line, false))
            .await
            .unwrap();
        store
            .insert_claim(claim(game_id, ClaimType::Column, true))
            .await
            .unwrap();

        let err = store
            .insert_claim(claim(game_id, ClaimType::Line, true))
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn approving_a_pending_claim_respects_the_award_constraint() {
        let store = InMemoryGameStore::new();
        let game_id = Uuid::new_v4();
        store
            .insert_claim(claim(game_id, ClaimType::FullCard, true))
            .await
            .unwrap();

        let mut pending = claim(game_id, ClaimType::FullCard, false);
        store.insert_claim(pending.clone()).await.unwrap();
        pending.validated = true;
        assert!(store.save_claim(pending).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn deleting_a_game_drops_its_dependent_records() {
        let store = InMemoryGameStore::new();
        let game_id = Uuid::new_v4();
        let other_game = Uuid::new_v4();
        store.insert_drawn_number(drawn(game_id, 9)).await.unwrap();
        store.insert_drawn_number(drawn(other_game, 9)).await.unwrap();
        store
            .insert_claim(claim(game_id, ClaimType::Line, true))
            .await
            .unwrap();

        store.delete_game(game_id).await.unwrap();

        assert!(store.list_drawn_numbers(game_id).await.unwrap().is_empty());
        assert_eq!(store.list_drawn_numbers(other_game).await.unwrap().len(), 1);
        assert!(
            store
                .find_validated_claim(game_id, ClaimType::Line)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn list_claims_filters_and_limits_newest_first() {
        let store = InMemoryGameStore::new();
        let game_id = Uuid::new_v4();
        let base = SystemTime::now();
        for offset in 1..=5 {
            let mut entry = claim(game_id, ClaimType::Line, false);
            entry.created_at = base + Duration::from_secs(offset);
            store.insert_claim(entry).await.unwrap();
        }
        store
            .insert_claim(claim(Uuid::new_v4(), ClaimType::Line, false))
            .await
            .unwrap();

        let listed = store
            .list_claims(ClaimFilter {
                game_id: Some(game_id),
                since: Some(base),
                only_validated: false,
                limit: Some(3),
            })
            .await
            .unwrap();

        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(listed.iter().all(|c| c.game_id == game_id && c.created_at >= base));
    }
}
