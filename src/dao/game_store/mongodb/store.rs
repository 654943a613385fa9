use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Cursor, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::IndexOptions,
};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
    models::{
        CLAIM_COLLECTION, DRAWN_NUMBER_COLLECTION, GAME_COLLECTION, MongoClaimDocument,
        MongoDrawnNumberDocument, MongoGameDocument, MongoParticipantDocument,
        MongoPrizeDocument, PARTICIPANT_COLLECTION, PRIZE_COLLECTION, doc_id,
    },
};
use crate::dao::{
    game_store::GameStore,
    models::{
        ClaimEntity, ClaimFilter, ClaimType, DrawnNumberEntity, GameEntity, GameStatus,
        ParticipantEntity, ParticipantStatus, PrizeEntity,
    },
    storage::StorageResult,
};

/// [`GameStore`] backed by MongoDB collections.
#[derive(Clone)]
pub struct MongoGameStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = self.config.open().await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

struct IndexPlan {
    collection: &'static str,
    name: &'static str,
    keys: Document,
    unique: bool,
    partial: Option<Document>,
}

impl MongoGameStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = config.open().await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let plans = [
            IndexPlan {
                collection: GAME_COLLECTION,
                name: "game_status_idx",
                keys: doc! {"status": 1},
                unique: false,
                partial: None,
            },
            IndexPlan {
                collection: DRAWN_NUMBER_COLLECTION,
                name: "drawn_number_unique_idx",
                keys: doc! {"game_id": 1, "number": 1},
                unique: true,
                partial: None,
            },
            IndexPlan {
                collection: PARTICIPANT_COLLECTION,
                name: "participant_game_idx",
                keys: doc! {"game_id": 1, "created_at": -1},
                unique: false,
                partial: None,
            },
            // A single validated claim per tier and game; pending claims are unrestricted.
            IndexPlan {
                collection: CLAIM_COLLECTION,
                name: "claim_validated_unique_idx",
                keys: doc! {"game_id": 1, "claim_type": 1},
                unique: true,
                partial: Some(doc! {"validated": true}),
            },
        ];

        let database = self.database().await;
        for plan in plans {
            let index = IndexModel::builder()
                .keys(plan.keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(plan.name.to_owned()))
                        .unique(Some(plan.unique))
                        .partial_filter_expression(plan.partial)
                        .build(),
                )
                .build();

            database
                .collection::<Document>(plan.collection)
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: plan.collection,
                    index: plan.name,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<T: Send + Sync>(&self, name: &'static str) -> Collection<T> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<T>(name)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document = MongoGameDocument::from(game);
        self.collection::<MongoGameDocument>(GAME_COLLECTION)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::write(GAME_COLLECTION, id, source))?;
        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        self.collection::<MongoGameDocument>(GAME_COLLECTION)
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: GAME_COLLECTION,
                id: id.to_string(),
                source,
            })?
            .map(GameEntity::try_from)
            .transpose()
    }

    async fn list_games(&self, filter: Document) -> MongoResult<Vec<GameEntity>> {
        let cursor = self
            .collection::<MongoGameDocument>(GAME_COLLECTION)
            .await
            .find(filter)
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: GAME_COLLECTION,
                source,
            })?;
        collect_entities(GAME_COLLECTION, cursor).await
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<()> {
        let by_game = doc! {"game_id": id.to_string()};
        let dependents = [DRAWN_NUMBER_COLLECTION, PARTICIPANT_COLLECTION, CLAIM_COLLECTION];
        for collection in dependents {
            self.collection::<Document>(collection)
                .await
                .delete_many(by_game.clone())
                .await
                .map_err(|source| MongoDaoError::write(collection, id, source))?;
        }
        self.collection::<Document>(GAME_COLLECTION)
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::write(GAME_COLLECTION, id, source))?;
        Ok(())
    }

    async fn list_drawn_numbers(&self, game_id: Uuid) -> MongoResult<Vec<DrawnNumberEntity>> {
        let cursor = self
            .collection::<MongoDrawnNumberDocument>(DRAWN_NUMBER_COLLECTION)
            .await
            .find(doc! {"game_id": game_id.to_string()})
            .sort(doc! {"drawn_at": 1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: DRAWN_NUMBER_COLLECTION,
                source,
            })?;
        collect_entities(DRAWN_NUMBER_COLLECTION, cursor).await
    }

    async fn insert_drawn_number(&self, drawn: DrawnNumberEntity) -> MongoResult<()> {
        let id = drawn.id;
        let document = MongoDrawnNumberDocument::from(drawn);
        self.collection::<MongoDrawnNumberDocument>(DRAWN_NUMBER_COLLECTION)
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::write(DRAWN_NUMBER_COLLECTION, id, source))?;
        Ok(())
    }

    async fn remove_drawn_number(&self, game_id: Uuid, number: u8) -> MongoResult<()> {
        self.collection::<MongoDrawnNumberDocument>(DRAWN_NUMBER_COLLECTION)
            .await
            .delete_one(doc! {"game_id": game_id.to_string(), "number": i32::from(number)})
            .await
            .map_err(|source| {
                let id = format!("{game_id}/{number}");
                MongoDaoError::write(DRAWN_NUMBER_COLLECTION, id, source)
            })?;
        Ok(())
    }

    async fn clear_drawn_numbers(&self, game_id: Uuid) -> MongoResult<u64> {
        let result = self
            .collection::<MongoDrawnNumberDocument>(DRAWN_NUMBER_COLLECTION)
            .await
            .delete_many(doc! {"game_id": game_id.to_string()})
            .await
            .map_err(|source| MongoDaoError::write(DRAWN_NUMBER_COLLECTION, game_id, source))?;
        Ok(result.deleted_count)
    }

    async fn save_participant(&self, participant: ParticipantEntity) -> MongoResult<()> {
        let id = participant.id;
        let document = MongoParticipantDocument::from(participant);
        self.collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::write(PARTICIPANT_COLLECTION, id, source))?;
        Ok(())
    }

    async fn find_participant(
        &self,
        filter: Document,
        id: Uuid,
    ) -> MongoResult<Option<ParticipantEntity>> {
        self.collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: PARTICIPANT_COLLECTION,
                id: id.to_string(),
                source,
            })?
            .map(ParticipantEntity::try_from)
            .transpose()
    }

    async fn list_participants(
        &self,
        game_id: Option<Uuid>,
    ) -> MongoResult<Vec<ParticipantEntity>> {
        let filter = match game_id {
            Some(game_id) => doc! {"game_id": game_id.to_string()},
            None => doc! {},
        };
        let cursor = self
            .collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION)
            .await
            .find(filter)
            .sort(doc! {"created_at": -1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: PARTICIPANT_COLLECTION,
                source,
            })?;
        collect_entities(PARTICIPANT_COLLECTION, cursor).await
    }

    async fn reset_participants(&self, game_id: Uuid) -> MongoResult<u64> {
        let result = self
            .collection::<MongoParticipantDocument>(PARTICIPANT_COLLECTION)
            .await
            .update_many(
                doc! {"game_id": game_id.to_string()},
                doc! {"$set": {"status": ParticipantStatus::Waiting.as_str()}},
            )
            .await
            .map_err(|source| MongoDaoError::write(PARTICIPANT_COLLECTION, game_id, source))?;
        Ok(result.modified_count)
    }

    async fn insert_claim(&self, claim: ClaimEntity) -> MongoResult<()> {
        let id = claim.id;
        let document = MongoClaimDocument::from(claim);
        self.collection::<MongoClaimDocument>(CLAIM_COLLECTION)
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::write(CLAIM_COLLECTION, id, source))?;
        Ok(())
    }

    async fn save_claim(&self, claim: ClaimEntity) -> MongoResult<()> {
        let id = claim.id;
        let document = MongoClaimDocument::from(claim);
        self.collection::<MongoClaimDocument>(CLAIM_COLLECTION)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::write(CLAIM_COLLECTION, id, source))?;
        Ok(())
    }

    async fn find_claim(&self, filter: Document, id: String) -> MongoResult<Option<ClaimEntity>> {
        self.collection::<MongoClaimDocument>(CLAIM_COLLECTION)
            .await
            .find_one(filter)
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: CLAIM_COLLECTION,
                id,
                source,
            })?
            .map(ClaimEntity::try_from)
            .transpose()
    }

    async fn list_claims(&self, filter: ClaimFilter) -> MongoResult<Vec<ClaimEntity>> {
        let collection = self.collection::<MongoClaimDocument>(CLAIM_COLLECTION).await;
        let mut find = collection
            .find(claim_query(&filter))
            .sort(doc! {"created_at": -1});
        if let Some(limit) = filter.limit {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let cursor = find.await.map_err(|source| MongoDaoError::Query {
            collection: CLAIM_COLLECTION,
            source,
        })?;
        collect_entities(CLAIM_COLLECTION, cursor).await
    }

    async fn save_prize(&self, prize: PrizeEntity) -> MongoResult<()> {
        let id = prize.id;
        let document = MongoPrizeDocument::from(prize);
        self.collection::<MongoPrizeDocument>(PRIZE_COLLECTION)
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::write(PRIZE_COLLECTION, id, source))?;
        Ok(())
    }

    async fn find_prize(&self, id: Uuid) -> MongoResult<Option<PrizeEntity>> {
        self.collection::<MongoPrizeDocument>(PRIZE_COLLECTION)
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Load {
                collection: PRIZE_COLLECTION,
                id: id.to_string(),
                source,
            })?
            .map(PrizeEntity::try_from)
            .transpose()
    }

    async fn list_prizes(&self) -> MongoResult<Vec<PrizeEntity>> {
        let cursor = self
            .collection::<MongoPrizeDocument>(PRIZE_COLLECTION)
            .await
            .find(doc! {})
            .sort(doc! {"type": 1, "created_at": 1})
            .await
            .map_err(|source| MongoDaoError::Query {
                collection: PRIZE_COLLECTION,
                source,
            })?;
        collect_entities(PRIZE_COLLECTION, cursor).await
    }
}

fn claim_query(filter: &ClaimFilter) -> Document {
    let mut query = Document::new();
    if let Some(game_id) = filter.game_id {
        query.insert("game_id", game_id.to_string());
    }
    if filter.only_validated {
        query.insert("validated", true);
    }
    if let Some(since) = filter.since {
        let since = DateTime::from_system_time(since);
        query.insert(
            "$or",
            vec![
                doc! {"created_at": {"$gte": since}},
                doc! {"validated_at": {"$gte": since}},
            ],
        );
    }
    query
}

async fn collect_entities<D, E>(
    collection: &'static str,
    cursor: Cursor<D>,
) -> MongoResult<Vec<E>>
where
    D: DeserializeOwned + Unpin + Send + Sync,
    E: TryFrom<D, Error = MongoDaoError>,
{
    let documents: Vec<D> = cursor
        .try_collect()
        .await
        .map_err(|source| MongoDaoError::Query { collection, source })?;
    documents.into_iter().map(E::try_from).collect()
}

impl GameStore for MongoGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games(doc! {}).await.map_err(Into::into) })
    }

    fn list_games_by_status(
        &self,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let statuses: Vec<&str> = statuses.into_iter().map(GameStatus::as_str).collect();
            store
                .list_games(doc! {"status": {"$in": statuses}})
                .await
                .map_err(Into::into)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn list_drawn_numbers(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<DrawnNumberEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_drawn_numbers(game_id).await.map_err(Into::into) })
    }

    fn insert_drawn_number(
        &self,
        drawn: DrawnNumberEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_drawn_number(drawn).await.map_err(Into::into) })
    }

    fn remove_drawn_number(
        &self,
        game_id: Uuid,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .remove_drawn_number(game_id, number)
                .await
                .map_err(Into::into)
        })
    }

    fn clear_drawn_numbers(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.clear_drawn_numbers(game_id).await.map_err(Into::into) })
    }

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_participant(participant).await.map_err(Into::into) })
    }

    fn find_participant(
        &self,
        game_id: Uuid,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_participant(
                    doc! {"_id": id.to_string(), "game_id": game_id.to_string()},
                    id,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_participant_by_id(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_participant(doc_id(id), id).await.map_err(Into::into) })
    }

    fn list_participants(
        &self,
        game_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_participants(game_id).await.map_err(Into::into) })
    }

    fn reset_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.reset_participants(game_id).await.map_err(Into::into) })
    }

    fn insert_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_claim(claim).await.map_err(Into::into) })
    }

    fn save_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_claim(claim).await.map_err(Into::into) })
    }

    fn find_claim(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_claim(doc_id(id), id.to_string())
                .await
                .map_err(Into::into)
        })
    }

    fn find_validated_claim(
        &self,
        game_id: Uuid,
        claim_type: ClaimType,
    ) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let filter = doc! {
                "game_id": game_id.to_string(),
                "claim_type": claim_type.as_str(),
                "validated": true,
            };
            store
                .find_claim(filter, format!("{game_id}/{}", claim_type.as_str()))
                .await
                .map_err(Into::into)
        })
    }

    fn list_claims(
        &self,
        filter: ClaimFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<ClaimEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_claims(filter).await.map_err(Into::into) })
    }

    fn save_prize(&self, prize: PrizeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_prize(prize).await.map_err(Into::into) })
    }

    fn find_prize(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PrizeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_prize(id).await.map_err(Into::into) })
    }

    fn list_prizes(&self) -> BoxFuture<'static, StorageResult<Vec<PrizeEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_prizes().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
