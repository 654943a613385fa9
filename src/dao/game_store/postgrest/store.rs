use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
    models::{
        CLAIM_TABLE, ClaimRow, DRAWN_NUMBER_TABLE, DrawnNumberRow, GAME_TABLE, GameRow,
        PARTICIPANT_TABLE, PRIZE_TABLE, ParticipantRow, PrizeRow,
    },
};
use crate::{
    dao::{
        game_store::GameStore,
        models::{
            ClaimEntity, ClaimFilter, ClaimType, DrawnNumberEntity, GameEntity, GameStatus,
            ParticipantEntity, ParticipantStatus, PrizeEntity,
        },
        storage::StorageResult,
    },
    dto::format_system_time,
};

const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=minimal";
const PREFER_MINIMAL: &str = "return=minimal";
const PREFER_REPRESENTATION: &str = "return=representation";

type Query = Vec<(&'static str, String)>;

/// [`GameStore`] talking to a PostgREST endpoint such as Supabase.
#[derive(Clone)]
pub struct RestGameStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl RestGameStore {
    /// Build the HTTP client and check that the `games` table answers.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
            api_key: config.api_key.map(Arc::<str>::from),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        let builder = self.client.request(method, url);
        match self.api_key {
            Some(ref key) => builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref()),
            None => builder,
        }
    }

    async fn send(table: &'static str, builder: RequestBuilder) -> RestResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend { table, source })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RestDaoError::RequestStatus {
                table,
                status: response.status(),
            })
        }
    }

    async fn ping(&self) -> RestResult<()> {
        let builder = self
            .request(Method::GET, GAME_TABLE)
            .query(&[("select", "id"), ("limit", "1")]);
        Self::send(GAME_TABLE, builder).await?;
        Ok(())
    }

    async fn select<R, E>(&self, table: &'static str, query: Query) -> RestResult<Vec<E>>
    where
        R: DeserializeOwned,
        E: TryFrom<R, Error = RestDaoError>,
    {
        let builder = self.request(Method::GET, table).query(&query);
        let rows = Self::send(table, builder)
            .await?
            .json::<Vec<R>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse { table, source })?;
        rows.into_iter().map(E::try_from).collect()
    }

    async fn select_one<R, E>(
        &self,
        table: &'static str,
        mut query: Query,
    ) -> RestResult<Option<E>>
    where
        R: DeserializeOwned,
        E: TryFrom<R, Error = RestDaoError>,
    {
        query.push(("limit", "1".to_owned()));
        Ok(self.select::<R, E>(table, query).await?.into_iter().next())
    }

    async fn write<T>(&self, table: &'static str, row: &T, prefer: &str) -> RestResult<()>
    where
        T: ?Sized + Serialize,
    {
        let builder = self
            .request(Method::POST, table)
            .header("Prefer", prefer)
            .json(row);
        Self::send(table, builder).await?;
        Ok(())
    }

    /// Run a mutating request and count the rows it touched.
    async fn affected(&self, table: &'static str, builder: RequestBuilder) -> RestResult<u64> {
        let rows = Self::send(table, builder.header("Prefer", PREFER_REPRESENTATION))
            .await?
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse { table, source })?;
        Ok(rows.len() as u64)
    }

    async fn delete_drawn(&self, query: Query) -> RestResult<u64> {
        let builder = self.request(Method::DELETE, DRAWN_NUMBER_TABLE).query(&query);
        self.affected(DRAWN_NUMBER_TABLE, builder).await
    }

    async fn delete_game(&self, id: Uuid) -> RestResult<()> {
        for table in [DRAWN_NUMBER_TABLE, PARTICIPANT_TABLE, CLAIM_TABLE] {
            let builder = self
                .request(Method::DELETE, table)
                .query(&[eq("game_id", id)]);
            Self::send(table, builder).await?;
        }
        let builder = self
            .request(Method::DELETE, GAME_TABLE)
            .query(&[eq("id", id)]);
        Self::send(GAME_TABLE, builder).await?;
        Ok(())
    }

    async fn reset_participants(&self, game_id: Uuid) -> RestResult<u64> {
        let builder = self
            .request(Method::PATCH, PARTICIPANT_TABLE)
            .query(&[eq("game_id", game_id)])
            .json(&serde_json::json!({ "status": ParticipantStatus::Waiting.as_str() }));
        self.affected(PARTICIPANT_TABLE, builder).await
    }
}

fn eq(column: &'static str, value: impl ToString) -> (&'static str, String) {
    (column, format!("eq.{}", value.to_string()))
}

fn order(column: &str, direction: &str) -> (&'static str, String) {
    ("order", format!("{column}.{direction}"))
}

fn claim_query(filter: &ClaimFilter) -> Query {
    let mut query = vec![order("created_at", "desc")];
    if let Some(game_id) = filter.game_id {
        query.push(eq("game_id", game_id));
    }
    if filter.only_validated {
        query.push(("validated", "is.true".to_owned()));
    }
    if let Some(since) = filter.since {
        let since = format_system_time(since);
        query.push((
            "or",
            format!("(created_at.gte.{since},validated_at.gte.{since})"),
        ));
    }
    if let Some(limit) = filter.limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

impl GameStore for RestGameStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = GameRow::from(game);
            store
                .write(GAME_TABLE, &row, PREFER_UPSERT)
                .await
                .map_err(Into::into)
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one::<GameRow, GameEntity>(GAME_TABLE, vec![eq("id", id)])
                .await
                .map_err(Into::into)
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select::<GameRow, GameEntity>(GAME_TABLE, vec![order("created_at", "desc")])
                .await
                .map_err(Into::into)
        })
    }

    fn list_games_by_status(
        &self,
        statuses: Vec<GameStatus>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let statuses: Vec<&str> = statuses.into_iter().map(GameStatus::as_str).collect();
            let query = vec![
                ("status", format!("in.({})", statuses.join(","))),
                order("created_at", "desc"),
            ];
            store
                .select::<GameRow, GameEntity>(GAME_TABLE, query)
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
        Box::pin(async move {
            let query = vec![eq("game_id", game_id), order("drawn_at", "asc")];
            store
                .select::<DrawnNumberRow, DrawnNumberEntity>(DRAWN_NUMBER_TABLE, query)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_drawn_number(
        &self,
        drawn: DrawnNumberEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = DrawnNumberRow::from(drawn);
            store
                .write(DRAWN_NUMBER_TABLE, &row, PREFER_MINIMAL)
                .await
                .map_err(Into::into)
        })
    }

    fn remove_drawn_number(
        &self,
        game_id: Uuid,
        number: u8,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_drawn(vec![eq("game_id", game_id), eq("number", number)])
                .await
                .map(|_| ())
                .map_err(Into::into)
        })
    }

    fn clear_drawn_numbers(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_drawn(vec![eq("game_id", game_id)])
                .await
                .map_err(Into::into)
        })
    }

    fn save_participant(
        &self,
        participant: ParticipantEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = ParticipantRow::from(participant);
            store
                .write(PARTICIPANT_TABLE, &row, PREFER_UPSERT)
                .await
                .map_err(Into::into)
        })
    }

    fn find_participant(
        &self,
        game_id: Uuid,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one::<ParticipantRow, ParticipantEntity>(
                    PARTICIPANT_TABLE,
                    vec![eq("id", id), eq("game_id", game_id)],
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
        Box::pin(async move {
            store
                .select_one::<ParticipantRow, ParticipantEntity>(
                    PARTICIPANT_TABLE,
                    vec![eq("id", id)],
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_participants(
        &self,
        game_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ParticipantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = vec![order("created_at", "desc")];
            if let Some(game_id) = game_id {
                query.push(eq("game_id", game_id));
            }
            store
                .select::<ParticipantRow, ParticipantEntity>(PARTICIPANT_TABLE, query)
                .await
                .map_err(Into::into)
        })
    }

    fn reset_participants(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.reset_participants(game_id).await.map_err(Into::into) })
    }

    fn insert_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = ClaimRow::from(claim);
            store
                .write(CLAIM_TABLE, &row, PREFER_MINIMAL)
                .await
                .map_err(Into::into)
        })
    }

    fn save_claim(&self, claim: ClaimEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = ClaimRow::from(claim);
            store
                .write(CLAIM_TABLE, &row, PREFER_UPSERT)
                .await
                .map_err(Into::into)
        })
    }

    fn find_claim(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ClaimEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one::<ClaimRow, ClaimEntity>(CLAIM_TABLE, vec![eq("id", id)])
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
            let query = vec![
                eq("game_id", game_id),
                eq("claim_type", claim_type.as_str()),
                ("validated", "is.true".to_owned()),
            ];
            store
                .select_one::<ClaimRow, ClaimEntity>(CLAIM_TABLE, query)
                .await
                .map_err(Into::into)
        })
    }

    fn list_claims(
        &self,
        filter: ClaimFilter,
    ) -> BoxFuture<'static, StorageResult<Vec<ClaimEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select::<ClaimRow, ClaimEntity>(CLAIM_TABLE, claim_query(&filter))
                .await
                .map_err(Into::into)
        })
    }

    fn save_prize(&self, prize: PrizeEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = PrizeRow::from(prize);
            store
                .write(PRIZE_TABLE, &row, PREFER_UPSERT)
                .await
                .map_err(Into::into)
        })
    }

    fn find_prize(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<PrizeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select_one::<PrizeRow, PrizeEntity>(PRIZE_TABLE, vec![eq("id", id)])
                .await
                .map_err(Into::into)
        })
    }

    fn list_prizes(&self) -> BoxFuture<'static, StorageResult<Vec<PrizeEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = vec![("order", "type.asc,created_at.asc".to_owned())];
            store
                .select::<PrizeRow, PrizeEntity>(PRIZE_TABLE, query)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        // Stateless HTTP: a successful round trip is a reconnect.
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;

    #[test]
    fn claim_query_uses_postgrest_operators() {
        let game_id = Uuid::new_v4();
        let since = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let query = claim_query(&ClaimFilter {
            game_id: Some(game_id),
            since: Some(since),
            only_validated: true,
            limit: Some(50),
        });

        assert!(query.contains(&("game_id", format!("eq.{game_id}"))));
        assert!(query.contains(&("validated", "is.true".to_owned())));
        assert!(query.contains(&(
            "or",
            "(created_at.gte.2023-11-14T22:13:20Z,validated_at.gte.2023-11-14T22:13:20Z)"
                .to_owned()
        )));
        assert!(query.contains(&("limit", "50".to_owned())));
        assert_eq!(query[0], ("order", "created_at.desc".to_owned()));
    }

    #[test]
    fn conflicts_are_recognised_by_status() {
        let err = RestDaoError::RequestStatus {
            table: CLAIM_TABLE,
            status: reqwest::StatusCode::CONFLICT,
        };
        assert!(err.is_conflict());
        let err = RestDaoError::RequestStatus {
            table: CLAIM_TABLE,
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert!(!err.is_conflict());
    }
}
