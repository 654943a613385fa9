use mongodb::{Client, Database, bson::doc, options::ClientOptions};

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "bingo_admin";

/// Connection settings for the MongoDB backend.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
}

impl MongoConfig {
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let database_name = db_name.unwrap_or(DEFAULT_DATABASE).to_owned();
        let options =
            ClientOptions::parse(uri)
                .await
                .map_err(|source| MongoDaoError::InvalidUri {
                    uri: uri.to_owned(),
                    source,
                })?;

        Ok(Self {
            options,
            database_name,
        })
    }

    /// Read `MONGO_URI` and `MONGO_DB`, defaulting to a local server.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI").unwrap_or_else(|_| DEFAULT_URI.to_owned());
        let db = std::env::var("MONGO_DB").ok();
        Self::from_uri(&uri, db.as_deref()).await
    }

    /// Build a client and check once that the database answers. Retries and back-off
    /// belong to the storage supervisor.
    pub(super) async fn open(&self) -> MongoResult<(Client, Database)> {
        let client = Client::with_options(self.options.clone())
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database = client.database(&self.database_name);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::Unreachable {
                database: self.database_name.clone(),
                source,
            })?;
        Ok((client, database))
    }
}
