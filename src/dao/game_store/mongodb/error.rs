use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB database `{database}` did not answer the connection ping")]
    Unreachable {
        database: String,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("unique index violated in collection `{collection}`")]
    DuplicateKey {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to write `{id}` to collection `{collection}`")]
    Write {
        collection: &'static str,
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to read `{id}` from collection `{collection}`")]
    Load {
        collection: &'static str,
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to query collection `{collection}`")]
    Query {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("document `{value}` in collection `{collection}` has a malformed identifier")]
    InvalidIdentifier {
        collection: &'static str,
        value: String,
        #[source]
        source: uuid::Error,
    },
}

impl MongoDaoError {
    /// Classify a failed write, separating unique index violations from other failures.
    pub fn write(collection: &'static str, id: impl ToString, source: MongoError) -> Self {
        if is_duplicate_key(&source) {
            MongoDaoError::DuplicateKey { collection, source }
        } else {
            MongoDaoError::Write {
                collection,
                id: id.to_string(),
                source,
            }
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}
