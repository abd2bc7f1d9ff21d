//! SurrealDB-backed movie store
//!
//! Supports runtime protocol selection via URL scheme:
//! - `ws://` / `wss://` - WebSocket connections
//! - `http://` / `https://` - HTTP connections
//! - `mem://` - In-memory database (for testing)
//!
//! Records live in one table keyed by the external identifier string, so a
//! lookup is a direct record fetch.

use serde::{Deserialize, Serialize};

use super::{MovieStore, StoreError, StoreErrorKind, StoreOperation, StoreResult};
use crate::config::StoreConfig;
use crate::ids::MovieId;
use crate::models::{Movie, NewMovie};

/// SurrealDB client type alias using the `Any` engine for runtime protocol selection
type SurrealClient = surrealdb::Surreal<surrealdb::engine::any::Any>;

const LIST_QUERY: &str =
    "SELECT record::id(id) AS key, title, director, year FROM type::table($table) LIMIT $limit START $start";

const COUNT_QUERY: &str = "SELECT count() AS total FROM type::table($table) GROUP ALL";

/// Stored document body. The record key carries the identifier.
#[derive(Debug, Serialize, Deserialize)]
struct MovieDocument {
    title: String,
    director: String,
    year: i64,
}

#[derive(Debug, Deserialize)]
struct MovieRow {
    key: String,
    title: String,
    director: String,
    year: i64,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// Movie store over a SurrealDB table
#[derive(Clone)]
pub struct SurrealMovieStore {
    client: SurrealClient,
    table: String,
}

impl SurrealMovieStore {
    /// Connects, authenticates when credentials are configured, and selects
    /// the namespace and database.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] with [`StoreOperation::Connect`] if any step fails.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let url_safe = sanitize_connection_url(&config.url);
        tracing::debug!("Connecting to SurrealDB: {}", url_safe);

        let client = surrealdb::engine::any::connect(&config.url)
            .await
            .map_err(|e| connect_error(&url_safe, &e))?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client
                .signin(surrealdb::opt::auth::Root { username, password })
                .await
                .map_err(|e| connect_error(&url_safe, &e))?;
        }

        client
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| connect_error(&url_safe, &e))?;

        tracing::info!(
            "SurrealDB connected: url={}, ns={}, db={}, table={}",
            url_safe,
            config.namespace,
            config.database,
            config.table
        );

        Ok(Self::from_client(client, config.table.clone()))
    }

    fn from_client(client: SurrealClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

impl MovieStore for SurrealMovieStore {
    async fn find_page(&self, skip: u64, limit: u64) -> StoreResult<Vec<Movie>> {
        let mut response = self
            .client
            .query(LIST_QUERY)
            .bind(("table", self.table.clone()))
            .bind(("limit", limit))
            .bind(("start", skip))
            .await
            .map_err(|e| store_error(StoreOperation::Find, &e))?;

        let rows: Vec<MovieRow> = response
            .take(0)
            .map_err(|e| store_error(StoreOperation::Find, &e))?;

        rows.into_iter().map(MovieRow::into_movie).collect()
    }

    async fn estimated_count(&self) -> StoreResult<u64> {
        let mut response = self
            .client
            .query(COUNT_QUERY)
            .bind(("table", self.table.clone()))
            .await
            .map_err(|e| store_error(StoreOperation::Count, &e))?;

        let row: Option<CountRow> = response
            .take(0)
            .map_err(|e| store_error(StoreOperation::Count, &e))?;

        // An empty table yields no group row
        Ok(row.map_or(0, |r| r.total))
    }

    async fn find_by_id(&self, id: &MovieId) -> StoreResult<Option<Movie>> {
        let document: Option<MovieDocument> = self
            .client
            .select((self.table.as_str(), id.encode()))
            .await
            .map_err(|e| store_error(StoreOperation::FindOne, &e))?;

        document
            .map(|doc| doc.into_movie(*id, StoreOperation::FindOne))
            .transpose()
    }

    async fn insert(&self, id: MovieId, movie: NewMovie) -> StoreResult<Movie> {
        let document = MovieDocument {
            title: movie.title,
            director: movie.director,
            year: i64::from(movie.year),
        };

        let created: Option<MovieDocument> = self
            .client
            .create((self.table.as_str(), id.encode()))
            .content(document)
            .await
            .map_err(|e| store_error(StoreOperation::Insert, &e))?;

        created
            .ok_or_else(|| {
                StoreError::new(
                    StoreOperation::Insert,
                    StoreErrorKind::QueryFailed,
                    "insert returned no record",
                )
            })?
            .into_movie(id, StoreOperation::Insert)
    }
}

impl MovieDocument {
    fn into_movie(self, id: MovieId, operation: StoreOperation) -> StoreResult<Movie> {
        Ok(Movie {
            id,
            title: self.title,
            director: self.director,
            year: decode_year(self.year, operation)?,
        })
    }
}

impl MovieRow {
    fn into_movie(self) -> StoreResult<Movie> {
        let id = MovieId::decode(&self.key).map_err(|e| {
            StoreError::decode(StoreOperation::Find, format!("record key {:?}: {e}", self.key))
        })?;
        Ok(Movie {
            id,
            title: self.title,
            director: self.director,
            year: decode_year(self.year, StoreOperation::Find)?,
        })
    }
}

fn decode_year(year: i64, operation: StoreOperation) -> StoreResult<i32> {
    i32::try_from(year)
        .map_err(|_| StoreError::decode(operation, format!("year {year} out of range")))
}

fn connect_error(url_safe: &str, err: &surrealdb::Error) -> StoreError {
    let kind = categorize_surrealdb_error(err);
    let kind = if kind == StoreErrorKind::QueryFailed {
        StoreErrorKind::ConnectionFailed
    } else {
        kind
    };
    StoreError::new(
        StoreOperation::Connect,
        kind,
        format!("SurrealDB at '{url_safe}': {err}"),
    )
}

fn store_error(operation: StoreOperation, err: &surrealdb::Error) -> StoreError {
    StoreError::new(operation, categorize_surrealdb_error(err), err.to_string())
}

/// Sanitize connection URL for safe logging (remove credentials if present)
pub fn sanitize_connection_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..=scheme_end + 2];
            let after_at = &url[at_pos..];
            return format!("{}***{}", scheme, after_at);
        }
    }
    url.to_string()
}

fn categorize_surrealdb_error(err: &surrealdb::Error) -> StoreErrorKind {
    let err_str = err.to_string().to_lowercase();

    if err_str.contains("auth") || err_str.contains("credentials") || err_str.contains("signin") {
        StoreErrorKind::AuthenticationFailed
    } else if err_str.contains("connect")
        || err_str.contains("network")
        || err_str.contains("dns")
        || err_str.contains("refused")
    {
        StoreErrorKind::ConnectionFailed
    } else if err_str.contains("timeout") || err_str.contains("timed out") {
        StoreErrorKind::Timeout
    } else if err_str.contains("deserializ") || err_str.contains("invalid type") {
        StoreErrorKind::Decode
    } else {
        StoreErrorKind::QueryFailed
    }
}
