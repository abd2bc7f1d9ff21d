//! Movie repository
//!
//! [`MovieRepository`] performs the three catalog operations against an
//! injected [`MovieStore`] and turns store outcomes into domain results or
//! [`RepositoryError`]s. It holds no per-request state; one instance is shared
//! by every in-flight call. Failed store operations are surfaced once and never
//! retried.

mod error;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};

use std::sync::Arc;

use crate::ids::MovieId;
use crate::models::{Movie, NewMovie};
use crate::pagination::{PageRequest, PageResult};
use crate::store::MovieStore;
use crate::trace::TraceContext;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Catalog operations over a shared store handle
#[derive(Debug)]
pub struct MovieRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for MovieRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: MovieStore> MovieRepository<S> {
    /// Create a repository over a store
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Lists one page of movies with the estimated collection size.
    ///
    /// The page scan and the count are separate store calls, so `total` may
    /// reflect a different moment than the returned movies.
    pub async fn list(
        &self,
        page: &PageRequest,
        trace: &TraceContext,
    ) -> RepositoryResult<PageResult> {
        let movies = self
            .store
            .find_page(page.skip(), page.limit())
            .await
            .map_err(|e| {
                tracing::error!(x_tracer_id = %trace, error = %e, "failed to find movies");
                RepositoryError::store(RepositoryOperation::List, &e)
            })?;

        let total = self.store.estimated_count().await.map_err(|e| {
            tracing::error!(x_tracer_id = %trace, error = %e, "failed to count movies");
            RepositoryError::store(RepositoryOperation::List, &e)
        })?;

        tracing::debug!(
            x_tracer_id = %trace,
            page = page.page(),
            per_page = page.per_page(),
            returned = movies.len(),
            total,
            "listed movies"
        );

        Ok(PageResult { movies, total })
    }

    /// Looks up a movie by its external identifier.
    ///
    /// A malformed identifier is an `InvalidArgument` error, a well-formed one
    /// with no record is `NotFound`, and a store failure is `Internal`.
    pub async fn get_by_id(&self, external_id: &str, trace: &TraceContext) -> RepositoryResult<Movie> {
        let id = MovieId::decode(external_id).map_err(|e| {
            tracing::warn!(x_tracer_id = %trace, id = external_id, error = %e, "invalid movie id");
            RepositoryError::invalid_id(external_id, &e)
        })?;

        match self.store.find_by_id(&id).await {
            Ok(Some(movie)) => Ok(movie),
            Ok(None) => {
                tracing::warn!(x_tracer_id = %trace, id = external_id, "movie not found");
                Err(RepositoryError::not_found(external_id))
            }
            Err(e) => {
                tracing::error!(x_tracer_id = %trace, id = external_id, error = %e, "failed to find movie");
                Err(RepositoryError::store(RepositoryOperation::GetById, &e).with_entity_id(external_id))
            }
        }
    }

    /// Inserts a movie under a freshly assigned identifier.
    ///
    /// Field presence is checked by the caller. No deduplication is done.
    pub async fn create(
        &self,
        movie: NewMovie,
        trace: &TraceContext,
    ) -> RepositoryResult<(MovieId, Movie)> {
        let id = MovieId::new();

        let stored = self.store.insert(id, movie).await.map_err(|e| {
            tracing::error!(x_tracer_id = %trace, id = %id, error = %e, "failed to insert movie");
            RepositoryError::store(RepositoryOperation::Create, &e).with_entity_id(id.encode())
        })?;

        tracing::info!(x_tracer_id = %trace, id = %id, "created movie");
        Ok((id, stored))
    }
}
