//! Typed client for the movie service
//!
//! One call per gateway request. The trace id is attached as metadata and the
//! configured timeout is sent as the gRPC deadline and enforced locally, so a
//! stalled backend surfaces as `DeadlineExceeded`. Dropping the returned
//! future cancels the call. Nothing is retried.

use std::future::Future;
use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use tonic::Status;

use super::pb::movies_service_client::MoviesServiceClient;
use super::pb::{CreateMovieRequest, GetMovieByIdRequest, GetMoviesRequest};
use crate::error::Result;
use crate::ids::MovieId;
use crate::models::{Movie, NewMovie};
use crate::pagination::{PageRequest, PageResult};
use crate::trace::TraceContext;

/// Client handle for `MoviesService`
///
/// Cheap to clone; clones share one HTTP/2 channel.
#[derive(Debug, Clone)]
pub struct MovieClient {
    inner: MoviesServiceClient<Channel>,
    timeout: Duration,
}

impl MovieClient {
    /// Create a client that connects on first use
    ///
    /// The gateway can start before the service is up.
    pub fn connect_lazy(url: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Endpoint::from_shared(url.to_string())?
            .connect_timeout(timeout)
            .timeout(timeout);

        tracing::info!(backend_url = %url, timeout_secs = timeout.as_secs(), "movie service client configured");

        Ok(Self::from_channel(endpoint.connect_lazy(), timeout))
    }

    /// Wrap an existing channel
    pub fn from_channel(channel: Channel, timeout: Duration) -> Self {
        Self {
            inner: MoviesServiceClient::new(channel),
            timeout,
        }
    }

    fn request<T>(&self, message: T, trace: &TraceContext) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        trace.inject(&mut request);
        request.set_timeout(self.timeout);
        request
    }

    async fn within_deadline<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, Status>>,
    ) -> std::result::Result<T, Status> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| Status::deadline_exceeded("movie service did not answer in time"))?
    }

    /// List a page of movies
    pub async fn list(
        &self,
        page: &PageRequest,
        trace: &TraceContext,
    ) -> std::result::Result<PageResult, Status> {
        let message = GetMoviesRequest {
            page: i32::try_from(page.page()).map_err(|_| Status::invalid_argument("invalid page"))?,
            per_page: i32::try_from(page.per_page())
                .map_err(|_| Status::invalid_argument("invalid per_page"))?,
        };

        let mut client = self.inner.clone();
        let response = self
            .within_deadline(client.get_movies(self.request(message, trace)))
            .await?
            .into_inner();

        let movies = response
            .movies
            .into_iter()
            .map(Movie::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(PageResult {
            movies,
            total: u64::try_from(response.total).unwrap_or(0),
        })
    }

    /// Fetch one movie by its external id
    pub async fn get(&self, id: &str, trace: &TraceContext) -> std::result::Result<Movie, Status> {
        let message = GetMovieByIdRequest { id: id.to_string() };

        let mut client = self.inner.clone();
        let response = self
            .within_deadline(client.get_movie_by_id(self.request(message, trace)))
            .await?
            .into_inner();

        response
            .movie
            .ok_or_else(|| Status::internal("response has no movie"))
            .and_then(Movie::try_from)
    }

    /// Create a movie
    pub async fn create(
        &self,
        movie: NewMovie,
        trace: &TraceContext,
    ) -> std::result::Result<(MovieId, Movie), Status> {
        let message = CreateMovieRequest {
            movie: Some(super::pb::Movie {
                id: String::new(),
                title: movie.title,
                director: movie.director,
                year: movie.year,
            }),
        };

        let mut client = self.inner.clone();
        let response = self
            .within_deadline(client.create_movie(self.request(message, trace)))
            .await?
            .into_inner();

        let movie = response
            .movie
            .ok_or_else(|| Status::internal("response has no movie"))
            .and_then(Movie::try_from)?;
        let id = MovieId::decode(&response.id)
            .map_err(|_| Status::internal("malformed movie id in response"))?;

        Ok((id, movie))
    }
}
