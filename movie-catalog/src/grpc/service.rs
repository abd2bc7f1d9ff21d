//! `MoviesService` implementation over the movie repository
//!
//! Each RPC validates its input, delegates to [`MovieRepository`], and maps
//! [`RepositoryError`](crate::repository::RepositoryError) to a status code.
//! Inputs are re-validated here so the service is safe to call directly.

use tonic::{Request, Response, Status};
use tracing::instrument;

use super::pb::movies_service_server::MoviesService;
use super::pb::{
    CreateMovieRequest, CreateMovieResponse, GetMovieByIdRequest, GetMovieByIdResponse,
    GetMoviesRequest, GetMoviesResponse,
};
use crate::models::NewMovie;
use crate::pagination::PageRequest;
use crate::repository::{MovieRepository, RepositoryError};
use crate::store::MovieStore;
use crate::trace::TraceContext;

/// gRPC adapter for [`MovieRepository`]
#[derive(Debug)]
pub struct MovieRpcService<S> {
    repository: MovieRepository<S>,
}

impl<S: MovieStore> MovieRpcService<S> {
    /// Create a new service over a repository
    pub fn new(repository: MovieRepository<S>) -> Self {
        Self { repository }
    }
}

#[tonic::async_trait]
impl<S: MovieStore + 'static> MoviesService for MovieRpcService<S> {
    #[instrument(skip_all, fields(method = "GetMovies"))]
    async fn get_movies(
        &self,
        request: Request<GetMoviesRequest>,
    ) -> Result<Response<GetMoviesResponse>, Status> {
        let trace = TraceContext::from_request(&request);
        let req = request.into_inner();
        tracing::info!(x_tracer_id = %trace, page = req.page, per_page = req.per_page, "GetMovies");

        let page = PageRequest::new(i64::from(req.page), i64::from(req.per_page)).map_err(|e| {
            tracing::warn!(x_tracer_id = %trace, error = %e, "rejected GetMovies");
            RepositoryError::invalid_page(e)
        })?;

        let result = self.repository.list(&page, &trace).await?;

        Ok(Response::new(GetMoviesResponse {
            total: i32::try_from(result.total).unwrap_or(i32::MAX),
            movies: result.movies.into_iter().map(Into::into).collect(),
        }))
    }

    #[instrument(skip_all, fields(method = "GetMovieById"))]
    async fn get_movie_by_id(
        &self,
        request: Request<GetMovieByIdRequest>,
    ) -> Result<Response<GetMovieByIdResponse>, Status> {
        let trace = TraceContext::from_request(&request);
        let req = request.into_inner();
        tracing::info!(x_tracer_id = %trace, id = %req.id, "GetMovieById");

        if req.id.is_empty() {
            tracing::warn!(x_tracer_id = %trace, "rejected GetMovieById: empty id");
            return Err(Status::invalid_argument("Invalid ID"));
        }

        let movie = self.repository.get_by_id(&req.id, &trace).await?;

        Ok(Response::new(GetMovieByIdResponse {
            movie: Some(movie.into()),
        }))
    }

    #[instrument(skip_all, fields(method = "CreateMovie"))]
    async fn create_movie(
        &self,
        request: Request<CreateMovieRequest>,
    ) -> Result<Response<CreateMovieResponse>, Status> {
        let trace = TraceContext::from_request(&request);
        tracing::info!(x_tracer_id = %trace, "CreateMovie");

        let Some(movie) = request.into_inner().movie else {
            tracing::warn!(x_tracer_id = %trace, "rejected CreateMovie: no movie");
            return Err(Status::invalid_argument("movie is required"));
        };

        let new_movie = NewMovie::from(movie);
        new_movie.validate().map_err(|e| {
            tracing::warn!(x_tracer_id = %trace, error = %e, "rejected CreateMovie");
            RepositoryError::invalid_movie(e)
        })?;

        let (id, movie) = self.repository.create(new_movie, &trace).await?;

        Ok(Response::new(CreateMovieResponse {
            id: id.encode(),
            movie: Some(movie.into()),
        }))
    }
}
