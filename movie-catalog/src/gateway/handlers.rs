//! Gateway request handlers
//!
//! Each handler validates its input, makes exactly one RPC, and translates the
//! outcome. Validation failures never reach the movie service.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{Method, Uri},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiErrorKind, ApiOperation};
use super::state::GatewayState;
use crate::models::{Movie, NewMovie};
use crate::pagination::PageRequest;
use crate::trace::TraceContext;

/// Query parameters of `GET /`
///
/// Kept as strings so a malformed value gets its own error message.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

/// Body of `POST /`; absent fields count as missing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateMovieBody {
    pub title: String,
    pub director: String,
    pub year: i32,
}

/// Movie as rendered to HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieBody {
    pub id: String,
    pub title: String,
    pub director: String,
    pub year: i32,
}

impl From<Movie> for MovieBody {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id.encode(),
            title: movie.title,
            director: movie.director,
            year: movie.year,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMoviesResponse {
    pub movies: Vec<MovieBody>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetMovieResponse {
    pub movie: MovieBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateMovieResponse {
    pub movie: MovieBody,
    pub id: String,
}

/// `GET /?page=&per_page=`
pub async fn list_movies(
    State(state): State<GatewayState>,
    trace: TraceContext,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListMoviesResponse>, ApiError> {
    let Query(params) = params.map_err(|e| {
        ApiError::bad_request(ApiOperation::List, "invalid query string")
            .with_detail(e.body_text())
            .logged(&trace)
    })?;

    let page = PageRequest::normalize(params.page.as_deref(), params.per_page.as_deref())
        .and_then(|page| page.with_max_per_page(state.max_per_page))
        .map_err(|e| ApiError::bad_request(ApiOperation::List, e.to_string()).logged(&trace))?;

    tracing::info!(
        x_tracer_id = %trace,
        page = page.page(),
        per_page = page.per_page(),
        "GET /"
    );

    let result = state
        .client
        .list(&page, &trace)
        .await
        .map_err(|status| ApiError::from_status(ApiOperation::List, &status).logged(&trace))?;

    Ok(Json(ListMoviesResponse {
        movies: result.movies.into_iter().map(MovieBody::from).collect(),
        total: result.total,
    }))
}

/// `GET /{id}`
pub async fn get_movie(
    State(state): State<GatewayState>,
    trace: TraceContext,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<GetMovieResponse>, ApiError> {
    let Path(id) = id.map_err(|e| {
        ApiError::bad_request(ApiOperation::Get, "invalid argument")
            .with_detail(e.body_text())
            .logged(&trace)
    })?;

    tracing::info!(x_tracer_id = %trace, id = %id, "GET /{{id}}");

    if id.trim().is_empty() {
        return Err(ApiError::bad_request(ApiOperation::Get, "id is required").logged(&trace));
    }

    let movie = state
        .client
        .get(&id, &trace)
        .await
        .map_err(|status| ApiError::from_status(ApiOperation::Get, &status).logged(&trace))?;

    Ok(Json(GetMovieResponse {
        movie: movie.into(),
    }))
}

/// `POST /`
pub async fn create_movie(
    State(state): State<GatewayState>,
    trace: TraceContext,
    body: Result<Json<CreateMovieBody>, JsonRejection>,
) -> Result<Json<CreateMovieResponse>, ApiError> {
    tracing::info!(x_tracer_id = %trace, "POST /");

    let Json(body) = body.map_err(|e| {
        ApiError::bad_request(ApiOperation::Create, "invalid request body")
            .with_detail(e.body_text())
            .logged(&trace)
    })?;

    let new_movie = NewMovie {
        title: body.title,
        director: body.director,
        year: body.year,
    };
    new_movie
        .validate()
        .map_err(|e| ApiError::bad_request(ApiOperation::Create, e.to_string()).logged(&trace))?;

    let (id, movie) = state
        .client
        .create(new_movie, &trace)
        .await
        .map_err(|status| ApiError::from_status(ApiOperation::Create, &status).logged(&trace))?;

    Ok(Json(CreateMovieResponse {
        movie: movie.into(),
        id: id.encode(),
    }))
}

/// Any path without a route
pub async fn route_not_found(trace: TraceContext, method: Method, uri: Uri) -> ApiError {
    ApiError::new(ApiOperation::Route, ApiErrorKind::NotFound, "not found")
        .with_detail(format!("{method} {uri}"))
        .logged(&trace)
}

/// A known path called with the wrong method
pub async fn method_not_allowed(trace: TraceContext, method: Method, uri: Uri) -> ApiError {
    ApiError::new(
        ApiOperation::Route,
        ApiErrorKind::MethodNotAllowed,
        "method not allowed",
    )
    .with_detail(format!("{method} {uri}"))
    .logged(&trace)
}
