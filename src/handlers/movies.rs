use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    models::{Movie, MovieFullDetails, MovieRequest, MovieWithGenres, ReviewWithAuthor},
    repository::RepositoryState,
};

async fn full_details(repo: &RepositoryState, movie: Movie) -> AppResult<MovieFullDetails> {
    let movie_id = movie.movie_id;
    let genres = repo.movie_genres(movie_id).await?;
    let credits = repo.movie_credits(movie_id).await?;
    let reviews = repo.reviews_with_authors(movie_id).await?;
    Ok(MovieFullDetails::assemble(movie, genres, credits, reviews))
}

async fn require_movie(repo: &RepositoryState, id: i64) -> AppResult<Movie> {
    repo.get_movie(id)
        .await?
        .ok_or_else(|| AppError::not_found("Movie", id))
}

// --- Public catalog ---

/// list_movies
///
/// [Public Route] Every movie in the catalog.
#[utoipa::path(
    get,
    path = "/movies",
    tag = "movies",
    responses((status = 200, description = "Movies", body = [Movie]))
)]
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(state.repo.list_movies().await?))
}

/// list_movies_with_genres
///
/// [Public Route] Catalog listing with genre names inlined.
#[utoipa::path(
    get,
    path = "/movies/with-genres",
    tag = "movies",
    responses((status = 200, description = "Movies with genre names", body = [MovieWithGenres]))
)]
pub async fn list_movies_with_genres(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MovieWithGenres>>> {
    Ok(Json(state.repo.list_movies_with_genres().await?))
}

/// get_movie
///
/// [Public Route] A single movie by id.
#[utoipa::path(
    get,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie", body = Movie),
        (status = 404, description = "No such movie")
    )
)]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Movie>> {
    Ok(Json(require_movie(&state.repo, id).await?))
}

/// list_full_details
///
/// [Public Route] Detail view of every movie. Builds each movie's view with the
/// same queries as the single-movie endpoint.
#[utoipa::path(
    get,
    path = "/movies/full-details",
    tag = "movies",
    responses((status = 200, description = "Detail views", body = [MovieFullDetails]))
)]
pub async fn list_full_details(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MovieFullDetails>>> {
    let movies = state.repo.list_movies().await?;
    let mut details = Vec::with_capacity(movies.len());
    for movie in movies {
        details.push(full_details(&state.repo, movie).await?);
    }
    Ok(Json(details))
}

/// get_full_details
///
/// [Public Route] Movie with genres, credits grouped by department, and reviews
/// (newest first).
#[utoipa::path(
    get,
    path = "/movies/full-details/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Detail view", body = MovieFullDetails),
        (status = 404, description = "No such movie")
    )
)]
pub async fn get_full_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MovieFullDetails>> {
    let movie = require_movie(&state.repo, id).await?;
    Ok(Json(full_details(&state.repo, movie).await?))
}

/// movie_reviews
///
/// [Public Route] Reviews of a movie with reviewer names, newest first.
#[utoipa::path(
    get,
    path = "/movies/{id}/reviews",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewWithAuthor]),
        (status = 404, description = "No such movie")
    )
)]
pub async fn movie_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<ReviewWithAuthor>>> {
    require_movie(&state.repo, id).await?;
    Ok(Json(state.repo.reviews_with_authors(id).await?))
}

// --- Editing ---

/// create_movie
///
/// [Authenticated Route] Adds a movie. The average rating always starts at 0.
#[utoipa::path(
    post,
    path = "/movies",
    tag = "movies",
    request_body = MovieRequest,
    responses(
        (status = 201, description = "Created", body = Movie),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_movie(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<MovieRequest>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    payload.validate()?;
    let movie = state.repo.create_movie(payload).await?;
    tracing::info!(user_id, movie_id = movie.movie_id, "Movie created");
    Ok((StatusCode::CREATED, Json(movie)))
}

/// update_movie
///
/// [Authenticated Route] Replaces every editable field.
#[utoipa::path(
    put,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    request_body = MovieRequest,
    responses(
        (status = 200, description = "Updated", body = Movie),
        (status = 404, description = "No such movie")
    )
)]
pub async fn update_movie(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<MovieRequest>,
) -> AppResult<Json<Movie>> {
    payload.validate()?;
    let movie = state
        .repo
        .update_movie(id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Movie", id))?;
    tracing::info!(user_id, movie_id = id, "Movie updated");
    Ok(Json(movie))
}

/// delete_movie
///
/// [Admin Route] Removes a movie and everything that references it.
#[utoipa::path(
    delete,
    path = "/movies/{id}",
    tag = "movies",
    params(("id" = i64, Path, description = "Movie id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "No such movie")
    )
)]
pub async fn delete_movie(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.repo.delete_movie(id).await? {
        return Err(AppError::not_found("Movie", id));
    }
    tracing::info!(admin_id = admin.id, movie_id = id, "Movie deleted");
    Ok(StatusCode::NO_CONTENT)
}
