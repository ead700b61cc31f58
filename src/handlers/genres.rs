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
    models::{CreateGenreRequest, Genre, LinkGenresRequest},
};

/// list_genres
///
/// [Authenticated Route] Every genre, ordered by name.
#[utoipa::path(
    get,
    path = "/api/genres",
    tag = "genres",
    responses((status = 200, description = "All genres, by name", body = [Genre]))
)]
pub async fn list_genres(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.repo.list_genres().await?))
}

/// create_genre
///
/// [Admin Route] Genre names are unique; a duplicate yields 409.
#[utoipa::path(
    post,
    path = "/api/genres",
    tag = "genres",
    request_body = CreateGenreRequest,
    responses(
        (status = 201, description = "Created", body = Genre),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_genre(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateGenreRequest>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    payload.validate()?;
    let genre = state.repo.create_genre(payload).await?;
    tracing::info!(admin_id = admin.id, genre_id = genre.genre_id, "Genre created");
    Ok((StatusCode::CREATED, Json(genre)))
}

/// link_genres
///
/// [Authenticated Route] Attaches genres to a movie and returns the movie's
/// resulting genre list. Linking an already-linked genre is a no-op.
#[utoipa::path(
    post,
    path = "/api/movies/{movie_id}/genres",
    tag = "genres",
    params(("movie_id" = i64, Path, description = "Movie id")),
    request_body = LinkGenresRequest,
    responses(
        (status = 200, description = "Genres now linked to the movie", body = [Genre]),
        (status = 404, description = "Unknown movie or genre")
    )
)]
pub async fn link_genres(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Json(payload): Json<LinkGenresRequest>,
) -> AppResult<Json<Vec<Genre>>> {
    payload.validate()?;
    state.repo.link_genres(movie_id, &payload.genre_ids).await?;
    Ok(Json(state.repo.movie_genres(movie_id).await?))
}

/// unlink_genre
///
/// [Authenticated Route] Detaches one genre from a movie.
#[utoipa::path(
    delete,
    path = "/api/movies/{movie_id}/genres/{genre_id}",
    tag = "genres",
    params(
        ("movie_id" = i64, Path, description = "Movie id"),
        ("genre_id" = i64, Path, description = "Genre id")
    ),
    responses(
        (status = 204, description = "Unlinked"),
        (status = 404, description = "Genre was not linked to the movie")
    )
)]
pub async fn unlink_genre(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((movie_id, genre_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    if !state.repo.unlink_genre(movie_id, genre_id).await? {
        return Err(AppError::NotFound(format!(
            "Genre {genre_id} is not linked to movie {movie_id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
