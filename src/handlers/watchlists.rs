use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{AddWatchlistItemRequest, Movie, Watchlist, WatchlistItem, WatchlistRequest},
    repository::RepositoryState,
};

/// Loads a watchlist the caller owns: 404 when missing, 403 when it belongs to someone else.
async fn owned_watchlist(repo: &RepositoryState, user: &AuthUser, id: i64) -> AppResult<Watchlist> {
    let list = repo
        .get_watchlist(id)
        .await?
        .ok_or_else(|| AppError::not_found("Watchlist", id))?;
    if list.user_id != user.id {
        tracing::warn!(user_id = user.id, watchlist_id = id, "Watchlist access refused");
        return Err(AppError::Forbidden(
            "You do not have access to this watchlist".into(),
        ));
    }
    Ok(list)
}

/// my_watchlists
///
/// [Authenticated Route] The caller's own watchlists.
#[utoipa::path(
    get,
    path = "/api/watchlists",
    tag = "watchlists",
    responses((status = 200, description = "Caller's watchlists", body = [Watchlist]))
)]
pub async fn my_watchlists(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Watchlist>>> {
    Ok(Json(state.repo.watchlists_for_user(id).await?))
}

/// get_watchlist
///
/// [Authenticated Route] One of the caller's watchlists.
#[utoipa::path(
    get,
    path = "/api/watchlists/{id}",
    tag = "watchlists",
    params(("id" = i64, Path, description = "Watchlist id")),
    responses(
        (status = 200, description = "Watchlist", body = Watchlist),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist")
    )
)]
pub async fn get_watchlist(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Watchlist>> {
    Ok(Json(owned_watchlist(&state.repo, &user, id).await?))
}

/// create_watchlist
///
/// [Authenticated Route] Creates a watchlist owned by the caller.
#[utoipa::path(
    post,
    path = "/api/watchlists",
    tag = "watchlists",
    request_body = WatchlistRequest,
    responses(
        (status = 201, description = "Created", body = Watchlist),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_watchlist(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<WatchlistRequest>,
) -> AppResult<(StatusCode, Json<Watchlist>)> {
    payload.validate()?;
    let list = state.repo.create_watchlist(id, payload).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// update_watchlist
///
/// [Authenticated Route] Renames a watchlist or changes its description.
#[utoipa::path(
    put,
    path = "/api/watchlists/{id}",
    tag = "watchlists",
    params(("id" = i64, Path, description = "Watchlist id")),
    request_body = WatchlistRequest,
    responses(
        (status = 200, description = "Updated", body = Watchlist),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist")
    )
)]
pub async fn update_watchlist(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<WatchlistRequest>,
) -> AppResult<Json<Watchlist>> {
    payload.validate()?;
    owned_watchlist(&state.repo, &user, id).await?;
    let list = state
        .repo
        .update_watchlist(id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Watchlist", id))?;
    Ok(Json(list))
}

/// delete_watchlist
///
/// [Authenticated Route] Removes a watchlist and its entries.
#[utoipa::path(
    delete,
    path = "/api/watchlists/{id}",
    tag = "watchlists",
    params(("id" = i64, Path, description = "Watchlist id")),
    responses(
        (status = 204, description = "Deleted with its items"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist")
    )
)]
pub async fn delete_watchlist(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    owned_watchlist(&state.repo, &user, id).await?;
    state.repo.delete_watchlist(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// watchlist_items
///
/// [Authenticated Route] Entries of a watchlist in the order they were added.
#[utoipa::path(
    get,
    path = "/api/watchlists/{id}/items",
    tag = "watchlists",
    params(("id" = i64, Path, description = "Watchlist id")),
    responses(
        (status = 200, description = "Items in insertion order", body = [WatchlistItem]),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist")
    )
)]
pub async fn watchlist_items(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<WatchlistItem>>> {
    owned_watchlist(&state.repo, &user, id).await?;
    Ok(Json(state.repo.watchlist_items(id).await?))
}

/// watchlist_movies
///
/// [Authenticated Route] Full movie rows of a watchlist's entries.
#[utoipa::path(
    get,
    path = "/api/watchlists/{id}/movies",
    tag = "watchlists",
    params(("id" = i64, Path, description = "Watchlist id")),
    responses(
        (status = 200, description = "Movies in the watchlist", body = [Movie]),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist")
    )
)]
pub async fn watchlist_movies(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Movie>>> {
    owned_watchlist(&state.repo, &user, id).await?;
    Ok(Json(state.repo.watchlist_movies(id).await?))
}

/// add_watchlist_item
///
/// [Authenticated Route] Adds a movie to one of the caller's watchlists.
/// A missing or unknown `movieId` is a client error (400); a movie already on
/// the list is a conflict (409).
#[utoipa::path(
    post,
    path = "/api/watchlists/{id}/items",
    tag = "watchlists",
    params(("id" = i64, Path, description = "Watchlist id")),
    request_body = AddWatchlistItemRequest,
    responses(
        (status = 201, description = "Added", body = WatchlistItem),
        (status = 400, description = "movieId missing or unknown"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist"),
        (status = 409, description = "Movie already in the watchlist")
    )
)]
pub async fn add_watchlist_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AddWatchlistItemRequest>,
) -> AppResult<(StatusCode, Json<WatchlistItem>)> {
    owned_watchlist(&state.repo, &user, id).await?;

    let movie_id = payload
        .movie_id
        .ok_or_else(|| AppError::BadRequest("movieId is required".into()))?;
    if state.repo.get_movie(movie_id).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Movie not found with id: {movie_id}"
        )));
    }
    if state
        .repo
        .watchlist_items(id)
        .await?
        .iter()
        .any(|item| item.movie_id == movie_id)
    {
        return Err(AppError::Conflict("Movie is already in this watchlist".into()));
    }

    let item = state.repo.add_watchlist_item(id, movie_id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// remove_watchlist_item
///
/// [Authenticated Route] Takes a movie off a watchlist.
#[utoipa::path(
    delete,
    path = "/api/watchlists/{id}/items/{movie_id}",
    tag = "watchlists",
    params(
        ("id" = i64, Path, description = "Watchlist id"),
        ("movie_id" = i64, Path, description = "Movie id")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 403, description = "Owned by another user"),
        (status = 404, description = "No such watchlist or movie not on it")
    )
)]
pub async fn remove_watchlist_item(
    user: AuthUser,
    State(state): State<AppState>,
    Path((id, movie_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    owned_watchlist(&state.repo, &user, id).await?;
    if !state.repo.remove_watchlist_item(id, movie_id).await? {
        return Err(AppError::NotFound(format!(
            "Movie {movie_id} is not in watchlist {id}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}
