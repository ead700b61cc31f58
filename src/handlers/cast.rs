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
    models::{CastCrewRequest, CastEntry, MessageResponse},
};

/// add_cast_member
///
/// [Authenticated Route] Credits a person with a role on a movie.
#[utoipa::path(
    post,
    path = "/api/movies/{movie_id}/cast",
    tag = "cast",
    params(("movie_id" = i64, Path, description = "Movie id")),
    request_body = CastCrewRequest,
    responses(
        (status = 201, description = "Credited", body = MessageResponse),
        (status = 404, description = "Unknown movie, person or role")
    )
)]
pub async fn add_cast_member(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Json(payload): Json<CastCrewRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    payload.validate()?;
    let participation = state.repo.add_credit(movie_id, payload).await?;
    tracing::debug!(
        movie_id,
        participation_id = participation.participation_id,
        "Credit added"
    );
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Cast/crew member added successfully")),
    ))
}

/// add_cast_members_bulk
///
/// [Authenticated Route] Adds several credits at once. Nothing is stored unless
/// every entry is valid.
#[utoipa::path(
    post,
    path = "/api/movies/{movie_id}/cast/bulk",
    tag = "cast",
    params(("movie_id" = i64, Path, description = "Movie id")),
    request_body = [CastCrewRequest],
    responses(
        (status = 201, description = "All credited", body = MessageResponse),
        (status = 400, description = "Empty list or invalid entry"),
        (status = 404, description = "Unknown movie, person or role")
    )
)]
pub async fn add_cast_members_bulk(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Json(payload): Json<Vec<CastCrewRequest>>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    if payload.is_empty() {
        return Err(AppError::BadRequest("At least one cast/crew member is required".into()));
    }
    for entry in &payload {
        entry.validate()?;
    }

    let created = state.repo.add_credits(movie_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!(
            "{} cast/crew members added successfully",
            created.len()
        ))),
    ))
}

/// list_cast
///
/// [Authenticated Route] Participations of a movie with their role rows.
#[utoipa::path(
    get,
    path = "/api/movies/{movie_id}/cast",
    tag = "cast",
    params(("movie_id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Participations with their roles", body = [CastEntry]),
        (status = 404, description = "No such movie")
    )
)]
pub async fn list_cast(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<Vec<CastEntry>>> {
    if state.repo.get_movie(movie_id).await?.is_none() {
        return Err(AppError::not_found("Movie", movie_id));
    }
    Ok(Json(state.repo.movie_cast(movie_id).await?))
}

/// remove_participation
///
/// [Authenticated Route] Deletes a participation and its role rows.
#[utoipa::path(
    delete,
    path = "/api/movies/cast/{participation_id}",
    tag = "cast",
    params(("participation_id" = i64, Path, description = "Participation id")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "No such participation")
    )
)]
pub async fn remove_participation(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(participation_id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.repo.delete_participation(participation_id).await? {
        return Err(AppError::not_found("Participation", participation_id));
    }
    Ok(StatusCode::NO_CONTENT)
}
