use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::AppResult,
    models::{CreateMovieRoleRequest, MovieRole},
};

/// list_roles
///
/// [Authenticated Route] Credit roles ("Director", "Actor", ...) by name.
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "roles",
    responses((status = 200, description = "Credit roles", body = [MovieRole]))
)]
pub async fn list_roles(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MovieRole>>> {
    Ok(Json(state.repo.list_movie_roles().await?))
}

/// create_role
///
/// [Admin Route] Adds a credit role such as "Composer".
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "roles",
    request_body = CreateMovieRoleRequest,
    responses(
        (status = 201, description = "Created", body = MovieRole),
        (status = 409, description = "Name already used")
    )
)]
pub async fn create_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateMovieRoleRequest>,
) -> AppResult<(StatusCode, Json<MovieRole>)> {
    payload.validate()?;
    let role = state.repo.create_movie_role(payload).await?;
    tracing::info!(admin_id = admin.id, role_id = role.role_id, "Credit role created");
    Ok((StatusCode::CREATED, Json(role)))
}
