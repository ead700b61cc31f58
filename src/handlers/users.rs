use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::{AdminUser, password},
    error::{AppError, AppResult},
    models::{CreateUserRequest, NewUser, Role, UpdateUserRequest, User, UserChanges},
};

// Every handler here sits behind the admin route layer and also takes `AdminUser`,
// so the requirement is visible in the signature.

/// list_users
///
/// [Admin Route] Every account.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All accounts", body = [User]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<User>>> {
    let users = state.repo.list_users().await?;
    Ok(Json(users.into_iter().map(User::from).collect()))
}

/// get_user
///
/// [Admin Route] A single account by id.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Account", body = User),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(user.into()))
}

/// create_user
///
/// [Admin Route] Creates an account with explicit roles (default `ROLE_USER`).
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn create_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    payload.validate()?;

    let roles = match payload.roles {
        Some(roles) if !roles.is_empty() => roles,
        _ => vec![Role::User],
    };
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash: password::hash_password(&payload.password)?,
            roles,
        })
        .await?;

    tracing::info!(admin_id = admin.id, user_id = user.id, "Account created by admin");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// update_user
///
/// [Admin Route] Partial update. A supplied password is re-hashed.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 404, description = "No such user"),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn update_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<User>> {
    payload.validate()?;

    let password_hash = match payload.password.as_deref() {
        Some(plain) => Some(password::hash_password(plain)?),
        None => None,
    };
    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        password_hash,
        roles: payload.roles,
    };

    let user = state
        .repo
        .update_user(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(admin_id = admin.id, user_id = id, "Account updated by admin");
    Ok(Json(user.into()))
}

/// delete_user
///
/// [Admin Route] Removes an account with its reviews and watchlists.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.repo.delete_user(id).await? {
        return Err(AppError::not_found("User", id));
    }
    tracing::info!(admin_id = admin.id, user_id = id, "Account deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
