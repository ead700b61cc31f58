use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
};
use validator::Validate;

use crate::{
    AppState,
    auth::{jwt, password, verify_credentials},
    error::{AppError, AppResult},
    models::{
        JwtResponse, LoginRequest, MessageResponse, NewUser, RegisterRequest, RegisterResponse,
        Role,
    },
};

/// register
///
/// [Public Route] Creates a `ROLE_USER` account. Roles cannot be chosen here;
/// administrators assign them through `/api/users`.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation failed or username/email taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    payload.validate()?;

    if state
        .repo
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Username already exists".into()));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            password_hash,
            roles: vec![Role::User],
        })
        .await
        .map_err(|e| match e.violated_constraint() {
            // A concurrent registration can still take the username after the check above.
            Some("uq_users_username") => AppError::BadRequest("Username already exists".into()),
            Some("uq_users_email") => AppError::BadRequest("Email already in use".into()),
            _ => e,
        })?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".into(),
            user_id: user.id,
            roles: Role::parse_all(&user.roles),
            username: user.username,
            email: user.email,
        }),
    ))
}

/// login
///
/// [Public Route] Exchanges credentials for a signed bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = JwtResponse),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<JwtResponse>> {
    payload.validate()?;

    let user = verify_credentials(&state.repo, &payload.username, &payload.password).await?;
    let roles = Role::parse_all(&user.roles);

    let (token, _) = jwt::issue_token(
        user.id,
        &user.username,
        &roles,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs,
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(JwtResponse {
        token,
        token_type: "Bearer".into(),
        username: user.username,
        email: user.email,
        roles,
    }))
}

/// logout
///
/// [Public Route] Revokes the presented bearer token until it would have expired.
/// A token that no longer validates has nothing left to revoke, so it still
/// yields 200.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Missing or non-Bearer Authorization header")
    ),
    security(("bearer" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<MessageResponse>> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Invalid Authorization header".into()))?;

    match jwt::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            state.blacklist.revoke(&claims.jti, claims.exp).await;
            tracing::info!(user_id = claims.uid, "User logged out");
        }
        Err(e) => tracing::debug!(error = %e, "Logout with unusable token"),
    }

    Ok(Json(MessageResponse::new("Logged out successfully")))
}
