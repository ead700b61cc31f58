use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{Person, PersonRequest, PersonSearch},
};

/// list_persons
///
/// [Authenticated Route] Every person, ordered by name.
#[utoipa::path(
    get,
    path = "/api/persons",
    tag = "persons",
    responses((status = 200, description = "Everyone, by name", body = [Person]))
)]
pub async fn list_persons(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Person>>> {
    Ok(Json(state.repo.list_persons().await?))
}

/// search_persons
///
/// [Authenticated Route] Case-insensitive substring search on the name.
#[utoipa::path(
    get,
    path = "/api/persons/search",
    tag = "persons",
    params(PersonSearch),
    responses((status = 200, description = "Matches", body = [Person]))
)]
pub async fn search_persons(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PersonSearch>,
) -> AppResult<Json<Vec<Person>>> {
    Ok(Json(state.repo.search_persons(query.name.trim()).await?))
}

/// get_person
///
/// [Authenticated Route] A single person by id.
#[utoipa::path(
    get,
    path = "/api/persons/{id}",
    tag = "persons",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person", body = Person),
        (status = 404, description = "No such person")
    )
)]
pub async fn get_person(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Person>> {
    let person = state
        .repo
        .get_person(id)
        .await?
        .ok_or_else(|| AppError::not_found("Person", id))?;
    Ok(Json(person))
}

/// create_person
///
/// [Authenticated Route] Names must be unique at creation time (409 otherwise).
#[utoipa::path(
    post,
    path = "/api/persons",
    tag = "persons",
    request_body = PersonRequest,
    responses(
        (status = 201, description = "Created", body = Person),
        (status = 409, description = "A person with this name exists")
    )
)]
pub async fn create_person(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PersonRequest>,
) -> AppResult<(StatusCode, Json<Person>)> {
    payload.validate()?;
    if state.repo.person_name_exists(&payload.name).await? {
        return Err(AppError::Conflict(format!(
            "Person already exists with name: {}",
            payload.name
        )));
    }
    let person = state.repo.create_person(payload).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// update_person
///
/// [Authenticated Route] Replaces a person's details.
#[utoipa::path(
    put,
    path = "/api/persons/{id}",
    tag = "persons",
    params(("id" = i64, Path, description = "Person id")),
    request_body = PersonRequest,
    responses(
        (status = 200, description = "Updated", body = Person),
        (status = 404, description = "No such person")
    )
)]
pub async fn update_person(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PersonRequest>,
) -> AppResult<Json<Person>> {
    payload.validate()?;
    let person = state
        .repo
        .update_person(id, payload)
        .await?
        .ok_or_else(|| AppError::not_found("Person", id))?;
    Ok(Json(person))
}

/// delete_person
///
/// [Authenticated Route] Removes a person along with their credits.
#[utoipa::path(
    delete,
    path = "/api/persons/{id}",
    tag = "persons",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such person")
    )
)]
pub async fn delete_person(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.repo.delete_person(id).await? {
        return Err(AppError::not_found("Person", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
