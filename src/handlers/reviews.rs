use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderName, StatusCode, header},
};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::{
        CreateReviewRequest, NewReview, PatchReviewRequest, ReplaceReviewRequest, Review,
        ReviewChanges,
    },
    repository::RepositoryState,
};

/// Loads a review and checks the caller may change it (author or admin).
async fn editable_review(repo: &RepositoryState, user: &AuthUser, id: i64) -> AppResult<Review> {
    let review = repo
        .get_review(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;
    if !user.can_modify(review.user_id) {
        tracing::warn!(user_id = user.id, review_id = id, "Review edit refused");
        return Err(AppError::Forbidden(
            "You can only modify your own reviews".into(),
        ));
    }
    Ok(review)
}

async fn apply_changes(
    repo: &RepositoryState,
    user: &AuthUser,
    id: i64,
    changes: ReviewChanges,
) -> AppResult<Review> {
    editable_review(repo, user, id).await?;
    repo.update_review(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))
}

/// list_reviews
///
/// [Authenticated Route] Every review.
#[utoipa::path(
    get,
    path = "/api/reviews",
    tag = "reviews",
    responses((status = 200, description = "All reviews", body = [Review]))
)]
pub async fn list_reviews(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.repo.list_reviews().await?))
}

/// get_review
///
/// [Authenticated Route] A single review by id.
#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review", body = Review),
        (status = 404, description = "No such review")
    )
)]
pub async fn get_review(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Review>> {
    let review = state
        .repo
        .get_review(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review", id))?;
    Ok(Json(review))
}

/// create_review
///
/// [Authenticated Route] Posts a review as the caller and folds its rating into
/// the movie's average. Responds with a `Location` header for the new review.
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = "reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Created", body = Review),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No such movie")
    )
)]
pub async fn create_review(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<Review>)> {
    payload.validate()?;

    let review = state
        .repo
        .create_review(NewReview {
            user_id: user.id,
            movie_id: payload.movie_id,
            rating: payload.rating,
            review_text: payload.review_text,
        })
        .await?;

    tracing::info!(
        user_id = user.id,
        movie_id = review.movie_id,
        review_id = review.review_id,
        "Review created"
    );

    let location = format!("/api/reviews/{}", review.review_id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(review)))
}

/// replace_review
///
/// [Authenticated Route] Full update; `rating` is required. Author or admin only.
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    request_body = ReplaceReviewRequest,
    responses(
        (status = 200, description = "Updated", body = Review),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such review")
    )
)]
pub async fn replace_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ReplaceReviewRequest>,
) -> AppResult<Json<Review>> {
    payload.validate()?;
    Ok(Json(apply_changes(&state.repo, &user, id, payload.into()).await?))
}

/// patch_review
///
/// [Authenticated Route] Partial update of rating and/or text. Author or admin only.
#[utoipa::path(
    patch,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    request_body = PatchReviewRequest,
    responses(
        (status = 200, description = "Updated", body = Review),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such review")
    )
)]
pub async fn patch_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PatchReviewRequest>,
) -> AppResult<Json<Review>> {
    payload.validate()?;
    Ok(Json(apply_changes(&state.repo, &user, id, payload.into()).await?))
}

/// delete_review
///
/// [Authenticated Route] Removes a review and takes its rating out of the movie's average.
/// Only the author or an admin may do this.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = "reviews",
    params(("id" = i64, Path, description = "Review id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such review")
    )
)]
pub async fn delete_review(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    editable_review(&state.repo, &user, id).await?;
    if !state.repo.delete_review(id).await? {
        return Err(AppError::not_found("Review", id));
    }
    tracing::info!(user_id = user.id, review_id = id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// reviews_by_movie
///
/// [Authenticated Route] Reviews written for one movie.
#[utoipa::path(
    get,
    path = "/api/reviews/movie/{movie_id}",
    tag = "reviews",
    params(("movie_id" = i64, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Reviews of the movie", body = [Review]),
        (status = 404, description = "No such movie")
    )
)]
pub async fn reviews_by_movie(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<Vec<Review>>> {
    if state.repo.get_movie(movie_id).await?.is_none() {
        return Err(AppError::not_found("Movie", movie_id));
    }
    Ok(Json(state.repo.reviews_for_movie(movie_id).await?))
}

/// reviews_by_user
///
/// [Authenticated Route] Reviews written by one user.
#[utoipa::path(
    get,
    path = "/api/reviews/user/{user_id}",
    tag = "reviews",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Reviews written by the user", body = [Review]),
        (status = 404, description = "No such user")
    )
)]
pub async fn reviews_by_user(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Review>>> {
    if state.repo.get_user(user_id).await?.is_none() {
        return Err(AppError::not_found("User", user_id));
    }
    Ok(Json(state.repo.reviews_for_user(user_id).await?))
}
