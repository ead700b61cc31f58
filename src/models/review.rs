use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Review
///
/// A user's rating (1 to 5) and optional text for one movie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Review {
    pub review_id: i64,
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: i64,
    pub review_text: Option<String>,
    pub helpful_count: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ReviewWithAuthor
///
/// Review joined with its author's username. Used in the movie detail views.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub review: Review,
    pub user_name: String,
}

/// CreateReviewRequest
///
/// The author is always the authenticated caller; any user id in the body is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateReviewRequest {
    pub movie_id: i64,
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    #[schema(example = 4)]
    pub rating: i64,
    #[serde(default)]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub review_text: Option<String>,
}

/// ReplaceReviewRequest
///
/// Body of `PUT /api/reviews/{id}`. The text is replaced as well, so omitting it clears it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReplaceReviewRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i64,
    #[serde(default)]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub review_text: Option<String>,
}

/// PatchReviewRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatchReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub review_text: Option<String>,
}

/// NewReview
///
/// Repository input for a review insert.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: i64,
    pub review_text: Option<String>,
}

/// ReviewChanges
///
/// Repository input for a review update. The outer `Option` of `review_text`
/// says whether the text changes; the inner one is the new value.
#[derive(Debug, Clone, Default)]
pub struct ReviewChanges {
    pub rating: Option<i64>,
    pub review_text: Option<Option<String>>,
}

impl From<ReplaceReviewRequest> for ReviewChanges {
    fn from(req: ReplaceReviewRequest) -> Self {
        Self {
            rating: Some(req.rating),
            review_text: Some(req.review_text),
        }
    }
}

impl From<PatchReviewRequest> for ReviewChanges {
    fn from(req: PatchReviewRequest) -> Self {
        Self {
            rating: req.rating,
            review_text: req.review_text.map(Some),
        }
    }
}
