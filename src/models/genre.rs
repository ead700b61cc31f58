use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Genre
///
/// Row of the `genres` table. Names are unique.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Genre {
    pub genre_id: i64,
    pub genre_name: String,
    pub description: Option<String>,
}

/// CreateGenreRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateGenreRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    #[schema(example = "Film Noir")]
    pub genre_name: String,
    #[serde(default)]
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub description: Option<String>,
}

/// LinkGenresRequest
///
/// Attaches genres to a movie (POST /api/movies/{movieId}/genres).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LinkGenresRequest {
    #[validate(length(min = 1, message = "must contain at least one genre"))]
    pub genre_ids: Vec<i64>,
}
