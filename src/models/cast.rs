use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// MovieParticipation
///
/// Links a person to a movie. The roles they hold live in `participation_roles`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovieParticipation {
    pub participation_id: i64,
    pub movie_id: i64,
    pub person_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// ParticipationRole
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ParticipationRole {
    pub id: i64,
    pub participation_id: i64,
    pub role_id: i64,
    // Character name for acting roles.
    pub note: Option<String>,
}

/// CastEntry
///
/// A participation together with its role rows, as listed by `GET /api/movies/{movieId}/cast`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CastEntry {
    #[serde(flatten)]
    pub participation: MovieParticipation,
    pub roles: Vec<ParticipationRole>,
}

/// CastCrewRequest
///
/// Credits one person with one role on a movie.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CastCrewRequest {
    pub person_id: i64,
    pub role_id: i64,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    #[schema(example = "Dom Cobb")]
    pub character_name: Option<String>,
}

/// CreditRow
///
/// Flat join of participation, person and role used to build the full-details view.
/// One row per (participation, role).
#[derive(Debug, Clone, FromRow)]
pub struct CreditRow {
    pub participation_id: i64,
    pub person_id: i64,
    pub person_name: String,
    pub birth_date: Option<NaiveDate>,
    pub bio: Option<String>,
    pub profile_url: Option<String>,
    pub role_id: i64,
    pub role_name: String,
    pub role_description: Option<String>,
    pub note: Option<String>,
}
