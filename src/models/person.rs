use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::validate_url;

/// Person
///
/// Anyone credited on a movie, regardless of department.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Person {
    pub person_id: i64,
    pub name: String,
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    pub bio: Option<String>,
    pub profile_url: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// PersonRequest
///
/// Body of create and update. Update replaces every field.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PersonRequest {
    #[validate(length(min = 1, max = 200, message = "must be between 1 and 200 characters"))]
    #[schema(example = "Greta Gerwig")]
    pub name: String,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 5000, message = "must be at most 5000 characters"))]
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_url"))]
    pub profile_url: Option<String>,
}

/// PersonSearch
///
/// Query string of `GET /api/persons/search`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct PersonSearch {
    /// Case-insensitive substring of the person's name.
    pub name: String,
}
