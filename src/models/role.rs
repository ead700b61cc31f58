use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// MovieRole
///
/// A kind of film credit ("Director", "Actor", ...), stored in the `roles` table.
/// Not to be confused with account [`Role`](super::Role)s.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovieRole {
    pub role_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// CreateMovieRoleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateMovieRoleRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    #[schema(example = "Stunt Coordinator")]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
}
