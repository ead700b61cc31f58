use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Watchlist
///
/// A named, user-owned list of movies. Only the owner may read or modify it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Watchlist {
    pub watchlist_id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// WatchlistItem
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WatchlistItem {
    pub watchlist_item_id: i64,
    pub watchlist_id: i64,
    pub movie_id: i64,
    #[ts(type = "string")]
    pub added_at: DateTime<Utc>,
}

/// WatchlistRequest
///
/// Body of create and update.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct WatchlistRequest {
    #[validate(length(min = 1, max = 100, message = "must be between 1 and 100 characters"))]
    #[schema(example = "Weekend marathon")]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
}

/// AddWatchlistItemRequest
///
/// `movieId` is optional on the wire so a missing id can be answered with a
/// descriptive 400 instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddWatchlistItemRequest {
    #[serde(default)]
    pub movie_id: Option<i64>,
}
