//! HTTP handlers, grouped by resource.
//!
//! Handlers validate input, apply ownership rules and translate repository
//! results into status codes. Authentication happens in the extractors
//! ([`crate::auth::AuthUser`], [`crate::auth::AdminUser`]) before a handler runs.

pub mod auth;
pub mod cast;
pub mod genres;
pub mod movies;
pub mod persons;
pub mod reviews;
pub mod roles;
pub mod users;
pub mod watchlists;

/// Liveness probe used by load balancers.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}
