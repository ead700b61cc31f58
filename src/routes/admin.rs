use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Admin Router Module
///
/// Endpoints restricted to `ROLE_ADMIN`. The route layer rejects other callers
/// with 403 before any handler runs, and the handlers take `AdminUser` as well.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Account Management ---
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        // PUT /api/users/{id}
        // Partial: only supplied fields change; a new password is re-hashed.
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        // --- Catalog Moderation ---
        // DELETE /movies/{id}
        // Cascades to genre links, credits, reviews and watchlist entries.
        .route("/movies/{id}", delete(handlers::movies::delete_movie))
        .route("/api/genres", post(handlers::genres::create_genre))
        .route("/api/roles", post(handlers::roles::create_role))
}
