use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without credentials. Movie reads are public so the
/// catalog can be browsed anonymously; every write lives in the other modules.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(handlers::health))
        // --- Account Gateway ---
        // POST /api/auth/register
        // Creates a ROLE_USER account.
        .route("/api/auth/register", post(handlers::auth::register))
        // POST /api/auth/login
        // Exchanges username/password for a signed JWT.
        .route("/api/auth/login", post(handlers::auth::login))
        // POST /api/auth/logout
        // Revokes the presented bearer token until it expires.
        .route("/api/auth/logout", post(handlers::auth::logout))
        // --- Movie Catalog (read-only) ---
        .route("/movies", get(handlers::movies::list_movies))
        // GET /movies/with-genres
        // Each movie with its genre names, in one aggregated query.
        .route(
            "/movies/with-genres",
            get(handlers::movies::list_movies_with_genres),
        )
        .route("/movies/{id}", get(handlers::movies::get_movie))
        // GET /movies/full-details[/{id}]
        // Detail view: genres, credits split by department, reviews with authors.
        .route(
            "/movies/full-details",
            get(handlers::movies::list_full_details),
        )
        .route(
            "/movies/full-details/{id}",
            get(handlers::movies::get_full_details),
        )
        .route("/movies/{id}/reviews", get(handlers::movies::movie_reviews))
}
