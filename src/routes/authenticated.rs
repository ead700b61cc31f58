use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Endpoints for any signed-in account. The route layer resolves the caller once
/// and stores it in the request extensions; handlers then read it back through the
/// `AuthUser` extractor. Ownership rules (reviews, watchlists) are enforced in the
/// handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Movies ---
        // POST /movies, PUT /movies/{id}
        // The average rating is never taken from the body.
        .route("/movies", post(handlers::movies::create_movie))
        .route("/movies/{id}", put(handlers::movies::update_movie))
        // --- Genres & Credit Roles ---
        .route("/api/genres", get(handlers::genres::list_genres))
        // POST /api/movies/{movie_id}/genres
        // Idempotent: already-linked genres are skipped.
        .route(
            "/api/movies/{movie_id}/genres",
            post(handlers::genres::link_genres),
        )
        .route(
            "/api/movies/{movie_id}/genres/{genre_id}",
            delete(handlers::genres::unlink_genre),
        )
        .route("/api/roles", get(handlers::roles::list_roles))
        // --- Persons ---
        .route(
            "/api/persons",
            get(handlers::persons::list_persons).post(handlers::persons::create_person),
        )
        // GET /api/persons/search?name=...
        .route("/api/persons/search", get(handlers::persons::search_persons))
        .route(
            "/api/persons/{id}",
            get(handlers::persons::get_person)
                .put(handlers::persons::update_person)
                .delete(handlers::persons::delete_person),
        )
        // --- Cast & Crew ---
        .route(
            "/api/movies/{movie_id}/cast",
            get(handlers::cast::list_cast).post(handlers::cast::add_cast_member),
        )
        // POST /api/movies/{movie_id}/cast/bulk
        // All-or-nothing: one bad entry rolls back the batch.
        .route(
            "/api/movies/{movie_id}/cast/bulk",
            post(handlers::cast::add_cast_members_bulk),
        )
        .route(
            "/api/movies/cast/{participation_id}",
            delete(handlers::cast::remove_participation),
        )
        // --- Reviews ---
        // Writes keep the movie's average rating in step.
        .route(
            "/api/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        // PUT/PATCH/DELETE /api/reviews/{id}
        // Author or admin only.
        .route(
            "/api/reviews/{id}",
            get(handlers::reviews::get_review)
                .put(handlers::reviews::replace_review)
                .patch(handlers::reviews::patch_review)
                .delete(handlers::reviews::delete_review),
        )
        .route(
            "/api/reviews/movie/{movie_id}",
            get(handlers::reviews::reviews_by_movie),
        )
        .route(
            "/api/reviews/user/{user_id}",
            get(handlers::reviews::reviews_by_user),
        )
        // --- Watchlists ---
        // Strictly owner-only; someone else's list answers 403.
        .route(
            "/api/watchlists",
            get(handlers::watchlists::my_watchlists).post(handlers::watchlists::create_watchlist),
        )
        .route(
            "/api/watchlists/{id}",
            get(handlers::watchlists::get_watchlist)
                .put(handlers::watchlists::update_watchlist)
                .delete(handlers::watchlists::delete_watchlist),
        )
        .route(
            "/api/watchlists/{id}/items",
            get(handlers::watchlists::watchlist_items)
                .post(handlers::watchlists::add_watchlist_item),
        )
        .route(
            "/api/watchlists/{id}/items/{movie_id}",
            delete(handlers::watchlists::remove_watchlist_item),
        )
        .route(
            "/api/watchlists/{id}/movies",
            get(handlers::watchlists::watchlist_movies),
        )
}
