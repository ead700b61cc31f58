use sqlx::{PgConnection, PgPool};

use crate::error::AppResult;

mod cast;
mod genres;
mod movies;
mod persons;
mod reviews;
mod roles;
mod users;
mod watchlists;

/// PostgresRepository
///
/// Implementation of every store against PostgreSQL. The schema lives in
/// `migrations/` and is applied at start-up.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row-locks the given movies in id order and returns the ids that exist.
///
/// Every write that touches reviews locks the movie row before any review row,
/// so rating upkeep and cascading deletes always acquire locks in the same order.
async fn lock_movies(conn: &mut PgConnection, ids: &[i64]) -> AppResult<Vec<i64>> {
    let locked: Vec<i64> = sqlx::query_scalar(
        "SELECT movie_id FROM movies WHERE movie_id = ANY($1) ORDER BY movie_id FOR UPDATE",
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;
    Ok(locked)
}

/// Escapes `LIKE` wildcards so user input only matches literally.
fn like_pattern(input: &str) -> String {
    let escaped = input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}
