use async_trait::async_trait;

use super::PostgresRepository;
use crate::{
    error::AppResult,
    models::{Movie, Watchlist, WatchlistItem, WatchlistRequest},
    repository::WatchlistStore,
};

const WATCHLIST_COLUMNS: &str = "watchlist_id, user_id, name, description, created_at";

#[async_trait]
impl WatchlistStore for PostgresRepository {
    async fn watchlists_for_user(&self, user_id: i64) -> AppResult<Vec<Watchlist>> {
        let lists = sqlx::query_as::<_, Watchlist>(&format!(
            "SELECT {WATCHLIST_COLUMNS} FROM watchlists WHERE user_id = $1 ORDER BY watchlist_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    async fn get_watchlist(&self, id: i64) -> AppResult<Option<Watchlist>> {
        let list = sqlx::query_as::<_, Watchlist>(&format!(
            "SELECT {WATCHLIST_COLUMNS} FROM watchlists WHERE watchlist_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }

    async fn create_watchlist(&self, user_id: i64, req: WatchlistRequest) -> AppResult<Watchlist> {
        let list = sqlx::query_as::<_, Watchlist>(&format!(
            "INSERT INTO watchlists (user_id, name, description) VALUES ($1, $2, $3) \
             RETURNING {WATCHLIST_COLUMNS}"
        ))
        .bind(user_id)
        .bind(req.name)
        .bind(req.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(list)
    }

    async fn update_watchlist(
        &self,
        id: i64,
        req: WatchlistRequest,
    ) -> AppResult<Option<Watchlist>> {
        let list = sqlx::query_as::<_, Watchlist>(&format!(
            "UPDATE watchlists SET name = $2, description = $3 WHERE watchlist_id = $1 \
             RETURNING {WATCHLIST_COLUMNS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }

    async fn delete_watchlist(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM watchlist_items WHERE watchlist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM watchlists WHERE watchlist_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn watchlist_items(&self, watchlist_id: i64) -> AppResult<Vec<WatchlistItem>> {
        let items = sqlx::query_as::<_, WatchlistItem>(
            "SELECT watchlist_item_id, watchlist_id, movie_id, added_at \
             FROM watchlist_items WHERE watchlist_id = $1 ORDER BY added_at, watchlist_item_id",
        )
        .bind(watchlist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn watchlist_movies(&self, watchlist_id: i64) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT
                m.movie_id, m.title, m.release_year, m.duration, m.description,
                m.language, m.country, m.poster_url, m.trailer_url, m.avg_rating
            FROM movies m
            JOIN watchlist_items wi ON wi.movie_id = m.movie_id
            WHERE wi.watchlist_id = $1
            ORDER BY wi.added_at, wi.watchlist_item_id
            "#,
        )
        .bind(watchlist_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    // Duplicates hit uq_watchlist_items_movie and surface as 409.
    async fn add_watchlist_item(
        &self,
        watchlist_id: i64,
        movie_id: i64,
    ) -> AppResult<WatchlistItem> {
        let item = sqlx::query_as::<_, WatchlistItem>(
            "INSERT INTO watchlist_items (watchlist_id, movie_id) VALUES ($1, $2) \
             RETURNING watchlist_item_id, watchlist_id, movie_id, added_at",
        )
        .bind(watchlist_id)
        .bind(movie_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn remove_watchlist_item(&self, watchlist_id: i64, movie_id: i64) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM watchlist_items WHERE watchlist_id = $1 AND movie_id = $2")
                .bind(watchlist_id)
                .bind(movie_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
