use async_trait::async_trait;

use super::PostgresRepository;
use crate::{
    error::{AppError, AppResult},
    models::{CreateGenreRequest, Genre},
    repository::GenreStore,
};

#[async_trait]
impl GenreStore for PostgresRepository {
    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT genre_id, genre_name, description FROM genres ORDER BY genre_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    async fn create_genre(&self, genre: CreateGenreRequest) -> AppResult<Genre> {
        let created = sqlx::query_as::<_, Genre>(
            "INSERT INTO genres (genre_name, description) VALUES ($1, $2) \
             RETURNING genre_id, genre_name, description",
        )
        .bind(genre.genre_name)
        .bind(genre.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn movie_genres(&self, movie_id: i64) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            r#"
            SELECT g.genre_id, g.genre_name, g.description
            FROM genres g
            JOIN movie_genres mg ON mg.genre_id = g.genre_id
            WHERE mg.movie_id = $1
            ORDER BY g.genre_name
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(genres)
    }

    /// link_genres
    ///
    /// Validates every id inside the transaction so a bad id leaves no partial links.
    async fn link_genres(&self, movie_id: i64, genre_ids: &[i64]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let movie_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM movies WHERE movie_id = $1)")
                .bind(movie_id)
                .fetch_one(&mut *tx)
                .await?;
        if !movie_exists {
            return Err(AppError::not_found("Movie", movie_id));
        }

        for &genre_id in genre_ids {
            let genre_exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM genres WHERE genre_id = $1)")
                    .bind(genre_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !genre_exists {
                return Err(AppError::not_found("Genre", genre_id));
            }

            sqlx::query(
                "INSERT INTO movie_genres (movie_id, genre_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(movie_id)
            .bind(genre_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn unlink_genre(&self, movie_id: i64, genre_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM movie_genres WHERE movie_id = $1 AND genre_id = $2")
            .bind(movie_id)
            .bind(genre_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
