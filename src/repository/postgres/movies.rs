use async_trait::async_trait;
use sqlx::FromRow;

use super::{PostgresRepository, lock_movies};
use crate::{
    error::AppResult,
    models::{Movie, MovieRequest, MovieWithGenres},
    repository::MovieStore,
};

const MOVIE_COLUMNS: &str = "movie_id, title, release_year, duration, description, \
     language, country, poster_url, trailer_url, avg_rating";

#[derive(FromRow)]
struct MovieGenresRow {
    #[sqlx(flatten)]
    movie: Movie,
    genres: Vec<String>,
}

#[async_trait]
impl MovieStore for PostgresRepository {
    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY movie_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(movies)
    }

    /// list_movies_with_genres
    ///
    /// Single query: genre names are aggregated per movie, sorted alphabetically.
    async fn list_movies_with_genres(&self) -> AppResult<Vec<MovieWithGenres>> {
        let rows = sqlx::query_as::<_, MovieGenresRow>(
            r#"
            SELECT
                m.movie_id, m.title, m.release_year, m.duration, m.description,
                m.language, m.country, m.poster_url, m.trailer_url, m.avg_rating,
                COALESCE(
                    array_agg(g.genre_name::TEXT ORDER BY g.genre_name)
                        FILTER (WHERE g.genre_id IS NOT NULL),
                    '{}'::TEXT[]
                ) AS genres
            FROM movies m
            LEFT JOIN movie_genres mg ON mg.movie_id = m.movie_id
            LEFT JOIN genres g ON g.genre_id = mg.genre_id
            GROUP BY m.movie_id
            ORDER BY m.movie_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MovieWithGenres {
                movie: row.movie,
                genres: row.genres,
            })
            .collect())
    }

    async fn get_movie(&self, id: i64) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE movie_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(movie)
    }

    async fn create_movie(&self, movie: MovieRequest) -> AppResult<Movie> {
        let created = sqlx::query_as::<_, Movie>(&format!(
            "INSERT INTO movies \
                (title, release_year, duration, description, language, country, poster_url, trailer_url, avg_rating) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0) \
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(movie.title)
        .bind(movie.release_year)
        .bind(movie.duration)
        .bind(movie.description)
        .bind(movie.language)
        .bind(movie.country)
        .bind(movie.poster_url)
        .bind(movie.trailer_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_movie(&self, id: i64, movie: MovieRequest) -> AppResult<Option<Movie>> {
        let updated = sqlx::query_as::<_, Movie>(&format!(
            "UPDATE movies SET \
                title = $2, release_year = $3, duration = $4, description = $5, \
                language = $6, country = $7, poster_url = $8, trailer_url = $9 \
             WHERE movie_id = $1 \
             RETURNING {MOVIE_COLUMNS}"
        ))
        .bind(id)
        .bind(movie.title)
        .bind(movie.release_year)
        .bind(movie.duration)
        .bind(movie.description)
        .bind(movie.language)
        .bind(movie.country)
        .bind(movie.poster_url)
        .bind(movie.trailer_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    // Dependent rows go through ON DELETE CASCADE.
    async fn delete_movie(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        if lock_movies(&mut tx, &[id]).await?.is_empty() {
            return Ok(false);
        }
        // Reviews, credits and watchlist entries follow through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM movies WHERE movie_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
