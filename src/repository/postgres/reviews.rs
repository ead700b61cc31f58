use async_trait::async_trait;
use sqlx::PgConnection;

use super::PostgresRepository;
use crate::{
    error::{AppError, AppResult},
    models::{NewReview, Review, ReviewChanges, ReviewWithAuthor},
    rating,
    repository::ReviewStore,
};

const REVIEW_COLUMNS: &str =
    "review_id, user_id, movie_id, rating, review_text, helpful_count, created_at, updated_at";

/// Locks the movie row and returns its current average and review count.
///
/// The row lock serialises concurrent review writes for the same movie, so the
/// running mean is never computed from a stale average.
async fn lock_movie_rating(conn: &mut PgConnection, movie_id: i64) -> AppResult<Option<(f64, i64)>> {
    let avg: Option<f64> =
        sqlx::query_scalar("SELECT avg_rating FROM movies WHERE movie_id = $1 FOR UPDATE")
            .bind(movie_id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(avg) = avg else {
        return Ok(None);
    };

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE movie_id = $1")
        .bind(movie_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(Some((avg, count)))
}

async fn store_movie_rating(conn: &mut PgConnection, movie_id: i64, avg: f64) -> AppResult<()> {
    sqlx::query("UPDATE movies SET avg_rating = $2 WHERE movie_id = $1")
        .bind(movie_id)
        .bind(avg)
        .execute(conn)
        .await?;
    Ok(())
}

/// Locks a review for modification, taking its movie's row lock first.
///
/// Returns the review together with the movie's average and review count as
/// seen under the lock.
async fn lock_review(
    conn: &mut PgConnection,
    id: i64,
) -> AppResult<Option<(Review, Option<(f64, i64)>)>> {
    // A review never moves between movies, so the unlocked read is enough to
    // find which movie row to lock.
    let movie_id: Option<i64> =
        sqlx::query_scalar("SELECT movie_id FROM reviews WHERE review_id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    let Some(movie_id) = movie_id else {
        return Ok(None);
    };

    let movie_rating = lock_movie_rating(conn, movie_id).await?;

    let review = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(review.map(|review| (review, movie_rating)))
}

#[async_trait]
impl ReviewStore for PostgresRepository {
    async fn list_reviews(&self) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY review_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn get_review(&self, id: i64) -> AppResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE review_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(review)
    }

    async fn reviews_for_movie(&self, movie_id: i64) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE movie_id = $1 ORDER BY review_id"
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn reviews_for_user(&self, user_id: i64) -> AppResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY review_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn reviews_with_authors(&self, movie_id: i64) -> AppResult<Vec<ReviewWithAuthor>> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            r#"
            SELECT
                r.review_id, r.user_id, r.movie_id, r.rating, r.review_text,
                r.helpful_count, r.created_at, r.updated_at,
                u.username AS user_name
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.movie_id = $1
            ORDER BY r.updated_at DESC, r.review_id DESC
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let mut tx = self.pool.begin().await?;

        let (avg, count) = lock_movie_rating(&mut tx, review.movie_id)
            .await?
            .ok_or_else(|| AppError::not_found("Movie", review.movie_id))?;

        let created = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (user_id, movie_id, rating, review_text) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.user_id)
        .bind(review.movie_id)
        .bind(review.rating)
        .bind(review.review_text)
        .fetch_one(&mut *tx)
        .await?;

        let new_avg = rating::after_insert(avg, count, created.rating);
        store_movie_rating(&mut tx, created.movie_id, new_avg).await?;

        tx.commit().await?;
        tracing::debug!(movie_id = created.movie_id, avg = new_avg, "Movie rating updated");
        Ok(created)
    }

    async fn update_review(&self, id: i64, changes: ReviewChanges) -> AppResult<Option<Review>> {
        let mut tx = self.pool.begin().await?;

        let Some((existing, movie_rating)) = lock_review(&mut tx, id).await? else {
            return Ok(None);
        };

        let new_rating = changes.rating.unwrap_or(existing.rating);
        if new_rating != existing.rating {
            if let Some((avg, count)) = movie_rating {
                let new_avg = rating::after_update(avg, count, existing.rating, new_rating);
                store_movie_rating(&mut tx, existing.movie_id, new_avg).await?;
            }
        }

        let text_changed = changes.review_text.is_some();
        let updated = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET \
                rating = $2, \
                review_text = CASE WHEN $3 THEN $4 ELSE review_text END, \
                updated_at = NOW() \
             WHERE review_id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(new_rating)
        .bind(text_changed)
        .bind(changes.review_text.flatten())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_review(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let Some((existing, movie_rating)) = lock_review(&mut tx, id).await? else {
            return Ok(false);
        };

        if let Some((avg, count)) = movie_rating {
            let new_avg = rating::after_delete(avg, count, existing.rating);
            store_movie_rating(&mut tx, existing.movie_id, new_avg).await?;
        }

        sqlx::query("DELETE FROM reviews WHERE review_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
