use async_trait::async_trait;

use super::{PostgresRepository, lock_movies};
use crate::{
    error::AppResult,
    models::{NewUser, Role, UserChanges, UserRecord},
    repository::UserStore,
};

const USER_COLUMNS: &str = "id, username, email, password, roles, created_at";

#[async_trait]
impl UserStore for PostgresRepository {
    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let users = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        let created = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (username, email, password, roles) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Role::to_strings(&user.roles))
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// update_user
    ///
    /// COALESCE keeps every column whose new value is NULL.
    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<Option<UserRecord>> {
        let updated = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET \
                username = COALESCE($2, username), \
                email = COALESCE($3, email), \
                password = COALESCE($4, password), \
                roles = COALESCE($5, roles) \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.username)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.roles.map(|roles| Role::to_strings(&roles)))
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    /// delete_user
    ///
    /// Reviews and watchlists go with the account through ON DELETE CASCADE; the
    /// movies those reviews rated get their average recomputed in the same transaction.
    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let rated: Vec<i64> =
            sqlx::query_scalar("SELECT DISTINCT movie_id FROM reviews WHERE user_id = $1")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        let rated = lock_movies(&mut tx, &rated).await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }

        if !rated.is_empty() {
            sqlx::query(
                "UPDATE movies m SET avg_rating = COALESCE( \
                    (SELECT AVG(r.rating)::DOUBLE PRECISION FROM reviews r WHERE r.movie_id = m.movie_id), 0) \
                 WHERE m.movie_id = ANY($1)",
            )
            .bind(&rated)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
