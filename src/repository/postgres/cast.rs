use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgConnection;

use super::PostgresRepository;
use crate::{
    error::{AppError, AppResult},
    models::{CastCrewRequest, CastEntry, CreditRow, MovieParticipation, ParticipationRole},
    repository::CastStore,
};

const MOVIE_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM movies WHERE movie_id = $1)";
const PERSON_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM persons WHERE person_id = $1)";
const ROLE_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM roles WHERE role_id = $1)";

async fn exists(conn: &mut PgConnection, sql: &str, id: i64) -> AppResult<bool> {
    let found: bool = sqlx::query_scalar(sql).bind(id).fetch_one(conn).await?;
    Ok(found)
}

/// Inserts one participation plus its role row on an open transaction.
async fn insert_credit(
    conn: &mut PgConnection,
    movie_id: i64,
    credit: CastCrewRequest,
) -> AppResult<MovieParticipation> {
    if !exists(conn, MOVIE_EXISTS, movie_id).await? {
        return Err(AppError::not_found("Movie", movie_id));
    }
    if !exists(conn, PERSON_EXISTS, credit.person_id).await? {
        return Err(AppError::not_found("Person", credit.person_id));
    }
    if !exists(conn, ROLE_EXISTS, credit.role_id).await? {
        return Err(AppError::not_found("Role", credit.role_id));
    }

    let participation = sqlx::query_as::<_, MovieParticipation>(
        "INSERT INTO movie_participations (movie_id, person_id) VALUES ($1, $2) \
         RETURNING participation_id, movie_id, person_id, created_at",
    )
    .bind(movie_id)
    .bind(credit.person_id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO participation_roles (participation_id, role_id, note) VALUES ($1, $2, $3)",
    )
    .bind(participation.participation_id)
    .bind(credit.role_id)
    .bind(credit.character_name)
    .execute(&mut *conn)
    .await?;

    Ok(participation)
}

#[async_trait]
impl CastStore for PostgresRepository {
    async fn add_credit(
        &self,
        movie_id: i64,
        credit: CastCrewRequest,
    ) -> AppResult<MovieParticipation> {
        let mut tx = self.pool.begin().await?;
        let participation = insert_credit(&mut tx, movie_id, credit).await?;
        tx.commit().await?;
        Ok(participation)
    }

    async fn add_credits(
        &self,
        movie_id: i64,
        credits: Vec<CastCrewRequest>,
    ) -> AppResult<Vec<MovieParticipation>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(credits.len());
        for credit in credits {
            created.push(insert_credit(&mut tx, movie_id, credit).await?);
        }
        tx.commit().await?;
        Ok(created)
    }

    async fn movie_cast(&self, movie_id: i64) -> AppResult<Vec<CastEntry>> {
        let participations = sqlx::query_as::<_, MovieParticipation>(
            "SELECT participation_id, movie_id, person_id, created_at \
             FROM movie_participations WHERE movie_id = $1 ORDER BY participation_id",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        let roles = sqlx::query_as::<_, ParticipationRole>(
            r#"
            SELECT pr.id, pr.participation_id, pr.role_id, pr.note
            FROM participation_roles pr
            JOIN movie_participations mp ON mp.participation_id = pr.participation_id
            WHERE mp.movie_id = $1
            ORDER BY pr.id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        let mut by_participation: HashMap<i64, Vec<ParticipationRole>> = HashMap::new();
        for role in roles {
            by_participation
                .entry(role.participation_id)
                .or_default()
                .push(role);
        }

        Ok(participations
            .into_iter()
            .map(|participation| CastEntry {
                roles: by_participation
                    .remove(&participation.participation_id)
                    .unwrap_or_default(),
                participation,
            })
            .collect())
    }

    async fn movie_credits(&self, movie_id: i64) -> AppResult<Vec<CreditRow>> {
        let rows = sqlx::query_as::<_, CreditRow>(
            r#"
            SELECT
                mp.participation_id,
                p.person_id,
                p.name AS person_name,
                p.birth_date,
                p.bio,
                p.profile_url,
                r.role_id,
                r.name AS role_name,
                r.description AS role_description,
                pr.note
            FROM movie_participations mp
            JOIN persons p ON p.person_id = mp.person_id
            JOIN participation_roles pr ON pr.participation_id = mp.participation_id
            JOIN roles r ON r.role_id = pr.role_id
            WHERE mp.movie_id = $1
            ORDER BY mp.participation_id, pr.id
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn delete_participation(&self, participation_id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM participation_roles WHERE participation_id = $1")
            .bind(participation_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM movie_participations WHERE participation_id = $1")
            .bind(participation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
