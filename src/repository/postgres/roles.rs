use async_trait::async_trait;

use super::PostgresRepository;
use crate::{
    error::AppResult,
    models::{CreateMovieRoleRequest, MovieRole},
    repository::RoleStore,
};

#[async_trait]
impl RoleStore for PostgresRepository {
    async fn list_movie_roles(&self) -> AppResult<Vec<MovieRole>> {
        let roles =
            sqlx::query_as::<_, MovieRole>("SELECT role_id, name, description FROM roles ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(roles)
    }

    async fn create_movie_role(&self, role: CreateMovieRoleRequest) -> AppResult<MovieRole> {
        let created = sqlx::query_as::<_, MovieRole>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) \
             RETURNING role_id, name, description",
        )
        .bind(role.name)
        .bind(role.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}
