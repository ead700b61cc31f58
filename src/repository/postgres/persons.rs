use async_trait::async_trait;

use super::{PostgresRepository, like_pattern};
use crate::{
    error::AppResult,
    models::{Person, PersonRequest},
    repository::PersonStore,
};

const PERSON_COLUMNS: &str = "person_id, name, birth_date, bio, profile_url, created_at, updated_at";

#[async_trait]
impl PersonStore for PostgresRepository {
    async fn list_persons(&self) -> AppResult<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(persons)
    }

    async fn search_persons(&self, name: &str) -> AppResult<Vec<Person>> {
        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE name ILIKE $1 ORDER BY name"
        ))
        .bind(like_pattern(name))
        .fetch_all(&self.pool)
        .await?;
        Ok(persons)
    }

    async fn get_person(&self, id: i64) -> AppResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE person_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(person)
    }

    async fn person_name_exists(&self, name: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM persons WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn create_person(&self, person: PersonRequest) -> AppResult<Person> {
        let created = sqlx::query_as::<_, Person>(&format!(
            "INSERT INTO persons (name, birth_date, bio, profile_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(person.name)
        .bind(person.birth_date)
        .bind(person.bio)
        .bind(person.profile_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_person(&self, id: i64, person: PersonRequest) -> AppResult<Option<Person>> {
        let updated = sqlx::query_as::<_, Person>(&format!(
            "UPDATE persons SET \
                name = $2, birth_date = $3, bio = $4, profile_url = $5, updated_at = NOW() \
             WHERE person_id = $1 \
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(id)
        .bind(person.name)
        .bind(person.birth_date)
        .bind(person.bio)
        .bind(person.profile_url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn delete_person(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM persons WHERE person_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
