use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use super::{CreditRow, Genre, ReviewWithAuthor, validate_url};

/// Movie
///
/// Canonical row of the `movies` table. `avg_rating` is maintained by the review
/// write path and is never accepted from clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Movie {
    pub movie_id: i64,
    pub title: String,
    pub release_year: i64,
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub avg_rating: f64,
}

/// MovieRequest
///
/// Body of both `POST /movies` and `PUT /movies/{id}`. A PUT replaces every
/// editable column, so omitted optional fields are cleared.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovieRequest {
    #[validate(length(min = 1, max = 50, message = "must be between 1 and 50 characters"))]
    #[schema(example = "Inception")]
    pub title: String,
    #[validate(range(min = 1888, message = "must be 1888 or later"))]
    #[schema(example = 2010)]
    pub release_year: i64,
    #[serde(default)]
    #[validate(range(min = 1, max = 600, message = "must be between 1 and 600 minutes"))]
    pub duration: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub language: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub country: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_url"))]
    pub poster_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_url"))]
    pub trailer_url: Option<String>,
}

/// MovieWithGenres
///
/// Catalog listing entry: the movie plus the names of its genres.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovieWithGenres {
    #[serde(flatten)]
    pub movie: Movie,
    pub genres: Vec<String>,
}

/// RoleCredit
///
/// One credited role of a person on a movie. `note` carries the character name for actors.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RoleCredit {
    pub role_id: i64,
    pub role_name: String,
    pub role_description: Option<String>,
    pub note: Option<String>,
}

/// PersonCredit
///
/// A person as they appear in the full-details view, with every role they hold on
/// that participation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PersonCredit {
    pub person_id: i64,
    pub name: String,
    #[ts(type = "string | null")]
    pub birth_date: Option<chrono::NaiveDate>,
    pub bio: Option<String>,
    pub profile_url: Option<String>,
    pub roles: Vec<RoleCredit>,
}

/// GenreSummary
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GenreSummary {
    pub genre_id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Genre> for GenreSummary {
    fn from(genre: Genre) -> Self {
        Self {
            genre_id: genre.genre_id,
            name: genre.genre_name,
            description: genre.description,
        }
    }
}

/// MovieFullDetails
///
/// Aggregated read model for the movie detail page: genres, credits split by
/// department, and reviews with their authors' usernames.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MovieFullDetails {
    #[serde(flatten)]
    pub movie: Movie,
    pub genres: Vec<GenreSummary>,
    pub cast: Vec<PersonCredit>,
    pub directors: Vec<PersonCredit>,
    pub producers: Vec<PersonCredit>,
    pub writers: Vec<PersonCredit>,
    pub reviews: Vec<ReviewWithAuthor>,
}

/// Department a credited role is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Department {
    Cast,
    Directing,
    Production,
    Writing,
}

impl Department {
    /// Classifies a role by substring match on its lower-cased name.
    pub fn of_role(role_name: &str) -> Option<Department> {
        let name = role_name.to_lowercase();
        if name.contains("actor") || name.contains("actress") {
            Some(Department::Cast)
        } else if name.contains("director") {
            Some(Department::Directing)
        } else if name.contains("producer") {
            Some(Department::Production)
        } else if name.contains("writer") || name.contains("screenplay") {
            Some(Department::Writing)
        } else {
            None
        }
    }
}

impl MovieFullDetails {
    /// assemble
    ///
    /// Builds the detail view from flat query results.
    ///
    /// `credits` must be ordered by participation id; consecutive rows of the same
    /// participation are folded into one [`PersonCredit`]. Each credit is then filed
    /// into every department its roles map to, keeping a person at most once per
    /// department. Roles that map to no department are not shown.
    /// `reviews` are expected newest first and are passed through unchanged.
    pub fn assemble(
        movie: Movie,
        genres: Vec<Genre>,
        credits: Vec<CreditRow>,
        reviews: Vec<ReviewWithAuthor>,
    ) -> Self {
        let mut details = MovieFullDetails {
            movie,
            genres: genres.into_iter().map(GenreSummary::from).collect(),
            cast: Vec::new(),
            directors: Vec::new(),
            producers: Vec::new(),
            writers: Vec::new(),
            reviews,
        };

        let mut participations: Vec<(i64, PersonCredit)> = Vec::new();
        for row in credits {
            let credit = RoleCredit {
                role_id: row.role_id,
                role_name: row.role_name,
                role_description: row.role_description,
                note: row.note,
            };
            match participations.last_mut() {
                Some((id, person)) if *id == row.participation_id => person.roles.push(credit),
                _ => participations.push((
                    row.participation_id,
                    PersonCredit {
                        person_id: row.person_id,
                        name: row.person_name,
                        birth_date: row.birth_date,
                        bio: row.bio,
                        profile_url: row.profile_url,
                        roles: vec![credit],
                    },
                )),
            }
        }

        for (_, person) in participations {
            for role in &person.roles {
                let bucket = match Department::of_role(&role.role_name) {
                    Some(Department::Cast) => &mut details.cast,
                    Some(Department::Directing) => &mut details.directors,
                    Some(Department::Production) => &mut details.producers,
                    Some(Department::Writing) => &mut details.writers,
                    None => continue,
                };
                if !bucket.iter().any(|p| p.person_id == person.person_id) {
                    bucket.push(person.clone());
                }
            }
        }

        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credit(participation_id: i64, person_id: i64, name: &str, role: &str) -> CreditRow {
        CreditRow {
            participation_id,
            person_id,
            person_name: name.to_string(),
            birth_date: None,
            bio: None,
            profile_url: None,
            role_id: participation_id * 10,
            role_name: role.to_string(),
            role_description: None,
            note: None,
        }
    }

    #[test]
    fn department_matching_is_case_insensitive_substring() {
        assert_eq!(Department::of_role("Lead ACTOR"), Some(Department::Cast));
        assert_eq!(Department::of_role("Actress"), Some(Department::Cast));
        assert_eq!(Department::of_role("Assistant Director"), Some(Department::Directing));
        assert_eq!(Department::of_role("Executive Producer"), Some(Department::Production));
        assert_eq!(Department::of_role("Screenplay"), Some(Department::Writing));
        assert_eq!(Department::of_role("Composer"), None);
    }

    #[test]
    fn assemble_files_people_into_departments() {
        let credits = vec![
            credit(1, 100, "Christopher Nolan", "Director"),
            credit(1, 100, "Christopher Nolan", "Writer"),
            credit(2, 200, "Leonardo DiCaprio", "Actor"),
            credit(3, 300, "Hans Zimmer", "Composer"),
        ];
        let details = MovieFullDetails::assemble(Movie::default(), vec![], credits, vec![]);

        assert_eq!(details.directors.len(), 1);
        assert_eq!(details.writers.len(), 1);
        assert_eq!(details.directors[0].roles.len(), 2);
        assert_eq!(details.cast[0].name, "Leonardo DiCaprio");
        assert!(details.producers.is_empty());
        // the composer has no department
        let everyone: Vec<_> = [&details.cast, &details.directors, &details.writers]
            .iter()
            .flat_map(|b| b.iter().map(|p| p.person_id))
            .collect();
        assert!(!everyone.contains(&300));
    }

    #[test]
    fn person_listed_once_per_department() {
        let credits = vec![
            credit(1, 100, "Frances McDormand", "Actress"),
            credit(2, 100, "Frances McDormand", "Actor"),
        ];
        let details = MovieFullDetails::assemble(Movie::default(), vec![], credits, vec![]);
        assert_eq!(details.cast.len(), 1);
    }
}
