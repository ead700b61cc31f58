use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    CastStore, GenreStore, MovieStore, PersonStore, ReviewStore, RoleStore, UserStore,
    WatchlistStore,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        CastCrewRequest, CastEntry, CreateGenreRequest, CreateMovieRoleRequest, CreditRow, Genre,
        Movie, MovieParticipation, MovieRequest, MovieRole, MovieWithGenres, NewReview, NewUser,
        ParticipationRole, Person, PersonRequest, Review, ReviewChanges, ReviewWithAuthor, Role,
        UserChanges, UserRecord, Watchlist, WatchlistItem, WatchlistRequest,
    },
    rating,
};

#[derive(Default)]
struct Tables {
    sequences: HashMap<&'static str, i64>,
    users: BTreeMap<i64, UserRecord>,
    movies: BTreeMap<i64, Movie>,
    genres: BTreeMap<i64, Genre>,
    movie_genres: BTreeSet<(i64, i64)>,
    roles: BTreeMap<i64, MovieRole>,
    persons: BTreeMap<i64, Person>,
    participations: BTreeMap<i64, MovieParticipation>,
    participation_roles: BTreeMap<i64, ParticipationRole>,
    reviews: BTreeMap<i64, Review>,
    watchlists: BTreeMap<i64, Watchlist>,
    watchlist_items: BTreeMap<i64, WatchlistItem>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let seq = self.sequences.entry(table).or_insert(0);
        *seq += 1;
        *seq
    }

    fn movie_review_stats(&self, movie_id: i64) -> Option<(f64, i64)> {
        let movie = self.movies.get(&movie_id)?;
        let count = self
            .reviews
            .values()
            .filter(|r| r.movie_id == movie_id)
            .count() as i64;
        Some((movie.avg_rating, count))
    }

    fn set_avg_rating(&mut self, movie_id: i64, avg: f64) {
        if let Some(movie) = self.movies.get_mut(&movie_id) {
            movie.avg_rating = avg;
        }
    }

    fn remove_participation(&mut self, participation_id: i64) -> bool {
        self.participation_roles
            .retain(|_, r| r.participation_id != participation_id);
        self.participations.remove(&participation_id).is_some()
    }

    fn remove_watchlist_items_where(&mut self, keep: impl Fn(&WatchlistItem) -> bool) {
        self.watchlist_items.retain(|_, item| keep(item));
    }

    fn insert_credit(
        &mut self,
        movie_id: i64,
        credit: CastCrewRequest,
    ) -> AppResult<MovieParticipation> {
        if !self.movies.contains_key(&movie_id) {
            return Err(AppError::not_found("Movie", movie_id));
        }
        if !self.persons.contains_key(&credit.person_id) {
            return Err(AppError::not_found("Person", credit.person_id));
        }
        if !self.roles.contains_key(&credit.role_id) {
            return Err(AppError::not_found("Role", credit.role_id));
        }

        let participation = MovieParticipation {
            participation_id: self.next_id("movie_participations"),
            movie_id,
            person_id: credit.person_id,
            created_at: Utc::now(),
        };
        self.participations
            .insert(participation.participation_id, participation.clone());

        let role_row_id = self.next_id("participation_roles");
        self.participation_roles.insert(
            role_row_id,
            ParticipationRole {
                id: role_row_id,
                participation_id: participation.participation_id,
                role_id: credit.role_id,
                note: credit.character_name,
            },
        );
        Ok(participation)
    }
}

/// InMemoryRepository
///
/// Process-local implementation of every store, honouring the same uniqueness
/// rules, cascades and rating maintenance as the Postgres schema. Backs the
/// handler and router tests; also handy for running the API without a database.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the same reference genres and credit roles as the initial migration.
    pub async fn with_reference_data() -> Self {
        let repo = Self::new();
        for name in [
            "Action", "Adventure", "Animation", "Comedy", "Crime", "Drama", "Fantasy", "Horror",
            "Romance", "Sci-Fi", "Thriller",
        ] {
            let _ = repo
                .create_genre(CreateGenreRequest {
                    genre_name: name.to_string(),
                    description: None,
                })
                .await;
        }
        for name in [
            "Actor",
            "Actress",
            "Director",
            "Producer",
            "Writer",
            "Screenplay",
            "Cinematographer",
            "Composer",
        ] {
            let _ = repo
                .create_movie_role(CreateMovieRoleRequest {
                    name: name.to_string(),
                    description: None,
                })
                .await;
        }
        repo
    }
}

// --- Users ---

#[async_trait]
impl UserStore for InMemoryRepository {
    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> AppResult<Option<UserRecord>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::unique_violation("uq_users_username"));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(AppError::unique_violation("uq_users_email"));
        }

        let record = UserRecord {
            id: tables.next_id("users"),
            username: user.username,
            email: user.email,
            password: user.password_hash,
            roles: Role::to_strings(&user.roles),
            created_at: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<Option<UserRecord>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(username) = &changes.username {
            if tables
                .users
                .values()
                .any(|u| u.id != id && &u.username == username)
            {
                return Err(AppError::unique_violation("uq_users_username"));
            }
        }
        if let Some(email) = &changes.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(AppError::unique_violation("uq_users_email"));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password = hash;
        }
        if let Some(roles) = changes.roles {
            user.roles = Role::to_strings(&roles);
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let rated: BTreeSet<i64> = tables
            .reviews
            .values()
            .filter(|r| r.user_id == id)
            .map(|r| r.movie_id)
            .collect();
        tables.reviews.retain(|_, r| r.user_id != id);
        for movie_id in rated {
            let ratings: Vec<i64> = tables
                .reviews
                .values()
                .filter(|r| r.movie_id == movie_id)
                .map(|r| r.rating)
                .collect();
            let avg = if ratings.is_empty() {
                0.0
            } else {
                ratings.iter().sum::<i64>() as f64 / ratings.len() as f64
            };
            tables.set_avg_rating(movie_id, avg);
        }
        let owned: Vec<i64> = tables
            .watchlists
            .values()
            .filter(|w| w.user_id == id)
            .map(|w| w.watchlist_id)
            .collect();
        tables.watchlists.retain(|_, w| w.user_id != id);
        tables.remove_watchlist_items_where(|item| !owned.contains(&item.watchlist_id));
        Ok(true)
    }
}

// --- Movies ---

fn movie_from_request(movie_id: i64, req: MovieRequest, avg_rating: f64) -> Movie {
    Movie {
        movie_id,
        title: req.title,
        release_year: req.release_year,
        duration: req.duration,
        description: req.description,
        language: req.language,
        country: req.country,
        poster_url: req.poster_url,
        trailer_url: req.trailer_url,
        avg_rating,
    }
}

#[async_trait]
impl MovieStore for InMemoryRepository {
    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.tables.read().await.movies.values().cloned().collect())
    }

    async fn list_movies_with_genres(&self) -> AppResult<Vec<MovieWithGenres>> {
        let tables = self.tables.read().await;
        Ok(tables
            .movies
            .values()
            .map(|movie| {
                let mut genres: Vec<String> = tables
                    .movie_genres
                    .iter()
                    .filter(|(m, _)| *m == movie.movie_id)
                    .filter_map(|(_, g)| tables.genres.get(g))
                    .map(|g| g.genre_name.clone())
                    .collect();
                genres.sort();
                MovieWithGenres {
                    movie: movie.clone(),
                    genres,
                }
            })
            .collect())
    }

    async fn get_movie(&self, id: i64) -> AppResult<Option<Movie>> {
        Ok(self.tables.read().await.movies.get(&id).cloned())
    }

    async fn create_movie(&self, movie: MovieRequest) -> AppResult<Movie> {
        let mut tables = self.tables.write().await;
        let created = movie_from_request(tables.next_id("movies"), movie, 0.0);
        tables.movies.insert(created.movie_id, created.clone());
        Ok(created)
    }

    async fn update_movie(&self, id: i64, movie: MovieRequest) -> AppResult<Option<Movie>> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.movies.get_mut(&id) else {
            return Ok(None);
        };
        *existing = movie_from_request(id, movie, existing.avg_rating);
        Ok(Some(existing.clone()))
    }

    async fn delete_movie(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.movies.remove(&id).is_none() {
            return Ok(false);
        }
        tables.movie_genres.retain(|(m, _)| *m != id);
        let participations: Vec<i64> = tables
            .participations
            .values()
            .filter(|p| p.movie_id == id)
            .map(|p| p.participation_id)
            .collect();
        for participation_id in participations {
            tables.remove_participation(participation_id);
        }
        tables.reviews.retain(|_, r| r.movie_id != id);
        tables.remove_watchlist_items_where(|item| item.movie_id != id);
        Ok(true)
    }
}

// --- Genres & Roles ---

#[async_trait]
impl GenreStore for InMemoryRepository {
    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let mut genres: Vec<Genre> = self.tables.read().await.genres.values().cloned().collect();
        genres.sort_by(|a, b| a.genre_name.cmp(&b.genre_name));
        Ok(genres)
    }

    async fn create_genre(&self, genre: CreateGenreRequest) -> AppResult<Genre> {
        let mut tables = self.tables.write().await;
        if tables
            .genres
            .values()
            .any(|g| g.genre_name == genre.genre_name)
        {
            return Err(AppError::unique_violation("uq_genres_name"));
        }
        let created = Genre {
            genre_id: tables.next_id("genres"),
            genre_name: genre.genre_name,
            description: genre.description,
        };
        tables.genres.insert(created.genre_id, created.clone());
        Ok(created)
    }

    async fn movie_genres(&self, movie_id: i64) -> AppResult<Vec<Genre>> {
        let tables = self.tables.read().await;
        let mut genres: Vec<Genre> = tables
            .movie_genres
            .iter()
            .filter(|(m, _)| *m == movie_id)
            .filter_map(|(_, g)| tables.genres.get(g).cloned())
            .collect();
        genres.sort_by(|a, b| a.genre_name.cmp(&b.genre_name));
        Ok(genres)
    }

    async fn link_genres(&self, movie_id: i64, genre_ids: &[i64]) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.movies.contains_key(&movie_id) {
            return Err(AppError::not_found("Movie", movie_id));
        }
        // Validate all before touching anything.
        if let Some(missing) = genre_ids.iter().find(|id| !tables.genres.contains_key(*id)) {
            return Err(AppError::not_found("Genre", *missing));
        }
        for &genre_id in genre_ids {
            tables.movie_genres.insert((movie_id, genre_id));
        }
        Ok(())
    }

    async fn unlink_genre(&self, movie_id: i64, genre_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .movie_genres
            .remove(&(movie_id, genre_id)))
    }
}

#[async_trait]
impl RoleStore for InMemoryRepository {
    async fn list_movie_roles(&self) -> AppResult<Vec<MovieRole>> {
        let mut roles: Vec<MovieRole> = self.tables.read().await.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn create_movie_role(&self, role: CreateMovieRoleRequest) -> AppResult<MovieRole> {
        let mut tables = self.tables.write().await;
        if tables.roles.values().any(|r| r.name == role.name) {
            return Err(AppError::unique_violation("uq_roles_name"));
        }
        let created = MovieRole {
            role_id: tables.next_id("roles"),
            name: role.name,
            description: role.description,
        };
        tables.roles.insert(created.role_id, created.clone());
        Ok(created)
    }
}

// --- Persons & Cast ---

#[async_trait]
impl PersonStore for InMemoryRepository {
    async fn list_persons(&self) -> AppResult<Vec<Person>> {
        let mut persons: Vec<Person> = self.tables.read().await.persons.values().cloned().collect();
        persons.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(persons)
    }

    async fn search_persons(&self, name: &str) -> AppResult<Vec<Person>> {
        let needle = name.to_lowercase();
        let mut persons: Vec<Person> = self
            .tables
            .read()
            .await
            .persons
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        persons.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(persons)
    }

    async fn get_person(&self, id: i64) -> AppResult<Option<Person>> {
        Ok(self.tables.read().await.persons.get(&id).cloned())
    }

    async fn person_name_exists(&self, name: &str) -> AppResult<bool> {
        Ok(self
            .tables
            .read()
            .await
            .persons
            .values()
            .any(|p| p.name == name))
    }

    async fn create_person(&self, person: PersonRequest) -> AppResult<Person> {
        let mut tables = self.tables.write().await;
        let created = Person {
            person_id: tables.next_id("persons"),
            name: person.name,
            birth_date: person.birth_date,
            bio: person.bio,
            profile_url: person.profile_url,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.persons.insert(created.person_id, created.clone());
        Ok(created)
    }

    async fn update_person(&self, id: i64, person: PersonRequest) -> AppResult<Option<Person>> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.persons.get_mut(&id) else {
            return Ok(None);
        };
        existing.name = person.name;
        existing.birth_date = person.birth_date;
        existing.bio = person.bio;
        existing.profile_url = person.profile_url;
        existing.updated_at = Some(Utc::now());
        Ok(Some(existing.clone()))
    }

    async fn delete_person(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.persons.remove(&id).is_none() {
            return Ok(false);
        }
        let participations: Vec<i64> = tables
            .participations
            .values()
            .filter(|p| p.person_id == id)
            .map(|p| p.participation_id)
            .collect();
        for participation_id in participations {
            tables.remove_participation(participation_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl CastStore for InMemoryRepository {
    async fn add_credit(
        &self,
        movie_id: i64,
        credit: CastCrewRequest,
    ) -> AppResult<MovieParticipation> {
        self.tables.write().await.insert_credit(movie_id, credit)
    }

    /// add_credits
    ///
    /// Works on a scratch copy of the affected tables and only publishes it when
    /// every credit succeeded.
    async fn add_credits(
        &self,
        movie_id: i64,
        credits: Vec<CastCrewRequest>,
    ) -> AppResult<Vec<MovieParticipation>> {
        let mut tables = self.tables.write().await;
        let sequences = tables.sequences.clone();
        let participations = tables.participations.clone();
        let participation_roles = tables.participation_roles.clone();

        let mut created = Vec::with_capacity(credits.len());
        for credit in credits {
            match tables.insert_credit(movie_id, credit) {
                Ok(participation) => created.push(participation),
                Err(err) => {
                    tables.sequences = sequences;
                    tables.participations = participations;
                    tables.participation_roles = participation_roles;
                    return Err(err);
                }
            }
        }
        Ok(created)
    }

    async fn movie_cast(&self, movie_id: i64) -> AppResult<Vec<CastEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .participations
            .values()
            .filter(|p| p.movie_id == movie_id)
            .map(|participation| CastEntry {
                roles: tables
                    .participation_roles
                    .values()
                    .filter(|r| r.participation_id == participation.participation_id)
                    .cloned()
                    .collect(),
                participation: participation.clone(),
            })
            .collect())
    }

    async fn movie_credits(&self, movie_id: i64) -> AppResult<Vec<CreditRow>> {
        let tables = self.tables.read().await;
        let mut rows = Vec::new();
        for participation in tables.participations.values().filter(|p| p.movie_id == movie_id) {
            let Some(person) = tables.persons.get(&participation.person_id) else {
                continue;
            };
            for pr in tables
                .participation_roles
                .values()
                .filter(|r| r.participation_id == participation.participation_id)
            {
                let Some(role) = tables.roles.get(&pr.role_id) else {
                    continue;
                };
                rows.push(CreditRow {
                    participation_id: participation.participation_id,
                    person_id: person.person_id,
                    person_name: person.name.clone(),
                    birth_date: person.birth_date,
                    bio: person.bio.clone(),
                    profile_url: person.profile_url.clone(),
                    role_id: role.role_id,
                    role_name: role.name.clone(),
                    role_description: role.description.clone(),
                    note: pr.note.clone(),
                });
            }
        }
        Ok(rows)
    }

    async fn delete_participation(&self, participation_id: i64) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .remove_participation(participation_id))
    }
}

// --- Reviews ---

#[async_trait]
impl ReviewStore for InMemoryRepository {
    async fn list_reviews(&self) -> AppResult<Vec<Review>> {
        Ok(self.tables.read().await.reviews.values().cloned().collect())
    }

    async fn get_review(&self, id: i64) -> AppResult<Option<Review>> {
        Ok(self.tables.read().await.reviews.get(&id).cloned())
    }

    async fn reviews_for_movie(&self, movie_id: i64) -> AppResult<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .values()
            .filter(|r| r.movie_id == movie_id)
            .cloned()
            .collect())
    }

    async fn reviews_for_user(&self, user_id: i64) -> AppResult<Vec<Review>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn reviews_with_authors(&self, movie_id: i64) -> AppResult<Vec<ReviewWithAuthor>> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<ReviewWithAuthor> = tables
            .reviews
            .values()
            .filter(|r| r.movie_id == movie_id)
            .filter_map(|r| {
                let author = tables.users.get(&r.user_id)?;
                Some(ReviewWithAuthor {
                    review: r.clone(),
                    user_name: author.username.clone(),
                })
            })
            .collect();
        reviews.sort_by(|a, b| {
            b.review
                .updated_at
                .cmp(&a.review.updated_at)
                .then(b.review.review_id.cmp(&a.review.review_id))
        });
        Ok(reviews)
    }

    async fn create_review(&self, review: NewReview) -> AppResult<Review> {
        let mut tables = self.tables.write().await;
        let (avg, count) = tables
            .movie_review_stats(review.movie_id)
            .ok_or_else(|| AppError::not_found("Movie", review.movie_id))?;
        if !tables.users.contains_key(&review.user_id) {
            return Err(AppError::not_found("User", review.user_id));
        }

        let now = Utc::now();
        let created = Review {
            review_id: tables.next_id("reviews"),
            user_id: review.user_id,
            movie_id: review.movie_id,
            rating: review.rating,
            review_text: review.review_text,
            helpful_count: 0,
            created_at: now,
            updated_at: now,
        };
        tables.reviews.insert(created.review_id, created.clone());
        tables.set_avg_rating(
            created.movie_id,
            rating::after_insert(avg, count, created.rating),
        );
        Ok(created)
    }

    async fn update_review(&self, id: i64, changes: ReviewChanges) -> AppResult<Option<Review>> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.reviews.get(&id).cloned() else {
            return Ok(None);
        };

        let new_rating = changes.rating.unwrap_or(existing.rating);
        if new_rating != existing.rating {
            if let Some((avg, count)) = tables.movie_review_stats(existing.movie_id) {
                let new_avg = rating::after_update(avg, count, existing.rating, new_rating);
                tables.set_avg_rating(existing.movie_id, new_avg);
            }
        }

        let Some(review) = tables.reviews.get_mut(&id) else {
            return Ok(None);
        };
        review.rating = new_rating;
        if let Some(text) = changes.review_text {
            review.review_text = text;
        }
        review.updated_at = Utc::now();
        Ok(Some(review.clone()))
    }

    async fn delete_review(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(existing) = tables.reviews.get(&id).cloned() else {
            return Ok(false);
        };

        if let Some((avg, count)) = tables.movie_review_stats(existing.movie_id) {
            let new_avg = rating::after_delete(avg, count, existing.rating);
            tables.set_avg_rating(existing.movie_id, new_avg);
        }
        tables.reviews.remove(&id);
        Ok(true)
    }
}

// --- Watchlists ---

#[async_trait]
impl WatchlistStore for InMemoryRepository {
    async fn watchlists_for_user(&self, user_id: i64) -> AppResult<Vec<Watchlist>> {
        let tables = self.tables.read().await;
        Ok(tables
            .watchlists
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_watchlist(&self, id: i64) -> AppResult<Option<Watchlist>> {
        Ok(self.tables.read().await.watchlists.get(&id).cloned())
    }

    async fn create_watchlist(&self, user_id: i64, req: WatchlistRequest) -> AppResult<Watchlist> {
        let mut tables = self.tables.write().await;
        let created = Watchlist {
            watchlist_id: tables.next_id("watchlists"),
            user_id,
            name: req.name,
            description: req.description,
            created_at: Utc::now(),
        };
        tables.watchlists.insert(created.watchlist_id, created.clone());
        Ok(created)
    }

    async fn update_watchlist(
        &self,
        id: i64,
        req: WatchlistRequest,
    ) -> AppResult<Option<Watchlist>> {
        let mut tables = self.tables.write().await;
        let Some(list) = tables.watchlists.get_mut(&id) else {
            return Ok(None);
        };
        list.name = req.name;
        list.description = req.description;
        Ok(Some(list.clone()))
    }

    async fn delete_watchlist(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        tables.remove_watchlist_items_where(|item| item.watchlist_id != id);
        Ok(tables.watchlists.remove(&id).is_some())
    }

    async fn watchlist_items(&self, watchlist_id: i64) -> AppResult<Vec<WatchlistItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .watchlist_items
            .values()
            .filter(|i| i.watchlist_id == watchlist_id)
            .cloned()
            .collect())
    }

    async fn watchlist_movies(&self, watchlist_id: i64) -> AppResult<Vec<Movie>> {
        let tables = self.tables.read().await;
        Ok(tables
            .watchlist_items
            .values()
            .filter(|i| i.watchlist_id == watchlist_id)
            .filter_map(|i| tables.movies.get(&i.movie_id).cloned())
            .collect())
    }

    async fn add_watchlist_item(
        &self,
        watchlist_id: i64,
        movie_id: i64,
    ) -> AppResult<WatchlistItem> {
        let mut tables = self.tables.write().await;
        if !tables.watchlists.contains_key(&watchlist_id) {
            return Err(AppError::not_found("Watchlist", watchlist_id));
        }
        if !tables.movies.contains_key(&movie_id) {
            return Err(AppError::not_found("Movie", movie_id));
        }
        if tables
            .watchlist_items
            .values()
            .any(|i| i.watchlist_id == watchlist_id && i.movie_id == movie_id)
        {
            return Err(AppError::unique_violation("uq_watchlist_items_movie"));
        }
        let item = WatchlistItem {
            watchlist_item_id: tables.next_id("watchlist_items"),
            watchlist_id,
            movie_id,
            added_at: Utc::now(),
        };
        tables.watchlist_items.insert(item.watchlist_item_id, item.clone());
        Ok(item)
    }

    async fn remove_watchlist_item(&self, watchlist_id: i64, movie_id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.watchlist_items.len();
        tables
            .watchlist_items
            .retain(|_, i| !(i.watchlist_id == watchlist_id && i.movie_id == movie_id));
        Ok(tables.watchlist_items.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str) -> MovieRequest {
        MovieRequest {
            title: title.to_string(),
            release_year: 1999,
            ..Default::default()
        }
    }

    async fn user(repo: &InMemoryRepository, name: &str) -> UserRecord {
        repo.create_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "hash".into(),
            roles: vec![Role::User],
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let repo = InMemoryRepository::new();
        user(&repo, "neo").await;
        let err = repo
            .create_user(NewUser {
                username: "neo".into(),
                email: "other@example.com".into(),
                password_hash: "x".into(),
                roles: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn review_lifecycle_keeps_running_mean() {
        let repo = InMemoryRepository::new();
        let m = repo.create_movie(movie("The Matrix")).await.unwrap();
        let a = user(&repo, "a").await;
        let b = user(&repo, "b").await;

        let ra = repo
            .create_review(NewReview {
                user_id: a.id,
                movie_id: m.movie_id,
                rating: 5,
                review_text: None,
            })
            .await
            .unwrap();
        repo.create_review(NewReview {
            user_id: b.id,
            movie_id: m.movie_id,
            rating: 2,
            review_text: None,
        })
        .await
        .unwrap();
        let avg = repo.get_movie(m.movie_id).await.unwrap().unwrap().avg_rating;
        assert!((avg - 3.5).abs() < 1e-9);

        repo.update_review(
            ra.review_id,
            ReviewChanges {
                rating: Some(4),
                review_text: None,
            },
        )
        .await
        .unwrap();
        let avg = repo.get_movie(m.movie_id).await.unwrap().unwrap().avg_rating;
        assert!((avg - 3.0).abs() < 1e-9);

        assert!(repo.delete_review(ra.review_id).await.unwrap());
        let avg = repo.get_movie(m.movie_id).await.unwrap().unwrap().avg_rating;
        assert!((avg - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn bulk_credits_are_all_or_nothing() {
        let repo = InMemoryRepository::with_reference_data().await;
        let m = repo.create_movie(movie("Heat")).await.unwrap();
        let p = repo
            .create_person(PersonRequest {
                name: "Al Pacino".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let actor = repo.list_movie_roles().await.unwrap()[0].role_id;

        let err = repo
            .add_credits(
                m.movie_id,
                vec![
                    CastCrewRequest {
                        person_id: p.person_id,
                        role_id: actor,
                        character_name: Some("Vincent Hanna".into()),
                    },
                    CastCrewRequest {
                        person_id: 999,
                        role_id: actor,
                        character_name: None,
                    },
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.movie_cast(m.movie_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_movie_cascades() {
        let repo = InMemoryRepository::with_reference_data().await;
        let m = repo.create_movie(movie("Alien")).await.unwrap();
        let u = user(&repo, "ripley").await;
        let list = repo
            .create_watchlist(
                u.id,
                WatchlistRequest {
                    name: "Space".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        repo.add_watchlist_item(list.watchlist_id, m.movie_id)
            .await
            .unwrap();
        let horror = repo.list_genres().await.unwrap()[7].genre_id;
        repo.link_genres(m.movie_id, &[horror]).await.unwrap();

        assert!(repo.delete_movie(m.movie_id).await.unwrap());
        assert!(repo.watchlist_items(list.watchlist_id).await.unwrap().is_empty());
        assert!(repo.movie_genres(m.movie_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_user_recomputes_ratings() {
        let repo = InMemoryRepository::new();
        let m = repo.create_movie(movie("Heat")).await.unwrap();
        let a = user(&repo, "a").await;
        let b = user(&repo, "b").await;
        for (user_id, rating) in [(a.id, 5), (b.id, 1)] {
            repo.create_review(NewReview {
                user_id,
                movie_id: m.movie_id,
                rating,
                review_text: None,
            })
            .await
            .unwrap();
        }

        assert!(repo.delete_user(b.id).await.unwrap());
        let movie = repo.get_movie(m.movie_id).await.unwrap().unwrap();
        assert_eq!(movie.avg_rating, 5.0);
    }
}
