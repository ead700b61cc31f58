use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        CastCrewRequest, CastEntry, CreateGenreRequest, CreateMovieRoleRequest, CreditRow, Genre,
        Movie, MovieParticipation, MovieRequest, MovieRole, MovieWithGenres, NewReview, NewUser,
        Person, PersonRequest, Review, ReviewChanges, ReviewWithAuthor, UserChanges, UserRecord,
        Watchlist, WatchlistItem, WatchlistRequest,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

// Persistence contracts, one per aggregate. Handlers only see `Arc<dyn Repository>`,
// so Postgres in production and the in-memory store in tests are interchangeable.
//
// Conventions:
// - Lookups return `Ok(None)` for a missing row; handlers turn that into a 404.
// - Deletes return whether a row was removed.
// - Writes that reference other rows return `AppError::NotFound` for a dangling id
//   and `AppError::Conflict` for a uniqueness violation.

/// UserStore
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self) -> AppResult<Vec<UserRecord>>;
    async fn get_user(&self, id: i64) -> AppResult<Option<UserRecord>>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;
    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord>;
    // Only fields that are `Some` change.
    async fn update_user(&self, id: i64, changes: UserChanges) -> AppResult<Option<UserRecord>>;
    async fn delete_user(&self, id: i64) -> AppResult<bool>;
}

/// MovieStore
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn list_movies(&self) -> AppResult<Vec<Movie>>;
    async fn list_movies_with_genres(&self) -> AppResult<Vec<MovieWithGenres>>;
    async fn get_movie(&self, id: i64) -> AppResult<Option<Movie>>;
    /// Inserts a movie with `avg_rating = 0`.
    async fn create_movie(&self, movie: MovieRequest) -> AppResult<Movie>;
    /// Replaces every editable column. `avg_rating` is preserved.
    async fn update_movie(&self, id: i64, movie: MovieRequest) -> AppResult<Option<Movie>>;
    /// Removes the movie together with its genre links, credits, reviews and watchlist entries.
    async fn delete_movie(&self, id: i64) -> AppResult<bool>;
}

/// GenreStore
#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;
    async fn create_genre(&self, genre: CreateGenreRequest) -> AppResult<Genre>;
    async fn movie_genres(&self, movie_id: i64) -> AppResult<Vec<Genre>>;
    /// Links every genre or none. Already-linked genres are left alone.
    async fn link_genres(&self, movie_id: i64, genre_ids: &[i64]) -> AppResult<()>;
    async fn unlink_genre(&self, movie_id: i64, genre_id: i64) -> AppResult<bool>;
}

/// RoleStore
///
/// Film credit roles, not account roles.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn list_movie_roles(&self) -> AppResult<Vec<MovieRole>>;
    async fn create_movie_role(&self, role: CreateMovieRoleRequest) -> AppResult<MovieRole>;
}

/// PersonStore
#[async_trait]
pub trait PersonStore: Send + Sync {
    async fn list_persons(&self) -> AppResult<Vec<Person>>;
    /// Case-insensitive substring match on the name.
    async fn search_persons(&self, name: &str) -> AppResult<Vec<Person>>;
    async fn get_person(&self, id: i64) -> AppResult<Option<Person>>;
    async fn person_name_exists(&self, name: &str) -> AppResult<bool>;
    async fn create_person(&self, person: PersonRequest) -> AppResult<Person>;
    async fn update_person(&self, id: i64, person: PersonRequest) -> AppResult<Option<Person>>;
    async fn delete_person(&self, id: i64) -> AppResult<bool>;
}

/// CastStore
#[async_trait]
pub trait CastStore: Send + Sync {
    /// Creates one participation and its role row.
    async fn add_credit(
        &self,
        movie_id: i64,
        credit: CastCrewRequest,
    ) -> AppResult<MovieParticipation>;
    /// Same as [`CastStore::add_credit`] for a batch, all-or-nothing.
    async fn add_credits(
        &self,
        movie_id: i64,
        credits: Vec<CastCrewRequest>,
    ) -> AppResult<Vec<MovieParticipation>>;
    async fn movie_cast(&self, movie_id: i64) -> AppResult<Vec<CastEntry>>;
    /// One row per (participation, role), ordered by participation id.
    async fn movie_credits(&self, movie_id: i64) -> AppResult<Vec<CreditRow>>;
    async fn delete_participation(&self, participation_id: i64) -> AppResult<bool>;
}

/// ReviewStore
///
/// Every write also maintains the movie's `avg_rating` (see [`crate::rating`]) in the
/// same unit of work.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn list_reviews(&self) -> AppResult<Vec<Review>>;
    async fn get_review(&self, id: i64) -> AppResult<Option<Review>>;
    async fn reviews_for_movie(&self, movie_id: i64) -> AppResult<Vec<Review>>;
    async fn reviews_for_user(&self, user_id: i64) -> AppResult<Vec<Review>>;
    /// Reviews with their authors' usernames, most recently updated first.
    async fn reviews_with_authors(&self, movie_id: i64) -> AppResult<Vec<ReviewWithAuthor>>;
    async fn create_review(&self, review: NewReview) -> AppResult<Review>;
    async fn update_review(&self, id: i64, changes: ReviewChanges) -> AppResult<Option<Review>>;
    async fn delete_review(&self, id: i64) -> AppResult<bool>;
}

/// WatchlistStore
///
/// Ownership is checked by the handlers; the store trusts its callers.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn watchlists_for_user(&self, user_id: i64) -> AppResult<Vec<Watchlist>>;
    async fn get_watchlist(&self, id: i64) -> AppResult<Option<Watchlist>>;
    async fn create_watchlist(&self, user_id: i64, req: WatchlistRequest) -> AppResult<Watchlist>;
    async fn update_watchlist(&self, id: i64, req: WatchlistRequest)
    -> AppResult<Option<Watchlist>>;
    async fn delete_watchlist(&self, id: i64) -> AppResult<bool>;
    async fn watchlist_items(&self, watchlist_id: i64) -> AppResult<Vec<WatchlistItem>>;
    async fn watchlist_movies(&self, watchlist_id: i64) -> AppResult<Vec<Movie>>;
    async fn add_watchlist_item(&self, watchlist_id: i64, movie_id: i64)
    -> AppResult<WatchlistItem>;
    async fn remove_watchlist_item(&self, watchlist_id: i64, movie_id: i64) -> AppResult<bool>;
}

/// Repository
///
/// The full persistence surface. Implemented automatically for any type that
/// implements every store.
pub trait Repository:
    UserStore + MovieStore + GenreStore + RoleStore + PersonStore + CastStore + ReviewStore + WatchlistStore
{
}

impl<T> Repository for T where
    T: UserStore
        + MovieStore
        + GenreStore
        + RoleStore
        + PersonStore
        + CastStore
        + ReviewStore
        + WatchlistStore
{
}

/// RepositoryState
///
/// Shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
