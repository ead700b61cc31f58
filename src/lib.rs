use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod rating;
pub mod repository;

// Routing split by access level (public, authenticated, admin).
pub mod routes;
use auth::{AdminUser, AuthUser};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::{BlacklistState, InMemoryTokenBlacklist};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and
/// browsable through Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::register, handlers::auth::login, handlers::auth::logout,
        handlers::users::list_users, handlers::users::get_user, handlers::users::create_user,
        handlers::users::update_user, handlers::users::delete_user,
        handlers::movies::list_movies, handlers::movies::list_movies_with_genres,
        handlers::movies::get_movie, handlers::movies::list_full_details,
        handlers::movies::get_full_details, handlers::movies::movie_reviews,
        handlers::movies::create_movie, handlers::movies::update_movie,
        handlers::movies::delete_movie,
        handlers::genres::list_genres, handlers::genres::create_genre,
        handlers::genres::link_genres, handlers::genres::unlink_genre,
        handlers::roles::list_roles, handlers::roles::create_role,
        handlers::persons::list_persons, handlers::persons::search_persons,
        handlers::persons::get_person, handlers::persons::create_person,
        handlers::persons::update_person, handlers::persons::delete_person,
        handlers::cast::add_cast_member, handlers::cast::add_cast_members_bulk,
        handlers::cast::list_cast, handlers::cast::remove_participation,
        handlers::reviews::list_reviews, handlers::reviews::get_review,
        handlers::reviews::create_review, handlers::reviews::replace_review,
        handlers::reviews::patch_review, handlers::reviews::delete_review,
        handlers::reviews::reviews_by_movie, handlers::reviews::reviews_by_user,
        handlers::watchlists::my_watchlists, handlers::watchlists::get_watchlist,
        handlers::watchlists::create_watchlist, handlers::watchlists::update_watchlist,
        handlers::watchlists::delete_watchlist, handlers::watchlists::watchlist_items,
        handlers::watchlists::watchlist_movies, handlers::watchlists::add_watchlist_item,
        handlers::watchlists::remove_watchlist_item,
    ),
    components(
        schemas(
            models::Role, models::User, models::RegisterRequest, models::LoginRequest,
            models::CreateUserRequest, models::UpdateUserRequest, models::JwtResponse,
            models::RegisterResponse, models::MessageResponse,
            models::Movie, models::MovieRequest, models::MovieWithGenres, models::MovieFullDetails,
            models::PersonCredit, models::RoleCredit, models::GenreSummary,
            models::Genre, models::CreateGenreRequest, models::LinkGenresRequest,
            models::MovieRole, models::CreateMovieRoleRequest,
            models::Person, models::PersonRequest,
            models::MovieParticipation, models::ParticipationRole, models::CastEntry,
            models::CastCrewRequest,
            models::Review, models::ReviewWithAuthor, models::CreateReviewRequest,
            models::ReplaceReviewRequest, models::PatchReviewRequest,
            models::Watchlist, models::WatchlistItem, models::WatchlistRequest,
            models::AddWatchlistItemRequest,
        )
    ),
    modifiers(&SecurityAddon),
    security(("bearer" = []), ("basic" = [])),
    tags(
        (name = "auth", description = "Registration, login and logout"),
        (name = "users", description = "Account administration"),
        (name = "movies", description = "Movie catalog"),
        (name = "genres", description = "Genres and movie genre links"),
        (name = "roles", description = "Film credit roles"),
        (name = "persons", description = "People who work on movies"),
        (name = "cast", description = "Cast and crew credits"),
        (name = "reviews", description = "User reviews and ratings"),
        (name = "watchlists", description = "Personal watchlists"),
    )
)]
pub struct ApiDoc;

/// Registers the two accepted credential schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme("basic", SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)));
    }
}

/// AppState
///
/// Shared, cheaply cloneable container for everything a request may need.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for every aggregate (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Revoked token ids, consulted on every bearer authentication.
    pub blacklist: BlacklistState,
    /// Loaded, immutable configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors such as `AuthUser` pull single components out of the state.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for BlacklistState {
    fn from_ref(app_state: &AppState) -> BlacklistState {
        app_state.blacklist.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Route layer for `authenticated_routes`. Resolving `AuthUser` rejects the request
/// with 401 on bad or missing credentials; on success the identity is stored in the
/// request extensions so the handler's own `AuthUser` does not authenticate twice.
async fn auth_middleware(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// admin_middleware
///
/// Route layer for `admin_routes`: 401 without valid credentials, 403 without
/// `ROLE_ADMIN`.
async fn admin_middleware(
    AdminUser(user): AdminUser,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// create_router
///
/// Assembles all routes, their access layers and the observability stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    // Paths shared between modules (e.g. `/movies/{id}`) merge per method, so each
    // method keeps the layer of the module it was declared in.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`; correlates every log line of a request by its id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
