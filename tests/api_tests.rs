use movie_catalog::{
    AppState, create_router,
    auth::{InMemoryTokenBlacklist, password},
    config::AppConfig,
    models::{NewUser, Role},
    repository::{InMemoryRepository, RepositoryState, UserStore},
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct TestApp {
    pub address: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": password,
            }))
            .send()
            .await
            .expect("register request failed")
    }

    /// Registers (if needed) and logs in, returning a bearer token.
    async fn login(&self, username: &str, password: &str) -> String {
        self.register(username, password).await;
        let body: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("login request failed")
            .json()
            .await
            .unwrap();
        body["token"].as_str().expect("token in login response").to_string()
    }

    async fn admin_token(&self) -> String {
        self.state
            .repo
            .create_user(NewUser {
                username: "admin".into(),
                email: "admin@example.com".into(),
                password_hash: password::hash_password("adminpass").unwrap(),
                roles: vec![Role::User, Role::Admin],
            })
            .await
            .unwrap();
        let body: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": "admin", "password": "adminpass" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_movie(&self, token: &str, title: &str) -> i64 {
        let body: Value = self
            .client
            .post(self.url("/movies"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "releaseYear": 2010 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        body["movieId"].as_i64().expect("movieId in response")
    }
}

async fn spawn_app() -> TestApp {
    let state = AppState {
        repo: Arc::new(InMemoryRepository::with_reference_data().await) as RepositoryState,
        blacklist: Arc::new(InMemoryTokenBlacklist::new()),
        config: AppConfig::default(),
    };
    let router = create_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        state,
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = spawn_app().await;
    let doc: Value = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"]["/api/reviews/{id}"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer"].is_object());
}

#[tokio::test]
async fn test_register_and_login() {
    let app = spawn_app().await;

    let response = app.register("moviefan", "secret1").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "moviefan");
    assert_eq!(body["roles"], json!(["ROLE_USER"]));

    // Same username again is a client error.
    let response = app.register("moviefan", "secret1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": "moviefan", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["type"], "Bearer");
    assert!(body["token"].as_str().is_some());

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "username": "moviefan", "password": "wrong!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalog_reads_are_public_writes_are_not() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/movies")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .post(app.url("/movies"))
        .json(&json!({ "title": "Inception", "releaseYear": 2010 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_basic_auth_is_accepted() {
    let app = spawn_app().await;
    app.register("basicuser", "secret1").await;

    let response = app
        .client
        .post(app.url("/movies"))
        .basic_auth("basicuser", Some("secret1"))
        .json(&json!({ "title": "Memento", "releaseYear": 2000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_movie_delete_requires_admin() {
    let app = spawn_app().await;
    let user_token = app.login("alice", "secret1").await;
    let movie_id = app.create_movie(&user_token, "Inception").await;

    let response = app
        .client
        .delete(app.url(&format!("/movies/{movie_id}")))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = app.admin_token().await;
    let response = app
        .client
        .delete(app.url(&format!("/movies/{movie_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .client
        .get(app.url(&format!("/movies/{movie_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reviews_drive_average_rating() {
    let app = spawn_app().await;
    let alice = app.login("alice", "secret1").await;
    let bob = app.login("bob", "secret1").await;
    let movie_id = app.create_movie(&alice, "Inception").await;

    for (token, rating) in [(&alice, 5), (&bob, 2)] {
        let response = app
            .client
            .post(app.url("/api/reviews"))
            .bearer_auth(token)
            .json(&json!({ "movieId": movie_id, "rating": rating, "reviewText": "Seen it" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().contains_key("location"));
    }

    let movie: Value = app
        .client
        .get(app.url(&format!("/movies/{movie_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(movie["avgRating"], json!(3.5));

    let reviews: Value = app
        .client
        .get(app.url(&format!("/movies/{movie_id}/reviews")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reviews.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_watchlist_privacy() {
    let app = spawn_app().await;
    let alice = app.login("alice", "secret1").await;
    let bob = app.login("bob", "secret1").await;

    let list: Value = app
        .client
        .post(app.url("/api/watchlists"))
        .bearer_auth(&alice)
        .json(&json!({ "name": "Favourites" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list_id = list["watchlistId"].as_i64().unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/watchlists/{list_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .client
        .get(app.url("/api/watchlists/99999"))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = spawn_app().await;
    let token = app.login("alice", "secret1").await;

    let response = app
        .client
        .post(app.url("/api/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .get(app.url("/api/watchlists"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_bearer_is_bad_request() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(app.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
