use movie_catalog::models::{
    AddWatchlistItemRequest, CreateReviewRequest, JwtResponse, Movie, MovieRequest,
    MovieWithGenres, PatchReviewRequest, PersonRequest, RegisterRequest, ReviewChanges, Role,
    User, UserRecord,
};
use serde_json::json;
use validator::Validate;

// --- Wire Format ---

#[test]
fn test_movie_serializes_camel_case() {
    let movie = Movie {
        movie_id: 7,
        title: "Arrival".into(),
        release_year: 2016,
        avg_rating: 4.5,
        ..Movie::default()
    };
    let value = serde_json::to_value(&movie).unwrap();
    assert_eq!(value["movieId"], 7);
    assert_eq!(value["releaseYear"], 2016);
    assert_eq!(value["avgRating"], 4.5);
    assert!(value.get("movie_id").is_none());
}

#[test]
fn test_movie_with_genres_is_flat() {
    let entry = MovieWithGenres {
        movie: Movie {
            movie_id: 1,
            title: "Heat".into(),
            release_year: 1995,
            ..Movie::default()
        },
        genres: vec!["Crime".into(), "Thriller".into()],
    };
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["title"], "Heat");
    assert_eq!(value["genres"], json!(["Crime", "Thriller"]));
}

#[test]
fn test_jwt_response_uses_type_key() {
    let body = JwtResponse {
        token: "abc".into(),
        token_type: "Bearer".into(),
        username: "u".into(),
        email: "u@example.com".into(),
        roles: vec![Role::User, Role::Admin],
    };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["type"], "Bearer");
    assert_eq!(value["roles"], json!(["ROLE_USER", "ROLE_ADMIN"]));
}

#[test]
fn test_user_never_exposes_password() {
    let record = UserRecord {
        id: 1,
        username: "alice".into(),
        email: "alice@example.com".into(),
        password: "$argon2id$...".into(),
        roles: vec!["ROLE_USER".into(), "ROLE_UNKNOWN".into()],
        created_at: chrono::Utc::now(),
    };
    let user = User::from(record);
    assert_eq!(user.roles, vec![Role::User]);

    let value = serde_json::to_value(&user).unwrap();
    assert!(value.get("password").is_none());
    assert!(value.get("createdAt").is_some());
}

// --- Validation ---

#[test]
fn test_register_request_rules() {
    let ok = RegisterRequest {
        username: "moviefan".into(),
        email: "fan@example.com".into(),
        password: "secret1".into(),
    };
    assert!(ok.validate().is_ok());

    let bad = RegisterRequest {
        username: "ab".into(),
        email: "not-an-email".into(),
        password: "123".into(),
    };
    let errors = bad.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("username"));
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("password"));
}

#[test]
fn test_movie_request_rules() {
    let req: MovieRequest = serde_json::from_value(json!({
        "title": "Inception",
        "releaseYear": 2010,
        "posterUrl": "https://img.example.com/inception.jpg"
    }))
    .unwrap();
    assert!(req.validate().is_ok());

    let req = MovieRequest {
        title: "x".repeat(51),
        release_year: 1887,
        duration: Some(0),
        poster_url: Some("not a url".into()),
        ..MovieRequest::default()
    };
    let errors = req.validate().unwrap_err();
    let fields = errors.field_errors();
    for field in ["title", "release_year", "duration", "poster_url"] {
        assert!(fields.contains_key(field), "expected error on {field}");
    }
}

#[test]
fn test_movie_request_ignores_client_rating() {
    // avgRating is not part of the request and is silently dropped.
    let req: MovieRequest = serde_json::from_value(json!({
        "title": "Inception",
        "releaseYear": 2010,
        "avgRating": 9.9
    }))
    .unwrap();
    assert_eq!(req.title, "Inception");
}

#[test]
fn test_person_profile_url_may_be_empty() {
    let req = PersonRequest {
        name: "Agnès Varda".into(),
        profile_url: Some(String::new()),
        ..PersonRequest::default()
    };
    assert!(req.validate().is_ok());
}

#[test]
fn test_review_rating_range() {
    for (rating, valid) in [(0, false), (1, true), (5, true), (6, false)] {
        let req = CreateReviewRequest {
            movie_id: 1,
            rating,
            review_text: None,
        };
        assert_eq!(req.validate().is_ok(), valid, "rating {rating}");
    }
}

#[test]
fn test_patch_review_only_touches_supplied_fields() {
    let req: PatchReviewRequest = serde_json::from_value(json!({ "rating": 4 })).unwrap();
    let changes = ReviewChanges::from(req);
    assert_eq!(changes.rating, Some(4));
    assert!(changes.review_text.is_none());
}

#[test]
fn test_add_item_without_movie_id_still_parses() {
    let req: AddWatchlistItemRequest = serde_json::from_value(json!({})).unwrap();
    assert_eq!(req.movie_id, None);
}
