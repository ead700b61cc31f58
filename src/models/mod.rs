use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use validator::ValidationError;

pub mod cast;
pub mod genre;
pub mod movie;
pub mod person;
pub mod review;
pub mod role;
pub mod user;
pub mod watchlist;

pub use cast::*;
pub use genre::*;
pub use movie::*;
pub use person::*;
pub use review::*;
pub use role::*;
pub use user::*;
pub use watchlist::*;

// Scheme optional, at least one dotted host label, optional path/query.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?([\w-]+\.)+[\w-]+(/[\w\-./?%&=]*)?$").expect("URL regex is valid")
});

/// validate_url
///
/// Custom `validator` rule for poster, trailer and profile links.
/// An empty string is accepted and treated as "no link".
pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || URL_RE.is_match(value) {
        return Ok(());
    }
    let mut err = ValidationError::new("url");
    err.message = Some("must be a valid URL".into());
    Err(err)
}

/// MessageResponse
///
/// Plain acknowledgement body used by endpoints that have nothing else to return
/// (logout, cast creation, item removal).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validate_url;

    #[test]
    fn accepts_common_links() {
        for url in [
            "",
            "https://image.tmdb.org/t/p/w500/poster.jpg",
            "http://example.com",
            "www.youtube.com/watch?v=abc-123",
        ] {
            assert!(validate_url(url).is_ok(), "{url} should be accepted");
        }
    }

    #[test]
    fn rejects_garbage() {
        for url in ["not a url", "ftp://example.com/file", "localhost"] {
            assert!(validate_url(url).is_err(), "{url} should be rejected");
        }
    }
}
