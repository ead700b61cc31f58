//! HS256 access tokens.
//!
//! Tokens identify the user by username (`sub`) and id (`uid`) and carry their
//! roles. Every token has a unique `jti` so that logout can revoke it before it
//! expires (see [`super::blacklist`]).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;

/// Claims
///
/// Payload signed into every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,
    /// Database id of the user.
    pub uid: i64,
    pub roles: Vec<String>,
    /// Issued at (UTC Unix timestamp).
    pub iat: usize,
    /// Expiration (UTC Unix timestamp).
    pub exp: usize,
    /// Unique token id, the unit of revocation.
    pub jti: String,
}

/// issue_token
///
/// Signs a fresh token valid for `lifetime_secs` seconds from now.
pub fn issue_token(
    user_id: i64,
    username: &str,
    roles: &[Role],
    secret: &str,
    lifetime_secs: u64,
) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0) as usize;
    let claims = Claims {
        sub: username.to_string(),
        uid: user_id,
        roles: Role::to_strings(roles),
        iat: now,
        exp: now.saturating_add(usize::try_from(lifetime_secs).unwrap_or(usize::MAX)),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, claims))
}

/// validate_token
///
/// Verifies signature and expiry and returns the embedded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // Tokens are short-lived; no clock skew allowance.
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    const SECRET: &str = "unit-test-secret-long-enough-for-hmac";

    #[test]
    fn issued_token_validates() {
        let (token, issued) = issue_token(7, "alice", &[Role::User], SECRET, 3600).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims, issued);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.roles, vec!["ROLE_USER".to_string()]);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn every_token_gets_a_new_jti() {
        let (_, a) = issue_token(1, "a", &[], SECRET, 60).unwrap();
        let (_, b) = issue_token(1, "a", &[], SECRET, 60).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn oversized_lifetime_saturates_instead_of_overflowing() {
        let (token, issued) = issue_token(1, "a", &[], SECRET, u64::MAX).unwrap();
        assert_eq!(issued.exp, usize::MAX);
        assert!(validate_token(&token, SECRET).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = issue_token(1, "a", &[], SECRET, 60).unwrap();
        let err = validate_token(&token, "another-secret").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidSignature));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "old".into(),
            uid: 1,
            roles: vec![],
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = validate_token(&token, SECRET).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::ExpiredSignature));
    }
}
