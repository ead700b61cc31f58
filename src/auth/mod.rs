use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Role, UserRecord},
    repository::RepositoryState,
};

pub mod blacklist;
pub mod jwt;
pub mod password;

pub use blacklist::{BlacklistState, InMemoryTokenBlacklist, TokenBlacklist};
pub use jwt::Claims;

/// AuthUser
///
/// Resolved identity of an authenticated request. Roles are always the user's
/// current roles as stored, not the ones baked into the token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Owner-or-admin rule used for reviews.
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.id == owner_id || self.is_admin()
    }
}

impl From<UserRecord> for AuthUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            roles: Role::parse_all(&record.roles),
            username: record.username,
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument. Resolution order:
/// 1. Reuse: an identity already resolved by the route-level auth middleware.
/// 2. Local Bypass: in `Env::Local`, an `x-user-id` header naming an existing user.
/// 3. Bearer: HS256 JWT, not expired, not revoked, subject still exists.
/// 4. Basic: `base64(username:password)` verified against the stored argon2 hash.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    BlacklistState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // 1. Reuse
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 2. Local Development Bypass
        if config.env == Env::Local {
            if let Some(id) = parts
                .headers
                .get("x-user-id")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok())
            {
                if let Some(user) = repo.get_user(id).await? {
                    return Ok(user.into());
                }
            }
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

        // 3. Bearer token
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let claims = jwt::validate_token(token.trim(), &config.jwt_secret).map_err(|e| {
                tracing::debug!(error = %e, "Rejected bearer token");
                AppError::Unauthorized("Invalid or expired token".into())
            })?;

            let blacklist = BlacklistState::from_ref(state);
            if blacklist.is_revoked(&claims.jti).await {
                return Err(AppError::Unauthorized("Token has been revoked".into()));
            }

            let user = repo
                .get_user(claims.uid)
                .await?
                .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;
            return Ok(user.into());
        }

        // 4. HTTP Basic
        if let Some(encoded) = auth_header.strip_prefix("Basic ") {
            let (username, password) = decode_basic(encoded.trim())
                .ok_or_else(|| AppError::Unauthorized("Malformed Basic credentials".into()))?;
            let user = verify_credentials(&repo, &username, &password).await?;
            return Ok(user.into());
        }

        Err(AppError::Unauthorized("Unsupported authorization scheme".into()))
    }
}

/// AdminUser
///
/// Wraps [`AuthUser`] and rejects callers without `ROLE_ADMIN` with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    BlacklistState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = user.id, "Admin role required");
            return Err(AppError::Forbidden("Admin role required".into()));
        }
        Ok(AdminUser(user))
    }
}

/// verify_credentials
///
/// Username/password check shared by login and HTTP Basic. Unknown users and
/// wrong passwords produce the same 401 so usernames cannot be probed.
pub async fn verify_credentials(
    repo: &RepositoryState,
    username: &str,
    password: &str,
) -> Result<UserRecord, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".into());

    let user = repo.find_user_by_username(username).await?.ok_or_else(invalid)?;
    if password::verify_password(password, &user.password)? {
        Ok(user)
    } else {
        Err(invalid())
    }
}

fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let bytes = BASE64.decode(encoded).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_credentials_split_on_first_colon() {
        let encoded = BASE64.encode("alice:pa:ss");
        assert_eq!(
            decode_basic(&encoded),
            Some(("alice".to_string(), "pa:ss".to_string()))
        );
    }

    #[test]
    fn basic_without_colon_is_rejected() {
        assert_eq!(decode_basic(&BASE64.encode("alice")), None);
        assert_eq!(decode_basic("%%%"), None);
    }

    #[test]
    fn owner_or_admin() {
        let user = AuthUser {
            id: 1,
            username: "u".into(),
            roles: vec![Role::User],
        };
        assert!(user.can_modify(1));
        assert!(!user.can_modify(2));

        let admin = AuthUser {
            roles: vec![Role::User, Role::Admin],
            ..user
        };
        assert!(admin.can_modify(2));
    }
}
