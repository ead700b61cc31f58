use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

/// Role
///
/// Account-level authority. Persisted as its `ROLE_*` string in the `users.roles` array
/// and carried in the JWT `roles` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_MODERATOR")]
    Moderator,
    #[serde(rename = "ROLE_PREMIUM_USER")]
    PremiumUser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
            Role::Moderator => "ROLE_MODERATOR",
            Role::PremiumUser => "ROLE_PREMIUM_USER",
        }
    }

    /// Parses stored role strings, dropping anything unrecognised.
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Vec<Role> {
        raw.iter().filter_map(|r| r.as_ref().parse().ok()).collect()
    }

    pub fn to_strings(roles: &[Role]) -> Vec<String> {
        roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            "ROLE_MODERATOR" => Ok(Role::Moderator),
            "ROLE_PREMIUM_USER" => Ok(Role::PremiumUser),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// --- Persistence ---

/// UserRecord
///
/// Raw row of the `users` table, including the argon2 PHC hash.
/// Never leaves the server: handlers convert it to [`User`] before serializing.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// User
///
/// Public representation of an account. The password hash is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            roles: Role::parse_all(&record.roles),
            created_at: record.created_at,
        }
    }
}

/// NewUser
///
/// Repository input for account creation. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

/// UserChanges
///
/// Partial repository update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub roles: Option<Vec<Role>>,
}

// --- Request Payloads ---

/// RegisterRequest
///
/// Public sign-up payload (POST /api/auth/register).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    #[schema(example = "moviefan")]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "fan@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "must not be blank"))]
    pub username: String,
    #[validate(length(min = 1, message = "must not be blank"))]
    pub password: String,
}

/// CreateUserRequest
///
/// Administrative account creation (POST /api/users). Unlike public registration
/// the caller may assign roles; omitted roles default to `ROLE_USER`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

/// UpdateUserRequest
///
/// Partial update payload (PUT /api/users/{id}). Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<Role>>,
}

// --- Responses ---

/// JwtResponse
///
/// Successful login. `type` is always `"Bearer"`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct JwtResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}

/// RegisterResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<Role>,
}
