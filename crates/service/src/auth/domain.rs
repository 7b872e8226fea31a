use serde::{Deserialize, Serialize};

/// Registration input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Public user summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
}

/// Stored user row including the password hash
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
}

impl From<StoredUser> for AuthUser {
    fn from(u: StoredUser) -> Self { AuthUser { id: u.id, username: u.username } }
}

/// Login result: serialized as the `/auth/login` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

/// JWT payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// user id
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}
