use async_trait::async_trait;

use super::domain::{AuthUser, StoredUser};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<StoredUser>, AuthError>;
    /// Insert a user; duplicate usernames must yield `AuthError::Conflict`.
    async fn create_user(&self, username: &str, password_hash: String) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use argon2::{Algorithm, Argon2, Params, Version};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, StoredUser>>, // key: username
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<StoredUser>, AuthError> {
            let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            Ok(users.get(username).cloned())
        }

        async fn create_user(&self, username: &str, password_hash: String) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
            if users.contains_key(username) {
                return Err(AuthError::Conflict);
            }
            let id = users.len() as i32 + 1;
            let user = StoredUser { id, username: username.to_string(), password_hash };
            users.insert(username.to_string(), user.clone());
            Ok(user.into())
        }
    }

    /// Argon2id with minimal cost so tests and benches do not spend seconds hashing.
    pub fn low_cost_hasher() -> Argon2<'static> {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap_or_default();
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}
