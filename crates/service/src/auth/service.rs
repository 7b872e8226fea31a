use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: String::new(), token_ttl_secs: 12 * 60 * 60 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    cfg: AuthConfig,
    hasher: Argon2<'static>,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self {
        Self { repo, cfg, hasher: Argon2::default() }
    }

    /// Replace the Argon2 instance used for new hashes.
    pub fn with_hasher(mut self, hasher: Argon2<'static>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Register a new user with a salted Argon2 hash.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::{self, MockAuthRepository}};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default()).with_hasher(mock::low_cost_hasher());
    /// let input = RegisterInput { username: "alice".into(), password: "pw".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.username, "alice");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        models::user::validate_username(&input.username)?;
        models::user::validate_password(&input.password)?;

        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("user exists: {}", existing.username);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self.hasher
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo.create_user(&input.username, hash).await?;
        info!(user_id = user.id, username = %user.username, "user_registered");
        Ok(user)
    }

    /// Authenticate a user against the stored hash and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::{self, MockAuthRepository}};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: "secret".into(), ..AuthConfig::default() };
    /// let svc = AuthService::new(repo, cfg).with_hasher(mock::low_cost_hasher());
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "u".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "u".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.username, "u");
    /// assert!(!session.access_token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let stored = self.repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&stored.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            warn!(user_id = stored.id, "login_rejected");
            return Err(AuthError::Unauthorized);
        }

        let user = AuthUser::from(stored);
        let access_token = self.issue_token(&user)?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { access_token, user })
    }

    /// Sign an HS256 token carrying `{username, sub}`.
    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            username: user.username.clone(),
            sub: user.id,
            iat: now.timestamp(),
            exp: (now + chrono::Duration::seconds(self.cfg.token_ttl_secs)).timestamp(),
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(self.cfg.jwt_secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check signature and expiry of a bearer token.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let key = DecodingKey::from_secret(self.cfg.jwt_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::{low_cost_hasher, MockAuthRepository};

    fn service() -> AuthService {
        let repo = Arc::new(MockAuthRepository::default());
        let cfg = AuthConfig { jwt_secret: "test-secret".into(), token_ttl_secs: 3600 };
        AuthService::new(repo, cfg).with_hasher(low_cost_hasher())
    }

    fn creds(username: &str, password: &str) -> (RegisterInput, LoginInput) {
        (
            RegisterInput { username: username.into(), password: password.into() },
            LoginInput { username: username.into(), password: password.into() },
        )
    }

    #[tokio::test]
    async fn register_then_login_issues_verifiable_token() {
        let svc = service();
        let (reg, login) = creds("alice", "pw");
        let user = svc.register(reg).await.unwrap();

        let session = svc.login(login).await.unwrap();
        assert_eq!(session.user, user);

        let claims = svc.verify_token(&session.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let svc = service();
        svc.register(creds("bob", "one").0).await.unwrap();
        let err = svc.register(creds("bob", "two").0).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let svc = service();
        assert!(matches!(svc.register(creds(" ", "pw").0).await, Err(AuthError::Validation(_))));
        assert!(matches!(svc.register(creds("carol", "").0).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let svc = service();
        svc.register(creds("dave", "right").0).await.unwrap();

        let wrong = LoginInput { username: "dave".into(), password: "wrong".into() };
        assert!(matches!(svc.login(wrong).await, Err(AuthError::Unauthorized)));

        let ghost = LoginInput { username: "ghost".into(), password: "right".into() };
        assert!(matches!(svc.login(ghost).await, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn stored_hash_is_salted() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = AuthService::new(repo.clone(), AuthConfig::default()).with_hasher(low_cost_hasher());
        svc.register(creds("erin", "same").0).await.unwrap();
        svc.register(creds("frank", "same").0).await.unwrap();

        let a = repo.find_user_by_username("erin").await.unwrap().unwrap();
        let b = repo.find_user_by_username("frank").await.unwrap().unwrap();
        assert!(a.password_hash.starts_with("$argon2id$"));
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn tampered_and_foreign_tokens_fail() {
        let svc = service();
        let user = AuthUser { id: 7, username: "gina".into() };
        let token = svc.issue_token(&user).unwrap();
        assert!(svc.verify_token(&format!("{}x", token)).is_err());

        let other = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: "other-secret".into(), token_ttl_secs: 3600 },
        );
        assert!(matches!(other.verify_token(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_fails() {
        let svc = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: "test-secret".into(), token_ttl_secs: -3600 },
        );
        let token = svc.issue_token(&AuthUser { id: 1, username: "h".into() }).unwrap();
        assert!(svc.verify_token(&token).is_err());
    }
}
