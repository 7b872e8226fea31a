//! Creates the demo account `testuser` / `password123`.

use std::sync::Arc;

use dotenvy::dotenv;
use service::auth::{errors::AuthError, repo::seaorm::SeaOrmAuthRepository, service::AuthConfig, AuthService};
use service::auth::domain::RegisterInput;
use tracing::{info, warn};

const SEED_USERNAME: &str = "testuser";
const SEED_PASSWORD: &str = "password123";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_default();

    // only the database section matters here
    let mut db_cfg = configs::load_optional()?.database;
    db_cfg.normalize_from_env();
    db_cfg.validate()?;

    let db = models::db::connect_with_config(&db_cfg).await?;
    models::db::migrate(&db).await?;

    let auth = AuthService::new(Arc::new(SeaOrmAuthRepository { db }), AuthConfig::default());
    let input = RegisterInput { username: SEED_USERNAME.into(), password: SEED_PASSWORD.into() };
    match auth.register(input).await {
        Ok(user) => info!(service = "seed", event = "user_created", user_id = user.id, username = %user.username, "seed user created"),
        Err(AuthError::Conflict) => warn!(service = "seed", event = "user_exists", username = SEED_USERNAME, "user already exists"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
