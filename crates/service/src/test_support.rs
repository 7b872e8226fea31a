#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};

// Migrations run once per test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// Connection to the test database, or `None` when `DATABASE_URL` is unset
/// so DB-backed tests skip instead of failing.
pub async fn try_db() -> Option<DatabaseConnection> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())?;

    let migrated = *MIGRATED
        .get_or_init(|| async {
            match Database::connect(url.as_str()).await {
                Ok(db) => models::db::migrate(&db).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !migrated {
        return None;
    }

    // fresh connection for the current test's runtime
    Database::connect(url.as_str()).await.ok()
}
