//! Full stack against PostgreSQL; skipped when `DATABASE_URL` is unset.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use server::routes::{self, auth::ServerState};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::repository::mock::low_cost_hasher;
use service::auth::service::{AuthConfig, AuthService};
use service::product::{repo::seaorm::SeaOrmProductRepository, ProductService};
use service::storage::mock::InMemoryStorage;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip e2e tests.");
        return Err(anyhow::anyhow!("missing DATABASE_URL"));
    }

    let db = models::db::connect().await?;
    if let Err(e) = models::db::migrate(&db).await { eprintln!("migrations notice: {}", e); }

    let auth = AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: db.clone() }),
        AuthConfig { jwt_secret: "test-secret".into(), token_ttl_secs: 600 },
    )
    .with_hasher(low_cost_hasher());
    let products = ProductService::new(
        Arc::new(SeaOrmProductRepository::new(db)),
        Arc::new(InMemoryStorage::default()),
    );
    let state = ServerState { auth: Arc::new(auth), products: Arc::new(products) };

    let app: Router = routes::build_router(state, tower_http::cors::CorsLayer::very_permissive(), 1024 * 1024);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{}_{}", prefix, nanos)
}

async fn login_token(c: &reqwest::Client, app: &TestApp) -> anyhow::Result<String> {
    let username = unique("e2e_user");
    let res = c.post(format!("{}/auth/register", app.base_url))
        .json(&json!({"username": username, "password": "pw"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": username, "password": "pw"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    Ok(body["access_token"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn e2e_register_login_and_wrong_password() -> anyhow::Result<()> {
    let Ok(app) = start_server().await else { return Ok(()) };
    let c = reqwest::Client::new();

    let username = unique("alice");
    let res = c.post(format!("{}/auth/register", app.base_url))
        .json(&json!({"username": username, "password": "pw"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.post(format!("{}/auth/register", app.base_url))
        .json(&json!({"username": username, "password": "other"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let res = c.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": username, "password": "pw"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert!(!body["access_token"].as_str().unwrap_or_default().is_empty());
    assert_eq!(body["user"]["username"], username.as_str());

    let res = c.post(format!("{}/auth/login", app.base_url))
        .json(&json!({"username": username, "password": "wrong"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_product_lifecycle() -> anyhow::Result<()> {
    let Ok(app) = start_server().await else { return Ok(()) };
    let c = reqwest::Client::new();
    let token = login_token(&c, &app).await?;

    let created = c.post(format!("{}/product", app.base_url))
        .bearer_auth(&token)
        .json(&json!({"name": "A", "description": "d", "priority": 999, "details": [{"label": "Size", "description": "L"}]}))
        .send().await?;
    assert_eq!(created.status(), HttpStatusCode::CREATED);
    let created = created.json::<Value>().await?;
    let id = created["id"].as_i64().unwrap_or_default();
    assert_eq!(created["details"][0]["label"], "Size");

    // priority is one above whatever was the maximum before
    let list = c.get(format!("{}/product", app.base_url)).send().await?.json::<Vec<Value>>().await?;
    let max = list.iter().filter_map(|p| p["priority"].as_i64()).max().unwrap_or_default();
    assert_eq!(created["priority"].as_i64(), Some(max));
    assert_ne!(created["priority"], 999);

    let form = reqwest::multipart::Form::new()
        .part("files", reqwest::multipart::Part::bytes(b"png".to_vec()).file_name("a b.png").mime_str("image/png")?);
    let res = c.post(format!("{}/product/{}/files", app.base_url, id))
        .bearer_auth(&token)
        .multipart(form)
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let with_files = res.json::<Value>().await?;
    assert_eq!(with_files["files"][0]["name"], "a b.png");

    let res = c.patch(format!("{}/product/{}", app.base_url, id))
        .bearer_auth(&token)
        .json(&json!({"details": [{"label": "Color", "description": "Red"}]}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let patched = res.json::<Value>().await?;
    assert_eq!(patched["details"].as_array().map(Vec::len), Some(1));
    assert_eq!(patched["details"][0]["label"], "Color");
    assert_eq!(patched["name"], "A");

    let res = c.delete(format!("{}/product/{}", app.base_url, id)).bearer_auth(&token).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(format!("{}/product/{}", app.base_url, id)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}
