pub mod auth;
pub mod products;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the application router: public reads, bearer-guarded writes, docs.
pub fn build_router(state: ServerState, cors: CorsLayer, max_upload_bytes: usize) -> Router {
    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/product", get(products::list))
        .route("/product/:id", get(products::get_one));

    // Bearer-protected product mutations
    let protected = Router::new()
        .route("/product", post(products::create))
        .route("/product/:id", axum::routing::patch(products::update).delete(products::remove))
        .route("/product/:id/files", post(products::upload_files))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token));

    public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx as ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
