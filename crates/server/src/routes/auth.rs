use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;

use service::auth::domain::{AuthSession, LoginInput, RegisterInput};
use service::auth::AuthService;
use service::product::ProductService;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

/// Services shared by all handlers.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService>,
    pub products: Arc<ProductService>,
}

#[derive(Serialize)]
pub struct RegisterOutput { pub message: String }

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::CredentialsRequest, responses((status = 201, description = "Registered", body = crate::openapi::MessageResponse), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterOutput>), JsonApiError> {
    state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterOutput { message: "Registration completed".into() })))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::CredentialsRequest, responses((status = 200, description = "Logged In", body = crate::openapi::LoginResponse), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthSession>, JsonApiError> {
    let session = state.auth.login(input).await?;
    Ok(Json(session))
}

/// Route middleware: requires `Authorization: Bearer <token>` with a valid,
/// unexpired token; verified claims are inserted into request extensions.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        tracing::warn!(path = %path, "missing or malformed Authorization header");
        return Err(JsonApiError::unauthorized("Unauthorized"));
    };

    match state.auth.verify_token(bearer.token()) {
        Ok(claims) => {
            tracing::debug!(path = %path, user_id = claims.sub, "token accepted");
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(path = %path, err = %e, "token validation failed");
            Err(e.into())
        }
    }
}
