//! Extractors whose rejections use the JSON error body.

use axum::{
    async_trait,
    extract::{rejection::{JsonRejection, PathRejection}, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::errors::JsonApiError;

/// `axum::Json` that answers malformed bodies with a 400 JSON error.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> JsonApiError {
    JsonApiError::bad_request(rejection.body_text())
}

/// `axum::extract::Path` for numeric ids; a non-integer segment is a 400.
pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(PathRejection::FailedToDeserializePathParams(_)) => {
                Err(JsonApiError::bad_request("Validation failed (numeric string is expected)"))
            }
            Err(other) => Err(JsonApiError::new(other.status(), other.body_text())),
        }
    }
}
