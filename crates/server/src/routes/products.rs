use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use service::product::domain::{CreateProductInput, Product, UpdateProductInput};
use service::storage::UploadedFile;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use super::auth::ServerState;

/// Multipart field carrying uploads
pub const FILES_FIELD: &str = "files";
pub const MAX_FILES: usize = 10;

#[utoipa::path(get, path = "/product", tag = "product", responses((status = 200, description = "Products by priority", body = [crate::openapi::ProductDoc])))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Product>>, JsonApiError> {
    Ok(Json(state.products.list_all().await?))
}

#[utoipa::path(get, path = "/product/{id}", tag = "product", params(("id" = i32, Path, description = "Product id")), responses((status = 200, description = "Product", body = crate::openapi::ProductDoc), (status = 400, description = "Non-integer id"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<ServerState>, ApiPath(id): ApiPath<i32>) -> Result<Json<Product>, JsonApiError> {
    Ok(Json(state.products.get_one(id).await?))
}

#[utoipa::path(post, path = "/product", tag = "product", security(("bearer" = [])), request_body = crate::openapi::CreateProductDoc, responses((status = 201, description = "Created", body = crate::openapi::ProductDoc), (status = 400, description = "Bad Request"), (status = 401, description = "Unauthorized")))]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<CreateProductInput>,
) -> Result<(StatusCode, Json<Product>), JsonApiError> {
    let created = state.products.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(post, path = "/product/{id}/files", tag = "product", security(("bearer" = [])), params(("id" = i32, Path, description = "Product id")), request_body(content = crate::openapi::UploadFilesDoc, content_type = "multipart/form-data"), responses((status = 201, description = "Files attached", body = crate::openapi::ProductDoc), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn upload_files(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Product>), JsonApiError> {
    let mut multipart = multipart.map_err(|e| JsonApiError::bad_request(e.body_text()))?;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILES_FIELD) {
            return Err(JsonApiError::bad_request(format!("Unexpected field: {}", field.name().unwrap_or_default())));
        }
        if files.len() == MAX_FILES {
            return Err(JsonApiError::bad_request("Too many files"));
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let data = field.bytes().await.map_err(|e| JsonApiError::new(e.status(), e.body_text()))?;
        debug!(product_id = id, file_name = %file_name, size = data.len(), "file part received");
        files.push(UploadedFile { file_name, content_type, data });
    }

    let updated = state.products.upload_files(id, files).await?;
    Ok((StatusCode::CREATED, Json(updated)))
}

#[utoipa::path(patch, path = "/product/{id}", tag = "product", security(("bearer" = [])), params(("id" = i32, Path, description = "Product id")), request_body = crate::openapi::UpdateProductDoc, responses((status = 200, description = "Updated", body = crate::openapi::ProductDoc), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<UpdateProductInput>,
) -> Result<Json<Product>, JsonApiError> {
    Ok(Json(state.products.update(id, input).await?))
}

#[utoipa::path(delete, path = "/product/{id}", tag = "product", security(("bearer" = [])), params(("id" = i32, Path, description = "Product id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 500, description = "Storage failure")))]
pub async fn remove(State(state): State<ServerState>, ApiPath(id): ApiPath<i32>) -> Result<StatusCode, JsonApiError> {
    state.products.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
