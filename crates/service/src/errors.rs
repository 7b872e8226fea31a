use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ServiceError {
    pub fn product_not_found(id: i32) -> Self { Self::NotFound(format!("Product with ID {} not found", id)) }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Model(e.into()) }
}
