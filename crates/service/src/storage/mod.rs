//! Object storage for product files.
//!
//! `StorageGateway` is the seam the product service talks to; `supabase`
//! speaks the Supabase Storage REST API and `mock` keeps objects in memory.

pub mod supabase;
pub mod mock;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use supabase::SupabaseStorage;

/// A file received from a client, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Bucket \"{0}\" does not exist in storage")]
    BucketNotFound(String),
    #[error("Failed to upload file: {0}")]
    Upload(String),
    #[error("Failed to delete file: {0}")]
    Delete(String),
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Store `file` under a key scoped to `product_id`; returns its public URL.
    async fn upload_file(&self, file: &UploadedFile, product_id: i32) -> Result<String, StorageError>;
    /// Remove the object behind a public URL previously returned by `upload_file`.
    async fn delete_file(&self, public_url: &str) -> Result<(), StorageError>;
}

/// Replace every character outside `[A-Za-z0-9.-_]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}

/// `{product_id}/{timestamp_ms}-{sanitized name}`
pub fn object_key(product_id: i32, timestamp_ms: i64, file_name: &str) -> String {
    format!("{}/{}-{}", product_id, timestamp_ms, sanitize_file_name(file_name))
}

/// Key portion of a public URL: everything after the first `/{bucket}/`.
pub fn key_from_public_url<'a>(url: &'a str, bucket: &str) -> Option<&'a str> {
    let marker = format!("/{}/", bucket);
    let start = url.find(&marker)? + marker.len();
    Some(&url[start..]).filter(|k| !k.is_empty())
}
