use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use super::{key_from_public_url, object_key, StorageError, StorageGateway, UploadedFile};

/// Supabase Storage REST client bound to one bucket.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    key: String,
    bucket: String,
}

#[derive(Deserialize)]
struct BucketInfo {
    name: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, key: &str, bucket: &str, timeout: Duration) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, self.bucket, key)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.key).header("apikey", &self.key)
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let res = self.authorized(self.client.get(url)).send().await?;
        if !res.status().is_success() {
            return Err(StorageError::Upload(error_message(res).await));
        }
        let buckets: Vec<BucketInfo> = res.json().await?;
        Ok(buckets.into_iter().map(|b| b.name).collect())
    }
}

/// Prefer the `message`/`error` field of a JSON error body, else the status line.
async fn error_message(res: Response) -> String {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("{} {}", status, body).trim().to_string())
}

#[async_trait]
impl StorageGateway for SupabaseStorage {
    #[instrument(skip(self, file), fields(bucket = %self.bucket, file_name = %file.file_name))]
    async fn upload_file(&self, file: &UploadedFile, product_id: i32) -> Result<String, StorageError> {
        match self.list_buckets().await {
            Ok(names) => {
                debug!(?names, "available buckets");
                if !names.iter().any(|n| n == &self.bucket) {
                    error!(event = "bucket_missing", "bucket not found in storage");
                    return Err(StorageError::BucketNotFound(self.bucket.clone()));
                }
            }
            // listing is advisory; the upload itself reports real failures
            Err(e) => warn!(event = "bucket_list_failed", error = %e, "could not list buckets"),
        }

        let key = object_key(product_id, chrono::Utc::now().timestamp_millis(), &file.file_name);
        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key);
        let res = self
            .authorized(self.client.post(url))
            .header(header::CONTENT_TYPE, &file.content_type)
            .header("x-upsert", "false")
            .body(file.data.clone())
            .send()
            .await?;
        if !res.status().is_success() {
            let msg = error_message(res).await;
            error!(event = "upload_failed", key = %key, error = %msg, "storage rejected upload");
            return Err(StorageError::Upload(msg));
        }

        info!(event = "file_uploaded", product_id, key = %key, size = file.data.len());
        Ok(self.public_url(&key))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete_file(&self, public_url: &str) -> Result<(), StorageError> {
        let Some(key) = key_from_public_url(public_url, &self.bucket) else {
            debug!("no object key in url; nothing to delete");
            return Ok(());
        };

        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let res = self
            .authorized(self.client.delete(url))
            .json(&serde_json::json!({ "prefixes": [key] }))
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(StorageError::Delete(error_message(res).await));
        }
        info!(event = "file_deleted", key = %key);
        Ok(())
    }
}
