use std::sync::Mutex;

use async_trait::async_trait;

use super::{key_from_public_url, object_key, StorageError, StorageGateway, UploadedFile};

/// In-memory object store for service and HTTP tests.
pub struct InMemoryStorage {
    bucket: String,
    objects: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_deletes: bool,
}

impl Default for InMemoryStorage {
    fn default() -> Self { Self::new("products") }
}

impl InMemoryStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            fail_deletes: false,
        }
    }

    /// Every delete call fails with `StorageError::Delete`.
    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Keys currently stored.
    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Keys removed so far, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://storage/v1/object/public/{}/{}", self.bucket, key)
    }
}

#[async_trait]
impl StorageGateway for InMemoryStorage {
    async fn upload_file(&self, file: &UploadedFile, product_id: i32) -> Result<String, StorageError> {
        let seq = self.deleted.lock().unwrap_or_else(|e| e.into_inner()).len();
        let mut objects = self.objects.lock().unwrap_or_else(|e| e.into_inner());
        // sequence number stands in for the timestamp so keys never collide
        let key = object_key(product_id, (objects.len() + seq) as i64, &file.file_name);
        objects.push(key.clone());
        Ok(self.public_url(&key))
    }

    async fn delete_file(&self, public_url: &str) -> Result<(), StorageError> {
        if self.fail_deletes {
            return Err(StorageError::Delete("storage unavailable".into()));
        }
        let Some(key) = key_from_public_url(public_url, &self.bucket) else {
            return Ok(());
        };
        self.objects.lock().unwrap_or_else(|e| e.into_inner()).retain(|k| k != key);
        self.deleted.lock().unwrap_or_else(|e| e.into_inner()).push(key.to_string());
        Ok(())
    }
}
