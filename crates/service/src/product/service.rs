use std::sync::Arc;

use tracing::{info, instrument};

use super::domain::{CreateProductInput, Product, ProductChanges, UpdateProductInput};
use super::repository::ProductRepository;
use crate::errors::ServiceError;
use crate::storage::{StorageGateway, UploadedFile};

/// Product catalog operations over a repository and an object store.
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    storage: Arc<dyn StorageGateway>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>, storage: Arc<dyn StorageGateway>) -> Self {
        Self { repo, storage }
    }

    pub async fn list_all(&self) -> Result<Vec<Product>, ServiceError> {
        self.repo.list_all().await
    }

    pub async fn get_one(&self, id: i32) -> Result<Product, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::product_not_found(id))
    }

    /// Create a product at the end of the priority order.
    ///
    /// Any client-supplied priority is ignored.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::product::{ProductService, domain::CreateProductInput, repository::mock::InMemoryProductRepository};
    /// use service::storage::mock::InMemoryStorage;
    /// let svc = ProductService::new(Arc::new(InMemoryProductRepository::default()), Arc::new(InMemoryStorage::default()));
    /// let input = CreateProductInput { name: "Chair".into(), description: "oak".into(), priority: Some(50), details: None };
    /// let created = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(created.priority, 1);
    /// ```
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ServiceError> {
        models::product::validate_name(&input.name)?;
        models::product::validate_description(&input.description)?;
        let details = input.details.unwrap_or_default();
        for d in &details {
            models::product_detail::validate(&d.label, &d.description)?;
        }

        let priority = models::product::next_priority(self.repo.max_priority().await?)?;
        let id = self.repo.insert_product(&input.name, Some(&input.description), priority).await?;
        if !details.is_empty() {
            self.repo.insert_details(id, &details).await?;
        }
        info!(service = "product", event = "created", product_id = id, priority, details = details.len());
        self.get_one(id).await
    }

    /// Upload each file in order and record its public URL.
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn upload_files(&self, id: i32, files: Vec<UploadedFile>) -> Result<Product, ServiceError> {
        self.get_one(id).await?;
        for file in &files {
            let location = self.storage.upload_file(file, id).await?;
            self.repo.insert_file(id, &file.file_name, &location).await?;
        }
        info!(service = "product", event = "files_uploaded", product_id = id, count = files.len());
        self.get_one(id).await
    }

    /// Apply present fields; `details`, when given, replaces the whole set.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i32, input: UpdateProductInput) -> Result<Product, ServiceError> {
        self.get_one(id).await?;
        let changes = ProductChanges::from(&input);
        if let Some(name) = &changes.name {
            models::product::validate_name(name)?;
        }
        if let Some(details) = &input.details {
            for d in details {
                models::product_detail::validate(&d.label, &d.description)?;
            }
        }

        self.repo.update_product(id, &changes).await?;
        if let Some(details) = &input.details {
            self.repo.replace_details(id, details).await?;
        }
        info!(service = "product", event = "updated", product_id = id);
        self.get_one(id).await
    }

    /// Delete stored objects first; a storage failure keeps the product.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i32) -> Result<(), ServiceError> {
        let product = self.get_one(id).await?;
        for file in &product.files {
            self.storage.delete_file(&file.location).await?;
        }
        self.repo.delete_product(id).await?;
        info!(service = "product", event = "removed", product_id = id, files = product.files.len());
        Ok(())
    }
}
