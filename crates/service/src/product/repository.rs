use async_trait::async_trait;

use super::domain::{DetailInput, Product, ProductChanges, ProductFile};
use crate::errors::ServiceError;

/// Persistence for products and their children.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Every product with children, `priority` ascending then `id`.
    async fn list_all(&self) -> Result<Vec<Product>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ServiceError>;
    async fn max_priority(&self) -> Result<Option<i32>, ServiceError>;
    async fn insert_product(&self, name: &str, description: Option<&str>, priority: i32) -> Result<i32, ServiceError>;
    async fn insert_details(&self, product_id: i32, details: &[DetailInput]) -> Result<(), ServiceError>;
    async fn update_product(&self, id: i32, changes: &ProductChanges) -> Result<(), ServiceError>;
    /// Drop all details of a product and insert `details` in one transaction.
    async fn replace_details(&self, product_id: i32, details: &[DetailInput]) -> Result<(), ServiceError>;
    async fn insert_file(&self, product_id: i32, name: &str, location: &str) -> Result<ProductFile, ServiceError>;
    /// Delete details, files and the product row in one transaction.
    async fn delete_product(&self, id: i32) -> Result<(), ServiceError>;
}

/// In-memory repository used by service and HTTP tests
pub mod mock {
    use super::*;
    use crate::product::domain::ProductDetail;
    use std::sync::Mutex;

    #[derive(Default)]
    struct State {
        products: Vec<Product>,
        next_product_id: i32,
        next_detail_id: i32,
        next_file_id: i32,
    }

    #[derive(Default)]
    pub struct InMemoryProductRepository {
        state: Mutex<State>,
    }

    impl InMemoryProductRepository {
        fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
            let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
            f(&mut guard)
        }
    }

    impl State {
        fn product_mut(&mut self, id: i32) -> Result<&mut Product, ServiceError> {
            self.products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| ServiceError::product_not_found(id))
        }

        fn build_details(&mut self, product_id: i32, details: &[DetailInput]) -> Result<Vec<ProductDetail>, ServiceError> {
            details
                .iter()
                .map(|d| -> Result<ProductDetail, ServiceError> {
                    models::product_detail::validate(&d.label, &d.description)?;
                    self.next_detail_id += 1;
                    Ok(ProductDetail {
                        id: self.next_detail_id,
                        product_id,
                        label: d.label.clone(),
                        description: d.description.clone(),
                    })
                })
                .collect()
        }
    }

    #[async_trait]
    impl ProductRepository for InMemoryProductRepository {
        async fn list_all(&self) -> Result<Vec<Product>, ServiceError> {
            Ok(self.with_state(|s| {
                let mut all = s.products.clone();
                all.sort_by_key(|p| (p.priority, p.id));
                all
            }))
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ServiceError> {
            Ok(self.with_state(|s| s.products.iter().find(|p| p.id == id).cloned()))
        }

        async fn max_priority(&self) -> Result<Option<i32>, ServiceError> {
            Ok(self.with_state(|s| s.products.iter().map(|p| p.priority).max()))
        }

        async fn insert_product(&self, name: &str, description: Option<&str>, priority: i32) -> Result<i32, ServiceError> {
            models::product::validate_name(name)?;
            Ok(self.with_state(|s| {
                s.next_product_id += 1;
                let id = s.next_product_id;
                s.products.push(Product {
                    id,
                    name: name.to_string(),
                    description: description.map(str::to_string),
                    priority,
                    details: Vec::new(),
                    files: Vec::new(),
                });
                id
            }))
        }

        async fn insert_details(&self, product_id: i32, details: &[DetailInput]) -> Result<(), ServiceError> {
            self.with_state(|s| {
                let rows = s.build_details(product_id, details)?;
                s.product_mut(product_id)?.details.extend(rows);
                Ok(())
            })
        }

        async fn update_product(&self, id: i32, changes: &ProductChanges) -> Result<(), ServiceError> {
            self.with_state(|s| {
                let product = s.product_mut(id)?;
                if let Some(name) = &changes.name {
                    product.name = name.clone();
                }
                if let Some(description) = &changes.description {
                    product.description = Some(description.clone());
                }
                if let Some(priority) = changes.priority {
                    product.priority = priority;
                }
                Ok(())
            })
        }

        async fn replace_details(&self, product_id: i32, details: &[DetailInput]) -> Result<(), ServiceError> {
            self.with_state(|s| {
                let rows = s.build_details(product_id, details)?;
                s.product_mut(product_id)?.details = rows;
                Ok(())
            })
        }

        async fn insert_file(&self, product_id: i32, name: &str, location: &str) -> Result<ProductFile, ServiceError> {
            self.with_state(|s| {
                s.next_file_id += 1;
                let file = ProductFile {
                    id: s.next_file_id,
                    product_id,
                    location: location.to_string(),
                    name: name.to_string(),
                };
                s.product_mut(product_id)?.files.push(file.clone());
                Ok(file)
            })
        }

        async fn delete_product(&self, id: i32) -> Result<(), ServiceError> {
            self.with_state(|s| {
                s.products.retain(|p| p.id != id);
                Ok(())
            })
        }
    }
}
