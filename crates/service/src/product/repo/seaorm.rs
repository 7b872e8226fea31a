use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, LoaderTrait, Set, TransactionTrait,
};
use tracing::debug;

use crate::errors::ServiceError;
use crate::product::domain::{DetailInput, Product, ProductChanges, ProductDetail, ProductFile};
use crate::product::repository::ProductRepository;
use models::{file, product, product_detail};

pub struct SeaOrmProductRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    /// Attach children to product rows with one query per child table.
    async fn hydrate(&self, rows: Vec<product::Model>) -> Result<Vec<Product>, ServiceError> {
        let details = rows.load_many(product_detail::Entity, &self.db).await?;
        let files = rows.load_many(file::Entity, &self.db).await?;

        Ok(rows
            .into_iter()
            .zip(details)
            .zip(files)
            .map(|((p, mut ds), mut fs)| {
                ds.sort_by_key(|d| d.id);
                fs.sort_by_key(|f| f.id);
                Product {
                    id: p.id,
                    name: p.name,
                    description: p.description,
                    priority: p.priority,
                    details: ds.into_iter().map(detail_from_model).collect(),
                    files: fs.into_iter().map(file_from_model).collect(),
                }
            })
            .collect())
    }
}

fn detail_from_model(m: product_detail::Model) -> ProductDetail {
    ProductDetail { id: m.id, product_id: m.product_id, label: m.label, description: m.description }
}

fn file_from_model(m: file::Model) -> ProductFile {
    ProductFile { id: m.id, product_id: m.product_id, location: m.location, name: m.name }
}

fn detail_pairs(details: &[DetailInput]) -> Vec<(String, String)> {
    details.iter().map(|d| (d.label.clone(), d.description.clone())).collect()
}

#[async_trait::async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn list_all(&self) -> Result<Vec<Product>, ServiceError> {
        let rows = product::list_ordered(&self.db).await?;
        self.hydrate(rows).await
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, ServiceError> {
        let Some(row) = product::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.into_iter().next())
    }

    async fn max_priority(&self) -> Result<Option<i32>, ServiceError> {
        Ok(product::max_priority(&self.db).await?)
    }

    async fn insert_product(&self, name: &str, description: Option<&str>, priority: i32) -> Result<i32, ServiceError> {
        let created = product::create(&self.db, name, description, priority).await?;
        Ok(created.id)
    }

    async fn insert_details(&self, product_id: i32, details: &[DetailInput]) -> Result<(), ServiceError> {
        product_detail::create_many(&self.db, product_id, &detail_pairs(details)).await?;
        Ok(())
    }

    async fn update_product(&self, id: i32, changes: &ProductChanges) -> Result<(), ServiceError> {
        if changes.is_empty() {
            return Ok(());
        }
        let row = product::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::product_not_found(id))?;
        let mut am = row.into_active_model();
        if let Some(name) = &changes.name {
            product::validate_name(name)?;
            am.name = Set(name.clone());
        }
        if let Some(description) = &changes.description {
            am.description = Set(Some(description.clone()));
        }
        if let Some(priority) = changes.priority {
            am.priority = Set(priority);
        }
        am.update(&self.db).await?;
        Ok(())
    }

    async fn replace_details(&self, product_id: i32, details: &[DetailInput]) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let removed = product_detail::delete_for_product(&txn, product_id).await?;
        product_detail::create_many(&txn, product_id, &detail_pairs(details)).await?;
        txn.commit().await?;
        debug!(product_id, removed, inserted = details.len(), "details_replaced");
        Ok(())
    }

    async fn insert_file(&self, product_id: i32, name: &str, location: &str) -> Result<ProductFile, ServiceError> {
        let created = file::create(&self.db, product_id, name, location).await?;
        Ok(file_from_model(created))
    }

    async fn delete_product(&self, id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        product_detail::delete_for_product(&txn, id).await?;
        file::delete_for_product(&txn, id).await?;
        product::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::try_db;

    fn detail(label: &str, description: &str) -> DetailInput {
        DetailInput { label: label.into(), description: description.into() }
    }

    #[tokio::test]
    async fn children_round_trip_and_cascade() {
        let Some(db) = try_db().await else { return };
        let repo = SeaOrmProductRepository::new(db);

        let id = repo.insert_product("repo-chair", Some("oak"), 1_000_000).await.unwrap();
        repo.insert_details(id, &[detail("Size", "L"), detail("Color", "Red")]).await.unwrap();
        repo.insert_file(id, "a.png", "http://storage/a.png").await.unwrap();

        let loaded = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(loaded.details.len(), 2);
        assert_eq!(loaded.details[0].label, "Size");
        assert_eq!(loaded.files[0].location, "http://storage/a.png");

        repo.replace_details(id, &[detail("Weight", "3kg")]).await.unwrap();
        let replaced = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(replaced.details.len(), 1);
        assert!(replaced.details.iter().all(|d| !loaded.details.iter().any(|old| old.id == d.id)));

        repo.delete_product(id).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_update_only_touches_given_columns() {
        let Some(db) = try_db().await else { return };
        let repo = SeaOrmProductRepository::new(db);

        let id = repo.insert_product("repo-lamp", Some("brass"), 1_000_001).await.unwrap();
        let changes = ProductChanges { name: Some("repo-lamp-2".into()), ..Default::default() };
        repo.update_product(id, &changes).await.unwrap();

        let updated = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "repo-lamp-2");
        assert_eq!(updated.description.as_deref(), Some("brass"));
        assert_eq!(updated.priority, 1_000_001);

        repo.delete_product(id).await.unwrap();
    }
}
