//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_users;
mod m20240601_000002_create_products;
mod m20240601_000003_create_product_details;
mod m20240601_000004_create_files;
mod m20240601_000005_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users::Migration),
            Box::new(m20240601_000002_create_products::Migration),
            Box::new(m20240601_000003_create_product_details::Migration),
            Box::new(m20240601_000004_create_files::Migration),
            // Indexes should always be applied last
            Box::new(m20240601_000005_add_indexes::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_registered_in_order() {
        let names: Vec<String> = Migrator::migrations().iter().map(|m| m.name().to_string()).collect();
        assert_eq!(names.len(), 5);
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.last().unwrap().ends_with("add_indexes"));
    }
}
