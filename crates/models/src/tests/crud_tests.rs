use crate::db::{connect, migrate};
use crate::errors::ModelError;
use crate::{file, product, product_detail, user};
use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, LoaderTrait, ModelTrait};

/// Connect and migrate, or `None` when no database is configured.
async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL missing; skip db tests");
        return Ok(None);
    }
    let db = connect().await?;
    migrate(&db).await?;
    Ok(Some(db))
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default())
}

#[tokio::test]
async fn test_user_unique_username() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let name = unique("user");
    let created = user::create(&db, &name, "hash".into()).await?;
    assert_eq!(created.username, name);

    let dup = user::create(&db, &name, "hash".into()).await;
    assert!(matches!(dup, Err(ModelError::Conflict(_))));

    let found = user::find_by_username(&db, &name).await?.expect("user present");
    assert_eq!(found.id, created.id);

    user::Entity::delete_by_id(created.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_product_children_cascade() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let max = product::max_priority(&db).await?;
    let p = product::create(&db, &unique("product"), Some("desc"), product::next_priority(max)?).await?;
    assert!(p.priority > max.unwrap_or(0));

    product_detail::create_many(&db, p.id, &[("Size".into(), "L".into()), ("Color".into(), "Red".into())]).await?;
    file::create(&db, p.id, "a.png", "https://cdn.example.com/products/1/a.png").await?;

    let loaded = vec![p.clone()];
    let details = loaded.load_many(product_detail::Entity, &db).await?;
    let files = loaded.load_many(file::Entity, &db).await?;
    assert_eq!(details[0].len(), 2);
    assert_eq!(files[0].len(), 1);

    // FK cascade removes children with the product
    p.clone().delete(&db).await?;
    assert!(product_detail::Entity::find_by_id(details[0][0].id).one(&db).await?.is_none());
    assert!(file::Entity::find_by_id(files[0][0].id).one(&db).await?.is_none());
    Ok(())
}
