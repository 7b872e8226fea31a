use sea_orm::{entity::prelude::*, ConnectionTrait, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{file, product_detail};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub priority: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Details, Files }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Details => Entity::has_many(product_detail::Entity).into(),
            Relation::Files => Entity::has_many(file::Entity).into(),
        }
    }
}

impl Related<product_detail::Entity> for Entity {
    fn to() -> RelationDef { Relation::Details.def() }
}

impl Related<file::Entity> for Entity {
    fn to() -> RelationDef { Relation::Files.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if name.len() > 255 {
        return Err(ModelError::Validation("name too long (<=255)".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ModelError> {
    if description.trim().is_empty() {
        return Err(ModelError::Validation("description required".into()));
    }
    Ok(())
}

/// Priority for a new product: one above the current maximum, starting at 1.
/// Fails once the maximum is already `i32::MAX`.
pub fn next_priority(current_max: Option<i32>) -> Result<i32, ModelError> {
    current_max
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| ModelError::Conflict("no priority left above the current maximum".into()))
}

pub async fn max_priority<C: ConnectionTrait>(db: &C) -> Result<Option<i32>, ModelError> {
    let max: Option<Option<i32>> = Entity::find()
        .select_only()
        .column_as(Column::Priority.max(), "max")
        .into_tuple()
        .one(db)
        .await?;
    Ok(max.flatten())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<&str>,
    priority: i32,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        priority: Set(priority),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

/// All products, priority ascending; ties keep insertion order.
pub async fn list_ordered<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, ModelError> {
    let rows = Entity::find()
        .order_by_asc(Column::Priority)
        .order_by_asc(Column::Id)
        .all(db)
        .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_priority_starts_at_one() {
        assert_eq!(next_priority(None).unwrap(), 1);
        assert_eq!(next_priority(Some(0)).unwrap(), 1);
        assert_eq!(next_priority(Some(10)).unwrap(), 11);
        assert_eq!(next_priority(Some(-7)).unwrap(), -6);
    }

    #[test]
    fn next_priority_refuses_to_wrap() {
        assert_eq!(next_priority(Some(i32::MAX - 1)).unwrap(), i32::MAX);
        assert!(matches!(next_priority(Some(i32::MAX)), Err(ModelError::Conflict(_))));
    }

    #[test]
    fn name_and_description_rules() {
        assert!(validate_name("Chair").is_ok());
        assert!(validate_name(" ").is_err());
        assert!(validate_name(&"n".repeat(256)).is_err());
        assert!(validate_description("wooden").is_ok());
        assert!(validate_description("").is_err());
    }
}
