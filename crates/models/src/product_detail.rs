use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::product;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub label: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Product }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Product => Entity::belongs_to(product::Entity)
                .from(Column::ProductId)
                .to(product::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<product::Entity> for Entity {
    fn to() -> RelationDef { Relation::Product.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(label: &str, description: &str) -> Result<(), ModelError> {
    if label.trim().is_empty() {
        return Err(ModelError::Validation("detail label required".into()));
    }
    if description.trim().is_empty() {
        return Err(ModelError::Validation("detail description required".into()));
    }
    Ok(())
}

pub async fn create_many<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    details: &[(String, String)],
) -> Result<(), ModelError> {
    if details.is_empty() {
        return Ok(());
    }
    let rows = details
        .iter()
        .map(|(label, description)| -> Result<ActiveModel, ModelError> {
            validate(label, description)?;
            Ok(ActiveModel {
                product_id: Set(product_id),
                label: Set(label.clone()),
                description: Set(description.clone()),
                ..Default::default()
            })
        })
        .collect::<Result<Vec<_>, ModelError>>()?;
    Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

pub async fn delete_for_product<C: ConnectionTrait>(db: &C, product_id: i32) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_fields_required() {
        assert!(validate("Size", "42").is_ok());
        assert!(validate("", "42").is_err());
        assert!(validate("Size", "  ").is_err());
    }
}
