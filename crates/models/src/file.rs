use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::product;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    /// Public URL returned by object storage.
    #[sea_orm(column_type = "Text")]
    pub location: String,
    /// Original client-side file name.
    pub name: String,
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

pub async fn create<C: ConnectionTrait>(db: &C, product_id: i32, name: &str, location: &str) -> Result<Model, ModelError> {
    if location.trim().is_empty() {
        return Err(ModelError::Validation("file location required".into()));
    }
    let am = ActiveModel {
        product_id: Set(product_id),
        name: Set(name.to_string()),
        location: Set(location.to_string()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}

pub async fn delete_for_product<C: ConnectionTrait>(db: &C, product_id: i32) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}
