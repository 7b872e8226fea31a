use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(username: &str) -> Result<(), ModelError> {
    if username.trim().is_empty() {
        return Err(ModelError::Validation("username required".into()));
    }
    if username.len() > 128 {
        return Err(ModelError::Validation("username too long (<=128)".into()));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.is_empty() {
        return Err(ModelError::Validation("password required".into()));
    }
    Ok(())
}

pub async fn find_by_username<C: ConnectionTrait>(db: &C, username: &str) -> Result<Option<Model>, ModelError> {
    let found = Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await?;
    Ok(found)
}

/// Insert a user; a duplicate username surfaces as `ModelError::Conflict`.
pub async fn create<C: ConnectionTrait>(db: &C, username: &str, password_hash: String) -> Result<Model, ModelError> {
    validate_username(username)?;
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let am = ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
