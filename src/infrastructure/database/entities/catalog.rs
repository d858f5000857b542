//! Catalog entity - named groups of rates

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "catalogs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::catalog_rate::Entity")]
    CatalogRate,
}

impl Related<super::catalog_rate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CatalogRate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
