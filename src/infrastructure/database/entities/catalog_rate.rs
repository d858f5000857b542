//! Catalog ↔ rate assignment entity
//!
//! The composite primary key is the uniqueness constraint on the pair;
//! unassignment only sets `deleted_at` so the row can be reactivated.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "catalog_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub catalog_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub rate_id: i32,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::catalog::Entity",
        from = "Column::CatalogId",
        to = "super::catalog::Column::Id"
    )]
    Catalog,
    #[sea_orm(
        belongs_to = "super::rate::Entity",
        from = "Column::RateId",
        to = "super::rate::Column::Id"
    )]
    Rate,
}

impl Related<super::catalog::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Catalog.def()
    }
}

impl Related<super::rate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
