//! Rate entity - canonical pricing rules

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Carrier operator code (e.g., "OP01")
    pub operator_id: String,

    /// Carrier service code within the operator
    pub service_id: String,

    pub name: String,

    /// Inclusive lower bound of the weight band
    pub weight_min: f64,

    /// Exclusive upper bound of the weight band
    pub weight_max: f64,

    pub fixed_fee: f64,

    /// `fixed_fee` is a percentage rather than a flat amount
    pub percentage: bool,

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
