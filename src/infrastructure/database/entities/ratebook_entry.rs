//! Ratebook entry entity - per client/warehouse tariffs

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ratebook_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub client_id: String,

    pub warehouse_id: String,

    pub operator_id: String,

    pub service_id: String,

    pub name: String,

    pub weight_min: f64,

    pub weight_max: f64,

    pub fixed_fee: f64,

    pub percentage: bool,

    /// Catalog this row was expanded from. Kept after detaching, but only
    /// meaningful while `dependent` is true.
    #[sea_orm(nullable)]
    pub catalog_id: Option<i32>,

    /// Rate this row mirrors (same caveat as `catalog_id`)
    #[sea_orm(nullable)]
    pub rate_id: Option<i32>,

    /// Maintained by propagation; false once edited directly
    pub dependent: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
