//! Catalog DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::services::AssignmentOutcome;
use crate::domain::Catalog;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Catalog> for CatalogResponse {
    fn from(c: Catalog) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Body for both create and rename
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CatalogRequest {
    #[validate(length(min = 1, max = 255, message = "catalog name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignmentResponse {
    pub catalog_id: i32,
    pub rate_id: i32,
    /// `created`, `reactivated` or `already_active`
    pub change: String,
    /// Dependent ratebook entries created for already linked pairs
    pub expanded: u64,
}

impl AssignmentResponse {
    pub fn new(catalog_id: i32, rate_id: i32, outcome: AssignmentOutcome) -> Self {
        Self {
            catalog_id,
            rate_id,
            change: outcome.change.to_string(),
            expanded: outcome.expanded,
        }
    }
}
