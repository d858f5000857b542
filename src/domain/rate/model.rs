//! Rate domain entity

use chrono::{DateTime, Utc};

use crate::domain::Pricing;

/// A reusable pricing rule
#[derive(Debug, Clone, PartialEq)]
pub struct Rate {
    pub id: i32,
    pub pricing: Pricing,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tombstone; a deleted rate is kept for history
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Rate {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Input for creating a rate
#[derive(Debug, Clone)]
pub struct NewRate {
    pub pricing: Pricing,
}
