//! Catalog and assignment domain entities

use chrono::{DateTime, Utc};

/// A named grouping of rates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Catalog {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Link between a catalog and a rate, keyed by the pair.
///
/// Unassigning sets the tombstone; assigning again clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRateAssignment {
    pub catalog_id: i32,
    pub rate_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CatalogRateAssignment {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// What an assign call did to the assignment row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentChange {
    Created,
    Reactivated,
    AlreadyActive,
}

impl AssignmentChange {
    /// Classify an upsert from the row state seen before it.
    pub fn from_previous(previous: Option<&CatalogRateAssignment>) -> Self {
        match previous {
            None => Self::Created,
            Some(a) if a.is_active() => Self::AlreadyActive,
            Some(_) => Self::Reactivated,
        }
    }
}

impl std::fmt::Display for AssignmentChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Reactivated => write!(f, "reactivated"),
            Self::AlreadyActive => write!(f, "already_active"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(deleted: bool) -> CatalogRateAssignment {
        let now = Utc::now();
        CatalogRateAssignment {
            catalog_id: 1,
            rate_id: 2,
            created_at: now,
            updated_at: now,
            deleted_at: deleted.then_some(now),
        }
    }

    #[test]
    fn change_classification() {
        assert_eq!(AssignmentChange::from_previous(None), AssignmentChange::Created);
        assert_eq!(
            AssignmentChange::from_previous(Some(&assignment(false))),
            AssignmentChange::AlreadyActive
        );
        assert_eq!(
            AssignmentChange::from_previous(Some(&assignment(true))),
            AssignmentChange::Reactivated
        );
    }

    #[test]
    fn change_display() {
        assert_eq!(AssignmentChange::Reactivated.to_string(), "reactivated");
    }
}
