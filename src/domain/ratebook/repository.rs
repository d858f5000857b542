//! Ratebook read port used by the tariff resolver

use async_trait::async_trait;

use super::model::RatebookEntry;
use super::tariff::TariffQuery;
use crate::domain::DomainResult;

#[async_trait]
pub trait RatebookLookup: Send + Sync {
    /// Active entries for the query's client, warehouse, operator and
    /// service whose band covers the query weight.
    async fn find_matching(&self, query: &TariffQuery) -> DomainResult<Vec<RatebookEntry>>;

    /// Number of active entries held by a client/warehouse pair.
    async fn count_active_for_pair(&self, client_id: &str, warehouse_id: &str)
        -> DomainResult<u64>;
}
