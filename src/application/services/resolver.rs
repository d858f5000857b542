//! Tariff resolver
//!
//! Read-only: picks the ratebook entry a quote should be priced with, or
//! synthesizes the fallback tariff when nothing covers the query.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::domain::{
    DomainError, DomainResult, FallbackReason, FallbackTariff, RatebookLookup, Resolution,
    ResolutionOutcome, TariffQuery,
};

pub struct TariffResolver {
    lookup: Arc<dyn RatebookLookup>,
    fallback: FallbackTariff,
}

impl TariffResolver {
    pub fn new(lookup: Arc<dyn RatebookLookup>, fallback: FallbackTariff) -> Self {
        Self { lookup, fallback }
    }

    pub async fn resolve(&self, query: TariffQuery) -> DomainResult<Resolution> {
        if !query.weight.is_finite() || query.weight < 0.0 {
            return Err(DomainError::Validation(format!(
                "weight must be a non-negative number, got {}",
                query.weight
            )));
        }

        let candidates = self.lookup.find_matching(&query).await?;
        let resolution = match Resolution::from_candidates(&query, candidates) {
            Some(resolution) => resolution,
            None => {
                let reason = if self
                    .lookup
                    .count_active_for_pair(&query.client_id, &query.warehouse_id)
                    .await?
                    == 0
                {
                    FallbackReason::Unconfigured
                } else {
                    FallbackReason::NoBandMatch
                };
                Resolution::fallback(&query, &self.fallback, reason)
            }
        };

        match resolution.outcome {
            ResolutionOutcome::Matched => {
                debug!(tariff_id = resolution.tariff.id(), "tariff matched");
            }
            ResolutionOutcome::Ambiguous { candidates } => {
                warn!(
                    client_id = %query.client_id,
                    warehouse_id = %query.warehouse_id,
                    operator_id = %query.operator_id,
                    service_id = %query.service_id,
                    weight = query.weight,
                    candidates,
                    tariff_id = resolution.tariff.id(),
                    "overlapping ratebook entries, using the most recently updated"
                );
            }
            ResolutionOutcome::Fallback(FallbackReason::Unconfigured) => {
                debug!(
                    client_id = %query.client_id,
                    warehouse_id = %query.warehouse_id,
                    "no ratebook for pair, using default tariff"
                );
            }
            ResolutionOutcome::Fallback(FallbackReason::NoBandMatch) => {
                warn!(
                    client_id = %query.client_id,
                    warehouse_id = %query.warehouse_id,
                    operator_id = %query.operator_id,
                    service_id = %query.service_id,
                    weight = query.weight,
                    "no ratebook entry covers the query, using default tariff"
                );
            }
        }

        let reason = match resolution.outcome {
            ResolutionOutcome::Fallback(reason) => reason.as_str(),
            _ => "none",
        };
        counter!(
            "tariff_resolutions_total",
            "outcome" => resolution.outcome.as_str(),
            "reason" => reason
        )
        .increment(1);

        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::pricing::sample_pricing;
    use crate::domain::{EntryLink, RatebookEntry, Tariff, FALLBACK_TARIFF_ID};

    /// In-memory lookup; returns every stored entry for the pair and lets the
    /// resolver do the band filtering.
    #[derive(Default)]
    struct FakeLookup {
        entries: Mutex<Vec<RatebookEntry>>,
    }

    impl FakeLookup {
        fn with(entries: Vec<RatebookEntry>) -> Arc<Self> {
            Arc::new(Self {
                entries: Mutex::new(entries),
            })
        }
    }

    #[async_trait]
    impl RatebookLookup for FakeLookup {
        async fn find_matching(&self, query: &TariffQuery) -> DomainResult<Vec<RatebookEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.client_id == query.client_id && e.warehouse_id == query.warehouse_id)
                .cloned()
                .collect())
        }

        async fn count_active_for_pair(
            &self,
            client_id: &str,
            warehouse_id: &str,
        ) -> DomainResult<u64> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| {
                    e.is_active() && e.client_id == client_id && e.warehouse_id == warehouse_id
                })
                .count() as u64)
        }
    }

    fn entry(id: i32, age_minutes: i64) -> RatebookEntry {
        let ts = Utc::now() - Duration::minutes(age_minutes);
        RatebookEntry {
            id,
            client_id: "1".into(),
            warehouse_id: "1".into(),
            pricing: sample_pricing(),
            link: EntryLink::Independent { origin: None },
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        }
    }

    fn query(client: &str, weight: f64) -> TariffQuery {
        TariffQuery {
            client_id: client.into(),
            warehouse_id: "1".into(),
            operator_id: "OP01".into(),
            service_id: "SVC01".into(),
            weight,
        }
    }

    #[tokio::test]
    async fn exact_match_returns_entry_unchanged() {
        let stored = entry(5, 0);
        let resolver = TariffResolver::new(
            FakeLookup::with(vec![stored.clone()]),
            FallbackTariff::default(),
        );

        let resolution = resolver.resolve(query("1", 42.0)).await.unwrap();
        assert_eq!(resolution.outcome, ResolutionOutcome::Matched);
        assert_eq!(resolution.tariff, Tariff::Configured(stored));
    }

    #[tokio::test]
    async fn unknown_pair_gets_default_tariff() {
        let resolver = TariffResolver::new(FakeLookup::with(vec![]), FallbackTariff::default());

        let resolution = resolver.resolve(query("999", 10.0)).await.unwrap();
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::Fallback(FallbackReason::Unconfigured)
        );
        assert_eq!(resolution.tariff.id(), FALLBACK_TARIFF_ID);
        let p = resolution.tariff.pricing();
        assert_eq!(p.name, "default tariff");
        assert_eq!((p.weight_min, p.weight_max), (0.0, 500.0));
        assert_eq!(p.fixed_fee, 30.0);
        assert!(p.percentage);
        assert_eq!(p.operator_id, "OP01");
    }

    #[tokio::test]
    async fn configured_pair_outside_band_is_no_band_match() {
        let resolver =
            TariffResolver::new(FakeLookup::with(vec![entry(1, 0)]), FallbackTariff::default());

        let resolution = resolver.resolve(query("1", 250.0)).await.unwrap();
        assert_eq!(
            resolution.outcome,
            ResolutionOutcome::Fallback(FallbackReason::NoBandMatch)
        );
        assert!(resolution.tariff.is_fallback());
    }

    #[tokio::test]
    async fn overlapping_entries_pick_latest_update() {
        let resolver = TariffResolver::new(
            FakeLookup::with(vec![entry(1, 60), entry(2, 1), entry(3, 30)]),
            FallbackTariff::default(),
        );

        let resolution = resolver.resolve(query("1", 10.0)).await.unwrap();
        assert_eq!(resolution.outcome, ResolutionOutcome::Ambiguous { candidates: 3 });
        assert_eq!(resolution.tariff.id(), 2);
    }

    #[tokio::test]
    async fn configured_fallback_values_are_used() {
        let fallback = FallbackTariff {
            name: "house rate".into(),
            fixed_fee: 12.5,
            percentage: false,
            ..Default::default()
        };
        let resolver = TariffResolver::new(FakeLookup::with(vec![]), fallback);

        let resolution = resolver.resolve(query("7", 1.0)).await.unwrap();
        assert_eq!(resolution.tariff.pricing().name, "house rate");
        assert_eq!(resolution.tariff.pricing().fixed_fee, 12.5);
        assert!(!resolution.tariff.pricing().percentage);
    }

    #[tokio::test]
    async fn invalid_weight_is_rejected() {
        let resolver = TariffResolver::new(FakeLookup::with(vec![]), FallbackTariff::default());
        assert!(matches!(
            resolver.resolve(query("1", f64::NAN)).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            resolver.resolve(query("1", -1.0)).await,
            Err(DomainError::Validation(_))
        ));
    }
}
