//! Catalog service — common-instrument discovery
//!
//! Fetches every venue's instrument catalog in parallel, keeps the pairs
//! quoted in the configured quote asset, and publishes the set of
//! instruments present on at least `min_venues` venues as the active
//! subscription set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::RwLock;

use futures_util::future::join_all;

use crate::adapters::traits::VenueAdapter;
use crate::core::notify::{FailureHub, FailureKind};
use crate::core::registry::VenueRegistry;
use crate::core::types::{Instrument, Venue};

// =============================================================================
// Configuration + Types
// =============================================================================

/// Discovery knobs, taken from the settings bag at startup.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Quote asset the intersection is restricted to
    pub quote_filter: String,
    /// An instrument must appear on at least this many venues
    pub min_venues: usize,
    /// On a venue's catalog failure, pretend it listed the fallback set
    pub enable_fallbacks: bool,
    /// Static list used when fallbacks are enabled or discovery is empty
    pub fallback_instruments: Vec<Instrument>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            quote_filter: "USDT".to_string(),
            min_venues: 2,
            enable_fallbacks: true,
            fallback_instruments: Vec::new(),
        }
    }
}

/// Additions and removals produced by a refresh.
#[derive(Debug, Clone, Default)]
pub struct CatalogDiff {
    pub added: Vec<Instrument>,
    pub removed: Vec<Instrument>,
}

impl CatalogDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Default)]
struct CatalogState {
    per_venue: HashMap<Venue, HashSet<Instrument>>,
    active: Vec<Instrument>,
}

// =============================================================================
// Active Set Seam
// =============================================================================

/// Read access to the published active set — the seam the engine scans
/// through, so engine tests don't need adapters.
pub trait ActiveSet: Send + Sync {
    fn active_set(&self) -> Vec<Instrument>;
}

// =============================================================================
// CatalogService
// =============================================================================

pub struct CatalogService<A: VenueAdapter> {
    registry: Arc<VenueRegistry<A>>,
    config: CatalogConfig,
    failures: Arc<FailureHub>,
    state: RwLock<CatalogState>,
}

impl<A: VenueAdapter> CatalogService<A> {
    pub fn new(
        registry: Arc<VenueRegistry<A>>,
        config: CatalogConfig,
        failures: Arc<FailureHub>,
    ) -> Self {
        Self {
            registry,
            config,
            failures,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Fetch all catalogs in parallel and recompute the active set.
    ///
    /// Idempotent under unchanged catalogs: the returned diff is empty.
    pub async fn refresh(&self) -> CatalogDiff {
        let fetches = self.registry.iter().map(|(venue, adapter)| async move {
            let guard = adapter.lock().await;
            (venue, guard.fetch_catalog().await)
        });
        let results = join_all(fetches).await;

        let mut per_venue: HashMap<Venue, HashSet<Instrument>> = HashMap::new();
        for (venue, result) in results {
            let instruments = match result {
                Ok(entries) => entries
                    .into_iter()
                    .filter(|e| e.quote == self.config.quote_filter)
                    .map(|e| e.instrument)
                    .collect::<HashSet<_>>(),
                Err(e) => {
                    self.failures
                        .notify(venue, FailureKind::CatalogFetchFailed, &e.to_string());
                    if self.config.enable_fallbacks {
                        tracing::info!(
                            venue = %venue,
                            count = self.config.fallback_instruments.len(),
                            "Catalog fetch failed, using fallback instruments"
                        );
                        self.config.fallback_instruments.iter().cloned().collect()
                    } else {
                        HashSet::new()
                    }
                }
            };
            tracing::debug!(
                venue = %venue,
                count = instruments.len(),
                quote = %self.config.quote_filter,
                "Catalog retained"
            );
            per_venue.insert(venue, instruments);
        }

        let active = self.intersect(&per_venue);

        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(_) => return CatalogDiff::default(),
        };
        let old: HashSet<Instrument> = state.active.iter().cloned().collect();
        let new: HashSet<Instrument> = active.iter().cloned().collect();
        let mut diff = CatalogDiff {
            added: active
                .iter()
                .filter(|i| !old.contains(*i))
                .cloned()
                .collect(),
            removed: state
                .active
                .iter()
                .filter(|i| !new.contains(*i))
                .cloned()
                .collect(),
        };
        diff.added.sort();
        diff.removed.sort();

        state.per_venue = per_venue;
        state.active = active;
        tracing::info!(
            active = state.active.len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            "Active set refreshed"
        );
        diff
    }

    /// Keep instruments on ≥ min_venues venues, ordered by venue count
    /// descending then lexicographic. Empty result falls back to the
    /// static list.
    fn intersect(&self, per_venue: &HashMap<Venue, HashSet<Instrument>>) -> Vec<Instrument> {
        let mut counts: HashMap<&Instrument, usize> = HashMap::new();
        for instruments in per_venue.values() {
            for instrument in instruments {
                *counts.entry(instrument).or_insert(0) += 1;
            }
        }

        let mut qualifying: Vec<(Instrument, usize)> = counts
            .into_iter()
            .filter(|(_, count)| *count >= self.config.min_venues)
            .map(|(i, count)| (i.clone(), count))
            .collect();
        qualifying.sort_by(|(ia, ca), (ib, cb)| cb.cmp(ca).then_with(|| ia.cmp(ib)));

        if qualifying.is_empty() {
            tracing::warn!(
                fallback = self.config.fallback_instruments.len(),
                "No instrument on enough venues, falling back to static list"
            );
            return self.config.fallback_instruments.clone();
        }
        qualifying.into_iter().map(|(i, _)| i).collect()
    }

    /// Venues whose catalog currently lists the instrument.
    pub fn venues_for(&self, instrument: &Instrument) -> Vec<Venue> {
        let state = match self.state.read() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        let mut venues: Vec<Venue> = state
            .per_venue
            .iter()
            .filter(|(_, set)| set.contains(instrument))
            .map(|(v, _)| *v)
            .collect();
        venues.sort();
        venues
    }
}

impl<A: VenueAdapter> ActiveSet for CatalogService<A> {
    fn active_set(&self) -> Vec<Instrument> {
        self.state
            .read()
            .map(|s| s.active.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::MockAdapter;
    use crate::core::notify::{FailureNotifier, LogNotifier};
    use std::time::Duration;

    fn hub() -> Arc<FailureHub> {
        Arc::new(FailureHub::new(
            Arc::new(LogNotifier),
            Duration::from_secs(1_800),
        ))
    }

    fn instrument(s: &str) -> Instrument {
        Instrument::parse(s).unwrap()
    }

    fn service(
        adapters: Vec<(Venue, MockAdapter)>,
        config: CatalogConfig,
    ) -> CatalogService<MockAdapter> {
        CatalogService::new(Arc::new(VenueRegistry::new(adapters)), config, hub())
    }

    #[tokio::test]
    async fn test_intersection_keeps_shared_instruments() {
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC", "ETH", "DOGE"]),
                ),
                (
                    Venue::Okx,
                    MockAdapter::new(Venue::Okx).with_usdt_pairs(&["BTC", "ETH"]),
                ),
            ],
            CatalogConfig::default(),
        );

        let diff = svc.refresh().await;
        let active = svc.active_set();
        assert_eq!(active.len(), 2);
        assert!(active.contains(&instrument("BTC/USDT")));
        assert!(active.contains(&instrument("ETH/USDT")));
        assert!(!active.contains(&instrument("DOGE/USDT")));
        assert_eq!(diff.added.len(), 2);
    }

    #[tokio::test]
    async fn test_exactly_min_venues_is_included() {
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC"]),
                ),
                (
                    Venue::Okx,
                    MockAdapter::new(Venue::Okx).with_usdt_pairs(&["BTC"]),
                ),
                (Venue::Gate, MockAdapter::new(Venue::Gate)),
            ],
            CatalogConfig {
                min_venues: 2,
                ..Default::default()
            },
        );

        svc.refresh().await;
        assert_eq!(svc.active_set(), vec![instrument("BTC/USDT")]);
    }

    #[tokio::test]
    async fn test_ordering_by_venue_count_then_lexicographic() {
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC", "ETH", "ADA"]),
                ),
                (
                    Venue::Okx,
                    MockAdapter::new(Venue::Okx).with_usdt_pairs(&["BTC", "ETH", "ADA"]),
                ),
                (
                    Venue::Gate,
                    MockAdapter::new(Venue::Gate).with_usdt_pairs(&["ETH"]),
                ),
            ],
            CatalogConfig::default(),
        );

        svc.refresh().await;
        let active = svc.active_set();
        // ETH on 3 venues first, then ADA/BTC (2 venues) lexicographically
        assert_eq!(
            active,
            vec![
                instrument("ETH/USDT"),
                instrument("ADA/USDT"),
                instrument("BTC/USDT"),
            ]
        );
    }

    #[tokio::test]
    async fn test_quote_filter_excludes_other_quotes() {
        let mut binance = MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC"]);
        binance
            .catalog
            .push(crate::adapters::types::CatalogEntry::tradable("BTC", "EUR"));
        let svc = service(
            vec![
                (Venue::Binance, binance),
                (
                    Venue::Okx,
                    MockAdapter::new(Venue::Okx).with_usdt_pairs(&["BTC"]),
                ),
            ],
            CatalogConfig::default(),
        );

        svc.refresh().await;
        assert_eq!(svc.active_set(), vec![instrument("BTC/USDT")]);
    }

    #[tokio::test]
    async fn test_empty_intersection_falls_back_to_static_list() {
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC"]),
                ),
                (
                    Venue::Okx,
                    MockAdapter::new(Venue::Okx).with_usdt_pairs(&["ETH"]),
                ),
            ],
            CatalogConfig {
                fallback_instruments: vec![instrument("SOL/USDT")],
                ..Default::default()
            },
        );

        svc.refresh().await;
        assert_eq!(svc.active_set(), vec![instrument("SOL/USDT")]);
    }

    #[tokio::test]
    async fn test_failed_venue_uses_fallback_list_when_enabled() {
        let mut broken = MockAdapter::new(Venue::Okx);
        broken.fail_catalog = true;
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC"]),
                ),
                (Venue::Okx, broken),
            ],
            CatalogConfig {
                fallback_instruments: vec![instrument("BTC/USDT")],
                ..Default::default()
            },
        );

        svc.refresh().await;
        // Okx "lists" the fallback BTC/USDT, so the pair survives intersection
        assert_eq!(svc.active_set(), vec![instrument("BTC/USDT")]);
        assert_eq!(svc.venues_for(&instrument("BTC/USDT")).len(), 2);
    }

    #[tokio::test]
    async fn test_failed_venue_yields_empty_set_when_fallbacks_disabled() {
        let mut broken = MockAdapter::new(Venue::Okx);
        broken.fail_catalog = true;
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC"]),
                ),
                (Venue::Okx, broken),
            ],
            CatalogConfig {
                enable_fallbacks: false,
                fallback_instruments: vec![instrument("BTC/USDT")],
                ..Default::default()
            },
        );

        svc.refresh().await;
        // Intersection empty → final fallback still applies
        assert_eq!(svc.active_set(), vec![instrument("BTC/USDT")]);
        // but Okx's per-venue set stays empty
        assert_eq!(svc.venues_for(&instrument("BTC/USDT")), vec![Venue::Binance]);
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent_under_unchanged_catalogs() {
        let svc = service(
            vec![
                (
                    Venue::Binance,
                    MockAdapter::new(Venue::Binance).with_usdt_pairs(&["BTC"]),
                ),
                (
                    Venue::Okx,
                    MockAdapter::new(Venue::Okx).with_usdt_pairs(&["BTC"]),
                ),
            ],
            CatalogConfig::default(),
        );

        let first = svc.refresh().await;
        assert!(!first.is_empty());
        let second = svc.refresh().await;
        assert!(second.is_empty());
        assert_eq!(svc.active_set(), vec![instrument("BTC/USDT")]);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_reported_once_per_cooldown() {
        struct Counting(std::sync::Mutex<u32>);
        impl FailureNotifier for Counting {
            fn notify(&self, _: Venue, _: FailureKind, _: &str) {
                *self.0.lock().unwrap() += 1;
            }
        }
        let counter = Arc::new(Counting(std::sync::Mutex::new(0)));
        let hub = Arc::new(FailureHub::new(
            counter.clone(),
            Duration::from_secs(1_800),
        ));

        let mut broken = MockAdapter::new(Venue::Okx);
        broken.fail_catalog = true;
        let svc = CatalogService::new(
            Arc::new(VenueRegistry::new(vec![(Venue::Okx, broken)])),
            CatalogConfig::default(),
            hub,
        );

        svc.refresh().await;
        svc.refresh().await;
        assert_eq!(*counter.0.lock().unwrap(), 1);
    }
}
