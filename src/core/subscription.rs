//! Subscription manager — wires the active set into the price store
//!
//! For every (venue, instrument ∈ active set ∩ venue catalog) the manager
//! issues a `subscribe` whose sink forwards straight into
//! `PriceStore::put`. Catalog refreshes apply as add/remove diffs;
//! explicit venue reconnects re-issue the adapter's own resubscription.

use std::sync::Arc;

use crate::adapters::errors::AdapterResult;
use crate::adapters::traits::VenueAdapter;
use crate::adapters::types::TickSink;
use crate::core::catalog::{CatalogDiff, CatalogService};
use crate::core::registry::VenueRegistry;
use crate::core::store::PriceStore;
use crate::core::types::{Instrument, Venue};

pub struct SubscriptionManager<A: VenueAdapter> {
    registry: Arc<VenueRegistry<A>>,
    catalog: Arc<CatalogService<A>>,
    store: Arc<PriceStore>,
}

impl<A: VenueAdapter> SubscriptionManager<A> {
    pub fn new(
        registry: Arc<VenueRegistry<A>>,
        catalog: Arc<CatalogService<A>>,
        store: Arc<PriceStore>,
    ) -> Self {
        Self {
            registry,
            catalog,
            store,
        }
    }

    /// Sink forwarding parsed ticks into the store. The put itself rejects
    /// anything violating the price invariant.
    fn make_sink(&self) -> TickSink {
        let store = Arc::clone(&self.store);
        Arc::new(move |tick| {
            store.put(tick);
        })
    }

    /// Subscribe one instrument on every venue whose catalog lists it.
    async fn subscribe_instrument(&self, instrument: &Instrument) {
        for venue in self.catalog.venues_for(instrument) {
            let Some(adapter) = self.registry.get(venue) else {
                continue;
            };
            let sink = self.make_sink();
            let mut guard = adapter.lock().await;
            if let Err(e) = guard.subscribe(instrument, sink).await {
                tracing::warn!(
                    venue = %venue,
                    instrument = %instrument,
                    error = %e,
                    "Subscribe failed"
                );
            }
        }
    }

    /// Unsubscribe one instrument everywhere (no-op on venues without it).
    async fn unsubscribe_instrument(&self, instrument: &Instrument) {
        for (venue, adapter) in self.registry.iter() {
            let mut guard = adapter.lock().await;
            if let Err(e) = guard.unsubscribe(instrument).await {
                tracing::warn!(
                    venue = %venue,
                    instrument = %instrument,
                    error = %e,
                    "Unsubscribe failed"
                );
            }
        }
    }

    /// Subscribe the entire current active set. Used at startup, after
    /// discovery has published the first set.
    pub async fn sync_all(&self) {
        use crate::core::catalog::ActiveSet;
        let active = self.catalog.active_set();
        for instrument in &active {
            self.subscribe_instrument(instrument).await;
        }
        tracing::info!(instruments = active.len(), "Active set subscribed");
    }

    /// Apply a catalog refresh diff: additions subscribe, removals
    /// unsubscribe.
    pub async fn apply(&self, diff: &CatalogDiff) {
        for instrument in &diff.added {
            self.subscribe_instrument(instrument).await;
        }
        for instrument in &diff.removed {
            self.unsubscribe_instrument(instrument).await;
        }
        if !diff.is_empty() {
            tracing::info!(
                added = diff.added.len(),
                removed = diff.removed.len(),
                "Subscription diff applied"
            );
        }
    }

    /// Tear down and re-establish one venue's stream. The adapter
    /// re-subscribes its own active set as part of the reconnect.
    pub async fn reconnect_venue(&self, venue: Venue) -> AdapterResult<()> {
        let Some(adapter) = self.registry.get(venue) else {
            return Ok(());
        };
        let mut guard = adapter.lock().await;
        guard.reconnect().await
    }
}
