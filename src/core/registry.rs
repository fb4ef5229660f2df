//! Venue registry — the closed set of adapters behind shared handles
//!
//! Each adapter sits behind its own async mutex so catalog fetches and
//! subscription calls on different venues proceed in parallel while calls
//! into one adapter stay serialized.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::adapters::traits::VenueAdapter;
use crate::core::types::Venue;

/// Shared handle to one adapter.
pub type SharedAdapter<A> = Arc<Mutex<A>>;

/// Immutable map from venue to adapter handle, built once at startup.
pub struct VenueRegistry<A: VenueAdapter> {
    adapters: BTreeMap<Venue, SharedAdapter<A>>,
}

impl<A: VenueAdapter> VenueRegistry<A> {
    pub fn new(adapters: impl IntoIterator<Item = (Venue, A)>) -> Self {
        Self {
            adapters: adapters
                .into_iter()
                .map(|(v, a)| (v, Arc::new(Mutex::new(a))))
                .collect(),
        }
    }

    pub fn get(&self, venue: Venue) -> Option<SharedAdapter<A>> {
        self.adapters.get(&venue).cloned()
    }

    pub fn venues(&self) -> Vec<Venue> {
        self.adapters.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Venue, SharedAdapter<A>)> + '_ {
        self.adapters.iter().map(|(v, a)| (*v, Arc::clone(a)))
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_utils::MockAdapter;

    #[test]
    fn test_registry_lookup_and_order() {
        let registry = VenueRegistry::new([
            (Venue::Okx, MockAdapter::new(Venue::Okx)),
            (Venue::Binance, MockAdapter::new(Venue::Binance)),
        ]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get(Venue::Binance).is_some());
        assert!(registry.get(Venue::Gate).is_none());
        // BTreeMap keeps canonical venue order
        assert_eq!(registry.venues(), vec![Venue::Binance, Venue::Okx]);
    }
}
