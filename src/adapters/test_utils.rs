//! Shared mock adapter for unit tests
//!
//! In-memory `VenueAdapter` implementation: serves a canned catalog,
//! records subscriptions, and lets tests push ticks through the sinks.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::adapters::errors::{AdapterError, AdapterResult};
use crate::adapters::traits::VenueAdapter;
use crate::adapters::types::{AdapterStatus, CatalogEntry, Tick, TickSink};
use crate::core::types::{Instrument, Venue};

pub struct MockAdapter {
    pub venue: Venue,
    pub connected: bool,
    pub catalog: Vec<CatalogEntry>,
    pub fail_catalog: bool,
    pub reconnects: u32,
    sinks: HashMap<Instrument, TickSink>,
}

impl MockAdapter {
    pub fn new(venue: Venue) -> Self {
        Self {
            venue,
            connected: true,
            catalog: Vec::new(),
            fail_catalog: false,
            reconnects: 0,
            sinks: HashMap::new(),
        }
    }

    /// Seed the catalog with tradable USDT pairs for the given bases.
    pub fn with_usdt_pairs(mut self, bases: &[&str]) -> Self {
        self.catalog = bases
            .iter()
            .map(|b| CatalogEntry::tradable(b, "USDT"))
            .collect();
        self
    }

    /// Deliver a tick through the registered sink, as the reader loop would.
    pub fn push_tick(&self, instrument: &Instrument, price: f64) {
        if let Some(sink) = self.sinks.get(instrument) {
            let tick = Tick::now(instrument.clone(), self.venue, price);
            if tick.is_valid() {
                sink(tick);
            }
        }
    }

    pub fn is_subscribed(&self, instrument: &Instrument) -> bool {
        self.sinks.contains_key(instrument)
    }
}

#[async_trait]
impl VenueAdapter for MockAdapter {
    fn venue(&self) -> Venue {
        self.venue
    }

    async fn start(&mut self) -> AdapterResult<()> {
        Ok(())
    }

    async fn stop(&mut self) -> AdapterResult<()> {
        self.connected = false;
        self.sinks.clear();
        Ok(())
    }

    async fn fetch_catalog(&self) -> AdapterResult<Vec<CatalogEntry>> {
        if self.fail_catalog {
            return Err(AdapterError::CatalogUnavailable("mock outage".into()));
        }
        Ok(self.catalog.clone())
    }

    async fn subscribe(&mut self, instrument: &Instrument, sink: TickSink) -> AdapterResult<()> {
        self.sinks.insert(instrument.clone(), sink);
        Ok(())
    }

    async fn unsubscribe(&mut self, instrument: &Instrument) -> AdapterResult<()> {
        self.sinks.remove(instrument);
        Ok(())
    }

    async fn reconnect(&mut self) -> AdapterResult<()> {
        self.reconnects += 1;
        self.connected = true;
        Ok(())
    }

    async fn status(&self) -> AdapterStatus {
        AdapterStatus {
            venue: self.venue,
            connected: self.connected,
            connection_count: usize::from(self.connected),
            subscribed: self.sinks.keys().cloned().collect(),
            last_error: None,
        }
    }
}
