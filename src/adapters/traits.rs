//! Venue adapter trait definition
//!
//! The VenueAdapter trait defines the common interface that every venue
//! adapter implements: lifecycle, catalog fetch, ticker subscriptions,
//! and status reporting.

use async_trait::async_trait;

use crate::adapters::errors::AdapterResult;
use crate::adapters::types::{AdapterStatus, CatalogEntry, TickSink};
use crate::core::types::{Instrument, Venue};

/// Common trait for all venue adapters.
///
/// Contracts shared by every implementation:
/// - `subscribe` never calls the sink with a non-finite or non-positive
///   price; such frames are dropped and counted.
/// - after `stop()` no further ticks are delivered, even if an in-flight
///   frame arrives.
/// - on stream close or error the adapter schedules its own reconnect and
///   re-subscribes its active set.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    /// The venue this adapter serves.
    fn venue(&self) -> Venue;

    /// Enter the initialized state. Idempotent; does not open sockets —
    /// the first `subscribe` does.
    async fn start(&mut self) -> AdapterResult<()>;

    /// Close all sockets and clear local connection state. Terminal.
    async fn stop(&mut self) -> AdapterResult<()>;

    /// Fetch the venue's full instrument catalog, filtered to tradable
    /// entries. Blocking I/O bounded by the configured network timeout.
    async fn fetch_catalog(&self) -> AdapterResult<Vec<CatalogEntry>>;

    /// Open (or reuse) a stream carrying the instrument's ticker; every
    /// parsed tick is delivered to `sink` exactly once.
    async fn subscribe(&mut self, instrument: &Instrument, sink: TickSink) -> AdapterResult<()>;

    /// Stop delivering ticks for the instrument.
    async fn unsubscribe(&mut self, instrument: &Instrument) -> AdapterResult<()>;

    /// Tear down and re-establish the stream, re-subscribing the active set.
    async fn reconnect(&mut self) -> AdapterResult<()>;

    /// Current connection/subscription snapshot.
    async fn status(&self) -> AdapterStatus;
}
