//! Adapter factory for the closed venue set
//!
//! Creates `VenueAdapter` instances from `Venue` values.
//! Uses an enum-based dispatch pattern (no `Box<dyn>`) to preserve
//! monomorphization.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapters::binance::{BinanceAdapter, BinanceConfig, BinanceWire};
use crate::adapters::bybit::{BybitAdapter, BybitConfig, BybitWire};
use crate::adapters::errors::AdapterResult;
use crate::adapters::gate::{GateAdapter, GateConfig, GateWire};
use crate::adapters::kucoin::{KucoinAdapter, KucoinConfig, KucoinWire};
use crate::adapters::okx::{OkxAdapter, OkxConfig, OkxWire};
use crate::adapters::shared::stream::{NetPolicy, StreamAdapter};
use crate::adapters::traits::VenueAdapter;
use crate::adapters::types::{create_http_client, AdapterStatus, CatalogEntry, TickSink};
use crate::core::notify::FailureHub;
use crate::core::types::{Instrument, Venue};

// =============================================================================
// AnyAdapter — enum-based dispatch over the closed venue set
// =============================================================================

/// Enum wrapping all concrete adapter types for runtime dispatch.
pub enum AnyAdapter {
    Binance(BinanceAdapter),
    Bybit(BybitAdapter),
    Okx(OkxAdapter),
    Kucoin(KucoinAdapter),
    Gate(GateAdapter),
}

/// Macro to reduce boilerplate for delegating trait methods
macro_rules! delegate {
    ($self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnyAdapter::Binance(a) => a.$method($($arg),*),
            AnyAdapter::Bybit(a) => a.$method($($arg),*),
            AnyAdapter::Okx(a) => a.$method($($arg),*),
            AnyAdapter::Kucoin(a) => a.$method($($arg),*),
            AnyAdapter::Gate(a) => a.$method($($arg),*),
        }
    };
    (await $self:expr, $method:ident ( $($arg:expr),* )) => {
        match $self {
            AnyAdapter::Binance(a) => a.$method($($arg),*).await,
            AnyAdapter::Bybit(a) => a.$method($($arg),*).await,
            AnyAdapter::Okx(a) => a.$method($($arg),*).await,
            AnyAdapter::Kucoin(a) => a.$method($($arg),*).await,
            AnyAdapter::Gate(a) => a.$method($($arg),*).await,
        }
    };
}

#[async_trait]
impl VenueAdapter for AnyAdapter {
    fn venue(&self) -> Venue {
        delegate!(self, venue())
    }

    async fn start(&mut self) -> AdapterResult<()> {
        delegate!(await self, start())
    }

    async fn stop(&mut self) -> AdapterResult<()> {
        delegate!(await self, stop())
    }

    async fn fetch_catalog(&self) -> AdapterResult<Vec<CatalogEntry>> {
        delegate!(await self, fetch_catalog())
    }

    async fn subscribe(&mut self, instrument: &Instrument, sink: TickSink) -> AdapterResult<()> {
        delegate!(await self, subscribe(instrument, sink))
    }

    async fn unsubscribe(&mut self, instrument: &Instrument) -> AdapterResult<()> {
        delegate!(await self, unsubscribe(instrument))
    }

    async fn reconnect(&mut self) -> AdapterResult<()> {
        delegate!(await self, reconnect())
    }

    async fn status(&self) -> AdapterStatus {
        delegate!(await self, status())
    }
}

// =============================================================================
// Factory Functions
// =============================================================================

/// Create the adapter for a venue.
///
/// The adapter is created but not started — call `start()` after. Each
/// adapter gets its own pooled HTTP client bounded by the network timeout.
pub fn create_adapter(venue: Venue, net: NetPolicy, failures: Arc<FailureHub>) -> AnyAdapter {
    let http = create_http_client(venue, net.ws_timeout);
    match venue {
        Venue::Binance => AnyAdapter::Binance(
            StreamAdapter::new(BinanceWire::new(BinanceConfig::from_env()), http, net)
                .with_failure_hub(failures),
        ),
        Venue::Bybit => AnyAdapter::Bybit(
            StreamAdapter::new(BybitWire::new(BybitConfig::from_env()), http, net)
                .with_failure_hub(failures),
        ),
        Venue::Okx => AnyAdapter::Okx(
            StreamAdapter::new(OkxWire::new(OkxConfig::from_env()), http, net)
                .with_failure_hub(failures),
        ),
        Venue::Kucoin => AnyAdapter::Kucoin(
            StreamAdapter::new(KucoinWire::new(KucoinConfig::from_env()), http, net)
                .with_failure_hub(failures),
        ),
        Venue::Gate => AnyAdapter::Gate(
            StreamAdapter::new(GateWire::new(GateConfig::from_env()), http, net)
                .with_failure_hub(failures),
        ),
    }
}
