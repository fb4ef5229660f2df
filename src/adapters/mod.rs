//! Venue adapters for the supported trading venues
//!
//! This module provides the core abstractions for connecting to venue
//! ticker streams and catalog endpoints, normalizing everything into
//! `Tick` and `CatalogEntry` records.

pub mod binance;
pub mod bybit;
pub mod errors;
pub mod factory;
pub mod gate;
pub mod kucoin;
pub mod okx;
pub mod shared;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use binance::{BinanceAdapter, BinanceConfig};
pub use bybit::{BybitAdapter, BybitConfig};
pub use errors::{AdapterError, AdapterResult};
pub use factory::{create_adapter, AnyAdapter};
pub use gate::{GateAdapter, GateConfig};
pub use kucoin::{KucoinAdapter, KucoinConfig};
pub use okx::{OkxAdapter, OkxConfig};
pub use shared::{NetPolicy, ReconnectPolicy};
pub use traits::VenueAdapter;
pub use types::{AdapterStatus, CatalogEntry, Tick, TickSink};
