//! Binance adapter
//!
//! Spot ticker streaming over the combined websocket endpoint plus the
//! `exchangeInfo` catalog. Symbol bijection: `BTC/USDT ↔ BTCUSDT`
//! (lower-cased in stream names).

mod config;
mod types;

pub use config::BinanceConfig;

use async_trait::async_trait;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::AdapterResult;
use crate::adapters::shared::stream::{ParsedFrame, StreamAdapter, VenueWire};
use crate::adapters::types::CatalogEntry;
use crate::core::types::{Instrument, Venue};

use types::next_request_id;

/// Binance venue adapter.
pub type BinanceAdapter = StreamAdapter<BinanceWire>;

/// Wire protocol for Binance spot streams.
pub struct BinanceWire {
    config: BinanceConfig,
}

impl BinanceWire {
    pub fn new(config: BinanceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl VenueWire for BinanceWire {
    const VENUE: Venue = Venue::Binance;

    async fn ws_endpoint(&self, _client: &reqwest::Client) -> AdapterResult<String> {
        Ok(self.config.ws_url().to_string())
    }

    fn wire_symbol(&self, instrument: &Instrument) -> String {
        format!("{}{}", instrument.base(), instrument.quote())
    }

    fn subscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "method": "SUBSCRIBE",
            "params": [format!("{}@ticker", wire_symbol.to_lowercase())],
            "id": next_request_id(),
        });
        Message::Text(msg.to_string())
    }

    fn unsubscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "method": "UNSUBSCRIBE",
            "params": [format!("{}@ticker", wire_symbol.to_lowercase())],
            "id": next_request_id(),
        });
        Message::Text(msg.to_string())
    }

    fn parse_frame(&self, text: &str) -> ParsedFrame {
        types::parse_frame(text)
    }

    async fn fetch_catalog(&self, client: &reqwest::Client) -> AdapterResult<Vec<CatalogEntry>> {
        types::fetch_catalog(client, self.config.rest_url()).await
    }
}
