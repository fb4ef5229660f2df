//! Bybit adapter
//!
//! v5 public spot ticker streaming plus the `instruments-info` catalog.
//! Symbol bijection: `BTC/USDT ↔ BTCUSDT`. Bybit expects an
//! application-level ping on the websocket.

mod config;
mod types;

pub use config::BybitConfig;

use async_trait::async_trait;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::AdapterResult;
use crate::adapters::shared::stream::{ParsedFrame, StreamAdapter, VenueWire};
use crate::adapters::types::CatalogEntry;
use crate::core::types::{Instrument, Venue};

/// Bybit venue adapter.
pub type BybitAdapter = StreamAdapter<BybitWire>;

/// Wire protocol for Bybit v5 public spot streams.
pub struct BybitWire {
    config: BybitConfig,
}

impl BybitWire {
    pub fn new(config: BybitConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl VenueWire for BybitWire {
    const VENUE: Venue = Venue::Bybit;

    async fn ws_endpoint(&self, _client: &reqwest::Client) -> AdapterResult<String> {
        Ok(self.config.ws_url().to_string())
    }

    fn wire_symbol(&self, instrument: &Instrument) -> String {
        format!("{}{}", instrument.base(), instrument.quote())
    }

    fn subscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "op": "subscribe",
            "args": [format!("tickers.{}", wire_symbol)],
        });
        Message::Text(msg.to_string())
    }

    fn unsubscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "op": "unsubscribe",
            "args": [format!("tickers.{}", wire_symbol)],
        });
        Message::Text(msg.to_string())
    }

    fn ping_frame(&self) -> Option<Message> {
        Some(Message::Text(
            serde_json::json!({"op": "ping"}).to_string(),
        ))
    }

    fn parse_frame(&self, text: &str) -> ParsedFrame {
        types::parse_frame(text)
    }

    async fn fetch_catalog(&self, client: &reqwest::Client) -> AdapterResult<Vec<CatalogEntry>> {
        types::fetch_catalog(client, self.config.rest_url()).await
    }
}
