//! Gate.io adapter
//!
//! v4 spot tickers channel plus the currency-pairs catalog.
//! Symbol bijection: `BTC/USDT ↔ BTC_USDT`. Gate expects an
//! application-level `spot.ping` on the websocket.

mod config;
mod types;

pub use config::GateConfig;

use async_trait::async_trait;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::AdapterResult;
use crate::adapters::shared::stream::{ParsedFrame, StreamAdapter, VenueWire};
use crate::adapters::types::CatalogEntry;
use crate::core::types::{current_time_ms, Instrument, Venue};

/// Gate.io venue adapter.
pub type GateAdapter = StreamAdapter<GateWire>;

/// Wire protocol for Gate.io v4 spot streams.
pub struct GateWire {
    config: GateConfig,
}

impl GateWire {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    fn channel_frame(&self, event: &str, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "time": current_time_ms() / 1000,
            "channel": "spot.tickers",
            "event": event,
            "payload": [wire_symbol],
        });
        Message::Text(msg.to_string())
    }
}

#[async_trait]
impl VenueWire for GateWire {
    const VENUE: Venue = Venue::Gate;

    async fn ws_endpoint(&self, _client: &reqwest::Client) -> AdapterResult<String> {
        Ok(self.config.ws_url().to_string())
    }

    fn wire_symbol(&self, instrument: &Instrument) -> String {
        format!("{}_{}", instrument.base(), instrument.quote())
    }

    fn subscribe_frame(&self, wire_symbol: &str) -> Message {
        self.channel_frame("subscribe", wire_symbol)
    }

    fn unsubscribe_frame(&self, wire_symbol: &str) -> Message {
        self.channel_frame("unsubscribe", wire_symbol)
    }

    fn ping_frame(&self) -> Option<Message> {
        let msg = serde_json::json!({
            "time": current_time_ms() / 1000,
            "channel": "spot.ping",
        });
        Some(Message::Text(msg.to_string()))
    }

    fn parse_frame(&self, text: &str) -> ParsedFrame {
        types::parse_frame(text)
    }

    async fn fetch_catalog(&self, client: &reqwest::Client) -> AdapterResult<Vec<CatalogEntry>> {
        types::fetch_catalog(client, self.config.rest_url()).await
    }
}
