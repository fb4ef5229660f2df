//! OKX adapter
//!
//! v5 public tickers channel plus the SPOT instruments catalog.
//! Symbol bijection: `BTC/USDT ↔ BTC-USDT`. OKX keepalive is the
//! literal `ping`/`pong` text frame.

mod config;
mod types;

pub use config::OkxConfig;

use async_trait::async_trait;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::AdapterResult;
use crate::adapters::shared::stream::{ParsedFrame, StreamAdapter, VenueWire};
use crate::adapters::types::CatalogEntry;
use crate::core::types::{Instrument, Venue};

/// OKX venue adapter.
pub type OkxAdapter = StreamAdapter<OkxWire>;

/// Wire protocol for OKX v5 public streams.
pub struct OkxWire {
    config: OkxConfig,
}

impl OkxWire {
    pub fn new(config: OkxConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl VenueWire for OkxWire {
    const VENUE: Venue = Venue::Okx;

    async fn ws_endpoint(&self, _client: &reqwest::Client) -> AdapterResult<String> {
        Ok(self.config.ws_url().to_string())
    }

    fn wire_symbol(&self, instrument: &Instrument) -> String {
        format!("{}-{}", instrument.base(), instrument.quote())
    }

    fn subscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "op": "subscribe",
            "args": [{"channel": "tickers", "instId": wire_symbol}],
        });
        Message::Text(msg.to_string())
    }

    fn unsubscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "op": "unsubscribe",
            "args": [{"channel": "tickers", "instId": wire_symbol}],
        });
        Message::Text(msg.to_string())
    }

    fn ping_frame(&self) -> Option<Message> {
        Some(Message::Text("ping".to_string()))
    }

    fn parse_frame(&self, text: &str) -> ParsedFrame {
        types::parse_frame(text)
    }

    async fn fetch_catalog(&self, client: &reqwest::Client) -> AdapterResult<Vec<CatalogEntry>> {
        types::fetch_catalog(client, self.config.rest_url()).await
    }
}
