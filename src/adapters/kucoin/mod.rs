//! KuCoin adapter
//!
//! Public ticker topic streaming plus the v2 symbols catalog. KuCoin
//! requires a short-lived token from the `bullet-public` endpoint before
//! the websocket can be opened; the handshake runs inside endpoint
//! resolution so reconnects always get a fresh token.
//!
//! Symbol bijection: `BTC/USDT ↔ BTC-USDT`.

mod config;
mod types;

pub use config::KucoinConfig;

use async_trait::async_trait;
use tokio_tungstenite::tungstenite::Message;

use crate::adapters::errors::AdapterResult;
use crate::adapters::shared::stream::{ParsedFrame, StreamAdapter, VenueWire};
use crate::adapters::types::CatalogEntry;
use crate::core::types::{Instrument, Venue};

use types::next_request_id;

/// KuCoin venue adapter.
pub type KucoinAdapter = StreamAdapter<KucoinWire>;

/// Wire protocol for KuCoin public streams.
pub struct KucoinWire {
    config: KucoinConfig,
}

impl KucoinWire {
    pub fn new(config: KucoinConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl VenueWire for KucoinWire {
    const VENUE: Venue = Venue::Kucoin;

    async fn ws_endpoint(&self, client: &reqwest::Client) -> AdapterResult<String> {
        types::resolve_ws_endpoint(client, self.config.rest_url()).await
    }

    fn wire_symbol(&self, instrument: &Instrument) -> String {
        format!("{}-{}", instrument.base(), instrument.quote())
    }

    fn subscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "id": next_request_id(),
            "type": "subscribe",
            "topic": format!("/market/ticker:{}", wire_symbol),
            "privateChannel": false,
            "response": true,
        });
        Message::Text(msg.to_string())
    }

    fn unsubscribe_frame(&self, wire_symbol: &str) -> Message {
        let msg = serde_json::json!({
            "id": next_request_id(),
            "type": "unsubscribe",
            "topic": format!("/market/ticker:{}", wire_symbol),
            "privateChannel": false,
            "response": true,
        });
        Message::Text(msg.to_string())
    }

    fn ping_frame(&self) -> Option<Message> {
        let msg = serde_json::json!({
            "id": next_request_id(),
            "type": "ping",
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
