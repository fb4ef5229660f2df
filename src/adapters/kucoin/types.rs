//! KuCoin wire types
//!
//! Bullet-public token handshake, ticker topic payloads, and the v2
//! symbols catalog.
//!
//! Ticker frame:
//!   { "type":"message", "topic":"/market/ticker:BTC-USDT",
//!     "subject":"trade.ticker",
//!     "data": { "price":"50000.0", "bestBid":"...", "bestAsk":"..." } }

use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::adapters::errors::{AdapterError, AdapterResult};
use crate::adapters::shared::stream::{ParsedFrame, RawTick};
use crate::adapters::types::CatalogEntry;
use crate::core::types::Instrument;

/// Request ids for subscribe/unsubscribe/ping frames.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

pub(super) fn next_request_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

// =============================================================================
// Token Handshake
// =============================================================================

#[derive(Debug, Deserialize)]
struct BulletResponse {
    code: String,
    data: BulletData,
}

#[derive(Debug, Deserialize)]
struct BulletData {
    token: String,
    #[serde(rename = "instanceServers")]
    instance_servers: Vec<InstanceServer>,
}

#[derive(Debug, Deserialize)]
struct InstanceServer {
    endpoint: String,
}

/// Resolve the websocket URL: POST bullet-public, then join token onto the
/// returned instance endpoint.
pub(super) async fn resolve_ws_endpoint(
    client: &reqwest::Client,
    rest_url: &str,
) -> AdapterResult<String> {
    let url = format!("{}/api/v1/bullet-public", rest_url);
    let response = client
        .post(&url)
        .send()
        .await
        .map_err(|e| AdapterError::ConnectionFailed(format!("bullet-public: {}", e)))?;
    if !response.status().is_success() {
        return Err(AdapterError::ConnectionFailed(format!(
            "bullet-public HTTP {}",
            response.status()
        )));
    }
    let body: BulletResponse = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;
    if body.code != "200000" {
        return Err(AdapterError::ConnectionFailed(format!(
            "bullet-public code {}",
            body.code
        )));
    }
    let server = body
        .data
        .instance_servers
        .first()
        .ok_or_else(|| AdapterError::InvalidResponse("no instance servers".into()))?;

    let connect_id: u64 = rand::random();
    Ok(format!(
        "{}?token={}&connectId={}",
        server.endpoint, body.data.token, connect_id
    ))
}

// =============================================================================
// Stream Frames
// =============================================================================

#[derive(Debug, Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    frame_type: String,
    topic: Option<String>,
    data: Option<TickerData>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    price: String,
}

pub(super) fn parse_frame(text: &str) -> ParsedFrame {
    let frame: InboundFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(_) => return ParsedFrame::Ignore,
    };
    match frame.frame_type.as_str() {
        "message" => {
            let Some(topic) = frame.topic.as_deref() else {
                return ParsedFrame::Ignore;
            };
            let Some(wire_symbol) = topic.strip_prefix("/market/ticker:") else {
                return ParsedFrame::Ignore;
            };
            let Some(data) = frame.data else {
                return ParsedFrame::Malformed("ticker message without data".into());
            };
            let price = match data.price.parse::<f64>() {
                Ok(p) => p,
                Err(e) => return ParsedFrame::Malformed(format!("price: {}", e)),
            };
            // The ticker topic carries no 24h stats; those live on the
            // snapshot topic and are not needed here.
            ParsedFrame::Tick(RawTick {
                wire_symbol: wire_symbol.to_string(),
                price,
                volume: None,
                high: None,
                low: None,
            })
        }
        "pong" => ParsedFrame::Pong,
        "ack" | "welcome" => ParsedFrame::Ack,
        "error" => ParsedFrame::Malformed(format!("venue error: {}", text)),
        _ => ParsedFrame::Ignore,
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
struct SymbolsResponse {
    code: String,
    data: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    #[allow(dead_code)]
    symbol: String,
    #[serde(rename = "baseCurrency")]
    base_currency: String,
    #[serde(rename = "quoteCurrency")]
    quote_currency: String,
    #[serde(rename = "enableTrading")]
    enable_trading: bool,
    #[serde(rename = "priceIncrement")]
    price_increment: Option<String>,
    #[serde(rename = "baseMinSize")]
    base_min_size: Option<String>,
}

pub(super) async fn fetch_catalog(
    client: &reqwest::Client,
    rest_url: &str,
) -> AdapterResult<Vec<CatalogEntry>> {
    let url = format!("{}/api/v2/symbols", rest_url);
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| AdapterError::CatalogUnavailable(e.to_string()))?;
    if !response.status().is_success() {
        return Err(AdapterError::CatalogUnavailable(format!(
            "HTTP {}",
            response.status()
        )));
    }
    let body: SymbolsResponse = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;
    if body.code != "200000" {
        return Err(AdapterError::CatalogUnavailable(format!(
            "code {}",
            body.code
        )));
    }

    Ok(body
        .data
        .into_iter()
        .map(|s| CatalogEntry {
            instrument: Instrument::new(&s.base_currency, &s.quote_currency),
            base: s.base_currency,
            quote: s.quote_currency,
            tradable: s.enable_trading,
            tick_size: s.price_increment.and_then(|v| v.parse().ok()),
            min_size: s.base_min_size.and_then(|v| v.parse().ok()),
        })
        .collect())
}
