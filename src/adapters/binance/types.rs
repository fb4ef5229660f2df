//! Binance wire types
//!
//! 24hr ticker stream payloads and the `exchangeInfo` catalog response.
//!
//! Ticker frame (individual symbol stream):
//!   { "e":"24hrTicker", "s":"BTCUSDT", "c":"50000.00",
//!     "h":"51000.00", "l":"49000.00", "v":"1234.5", ... }

use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::adapters::errors::{AdapterError, AdapterResult};
use crate::adapters::shared::stream::{ParsedFrame, RawTick};
use crate::adapters::types::CatalogEntry;
use crate::core::types::Instrument;

/// Request ids for SUBSCRIBE/UNSUBSCRIBE frames.
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

pub(super) fn next_request_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

// =============================================================================
// Stream Frames
// =============================================================================

/// 24hr rolling window ticker event
#[derive(Debug, Deserialize)]
struct TickerEvent {
    /// Event type, always "24hrTicker" for this stream
    #[serde(rename = "e")]
    event: String,
    /// Symbol, e.g. "BTCUSDT"
    #[serde(rename = "s")]
    symbol: String,
    /// Last price
    #[serde(rename = "c")]
    last_price: String,
    /// 24h high
    #[serde(rename = "h")]
    high: Option<String>,
    /// 24h low
    #[serde(rename = "l")]
    low: Option<String>,
    /// 24h base asset volume
    #[serde(rename = "v")]
    volume: Option<String>,
}

/// Response to a SUBSCRIBE/UNSUBSCRIBE request
#[derive(Debug, Deserialize)]
struct RequestAck {
    #[allow(dead_code)]
    result: Option<serde_json::Value>,
    #[allow(dead_code)]
    id: u64,
}

pub(super) fn parse_frame(text: &str) -> ParsedFrame {
    if text.contains("\"e\":\"24hrTicker\"") {
        let event: TickerEvent = match serde_json::from_str(text) {
            Ok(e) => e,
            Err(e) => return ParsedFrame::Malformed(format!("ticker frame: {}", e)),
        };
        debug_assert_eq!(event.event, "24hrTicker");
        let price = match event.last_price.parse::<f64>() {
            Ok(p) => p,
            Err(e) => return ParsedFrame::Malformed(format!("last price: {}", e)),
        };
        return ParsedFrame::Tick(RawTick {
            wire_symbol: event.symbol,
            price,
            volume: event.volume.and_then(|v| v.parse().ok()),
            high: event.high.and_then(|v| v.parse().ok()),
            low: event.low.and_then(|v| v.parse().ok()),
        });
    }
    if serde_json::from_str::<RequestAck>(text).is_ok() {
        return ParsedFrame::Ack;
    }
    ParsedFrame::Ignore
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    #[allow(dead_code)]
    symbol: String,
    status: String,
    #[serde(rename = "baseAsset")]
    base_asset: String,
    #[serde(rename = "quoteAsset")]
    quote_asset: String,
}

pub(super) async fn fetch_catalog(
    client: &reqwest::Client,
    rest_url: &str,
) -> AdapterResult<Vec<CatalogEntry>> {
    let url = format!("{}/api/v3/exchangeInfo", rest_url);
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
    let info: ExchangeInfo = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;

    Ok(info
        .symbols
        .into_iter()
        .map(|s| CatalogEntry {
            instrument: Instrument::new(&s.base_asset, &s.quote_asset),
            base: s.base_asset,
            quote: s.quote_asset,
            tradable: s.status == "TRADING",
            tick_size: None,
            min_size: None,
        })
        .collect())
}
