//! Bybit wire types
//!
//! v5 spot ticker topic payloads and the `instruments-info` catalog.
//!
//! Ticker frame:
//!   { "topic":"tickers.BTCUSDT", "type":"snapshot", "ts":...,
//!     "data": { "symbol":"BTCUSDT", "lastPrice":"50000.00",
//!               "highPrice24h":"...", "lowPrice24h":"...", "volume24h":"..." } }

use serde::Deserialize;

use crate::adapters::errors::{AdapterError, AdapterResult};
use crate::adapters::shared::stream::{ParsedFrame, RawTick};
use crate::adapters::types::CatalogEntry;
use crate::core::types::Instrument;

// =============================================================================
// Stream Frames
// =============================================================================

#[derive(Debug, Deserialize)]
struct TopicFrame {
    topic: String,
    data: TickerData,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    symbol: String,
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "highPrice24h")]
    high: Option<String>,
    #[serde(rename = "lowPrice24h")]
    low: Option<String>,
    #[serde(rename = "volume24h")]
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpFrame {
    op: Option<String>,
    ret_msg: Option<String>,
    success: Option<bool>,
}

pub(super) fn parse_frame(text: &str) -> ParsedFrame {
    if text.contains("\"topic\":\"tickers.") {
        let frame: TopicFrame = match serde_json::from_str(text) {
            Ok(f) => f,
            Err(e) => return ParsedFrame::Malformed(format!("ticker frame: {}", e)),
        };
        debug_assert!(frame.topic.starts_with("tickers."));
        let price = match frame.data.last_price.parse::<f64>() {
            Ok(p) => p,
            Err(e) => return ParsedFrame::Malformed(format!("lastPrice: {}", e)),
        };
        return ParsedFrame::Tick(RawTick {
            wire_symbol: frame.data.symbol,
            price,
            volume: frame.data.volume.and_then(|v| v.parse().ok()),
            high: frame.data.high.and_then(|v| v.parse().ok()),
            low: frame.data.low.and_then(|v| v.parse().ok()),
        });
    }
    if let Ok(op) = serde_json::from_str::<OpFrame>(text) {
        let is_pong = op.op.as_deref() == Some("pong") || op.ret_msg.as_deref() == Some("pong");
        if is_pong {
            return ParsedFrame::Pong;
        }
        if op.success.is_some() {
            return ParsedFrame::Ack;
        }
    }
    ParsedFrame::Ignore
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
struct InstrumentsResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    result: InstrumentsResult,
}

#[derive(Debug, Deserialize)]
struct InstrumentsResult {
    list: Vec<InstrumentInfo>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    #[allow(dead_code)]
    symbol: String,
    #[serde(rename = "baseCoin")]
    base_coin: String,
    #[serde(rename = "quoteCoin")]
    quote_coin: String,
    status: String,
    #[serde(rename = "priceFilter")]
    price_filter: Option<PriceFilter>,
    #[serde(rename = "lotSizeFilter")]
    lot_size_filter: Option<LotSizeFilter>,
}

#[derive(Debug, Deserialize)]
struct PriceFilter {
    #[serde(rename = "tickSize")]
    tick_size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LotSizeFilter {
    #[serde(rename = "minOrderQty")]
    min_order_qty: Option<String>,
}

pub(super) async fn fetch_catalog(
    client: &reqwest::Client,
    rest_url: &str,
) -> AdapterResult<Vec<CatalogEntry>> {
    let url = format!("{}/v5/market/instruments-info?category=spot", rest_url);
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
    let body: InstrumentsResponse = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;
    if body.ret_code != 0 {
        return Err(AdapterError::CatalogUnavailable(format!(
            "retCode {}",
            body.ret_code
        )));
    }

    Ok(body
        .result
        .list
        .into_iter()
        .map(|s| CatalogEntry {
            instrument: Instrument::new(&s.base_coin, &s.quote_coin),
            base: s.base_coin,
            quote: s.quote_coin,
            tradable: s.status == "Trading",
            tick_size: s
                .price_filter
                .and_then(|f| f.tick_size)
                .and_then(|v| v.parse().ok()),
            min_size: s
                .lot_size_filter
                .and_then(|f| f.min_order_qty)
                .and_then(|v| v.parse().ok()),
        })
        .collect())
}
