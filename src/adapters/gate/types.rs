//! Gate.io wire types
//!
//! v4 spot tickers channel payloads and the currency-pairs catalog.
//!
//! Ticker frame:
//!   { "time":..., "channel":"spot.tickers", "event":"update",
//!     "result": { "currency_pair":"BTC_USDT", "last":"50000.0",
//!                 "high_24h":"...", "low_24h":"...", "base_volume":"..." } }

use serde::Deserialize;

use crate::adapters::errors::{AdapterError, AdapterResult};
use crate::adapters::shared::stream::{ParsedFrame, RawTick};
use crate::adapters::types::CatalogEntry;
use crate::core::types::Instrument;

// =============================================================================
// Stream Frames
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChannelFrame {
    channel: String,
    event: Option<String>,
    result: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TickerResult {
    currency_pair: String,
    last: String,
    #[serde(rename = "high_24h")]
    high: Option<String>,
    #[serde(rename = "low_24h")]
    low: Option<String>,
    #[serde(rename = "base_volume")]
    volume: Option<String>,
}

pub(super) fn parse_frame(text: &str) -> ParsedFrame {
    let frame: ChannelFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(_) => return ParsedFrame::Ignore,
    };
    match (frame.channel.as_str(), frame.event.as_deref()) {
        ("spot.tickers", Some("update")) => {
            let Some(result) = frame.result else {
                return ParsedFrame::Malformed("ticker update without result".into());
            };
            let ticker: TickerResult = match serde_json::from_value(result) {
                Ok(t) => t,
                Err(e) => return ParsedFrame::Malformed(format!("ticker result: {}", e)),
            };
            let price = match ticker.last.parse::<f64>() {
                Ok(p) => p,
                Err(e) => return ParsedFrame::Malformed(format!("last: {}", e)),
            };
            ParsedFrame::Tick(RawTick {
                wire_symbol: ticker.currency_pair,
                price,
                volume: ticker.volume.and_then(|v| v.parse().ok()),
                high: ticker.high.and_then(|v| v.parse().ok()),
                low: ticker.low.and_then(|v| v.parse().ok()),
            })
        }
        ("spot.tickers", Some("subscribe")) | ("spot.tickers", Some("unsubscribe")) => {
            ParsedFrame::Ack
        }
        ("spot.pong", _) => ParsedFrame::Pong,
        _ => ParsedFrame::Ignore,
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
struct CurrencyPair {
    #[allow(dead_code)]
    id: String,
    base: String,
    quote: String,
    trade_status: String,
    min_base_amount: Option<String>,
}

pub(super) async fn fetch_catalog(
    client: &reqwest::Client,
    rest_url: &str,
) -> AdapterResult<Vec<CatalogEntry>> {
    let url = format!("{}/api/v4/spot/currency_pairs", rest_url);
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
    let pairs: Vec<CurrencyPair> = response
        .json()
        .await
        .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;

    Ok(pairs
        .into_iter()
        .map(|p| CatalogEntry {
            instrument: Instrument::new(&p.base, &p.quote),
            base: p.base,
            quote: p.quote,
            tradable: p.trade_status == "tradable",
            tick_size: None,
            min_size: p.min_base_amount.and_then(|v| v.parse().ok()),
        })
        .collect())
}
