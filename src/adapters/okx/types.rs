//! OKX wire types
//!
//! v5 tickers channel payloads and the SPOT instruments catalog.
//!
//! Ticker frame:
//!   { "arg": {"channel":"tickers","instId":"BTC-USDT"},
//!     "data": [ { "instId":"BTC-USDT", "last":"50000.1",
//!                 "high24h":"...", "low24h":"...", "vol24h":"..." } ] }

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
    arg: ChannelArg,
    data: Vec<TickerData>,
}

#[derive(Debug, Deserialize)]
struct ChannelArg {
    channel: String,
    #[serde(rename = "instId")]
    #[allow(dead_code)]
    inst_id: String,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    #[serde(rename = "instId")]
    inst_id: String,
    last: String,
    #[serde(rename = "high24h")]
    high: Option<String>,
    #[serde(rename = "low24h")]
    low: Option<String>,
    #[serde(rename = "vol24h")]
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventFrame {
    event: String,
    #[allow(dead_code)]
    msg: Option<String>,
}

pub(super) fn parse_frame(text: &str) -> ParsedFrame {
    if text == "pong" {
        return ParsedFrame::Pong;
    }
    if text.contains("\"channel\":\"tickers\"") && text.contains("\"data\"") {
        let frame: ChannelFrame = match serde_json::from_str(text) {
            Ok(f) => f,
            Err(e) => return ParsedFrame::Malformed(format!("ticker frame: {}", e)),
        };
        debug_assert_eq!(frame.arg.channel, "tickers");
        let Some(ticker) = frame.data.into_iter().next() else {
            return ParsedFrame::Ignore;
        };
        let price = match ticker.last.parse::<f64>() {
            Ok(p) => p,
            Err(e) => return ParsedFrame::Malformed(format!("last: {}", e)),
        };
        return ParsedFrame::Tick(RawTick {
            wire_symbol: ticker.inst_id,
            price,
            volume: ticker.volume.and_then(|v| v.parse().ok()),
            high: ticker.high.and_then(|v| v.parse().ok()),
            low: ticker.low.and_then(|v| v.parse().ok()),
        });
    }
    if let Ok(event) = serde_json::from_str::<EventFrame>(text) {
        return match event.event.as_str() {
            "subscribe" | "unsubscribe" => ParsedFrame::Ack,
            "error" => ParsedFrame::Malformed(format!("venue error: {}", text)),
            _ => ParsedFrame::Ignore,
        };
    }
    ParsedFrame::Ignore
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)]
struct InstrumentsResponse {
    code: String,
    data: Vec<InstrumentInfo>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    #[serde(rename = "instId")]
    #[allow(dead_code)]
    inst_id: String,
    #[serde(rename = "baseCcy")]
    base_ccy: String,
    #[serde(rename = "quoteCcy")]
    quote_ccy: String,
    state: String,
    #[serde(rename = "tickSz")]
    tick_sz: Option<String>,
    #[serde(rename = "minSz")]
    min_sz: Option<String>,
}

pub(super) async fn fetch_catalog(
    client: &reqwest::Client,
    rest_url: &str,
) -> AdapterResult<Vec<CatalogEntry>> {
    let url = format!("{}/api/v5/public/instruments?instType=SPOT", rest_url);
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
    if body.code != "0" {
        return Err(AdapterError::CatalogUnavailable(format!(
            "code {}",
            body.code
        )));
    }

    Ok(body
        .data
        .into_iter()
        .map(|s| CatalogEntry {
            instrument: Instrument::new(&s.base_ccy, &s.quote_ccy),
            base: s.base_ccy,
            quote: s.quote_ccy,
            tradable: s.state == "live",
            tick_size: s.tick_sz.and_then(|v| v.parse().ok()),
            min_size: s.min_sz.and_then(|v| v.parse().ok()),
        })
        .collect())
}
