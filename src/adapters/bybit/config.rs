//! Bybit endpoint configuration

/// v5 public spot streaming endpoint
const MAINNET_WS_URL: &str = "wss://stream.bybit.com/v5/public/spot";

/// v5 REST base for the catalog fetch
const MAINNET_REST_URL: &str = "https://api.bybit.com";

/// Configuration for the Bybit connection (public market data)
#[derive(Debug, Clone)]
pub struct BybitConfig {
    ws_url: String,
    rest_url: String,
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self {
            ws_url: MAINNET_WS_URL.to_string(),
            rest_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl BybitConfig {
    pub fn from_env() -> Self {
        Self {
            ws_url: std::env::var("BYBIT_WS_URL").unwrap_or_else(|_| MAINNET_WS_URL.to_string()),
            rest_url: std::env::var("BYBIT_REST_URL")
                .unwrap_or_else(|_| MAINNET_REST_URL.to_string()),
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }
}
