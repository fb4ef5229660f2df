//! OKX endpoint configuration

/// v5 public streaming endpoint
const MAINNET_WS_URL: &str = "wss://ws.okx.com:8443/ws/v5/public";

/// REST base for the catalog fetch
const MAINNET_REST_URL: &str = "https://www.okx.com";

/// Configuration for the OKX connection (public market data)
#[derive(Debug, Clone)]
pub struct OkxConfig {
    ws_url: String,
    rest_url: String,
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            ws_url: MAINNET_WS_URL.to_string(),
            rest_url: MAINNET_REST_URL.to_string(),
        }
    }
}

impl OkxConfig {
    pub fn from_env() -> Self {
        Self {
            ws_url: std::env::var("OKX_WS_URL").unwrap_or_else(|_| MAINNET_WS_URL.to_string()),
            rest_url: std::env::var("OKX_REST_URL")
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
