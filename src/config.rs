/// Endpoint configuration derived from a single server base URL.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// REST base, e.g. `http://127.0.0.1:8000`.
    pub api_url: String,
    /// WebSocket base with the scheme already switched, e.g. `ws://...`.
    pub ws_url: String,
}

impl ClientConfig {
    pub fn new(server_url: &str) -> Self {
        let api_url = server_url.trim_end_matches('/').to_string();
        let ws_url = if let Some(rest) = api_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = api_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            // Already a ws:// or wss:// URL, or schemeless; use as given.
            api_url.clone()
        };
        Self { api_url, ws_url }
    }

    pub fn ws_endpoint(&self, user_id: &str) -> String {
        format!("{}/ws/{}", self.ws_url, urlencoding::encode(user_id))
    }
}
