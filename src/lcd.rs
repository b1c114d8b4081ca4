//! LCD client-state queries
//!
//! Chain nodes expose the light client behind a channel over their LCD REST
//! API. The per-chain API path is a template in which `CHANNEL` and `PORT` are
//! substituted with the channel and port being queried, e.g.
//! `/ibc/core/channel/v1/channels/CHANNEL/ports/PORT/client_state`.
//!
//! The client never retries. Callers decide what to do with
//! [`LcdError::TransientNetworkFault`].

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::LcdError;

/// Placeholder for the channel id in an API path template
pub const CHANNEL_PLACEHOLDER: &str = "CHANNEL";

/// Placeholder for the port id in an API path template
pub const PORT_PLACEHOLDER: &str = "PORT";

const CONNECTION_ERROR_MARKERS: [&str; 3] = [
    "connection refused",
    "i/o timeout",
    "unsupported protocol scheme",
];

/// Whether an error message describes a connection-level fault worth retrying
pub fn is_connection_error(message: &str) -> bool {
    let message = message.to_lowercase();
    CONNECTION_ERROR_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Full client-state URL for `port/channel` on an LCD
pub fn client_state_url(lcd_url: &str, api_path: &str, port: &str, channel: &str) -> String {
    let api_path = api_path
        .replace(CHANNEL_PLACEHOLDER, channel)
        .replace(PORT_PLACEHOLDER, port);
    format!("{}{}", lcd_url.trim_end_matches('/'), api_path)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStateResponse {
    #[serde(default)]
    pub identified_client_state: IdentifiedClientState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifiedClientState {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_state: ClientState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(rename = "@type", default)]
    pub type_url: String,
    /// Chain tracked by the light client, i.e. the counterparty chain
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub latest_height: Height,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Height {
    #[serde(default)]
    pub revision_number: String,
    #[serde(default)]
    pub revision_height: String,
}

impl ClientStateResponse {
    /// Chain id of the counterparty, empty when the node did not report one
    pub fn counterparty_chain_id(&self) -> &str {
        &self.identified_client_state.client_state.chain_id
    }
}

/// LCD client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcdConfig {
    pub timeout_secs: u64,
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl LcdConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// LCD REST client
pub struct LcdClient {
    client: Client,
}

impl LcdClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self { client }
    }

    pub fn from_config(config: &LcdConfig) -> Self {
        Self::new(config.timeout())
    }

    /// GET the client state behind `port/channel`
    pub async fn query_client_state(
        &self,
        lcd_url: &str,
        api_path: &str,
        port: &str,
        channel: &str,
    ) -> Result<ClientStateResponse, LcdError> {
        let url = client_state_url(lcd_url, api_path, port, channel);
        tracing::debug!(%url, "Querying client state");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LcdError::from_request(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LcdError::from_request(&e))?;

        if !status.is_success() {
            return Err(LcdError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_client_state(&body)
    }
}

impl Default for LcdClient {
    fn default() -> Self {
        Self::from_config(&LcdConfig::default())
    }
}

fn parse_client_state(body: &str) -> Result<ClientStateResponse, LcdError> {
    serde_json::from_str(body).map_err(|e| LcdError::Decode(e.to_string()))
}
