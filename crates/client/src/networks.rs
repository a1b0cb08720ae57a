//! Per-chain endpoint defaults published by shBundler

use crate::error::ShBundlerError;
use async_trait::async_trait;
use ethers::types::Address;
use serde_json::Value;
use shbundler_primitives::{constants::networks::DEFAULTS_URL, NetworkDefaults};
use std::{collections::HashMap, str::FromStr};
use tracing::{debug, trace};

/// Source of per-chain endpoint defaults
#[async_trait]
pub trait NetworkDefaultsSource: Send + Sync {
    /// Defaults for the chain, `None` when the chain is not listed
    async fn fetch_network_defaults(
        &self,
        chain_id: u64,
    ) -> Result<Option<NetworkDefaults>, ShBundlerError>;
}

/// Defaults fetched from the hosted `networks.json` document (keyed by decimal chain id)
///
/// The document is fetched on every lookup.
#[derive(Clone, Debug)]
pub struct RemoteNetworkDefaults {
    url: String,
    client: reqwest::Client,
}

impl RemoteNetworkDefaults {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), client: reqwest::Client::new() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for RemoteNetworkDefaults {
    fn default() -> Self {
        Self::new(DEFAULTS_URL)
    }
}

/// Looks the chain up in the defaults document
///
/// Entries are not validated beyond the key lookup. Each field is read on its own, a field with an
/// unexpected shape reads as missing without affecting the others.
pub fn lookup_network_defaults(
    document: &HashMap<String, Value>,
    chain_id: u64,
) -> Option<NetworkDefaults> {
    document.get(&chain_id.to_string()).map(|entry| {
        let field = |name: &str| entry.get(name).and_then(Value::as_str);
        NetworkDefaults {
            bundler_url: field("bundlerUrl").map(String::from),
            paymaster_url: field("paymasterUrl").map(String::from),
            paymaster_address: field("paymasterAddress")
                .and_then(|address| Address::from_str(address).ok()),
        }
    })
}

#[async_trait]
impl NetworkDefaultsSource for RemoteNetworkDefaults {
    async fn fetch_network_defaults(
        &self,
        chain_id: u64,
    ) -> Result<Option<NetworkDefaults>, ShBundlerError> {
        trace!("Fetching network defaults from {}", self.url);

        let document = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<HashMap<String, Value>>()
            .await?;

        let defaults = lookup_network_defaults(&document, chain_id);
        debug!("Network defaults for chain {chain_id}: {defaults:?}");
        Ok(defaults)
    }
}
