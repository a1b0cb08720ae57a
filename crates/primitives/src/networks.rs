//! Per-chain endpoints published by shBundler

use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Fallback endpoints for a chain
///
/// Every field is optional: an entry may omit any of them and the missing ones stay missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundler_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_address: Option<Address>,
}
