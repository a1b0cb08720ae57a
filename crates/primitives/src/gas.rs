//! Fee quotes returned by the bundler gas price oracle

use crate::utils::parse_hex_u256;
use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// EIP-1559 fee parameters for a user operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPrice {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Fee tier as reported by `gas_getUserOperationGasPrice` (hex strings, not decoded yet)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceTier {
    pub max_fee_per_gas: String,
    pub max_priority_fee_per_gas: String,
}

impl GasPriceTier {
    /// Decodes both `0x`-prefixed quantities
    pub fn decode(&self) -> Result<GasPrice, String> {
        Ok(GasPrice {
            max_fee_per_gas: parse_hex_u256(&self.max_fee_per_gas)?,
            max_priority_fee_per_gas: parse_hex_u256(&self.max_priority_fee_per_gas)?,
        })
    }
}

/// Response of `gas_getUserOperationGasPrice`
///
/// Only the `standard` tier is required, the other tiers are kept when the bundler reports them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasPriceResponse {
    pub standard: GasPriceTier,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow: Option<GasPriceTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast: Option<GasPriceTier>,
}
