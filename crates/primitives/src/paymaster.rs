//! Paymaster sponsorship context and ERC-7677 paymaster responses

use crate::utils::as_checksum_addr;
use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, EnumVariantNames};

/// Who pays for the user operation
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumVariantNames,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymasterMode {
    /// The account pays through the paymaster
    #[default]
    User,
    /// A sponsor pays on behalf of the account
    Sponsor,
}

/// Sponsorship parameters forwarded verbatim to the paymaster for a single user operation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterContext {
    #[serde(serialize_with = "as_checksum_addr")]
    pub paymaster_address: Address,
    pub mode: PaymasterMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_signature: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_after: Option<U256>,
}

impl PaymasterContext {
    pub fn new(paymaster_address: Address, mode: PaymasterMode) -> Self {
        Self {
            paymaster_address,
            mode,
            sponsor: None,
            sponsor_signature: None,
            valid_until: None,
            valid_after: None,
        }
    }

    /// Sets the sponsor and its signature
    pub fn sponsor(mut self, sponsor: Address, sponsor_signature: Bytes) -> Self {
        self.sponsor = Some(sponsor);
        self.sponsor_signature = Some(sponsor_signature);
        self
    }

    /// Sets the validity window
    pub fn validity(mut self, valid_after: U256, valid_until: U256) -> Self {
        self.valid_after = Some(valid_after);
        self.valid_until = Some(valid_until);
        self
    }
}

/// Sponsor information shown to the user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymasterSponsor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Response of `pm_getPaymasterStubData`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterStubData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<PaymasterSponsor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,
    /// No `pm_getPaymasterData` call is needed when set
    #[serde(default)]
    pub is_final: bool,
}

/// Response of `pm_getPaymasterData`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymasterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,
}
