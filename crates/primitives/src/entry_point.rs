//! Entry point versions and addresses

use crate::constants::entry_point::{ADDRESS_V07, ADDRESS_V08};
use ethers::types::Address;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, EnumVariantNames};

lazy_static! {
    static ref ENTRY_POINT_V07: Address =
        ADDRESS_V07.parse().expect("Entry point v0.7 address is valid");
    static ref ENTRY_POINT_V08: Address =
        ADDRESS_V08.parse().expect("Entry point v0.8 address is valid");
}

/// Supported entry point versions
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumVariantNames,
    Serialize,
    Deserialize,
)]
pub enum EntryPointVersion {
    #[strum(serialize = "0.7")]
    #[serde(rename = "0.7")]
    V07,
    #[default]
    #[strum(serialize = "0.8")]
    #[serde(rename = "0.8")]
    V08,
}

impl EntryPointVersion {
    /// Canonical deployment address of the entry point with this version
    pub fn address(&self) -> Address {
        match self {
            EntryPointVersion::V07 => *ENTRY_POINT_V07,
            EntryPointVersion::V08 => *ENTRY_POINT_V08,
        }
    }
}

/// Entry point a smart account is bound to
///
/// The address and the version normally match, but a deployment may pin an account to the
/// protocol of an older version while talking to a newer entry point address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub address: Address,
    pub version: EntryPointVersion,
}

impl EntryPoint {
    pub fn new(address: Address, version: EntryPointVersion) -> Self {
        Self { address, version }
    }
}

impl From<EntryPointVersion> for EntryPoint {
    fn from(version: EntryPointVersion) -> Self {
        Self { address: version.address(), version }
    }
}
