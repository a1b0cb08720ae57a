//! Calls executed by a smart account

use ethers::types::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Single call executed by the smart account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
}

impl Call {
    /// Call without value transfer
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { to, value: U256::zero(), data }
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}
