//! User operation (ERC-4337) in the unpacked form used by entry point v0.7 and v0.8 RPC APIs

mod hash;

use crate::{
    constants::entry_point::{EIP712_NAME, EIP712_VERSION, PACKED_USER_OPERATION_TYPE},
    entry_point::{EntryPoint, EntryPointVersion},
    utils::{as_checksum_addr, pack_factory_data, pack_paymaster_data, pack_uint128},
};
use ethers::{
    abi::AbiEncode,
    contract::{EthAbiCodec, EthAbiType},
    types::{
        transaction::eip712::{EIP712Domain, Eip712, Eip712Error},
        Address, Bytes, Log, TransactionReceipt, H256, U256,
    },
    utils::keccak256,
};
pub use hash::UserOperationHash;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// User operation
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    /// Sender of the user operation
    #[serde(serialize_with = "as_checksum_addr")]
    pub sender: Address,

    /// Nonce (anti replay protection)
    pub nonce: U256,

    /// Factory deploying the account (only while the account is not deployed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory: Option<Address>,

    /// Data passed to the factory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_data: Option<Bytes>,

    /// The data that is passed to the sender during the main execution call
    pub call_data: Bytes,

    /// The amount of gas to allocate for the main execution call
    pub call_gas_limit: U256,

    /// The amount of gas to allocate for the verification step
    pub verification_gas_limit: U256,

    /// The amount of gas to pay bundler to compensate for the pre-verification execution and
    /// calldata
    pub pre_verification_gas: U256,

    /// Maximum fee per gas (similar to EIP-1559)
    pub max_fee_per_gas: U256,

    /// Maximum priority fee per gas (similar to EIP-1559)
    pub max_priority_fee_per_gas: U256,

    /// Paymaster sponsoring the user operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_data: Option<Bytes>,

    /// Data passed to the account along with the nonce during the verification step
    pub signature: Bytes,
}

/// Packed user operation without signature (helper for hashing)
#[derive(EthAbiCodec, EthAbiType)]
struct UserOperationNoSignature {
    pub sender: Address,
    pub nonce: U256,
    pub init_code: H256,
    pub call_data: H256,
    pub account_gas_limits: H256,
    pub pre_verification_gas: U256,
    pub gas_fees: H256,
    pub paymaster_and_data: H256,
}

impl From<&UserOperation> for UserOperationNoSignature {
    fn from(value: &UserOperation) -> Self {
        Self {
            sender: value.sender,
            nonce: value.nonce,
            init_code: keccak256(value.init_code().deref()).into(),
            call_data: keccak256(value.call_data.deref()).into(),
            account_gas_limits: value.account_gas_limits().into(),
            pre_verification_gas: value.pre_verification_gas,
            gas_fees: value.gas_fees().into(),
            paymaster_and_data: keccak256(value.paymaster_and_data().deref()).into(),
        }
    }
}

impl UserOperation {
    /// Init code as seen by the entry point (`factory ++ factoryData`, empty without factory)
    pub fn init_code(&self) -> Bytes {
        match self.factory {
            Some(factory) => {
                pack_factory_data(factory, &self.factory_data.clone().unwrap_or_default()).into()
            }
            None => Bytes::default(),
        }
    }

    /// Paymaster and data as seen by the entry point (empty without paymaster)
    pub fn paymaster_and_data(&self) -> Bytes {
        match self.paymaster {
            Some(paymaster) => pack_paymaster_data(
                paymaster,
                self.paymaster_verification_gas_limit.unwrap_or_default(),
                self.paymaster_post_op_gas_limit.unwrap_or_default(),
                &self.paymaster_data.clone().unwrap_or_default(),
            )
            .into(),
            None => Bytes::default(),
        }
    }

    /// `verificationGasLimit ++ callGasLimit` as two uint128
    pub fn account_gas_limits(&self) -> [u8; 32] {
        pack_uint128(self.verification_gas_limit, self.call_gas_limit)
    }

    /// `maxPriorityFeePerGas ++ maxFeePerGas` as two uint128
    pub fn gas_fees(&self) -> [u8; 32] {
        pack_uint128(self.max_priority_fee_per_gas, self.max_fee_per_gas)
    }

    /// Packs the user operation without signature to bytes (used for calculating the hash)
    pub fn pack_without_signature(&self) -> Bytes {
        UserOperationNoSignature::from(self).encode().into()
    }

    /// Calculates the hash of the user operation
    ///
    /// Entry point v0.7 hashes the packed operation together with the entry point and chain id,
    /// v0.8 uses the EIP-712 digest of the packed operation.
    pub fn hash(&self, entry_point: &EntryPoint, chain_id: u64) -> UserOperationHash {
        match entry_point.version {
            EntryPointVersion::V07 => H256::from(keccak256(
                [
                    keccak256(self.pack_without_signature().deref()).to_vec(),
                    entry_point.address.encode(),
                    U256::from(chain_id).encode(),
                ]
                .concat(),
            ))
            .into(),
            EntryPointVersion::V08 => {
                UserOperationTypedData::new(self.clone(), entry_point.address, chain_id)
                    .digest()
                    .into()
            }
        }
    }

    // Builder pattern helpers

    /// Sets the sender of the user operation
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = sender;
        self
    }

    /// Sets the nonce of the user operation
    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets (or clears) the factory and factory data of the user operation
    pub fn factory(mut self, factory: Option<(Address, Bytes)>) -> Self {
        match factory {
            Some((factory, data)) => {
                self.factory = Some(factory);
                self.factory_data = Some(data);
            }
            None => {
                self.factory = None;
                self.factory_data = None;
            }
        }
        self
    }

    /// Sets the call data of the user operation
    pub fn call_data(mut self, call_data: Bytes) -> Self {
        self.call_data = call_data;
        self
    }

    /// Sets the call gas limit of the user operation
    pub fn call_gas_limit(mut self, call_gas_limit: U256) -> Self {
        self.call_gas_limit = call_gas_limit;
        self
    }

    /// Sets the verification gas limit of the user operation
    pub fn verification_gas_limit(mut self, verification_gas_limit: U256) -> Self {
        self.verification_gas_limit = verification_gas_limit;
        self
    }

    /// Sets the pre-verification gas of the user operation
    pub fn pre_verification_gas(mut self, pre_verification_gas: U256) -> Self {
        self.pre_verification_gas = pre_verification_gas;
        self
    }

    /// Sets the max fee per gas of the user operation
    pub fn max_fee_per_gas(mut self, max_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = max_fee_per_gas;
        self
    }

    /// Sets the max priority fee per gas of the user operation
    pub fn max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: U256) -> Self {
        self.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    /// Sets the paymaster of the user operation
    pub fn paymaster(mut self, paymaster: Option<Address>) -> Self {
        self.paymaster = paymaster;
        self
    }

    /// Sets the paymaster data of the user operation
    pub fn paymaster_data(mut self, paymaster_data: Option<Bytes>) -> Self {
        self.paymaster_data = paymaster_data;
        self
    }

    /// Sets the signature of the user operation
    pub fn signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }
}

/// EIP-712 view of a user operation, signed by v0.8 accounts
#[derive(Clone, Debug)]
pub struct UserOperationTypedData {
    pub user_operation: UserOperation,
    pub entry_point: Address,
    pub chain_id: u64,
}

impl UserOperationTypedData {
    pub fn new(user_operation: UserOperation, entry_point: Address, chain_id: u64) -> Self {
        Self { user_operation, entry_point, chain_id }
    }

    fn domain_data(&self) -> EIP712Domain {
        EIP712Domain {
            name: Some(EIP712_NAME.into()),
            version: Some(EIP712_VERSION.into()),
            chain_id: Some(self.chain_id.into()),
            verifying_contract: Some(self.entry_point),
            salt: None,
        }
    }

    fn struct_hash_of(&self) -> [u8; 32] {
        keccak256(
            [
                keccak256(PACKED_USER_OPERATION_TYPE).to_vec(),
                self.user_operation.pack_without_signature().to_vec(),
            ]
            .concat(),
        )
    }

    /// `keccak256(0x1901 ++ domainSeparator ++ structHash)`
    pub fn digest(&self) -> [u8; 32] {
        keccak256(
            [
                vec![0x19, 0x01],
                self.domain_data().separator().to_vec(),
                self.struct_hash_of().to_vec(),
            ]
            .concat(),
        )
    }
}

impl Eip712 for UserOperationTypedData {
    type Error = Eip712Error;

    fn domain(&self) -> Result<EIP712Domain, Self::Error> {
        Ok(self.domain_data())
    }

    fn type_hash() -> Result<[u8; 32], Self::Error> {
        Ok(keccak256(PACKED_USER_OPERATION_TYPE))
    }

    fn struct_hash(&self) -> Result<[u8; 32], Self::Error> {
        Ok(self.struct_hash_of())
    }
}

/// Receipt of the user operation (returned from the RPC endpoint eth_getUserOperationReceipt)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationReceipt {
    #[serde(rename = "userOpHash")]
    pub user_operation_hash: UserOperationHash,
    #[serde(serialize_with = "as_checksum_addr")]
    pub sender: Address,
    pub nonce: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster: Option<Address>,
    pub actual_gas_cost: U256,
    pub actual_gas_used: U256,
    pub success: bool,
    #[serde(default)]
    pub reason: String,
    pub logs: Vec<Log>,
    #[serde(rename = "receipt")]
    pub tx_receipt: TransactionReceipt,
}

/// Gas estimations for user operation (returned from the RPC endpoint eth_estimateUserOperationGas)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperationGasEstimation {
    pub pre_verification_gas: U256,
    pub verification_gas_limit: U256,
    pub call_gas_limit: U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_verification_gas_limit: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paymaster_post_op_gas_limit: Option<U256>,
}
