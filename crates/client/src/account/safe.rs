use super::{account_nonce, counterfactual_address, factory_args, SmartAccount, SmartAccountKind};
use crate::error::ShBundlerError;
use async_trait::async_trait;
use ethers::{
    abi::{encode, AbiEncode, Token},
    providers::Middleware,
    signers::Signer,
    types::{
        transaction::eip712::{EIP712Domain, Eip712, Eip712Error},
        Address, Bytes, U256,
    },
    utils::keccak256,
};
use lazy_static::lazy_static;
use shbundler_contracts::gen::{
    CreateProxyWithNonceCall, EnableModulesCall, ExecuteUserOpCall, MultiSendCall, SetupCall,
};
use shbundler_primitives::{
    constants::safe::{
        monad_testnet, DUMMY_SIGNATURE, SAFE_OP_TYPE, SALT_NONCE, THRESHOLD,
    },
    Call, EntryPoint, UserOperation,
};
use std::{fmt, sync::Arc};

lazy_static! {
    static ref MONAD_TESTNET_SAFE_ADDRESSES: SafeAddresses = SafeAddresses {
        safe_4337_module: monad_testnet::SAFE_4337_MODULE
            .parse()
            .expect("Safe 4337 module address is valid"),
        safe_proxy_factory: monad_testnet::SAFE_PROXY_FACTORY
            .parse()
            .expect("Safe proxy factory address is valid"),
        safe_singleton: monad_testnet::SAFE_SINGLETON
            .parse()
            .expect("Safe singleton address is valid"),
        safe_module_setup: monad_testnet::SAFE_MODULE_SETUP
            .parse()
            .expect("Safe module setup address is valid"),
        multi_send: monad_testnet::MULTI_SEND.parse().expect("MultiSend address is valid"),
        multi_send_call_only: monad_testnet::MULTI_SEND_CALL_ONLY
            .parse()
            .expect("MultiSendCallOnly address is valid"),
    };
    static ref SAFE_DUMMY_SIGNATURE: Bytes =
        DUMMY_SIGNATURE.parse().expect("Dummy signature is valid hex");
}

/// Safe operation types
const OPERATION_CALL: u8 = 0;
const OPERATION_DELEGATE_CALL: u8 = 1;

/// Length of `validAfter ++ validUntil` (two uint48) prefixing Safe signatures
const VALIDITY_LENGTH: usize = 12;

/// Contracts a Safe account is deployed and operated with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeAddresses {
    pub safe_4337_module: Address,
    pub safe_proxy_factory: Address,
    pub safe_singleton: Address,
    pub safe_module_setup: Address,
    pub multi_send: Address,
    pub multi_send_call_only: Address,
}

impl SafeAddresses {
    /// Safe 1.4.1 deployment on Monad testnet
    pub fn monad_testnet() -> Self {
        *MONAD_TESTNET_SAFE_ADDRESSES
    }
}

/// Packs transactions for `multiSend(bytes)`
///
/// Each transaction is `operation (uint8) ++ to (address) ++ value (uint256) ++ data length
/// (uint256) ++ data`.
pub fn encode_multi_send(transactions: &[(u8, Call)]) -> Bytes {
    let packed: Vec<u8> = transactions
        .iter()
        .flat_map(|(operation, call)| {
            [
                vec![*operation],
                call.to.as_bytes().to_vec(),
                call.value.encode(),
                U256::from(call.data.len()).encode(),
                call.data.to_vec(),
            ]
            .concat()
        })
        .collect();
    MultiSendCall { transactions: packed.into() }.encode().into()
}

/// `SafeOp` typed data signed by the owners (verified by the Safe 4337 module)
#[derive(Clone, Debug)]
pub struct SafeOperation {
    pub safe: Address,
    pub user_operation: UserOperation,
    pub entry_point: Address,
    pub valid_after: u64,
    pub valid_until: u64,
    pub chain_id: u64,
    pub module: Address,
}

impl Eip712 for SafeOperation {
    type Error = Eip712Error;

    fn domain(&self) -> Result<EIP712Domain, Self::Error> {
        Ok(EIP712Domain {
            name: None,
            version: None,
            chain_id: Some(self.chain_id.into()),
            verifying_contract: Some(self.module),
            salt: None,
        })
    }

    fn type_hash() -> Result<[u8; 32], Self::Error> {
        Ok(keccak256(SAFE_OP_TYPE))
    }

    fn struct_hash(&self) -> Result<[u8; 32], Self::Error> {
        let uo = &self.user_operation;
        let encoded = encode(&[
            Token::FixedBytes(Self::type_hash()?.to_vec()),
            Token::Address(self.safe),
            Token::Uint(uo.nonce),
            Token::FixedBytes(keccak256(uo.init_code()).to_vec()),
            Token::FixedBytes(keccak256(&uo.call_data).to_vec()),
            Token::Uint(uo.verification_gas_limit),
            Token::Uint(uo.call_gas_limit),
            Token::Uint(uo.pre_verification_gas),
            Token::Uint(uo.max_priority_fee_per_gas),
            Token::Uint(uo.max_fee_per_gas),
            Token::FixedBytes(keccak256(uo.paymaster_and_data()).to_vec()),
            Token::Uint(self.valid_after.into()),
            Token::Uint(self.valid_until.into()),
            Token::Address(self.entry_point),
        ]);
        Ok(keccak256(encoded))
    }
}

/// Safe (with the 4337 module) owned by a single signer
pub struct SafeAccount<M: Middleware + 'static, S: Signer> {
    eth_client: Arc<M>,
    signer: S,
    entry_point: EntryPoint,
    addresses: SafeAddresses,
    factory_data: Bytes,
    address: Address,
}

impl<M: Middleware + 'static, S: Signer> fmt::Debug for SafeAccount<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeAccount")
            .field("address", &self.address)
            .field("owner", &self.signer.address())
            .field("entry_point", &self.entry_point)
            .field("addresses", &self.addresses)
            .finish()
    }
}

impl<M: Middleware + 'static, S: Signer> SafeAccount<M, S> {
    /// Safe of the signer, address derived through the entry point
    pub async fn new(
        eth_client: Arc<M>,
        signer: S,
        entry_point: EntryPoint,
        addresses: SafeAddresses,
    ) -> Result<Self, ShBundlerError> {
        let factory_data = Self::factory_data(&addresses, signer.address());
        let address = counterfactual_address(
            eth_client.clone(),
            entry_point.address,
            addresses.safe_proxy_factory,
            &factory_data,
        )
        .await?;
        Ok(Self { eth_client, signer, entry_point, addresses, factory_data, address })
    }

    /// `setup` call enabling the 4337 module (through SafeModuleSetup) and installing it as
    /// fallback handler
    pub fn initializer(addresses: &SafeAddresses, owner: Address) -> Bytes {
        let enable_modules = Call::new(
            addresses.safe_module_setup,
            EnableModulesCall { modules: vec![addresses.safe_4337_module] }.encode().into(),
        );
        SetupCall {
            owners: vec![owner],
            threshold: THRESHOLD.into(),
            to: addresses.multi_send,
            data: encode_multi_send(&[(OPERATION_DELEGATE_CALL, enable_modules)]),
            fallback_handler: addresses.safe_4337_module,
            payment_token: Address::zero(),
            payment: U256::zero(),
            payment_receiver: Address::zero(),
        }
        .encode()
        .into()
    }

    /// `createProxyWithNonce(singleton, initializer, 0)`
    pub fn factory_data(addresses: &SafeAddresses, owner: Address) -> Bytes {
        CreateProxyWithNonceCall {
            singleton: addresses.safe_singleton,
            initializer: Self::initializer(addresses, owner),
            salt_nonce: SALT_NONCE.into(),
        }
        .encode()
        .into()
    }

    /// `executeUserOp` of the 4337 module, batches go through MultiSendCallOnly
    pub fn encode_calls_with(
        addresses: &SafeAddresses,
        calls: &[Call],
    ) -> Result<Bytes, ShBundlerError> {
        let call = match calls {
            [] => return Err(ShBundlerError::EmptyCalls),
            [call] => ExecuteUserOpCall {
                to: call.to,
                value: call.value,
                data: call.data.clone(),
                operation: OPERATION_CALL,
            },
            _ => {
                let transactions: Vec<(u8, Call)> =
                    calls.iter().map(|c| (OPERATION_CALL, c.clone())).collect();
                ExecuteUserOpCall {
                    to: addresses.multi_send_call_only,
                    value: U256::zero(),
                    data: encode_multi_send(&transactions),
                    operation: OPERATION_DELEGATE_CALL,
                }
            }
        };
        Ok(call.encode().into())
    }

    fn safe_operation(&self, uo: &UserOperation, chain_id: u64) -> SafeOperation {
        SafeOperation {
            safe: self.address,
            user_operation: uo.clone(),
            entry_point: self.entry_point.address,
            valid_after: 0,
            valid_until: 0,
            chain_id,
            module: self.addresses.safe_4337_module,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static, S: Signer + 'static> SmartAccount for SafeAccount<M, S> {
    fn kind(&self) -> SmartAccountKind {
        SmartAccountKind::Safe
    }

    fn address(&self) -> Address {
        self.address
    }

    fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    fn owner(&self) -> Address {
        self.signer.address()
    }

    async fn get_nonce(&self) -> Result<U256, ShBundlerError> {
        account_nonce(self.eth_client.clone(), self.entry_point.address, self.address).await
    }

    async fn get_factory_args(&self) -> Result<Option<(Address, Bytes)>, ShBundlerError> {
        factory_args(
            self.eth_client.as_ref(),
            self.address,
            self.addresses.safe_proxy_factory,
            &self.factory_data,
        )
        .await
    }

    fn encode_calls(&self, calls: &[Call]) -> Result<Bytes, ShBundlerError> {
        Self::encode_calls_with(&self.addresses, calls)
    }

    fn stub_signature(&self) -> Bytes {
        [vec![0u8; VALIDITY_LENGTH], SAFE_DUMMY_SIGNATURE.to_vec()].concat().into()
    }

    /// `validAfter (uint48) ++ validUntil (uint48) ++ owner signature`, no validity window
    async fn sign_user_operation(
        &self,
        uo: &UserOperation,
        chain_id: u64,
    ) -> Result<Bytes, ShBundlerError> {
        let operation = self.safe_operation(uo, chain_id);
        let signature =
            self.signer.sign_typed_data(&operation).await.map_err(ShBundlerError::signer)?;
        Ok([vec![0u8; VALIDITY_LENGTH], signature.to_vec()].concat().into())
    }
}
