use super::{account_nonce, counterfactual_address, factory_args, SmartAccount, SmartAccountKind};
use crate::error::ShBundlerError;
use async_trait::async_trait;
use ethers::{
    abi::{encode, AbiEncode, Token},
    providers::Middleware,
    signers::Signer,
    types::{Address, Bytes, U256},
    utils::id,
};
use lazy_static::lazy_static;
use shbundler_contracts::gen::{CreateAccountCall, ExecuteBatchCall, ExecuteCall};
use shbundler_primitives::{
    constants::simple_account::{DUMMY_SIGNATURE, FACTORY_V07, FACTORY_V08, SALT},
    Call, EntryPoint, EntryPointVersion, UserOperation, UserOperationTypedData,
};
use std::{fmt, sync::Arc};

lazy_static! {
    static ref SIMPLE_ACCOUNT_FACTORY_V07: Address =
        FACTORY_V07.parse().expect("Simple account factory v0.7 address is valid");
    static ref SIMPLE_ACCOUNT_FACTORY_V08: Address =
        FACTORY_V08.parse().expect("Simple account factory v0.8 address is valid");
    static ref SIMPLE_ACCOUNT_DUMMY_SIGNATURE: Bytes =
        DUMMY_SIGNATURE.parse().expect("Dummy signature is valid hex");
}

/// `executeBatch((address,uint256,bytes)[])` of the v0.8 simple account
const EXECUTE_BATCH_V08: &str = "executeBatch((address,uint256,bytes)[])";

/// Minimal single-owner smart account (`SimpleAccount`)
pub struct SimpleAccount<M: Middleware + 'static, S: Signer> {
    eth_client: Arc<M>,
    signer: S,
    entry_point: EntryPoint,
    factory: Address,
    factory_data: Bytes,
    address: Address,
}

impl<M: Middleware + 'static, S: Signer> fmt::Debug for SimpleAccount<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleAccount")
            .field("address", &self.address)
            .field("owner", &self.signer.address())
            .field("entry_point", &self.entry_point)
            .finish()
    }
}

impl<M: Middleware + 'static, S: Signer> SimpleAccount<M, S> {
    /// Simple account of the signer, address derived through the entry point
    pub async fn new(
        eth_client: Arc<M>,
        signer: S,
        entry_point: EntryPoint,
    ) -> Result<Self, ShBundlerError> {
        let factory = Self::factory_address(entry_point.version);
        let factory_data = Self::factory_data(signer.address());
        let address =
            counterfactual_address(eth_client.clone(), entry_point.address, factory, &factory_data)
                .await?;
        Ok(Self { eth_client, signer, entry_point, factory, factory_data, address })
    }

    /// Factory deploying simple accounts for the entry point version
    pub fn factory_address(version: EntryPointVersion) -> Address {
        match version {
            EntryPointVersion::V07 => *SIMPLE_ACCOUNT_FACTORY_V07,
            EntryPointVersion::V08 => *SIMPLE_ACCOUNT_FACTORY_V08,
        }
    }

    /// `createAccount(owner, 0)`
    pub fn factory_data(owner: Address) -> Bytes {
        CreateAccountCall { owner, salt: SALT.into() }.encode().into()
    }

    /// Call data for the calls, batching with the encoding of the entry point version
    pub fn encode_calls_for(
        version: EntryPointVersion,
        calls: &[Call],
    ) -> Result<Bytes, ShBundlerError> {
        match calls {
            [] => Err(ShBundlerError::EmptyCalls),
            [call] => Ok(ExecuteCall { dest: call.to, value: call.value, func: call.data.clone() }
                .encode()
                .into()),
            _ => match version {
                EntryPointVersion::V07 => Ok(ExecuteBatchCall {
                    dest: calls.iter().map(|c| c.to).collect(),
                    value: calls.iter().map(|c| c.value).collect(),
                    func: calls.iter().map(|c| c.data.clone()).collect(),
                }
                .encode()
                .into()),
                EntryPointVersion::V08 => {
                    let calls = calls
                        .iter()
                        .map(|c| {
                            Token::Tuple(vec![
                                Token::Address(c.to),
                                Token::Uint(c.value),
                                Token::Bytes(c.data.to_vec()),
                            ])
                        })
                        .collect();
                    Ok([id(EXECUTE_BATCH_V08).to_vec(), encode(&[Token::Array(calls)])]
                        .concat()
                        .into())
                }
            },
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static, S: Signer + 'static> SmartAccount for SimpleAccount<M, S> {
    fn kind(&self) -> SmartAccountKind {
        SmartAccountKind::Simple
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
        factory_args(self.eth_client.as_ref(), self.address, self.factory, &self.factory_data).await
    }

    fn encode_calls(&self, calls: &[Call]) -> Result<Bytes, ShBundlerError> {
        Self::encode_calls_for(self.entry_point.version, calls)
    }

    fn stub_signature(&self) -> Bytes {
        SIMPLE_ACCOUNT_DUMMY_SIGNATURE.clone()
    }

    /// v0.7 accounts verify a personal signature of the hash, v0.8 accounts the EIP-712 signature
    async fn sign_user_operation(
        &self,
        uo: &UserOperation,
        chain_id: u64,
    ) -> Result<Bytes, ShBundlerError> {
        let signature = match self.entry_point.version {
            EntryPointVersion::V07 => {
                let hash = uo.hash(&self.entry_point, chain_id);
                self.signer.sign_message(hash.0.as_bytes()).await
            }
            EntryPointVersion::V08 => {
                let typed_data =
                    UserOperationTypedData::new(uo.clone(), self.entry_point.address, chain_id);
                self.signer.sign_typed_data(&typed_data).await
            }
        }
        .map_err(ShBundlerError::signer)?;

        Ok(signature.to_vec().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::{
        abi::AbiDecode,
        providers::{MockProvider, Provider},
        signers::LocalWallet,
        types::H256,
    };

    type Account = SimpleAccount<Provider<MockProvider>, LocalWallet>;

    fn calls() -> Vec<Call> {
        vec![
            Call::new(Address::repeat_byte(0x11), "0x12345678".parse().unwrap()),
            Call::new(Address::repeat_byte(0x22), Bytes::default()).value(1_000.into()),
        ]
    }

    #[test]
    fn factory_data_create_account() {
        let owner = Address::repeat_byte(0xaa);
        let data = Account::factory_data(owner);
        let decoded = CreateAccountCall::decode(data).unwrap();
        assert_eq!(decoded.owner, owner);
        assert_eq!(decoded.salt, U256::zero());
    }

    #[test]
    fn factory_by_version() {
        assert_eq!(
            Account::factory_address(EntryPointVersion::V07),
            "0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985".parse::<Address>().unwrap()
        );
        assert_eq!(
            Account::factory_address(EntryPointVersion::V08),
            "0x13E9ed32155810FDbd067D4522C492D6f68E5944".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn encode_single_call() {
        let calls = calls();
        for version in [EntryPointVersion::V07, EntryPointVersion::V08] {
            let data = Account::encode_calls_for(version, &calls[..1]).unwrap();
            let decoded = ExecuteCall::decode(data).unwrap();
            assert_eq!(decoded.dest, calls[0].to);
            assert_eq!(decoded.value, U256::zero());
            assert_eq!(decoded.func, calls[0].data);
        }
        assert!(matches!(
            Account::encode_calls_for(EntryPointVersion::V07, &[]),
            Err(ShBundlerError::EmptyCalls)
        ));
    }

    #[test]
    fn encode_batch_v07() {
        let calls = calls();
        let data = Account::encode_calls_for(EntryPointVersion::V07, &calls).unwrap();
        let decoded = ExecuteBatchCall::decode(data).unwrap();
        assert_eq!(decoded.dest, vec![calls[0].to, calls[1].to]);
        assert_eq!(decoded.value, vec![U256::zero(), U256::from(1_000)]);
    }

    #[test]
    fn encode_batch_v08() {
        let calls = calls();
        let data = Account::encode_calls_for(EntryPointVersion::V08, &calls).unwrap();
        assert_eq!(&data[..4], &id(EXECUTE_BATCH_V08)[..]);
        let tokens = ethers::abi::decode(
            &[ethers::abi::ParamType::Array(Box::new(ethers::abi::ParamType::Tuple(vec![
                ethers::abi::ParamType::Address,
                ethers::abi::ParamType::Uint(256),
                ethers::abi::ParamType::Bytes,
            ])))],
            &data[4..],
        )
        .unwrap();
        let Token::Array(items) = &tokens[0] else { panic!("array expected") };
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[1],
            Token::Tuple(vec![
                Token::Address(calls[1].to),
                Token::Uint(1_000.into()),
                Token::Bytes(vec![]),
            ])
        );
    }

    async fn account(version: EntryPointVersion) -> Account {
        let mock = MockProvider::new();
        let sender = Address::repeat_byte(0x42);
        mock.push_response(ethers::providers::MockResponse::Error(
            ethers::providers::JsonRpcError {
                code: 3,
                message: "execution reverted".into(),
                data: Some(serde_json::Value::String(
                    Bytes::from(
                        [
                            id("SenderAddressResult(address)").to_vec(),
                            encode(&[Token::Address(sender)]),
                        ]
                        .concat(),
                    )
                    .to_string(),
                )),
            },
        ));
        let signer: LocalWallet =
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".parse().unwrap();
        SimpleAccount::new(Arc::new(Provider::new(mock)), signer, version.into()).await.unwrap()
    }

    #[tokio::test]
    async fn counterfactual_address_from_entry_point() {
        let account = account(EntryPointVersion::V08).await;
        assert_eq!(account.address(), Address::repeat_byte(0x42));
        assert_eq!(account.kind(), SmartAccountKind::Simple);
        assert_eq!(
            account.owner(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
    }

    #[tokio::test]
    async fn sign_user_operation_v07() {
        let account = account(EntryPointVersion::V07).await;
        let uo = UserOperation::default().sender(account.address());
        let signature = account.sign_user_operation(&uo, 10143).await.unwrap();
        assert_eq!(signature.len(), 65);

        let signature = ethers::types::Signature::try_from(signature.as_ref()).unwrap();
        let hash = uo.hash(&account.entry_point(), 10143);
        let recovered = signature.recover(hash.0.as_bytes()).unwrap();
        assert_eq!(recovered, account.owner());
    }

    #[tokio::test]
    async fn sign_user_operation_v08() {
        let account = account(EntryPointVersion::V08).await;
        let uo = UserOperation::default().sender(account.address());
        let signature = account.sign_user_operation(&uo, 10143).await.unwrap();

        let signature = ethers::types::Signature::try_from(signature.as_ref()).unwrap();
        let hash = uo.hash(&account.entry_point(), 10143);
        let recovered = signature.recover(H256::from(hash)).unwrap();
        assert_eq!(recovered, account.owner());
    }
}
