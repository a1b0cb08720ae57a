#![allow(dead_code)]

use async_trait::async_trait;
use ethers::{
    abi::{encode, AbiEncode, Token},
    types::{Address, Bytes, U256, U64},
    utils::id,
};
use hyper::{
    header::CONTENT_TYPE,
    service::{make_service_fn, service_fn},
    Body, Response, Server,
};
use jsonrpsee::{
    core::RpcResult,
    proc_macros::rpc,
    server::ServerBuilder,
    types::ErrorObject,
};
use shbundler_client::{NetworkDefaultsSource, ShBundlerError};
use shbundler_primitives::{
    NetworkDefaults, UserOperation, UserOperationGasEstimation, UserOperationHash,
};
use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

pub const USER_OPERATION_HASH: &str =
    "0x95418c07086df02ff6bc9e8bdc150b380cb761beecc098630440bcec6e862702";

/// Counterfactual address every account gets from the dummy node
pub fn sender() -> Address {
    "0x9c5754De1443984659E1b3a8d1931D83475ba29C".parse().unwrap()
}

#[rpc(server, namespace = "eth")]
pub trait DummyEthApi {
    #[method(name = "chainId")]
    async fn chain_id(&self) -> RpcResult<U64>;

    #[method(name = "call")]
    async fn call(
        &self,
        tx: serde_json::Value,
        block: Option<serde_json::Value>,
    ) -> RpcResult<Bytes>;

    #[method(name = "getCode")]
    async fn get_code(&self, address: Address, block: Option<serde_json::Value>)
        -> RpcResult<Bytes>;
}

/// Chain node answering the entry point calls made while building user operations
pub struct DummyEthApiServerImpl {
    pub chain_id: U64,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DummyEthApiServer for DummyEthApiServerImpl {
    async fn chain_id(&self) -> RpcResult<U64> {
        Ok(self.chain_id)
    }

    async fn call(
        &self,
        tx: serde_json::Value,
        _block: Option<serde_json::Value>,
    ) -> RpcResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let data = tx
            .get("data")
            .or_else(|| tx.get("input"))
            .and_then(|data| data.as_str())
            .unwrap_or_default();

        if data.starts_with(&Bytes::from(id("getSenderAddress(bytes)").to_vec()).to_string()) {
            let revert: Bytes = [
                id("SenderAddressResult(address)").to_vec(),
                encode(&[Token::Address(sender())]),
            ]
            .concat()
            .into();
            return Err(ErrorObject::owned(3, "execution reverted", Some(revert.to_string())));
        }

        if data.starts_with(&Bytes::from(id("getNonce(address,uint192)").to_vec()).to_string()) {
            return Ok(U256::zero().encode().into());
        }

        Err(ErrorObject::owned(-32000, "unexpected call", None::<()>))
    }

    async fn get_code(
        &self,
        _address: Address,
        _block: Option<serde_json::Value>,
    ) -> RpcResult<Bytes> {
        Ok(Bytes::default())
    }
}

#[rpc(server)]
pub trait DummyBundlerApi {
    #[method(name = "gas_getUserOperationGasPrice")]
    async fn gas_price(&self) -> RpcResult<serde_json::Value>;

    #[method(name = "eth_estimateUserOperationGas")]
    async fn estimate_user_operation_gas(
        &self,
        uo: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationGasEstimation>;

    #[method(name = "eth_sendUserOperation")]
    async fn send_user_operation(
        &self,
        uo: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationHash>;

    #[method(name = "pm_getPaymasterStubData")]
    async fn paymaster_stub_data(
        &self,
        uo: UserOperation,
        entry_point: Address,
        chain_id: String,
        pm_context: Option<serde_json::Value>,
    ) -> RpcResult<serde_json::Value>;

    #[method(name = "pm_getPaymasterData")]
    async fn paymaster_data(
        &self,
        uo: UserOperation,
        entry_point: Address,
        chain_id: String,
        pm_context: Option<serde_json::Value>,
    ) -> RpcResult<serde_json::Value>;
}

/// Bundler and paymaster services recording what they receive
#[derive(Default)]
pub struct DummyBundlerApiServerImpl {
    pub paymaster: Address,
    pub gas_price_requests: AtomicUsize,
    pub sent: Mutex<Vec<(UserOperation, Address)>>,
    pub paymaster_requests: Mutex<Vec<(String, Option<serde_json::Value>)>>,
}

#[async_trait]
impl DummyBundlerApiServer for Arc<DummyBundlerApiServerImpl> {
    async fn gas_price(&self) -> RpcResult<serde_json::Value> {
        self.gas_price_requests.fetch_add(1, Ordering::SeqCst);
        Ok(serde_json::json!({
            "slow": {"maxFeePerGas": "0x3b9aca00", "maxPriorityFeePerGas": "0x1"},
            "standard": {"maxFeePerGas": "0x77359400", "maxPriorityFeePerGas": "0x2"},
            "fast": {"maxFeePerGas": "0xb2d05e00", "maxPriorityFeePerGas": "0x3"},
        }))
    }

    async fn estimate_user_operation_gas(
        &self,
        _uo: UserOperation,
        _entry_point: Address,
    ) -> RpcResult<UserOperationGasEstimation> {
        Ok(UserOperationGasEstimation {
            pre_verification_gas: 44_056.into(),
            verification_gas_limit: 60_624.into(),
            call_gas_limit: 33_100.into(),
            paymaster_verification_gas_limit: Some(30_000.into()),
            paymaster_post_op_gas_limit: None,
        })
    }

    async fn send_user_operation(
        &self,
        uo: UserOperation,
        entry_point: Address,
    ) -> RpcResult<UserOperationHash> {
        self.sent.lock().unwrap().push((uo, entry_point));
        Ok(USER_OPERATION_HASH.parse().unwrap())
    }

    async fn paymaster_stub_data(
        &self,
        _uo: UserOperation,
        _entry_point: Address,
        chain_id: String,
        pm_context: Option<serde_json::Value>,
    ) -> RpcResult<serde_json::Value> {
        self.paymaster_requests.lock().unwrap().push((chain_id, pm_context));
        Ok(serde_json::json!({
            "paymaster": self.paymaster,
            "paymasterData": "0x01",
            "paymasterVerificationGasLimit": "0x7530",
            "paymasterPostOpGasLimit": "0x0",
        }))
    }

    async fn paymaster_data(
        &self,
        _uo: UserOperation,
        _entry_point: Address,
        chain_id: String,
        pm_context: Option<serde_json::Value>,
    ) -> RpcResult<serde_json::Value> {
        self.paymaster_requests.lock().unwrap().push((chain_id, pm_context));
        Ok(serde_json::json!({
            "paymaster": self.paymaster,
            "paymasterData": "0x0202",
        }))
    }
}

/// Starts the dummy node, returns its URL
pub async fn start_node(chain_id: u64, calls: Arc<AtomicUsize>) -> String {
    let server = ServerBuilder::default().build("127.0.0.1:0").await.unwrap();
    let address = server.local_addr().unwrap();
    let node = DummyEthApiServerImpl { chain_id: chain_id.into(), calls };
    let handle = server.start(node.into_rpc());
    tokio::spawn(handle.stopped());
    format!("http://{address}")
}

/// Starts the dummy bundler (also serving the paymaster methods), returns its URL
pub async fn start_bundler(bundler: Arc<DummyBundlerApiServerImpl>) -> String {
    let server = ServerBuilder::default().build("127.0.0.1:0").await.unwrap();
    let address = server.local_addr().unwrap();
    let handle = server.start(bundler.into_rpc());
    tokio::spawn(handle.stopped());
    format!("http://{address}")
}

/// Serves `body` as JSON to every HTTP request, returns the URL
pub async fn serve_json(body: serde_json::Value) -> String {
    let body = body.to_string();
    let make_service = make_service_fn(move |_| {
        let body = body.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |_req| {
                let body = body.clone();
                async move {
                    Response::builder()
                        .header(CONTENT_TYPE, "application/json")
                        .body(Body::from(body))
                }
            }))
        }
    });

    let server = Server::bind(&([127, 0, 0, 1], 0).into()).serve(make_service);
    let address = server.local_addr();
    tokio::spawn(server);

    format!("http://{address}/networks.json")
}

/// Defaults source counting lookups
#[derive(Default)]
pub struct CountingDefaults {
    pub defaults: Option<NetworkDefaults>,
    pub lookups: AtomicUsize,
}

impl CountingDefaults {
    pub fn new(defaults: Option<NetworkDefaults>) -> Self {
        Self { defaults, lookups: AtomicUsize::new(0) }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NetworkDefaultsSource for CountingDefaults {
    async fn fetch_network_defaults(
        &self,
        _chain_id: u64,
    ) -> Result<Option<NetworkDefaults>, ShBundlerError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.defaults.clone())
    }
}
