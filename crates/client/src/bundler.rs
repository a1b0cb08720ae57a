//! Bundler JSON-RPC client with an installable fee estimator

use crate::{
    error::ShBundlerError,
    gas::{BundlerGasPriceOracle, FeeEstimator},
};
use ethers::{
    providers::{Http, JsonRpcClient, Provider},
    types::{Address, U64},
};
use serde::{de::DeserializeOwned, Serialize};
use shbundler_primitives::{
    constants::rpc_methods::{
        CHAIN_ID, ESTIMATE_USER_OPERATION_GAS, GET_USER_OPERATION_RECEIPT, SEND_USER_OPERATION,
        SUPPORTED_ENTRY_POINTS,
    },
    GasPrice, UserOperation, UserOperationGasEstimation, UserOperationHash, UserOperationReceipt,
};
use std::{fmt::Debug, sync::Arc};
use tracing::{info, trace};

/// Client of an ERC-4337 bundler
#[derive(Debug)]
pub struct BundlerClient<P: JsonRpcClient + 'static> {
    /// Name of the client
    name: String,
    /// Connection to the bundler
    provider: Provider<P>,
    /// Fee estimation used for new user operations
    fee_estimator: Box<dyn FeeEstimator>,
}

impl<P: JsonRpcClient + 'static> BundlerClient<P> {
    /// Bundler client with the given fee estimator
    pub fn with_fee_estimator(
        name: impl Into<String>,
        provider: Provider<P>,
        fee_estimator: Box<dyn FeeEstimator>,
    ) -> Self {
        Self { name: name.into(), provider, fee_estimator }
    }

    /// Bundler client whose fee estimator queries the gas price oracle of this very client
    pub fn new_cyclic(name: impl Into<String>, provider: Provider<P>) -> Arc<Self> {
        let name = name.into();
        Arc::new_cyclic(|bundler| Self {
            name,
            provider,
            fee_estimator: Box::new(BundlerGasPriceOracle::new(bundler.clone())),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }

    /// Raw JSON-RPC request to the bundler
    pub async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ShBundlerError>
    where
        T: Debug + Serialize + Send + Sync,
        R: Serialize + DeserializeOwned + Debug + Send,
    {
        Ok(self.provider.request(method, params).await?)
    }

    /// Fee quote from the installed fee estimator
    pub async fn estimate_fees_per_gas(&self) -> Result<GasPrice, ShBundlerError> {
        self.fee_estimator.estimate_fees_per_gas().await
    }

    pub async fn estimate_user_operation_gas(
        &self,
        uo: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationGasEstimation, ShBundlerError> {
        trace!("Estimating gas of user operation {uo:?} on {}", self.name);
        self.request(ESTIMATE_USER_OPERATION_GAS, (uo, entry_point)).await
    }

    pub async fn send_user_operation(
        &self,
        uo: &UserOperation,
        entry_point: &Address,
    ) -> Result<UserOperationHash, ShBundlerError> {
        let hash: UserOperationHash = self.request(SEND_USER_OPERATION, (uo, entry_point)).await?;
        info!("User operation {hash} from {:?} sent to {}", uo.sender, self.name);
        Ok(hash)
    }

    pub async fn get_user_operation_receipt(
        &self,
        hash: &UserOperationHash,
    ) -> Result<Option<UserOperationReceipt>, ShBundlerError> {
        self.request(GET_USER_OPERATION_RECEIPT, [hash]).await
    }

    pub async fn supported_entry_points(&self) -> Result<Vec<Address>, ShBundlerError> {
        self.request(SUPPORTED_ENTRY_POINTS, ()).await
    }

    pub async fn chain_id(&self) -> Result<U64, ShBundlerError> {
        self.request(CHAIN_ID, ()).await
    }
}

impl BundlerClient<Http> {
    /// Self-referential HTTP bundler client
    pub fn connect(name: impl Into<String>, url: &str) -> Result<Arc<Self>, ShBundlerError> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| ShBundlerError::InvalidUrl { url: url.into(), inner: e.to_string() })?;
        Ok(Self::new_cyclic(name, provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingEstimator {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl FeeEstimator for CountingEstimator {
        async fn estimate_fees_per_gas(&self) -> Result<GasPrice, ShBundlerError> {
            let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(GasPrice { max_fee_per_gas: calls.into(), max_priority_fee_per_gas: 0.into() })
        }
    }

    #[tokio::test]
    async fn self_referential_fee_estimation() {
        let mock = MockProvider::new();
        let bundler = BundlerClient::new_cyclic("shBundler", Provider::new(mock.clone()));
        assert_eq!(bundler.name(), "shBundler");

        for fee in ["0x2", "0x1"] {
            mock.push::<serde_json::Value, _>(json!({
                "standard": {"maxFeePerGas": fee, "maxPriorityFeePerGas": "0x1"},
            }))
            .unwrap();
        }

        // every estimation is a fresh request
        assert_eq!(bundler.estimate_fees_per_gas().await.unwrap().max_fee_per_gas, 1.into());
        assert_eq!(bundler.estimate_fees_per_gas().await.unwrap().max_fee_per_gas, 2.into());
        mock.assert_request("gas_getUserOperationGasPrice", ()).unwrap();
        mock.assert_request("gas_getUserOperationGasPrice", ()).unwrap();
    }

    #[tokio::test]
    async fn installed_fee_estimator() {
        let bundler = BundlerClient::with_fee_estimator(
            "shBundler",
            Provider::new(MockProvider::new()),
            Box::<CountingEstimator>::default(),
        );
        assert_eq!(bundler.estimate_fees_per_gas().await.unwrap().max_fee_per_gas, 1.into());
        assert_eq!(bundler.estimate_fees_per_gas().await.unwrap().max_fee_per_gas, 2.into());
    }

    #[tokio::test]
    async fn send_user_operation() {
        let mock = MockProvider::new();
        let bundler = BundlerClient::new_cyclic("shBundler", Provider::new(mock.clone()));
        let hash = "0x95418c07086df02ff6bc9e8bdc150b380cb761beecc098630440bcec6e862702";
        mock.push::<serde_json::Value, _>(json!(hash)).unwrap();

        let uo = UserOperation::default().sender(Address::random());
        let entry_point: Address = "0x4337084D9e255Ff0702461CF8895CE9E3B5Ff108".parse().unwrap();
        let res = bundler.send_user_operation(&uo, &entry_point).await.unwrap();
        assert_eq!(res, hash.parse().unwrap());
        mock.assert_request(SEND_USER_OPERATION, (&uo, &entry_point)).unwrap();
    }

    #[tokio::test]
    async fn estimate_user_operation_gas() {
        let mock = MockProvider::new();
        let bundler = BundlerClient::new_cyclic("shBundler", Provider::new(mock.clone()));
        mock.push::<serde_json::Value, _>(json!({
            "preVerificationGas": "0xac18",
            "verificationGasLimit": "0xecd0",
            "callGasLimit": "0x814c",
        }))
        .unwrap();

        let uo = UserOperation::default();
        let estimation =
            bundler.estimate_user_operation_gas(&uo, &Address::zero()).await.unwrap();
        assert_eq!(estimation.pre_verification_gas, 44_056.into());
        assert_eq!(estimation.call_gas_limit, 33_100.into());
    }

    #[tokio::test]
    async fn receipt_not_found() {
        let mock = MockProvider::new();
        let bundler = BundlerClient::new_cyclic("shBundler", Provider::new(mock.clone()));
        mock.push::<serde_json::Value, _>(serde_json::Value::Null).unwrap();
        let receipt =
            bundler.get_user_operation_receipt(&UserOperationHash::zero()).await.unwrap();
        assert!(receipt.is_none());
    }

    #[tokio::test]
    async fn supported_entry_points() {
        let mock = MockProvider::new();
        let bundler = BundlerClient::new_cyclic("shBundler", Provider::new(mock.clone()));
        mock.push::<serde_json::Value, _>(json!([
            "0x0000000071727De22E5E9d8BAf0edAc6f37da032",
            "0x4337084D9e255Ff0702461CF8895CE9E3B5Ff108",
        ]))
        .unwrap();

        let entry_points = bundler.supported_entry_points().await.unwrap();
        assert_eq!(entry_points.len(), 2);
        assert_eq!(
            entry_points[1],
            "0x4337084D9e255Ff0702461CF8895CE9E3B5Ff108".parse::<Address>().unwrap()
        );
        mock.assert_request(SUPPORTED_ENTRY_POINTS, ()).unwrap();
    }

    #[test]
    fn connect_invalid_url() {
        assert!(matches!(
            BundlerClient::connect("shBundler", "not a url"),
            Err(ShBundlerError::InvalidUrl { .. })
        ));
    }
}
