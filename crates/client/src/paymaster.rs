//! ERC-7677 paymaster client

use crate::error::ShBundlerError;
use ethers::{
    providers::{Http, JsonRpcClient, Provider},
    types::Address,
};
use shbundler_primitives::{
    constants::rpc_methods::{PAYMASTER_DATA, PAYMASTER_STUB_DATA},
    PaymasterContext, PaymasterData, PaymasterStubData, UserOperation,
};
use tracing::trace;

/// Client of a paymaster service
#[derive(Debug)]
pub struct PaymasterClient<P: JsonRpcClient + 'static> {
    provider: Provider<P>,
}

impl<P: JsonRpcClient + 'static> PaymasterClient<P> {
    pub fn new(provider: Provider<P>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }

    /// Paymaster fields used while estimating gas
    ///
    /// # Arguments
    /// * `uo` - User operation signed with the account's stub signature
    /// * `entry_point` - Entry point address
    /// * `chain_id` - Chain id (sent hex-encoded)
    /// * `context` - Sponsorship context forwarded verbatim (`null` when absent)
    pub async fn get_paymaster_stub_data(
        &self,
        uo: &UserOperation,
        entry_point: &Address,
        chain_id: u64,
        context: Option<&PaymasterContext>,
    ) -> Result<PaymasterStubData, ShBundlerError> {
        trace!("Requesting paymaster stub data for {:?}", uo.sender);
        Ok(self
            .provider
            .request(PAYMASTER_STUB_DATA, (uo, entry_point, format!("{chain_id:#x}"), context))
            .await?)
    }

    /// Final paymaster fields of a user operation with its gas limits set
    pub async fn get_paymaster_data(
        &self,
        uo: &UserOperation,
        entry_point: &Address,
        chain_id: u64,
        context: Option<&PaymasterContext>,
    ) -> Result<PaymasterData, ShBundlerError> {
        trace!("Requesting paymaster data for {:?}", uo.sender);
        Ok(self
            .provider
            .request(PAYMASTER_DATA, (uo, entry_point, format!("{chain_id:#x}"), context))
            .await?)
    }
}

impl PaymasterClient<Http> {
    pub fn connect(url: &str) -> Result<Self, ShBundlerError> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| ShBundlerError::InvalidUrl { url: url.into(), inner: e.to_string() })?;
        Ok(Self::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::MockProvider;
    use serde_json::json;
    use shbundler_primitives::PaymasterMode;

    #[tokio::test]
    async fn stub_data_request() {
        let mock = MockProvider::new();
        let paymaster = PaymasterClient::new(Provider::new(mock.clone()));
        let paymaster_address: Address =
            "0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5".parse().unwrap();
        mock.push::<serde_json::Value, _>(json!({
            "paymaster": paymaster_address,
            "paymasterData": "0x",
            "paymasterVerificationGasLimit": "0x7530",
            "paymasterPostOpGasLimit": "0x0",
            "isFinal": true,
        }))
        .unwrap();

        let uo = UserOperation::default();
        let entry_point = Address::random();
        let context = PaymasterContext::new(paymaster_address, PaymasterMode::User);
        let stub = paymaster
            .get_paymaster_stub_data(&uo, &entry_point, 10143, Some(&context))
            .await
            .unwrap();
        assert!(stub.is_final);
        assert_eq!(stub.paymaster, Some(paymaster_address));

        mock.assert_request(
            PAYMASTER_STUB_DATA,
            (&uo, &entry_point, "0x279f", json!({
                "paymasterAddress": "0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5",
                "mode": "user",
            })),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn data_request_without_context() {
        let mock = MockProvider::new();
        let paymaster = PaymasterClient::new(Provider::new(mock.clone()));
        mock.push::<serde_json::Value, _>(json!({"paymasterData": "0x01"})).unwrap();

        let uo = UserOperation::default();
        let data = paymaster.get_paymaster_data(&uo, &Address::zero(), 1, None).await.unwrap();
        assert_eq!(data.paymaster_data, Some("0x01".parse().unwrap()));
        assert_eq!(data.paymaster, None);
        mock.assert_request(
            PAYMASTER_DATA,
            (&uo, Address::zero(), "0x1", serde_json::Value::Null),
        )
        .unwrap();
    }
}
