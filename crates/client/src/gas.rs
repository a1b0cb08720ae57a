//! Gas price oracle backed by the bundler's `gas_getUserOperationGasPrice`

use crate::{bundler::BundlerClient, error::ShBundlerError};
use async_trait::async_trait;
use ethers::providers::JsonRpcClient;
use shbundler_primitives::{constants::rpc_methods::GAS_PRICE, GasPrice, GasPriceResponse};
use std::{fmt::Debug, sync::Weak};
use tracing::trace;

/// Fee estimation callback installed on a bundler client
#[async_trait]
pub trait FeeEstimator: Send + Sync + Debug {
    /// Fresh fee quote for the next user operation
    async fn estimate_fees_per_gas(&self) -> Result<GasPrice, ShBundlerError>;
}

/// Queries the current fee quote through the given bundler connection
///
/// The `standard` tier is read and its hex quantities decoded. No unit conversion and no fallback
/// to another tier.
pub async fn get_user_operation_gas_price<P: JsonRpcClient + 'static>(
    bundler: &BundlerClient<P>,
) -> Result<GasPrice, ShBundlerError> {
    let response: serde_json::Value = bundler.request(GAS_PRICE, ()).await?;
    trace!("Gas price response: {response:?}");

    let response: GasPriceResponse =
        serde_json::from_value(response).map_err(ShBundlerError::decode)?;
    response.standard.decode().map_err(|inner| ShBundlerError::Decode { inner })
}

/// Fee estimator calling back into a bundler client
///
/// Holds a weak reference so that a bundler can own its own oracle. The reference is resolved on
/// every estimation.
#[derive(Debug)]
pub struct BundlerGasPriceOracle<P: JsonRpcClient + 'static> {
    bundler: Weak<BundlerClient<P>>,
}

impl<P: JsonRpcClient + 'static> BundlerGasPriceOracle<P> {
    pub fn new(bundler: Weak<BundlerClient<P>>) -> Self {
        Self { bundler }
    }
}

impl<P: JsonRpcClient + 'static> Clone for BundlerGasPriceOracle<P> {
    fn clone(&self) -> Self {
        Self { bundler: self.bundler.clone() }
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> FeeEstimator for BundlerGasPriceOracle<P> {
    async fn estimate_fees_per_gas(&self) -> Result<GasPrice, ShBundlerError> {
        let bundler = self.bundler.upgrade().ok_or(ShBundlerError::BundlerDropped)?;
        get_user_operation_gas_price(&bundler).await
    }
}
