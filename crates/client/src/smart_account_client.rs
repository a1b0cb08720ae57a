//! Transient client submitting user operations of one smart account
use crate::{
    account::SmartAccount, bundler::BundlerClient, error::ShBundlerError,
    paymaster::PaymasterClient,
};
use ethers::providers::JsonRpcClient;
use shbundler_primitives::{Call, PaymasterContext, UserOperation, UserOperationHash};
use std::sync::Arc;
use tracing::{debug, trace};

/// Builds, sponsors, signs and submits user operations for a smart account
///
/// Created for a single submission: the paymaster context and target chain are fixed for the
/// lifetime of the client.
#[derive(Debug)]
pub struct SmartAccountClient<P: JsonRpcClient + 'static> {
    account: Arc<dyn SmartAccount>,
    bundler: BundlerClient<P>,
    paymaster: Option<Arc<PaymasterClient<P>>>,
    paymaster_context: Option<PaymasterContext>,
    chain_id: u64,
}

impl<P: JsonRpcClient + 'static> SmartAccountClient<P> {
    pub fn new(account: Arc<dyn SmartAccount>, bundler: BundlerClient<P>, chain_id: u64) -> Self {
        Self { account, bundler, paymaster: None, paymaster_context: None, chain_id }
    }

    /// Sponsors user operations through the paymaster service
    pub fn paymaster(
        mut self,
        paymaster: Arc<PaymasterClient<P>>,
        context: Option<PaymasterContext>,
    ) -> Self {
        self.paymaster = Some(paymaster);
        self.paymaster_context = context;
        self
    }

    pub fn account(&self) -> &Arc<dyn SmartAccount> {
        &self.account
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Unsigned user operation executing the calls, gas limits and paymaster fields set
    pub async fn prepare_user_operation(
        &self,
        calls: &[Call],
    ) -> Result<UserOperation, ShBundlerError> {
        let entry_point = self.account.entry_point();

        let call_data = self.account.encode_calls(calls)?;
        let nonce = self.account.get_nonce().await?;
        let factory = self.account.get_factory_args().await?;
        let fees = self.bundler.estimate_fees_per_gas().await?;

        let mut uo = UserOperation::default()
            .sender(self.account.address())
            .nonce(nonce)
            .factory(factory)
            .call_data(call_data)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
            .signature(self.account.stub_signature());

        let mut is_final = false;
        if let Some(paymaster) = &self.paymaster {
            let stub = paymaster
                .get_paymaster_stub_data(
                    &uo,
                    &entry_point.address,
                    self.chain_id,
                    self.paymaster_context.as_ref(),
                )
                .await?;
            trace!("Paymaster stub data: {stub:?}");
            is_final = stub.is_final;
            uo.paymaster = stub.paymaster;
            uo.paymaster_data = stub.paymaster_data;
            uo.paymaster_verification_gas_limit = stub.paymaster_verification_gas_limit;
            uo.paymaster_post_op_gas_limit = stub.paymaster_post_op_gas_limit;
        }

        let estimation =
            self.bundler.estimate_user_operation_gas(&uo, &entry_point.address).await?;
        debug!("Gas estimation for {:?}: {estimation:?}", uo.sender);
        uo.call_gas_limit = estimation.call_gas_limit;
        uo.verification_gas_limit = estimation.verification_gas_limit;
        uo.pre_verification_gas = estimation.pre_verification_gas;
        if estimation.paymaster_verification_gas_limit.is_some() {
            uo.paymaster_verification_gas_limit = estimation.paymaster_verification_gas_limit;
        }
        if estimation.paymaster_post_op_gas_limit.is_some() {
            uo.paymaster_post_op_gas_limit = estimation.paymaster_post_op_gas_limit;
        }

        if let Some(paymaster) = self.paymaster.as_ref().filter(|_| !is_final) {
            let data = paymaster
                .get_paymaster_data(
                    &uo,
                    &entry_point.address,
                    self.chain_id,
                    self.paymaster_context.as_ref(),
                )
                .await?;
            trace!("Paymaster data: {data:?}");
            uo.paymaster = data.paymaster.or(uo.paymaster);
            uo.paymaster_data = data.paymaster_data;
        }

        Ok(uo)
    }

    /// Submits one user operation executing the calls
    pub async fn send_user_operation(
        &self,
        calls: &[Call],
    ) -> Result<UserOperationHash, ShBundlerError> {
        let uo = self.prepare_user_operation(calls).await?;
        let signature = self.account.sign_user_operation(&uo, self.chain_id).await?;
        let uo = uo.signature(signature);
        self.bundler.send_user_operation(&uo, &self.account.entry_point().address).await
    }
}
