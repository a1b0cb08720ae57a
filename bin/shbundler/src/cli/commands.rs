use super::args::{BundlerArgs, ClientArgs, DefaultsArgs, ReceiptArgs, SendArgs, WalletArgs};
use clap::Parser;
use ethers::signers::LocalWallet;
use shbundler_client::{
    create_sh_bundler_client_with_defaults, BundlerClient, NetworkDefaultsSource,
    RemoteNetworkDefaults, SendUserOperationParams, ShBundlerSdk,
};
use shbundler_primitives::constants::bundler::NAME;
use tracing::info;

async fn create_client(
    client: &ClientArgs,
    wallet: &WalletArgs,
) -> eyre::Result<ShBundlerSdk<LocalWallet>> {
    let wallet = wallet.wallet(client.chain.id())?;
    info!("Owner {:?}", wallet.address());

    let sdk = create_sh_bundler_client_with_defaults(
        client.options(wallet),
        &client.network_defaults(),
    )
    .await?;
    Ok(sdk)
}

/// Send a user operation with a single call from the smart account
#[derive(Debug, Parser)]
pub struct SendCommand {
    /// Chain and endpoints args
    #[clap(flatten)]
    client: ClientArgs,

    /// Owner key args
    #[clap(flatten)]
    wallet: WalletArgs,

    /// User operation args
    #[clap(flatten)]
    send: SendArgs,
}

impl SendCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let sdk = create_client(&self.client, &self.wallet).await?;

        let mut params = SendUserOperationParams::new(self.send.to, self.send.data.clone());
        if let Some(context) = self.send.paymaster_context(sdk.paymaster_address()) {
            params = params.paymaster_context(context);
        }

        let hash = sdk.send_user_operation(params).await?;
        info!("User operation hash {hash}");
        Ok(())
    }
}

/// Print the smart account of the owner on the chain
#[derive(Debug, Parser)]
pub struct AddressCommand {
    /// Chain and endpoints args
    #[clap(flatten)]
    client: ClientArgs,

    /// Owner key args
    #[clap(flatten)]
    wallet: WalletArgs,
}

impl AddressCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let sdk = create_client(&self.client, &self.wallet).await?;
        let account = sdk.smart_account();
        let entry_point = account.entry_point();

        info!(
            "{} account {:?} (entry point {:?}, version {})",
            account.kind(),
            account.address(),
            entry_point.address,
            entry_point.version
        );
        Ok(())
    }
}

/// Query the bundler for the current user operation gas price
#[derive(Debug, Parser)]
pub struct GasPriceCommand {
    /// Bundler args
    #[clap(flatten)]
    bundler: BundlerArgs,
}

impl GasPriceCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let bundler = BundlerClient::connect(NAME, &self.bundler.bundler_url)?;
        let gas_price = bundler.estimate_fees_per_gas().await?;
        info!(
            "maxFeePerGas {} maxPriorityFeePerGas {}",
            gas_price.max_fee_per_gas, gas_price.max_priority_fee_per_gas
        );
        Ok(())
    }
}

/// Fetch the receipt of a user operation
#[derive(Debug, Parser)]
pub struct ReceiptCommand {
    /// Bundler args
    #[clap(flatten)]
    bundler: BundlerArgs,

    /// Receipt args
    #[clap(flatten)]
    receipt: ReceiptArgs,
}

impl ReceiptCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let bundler = BundlerClient::connect(NAME, &self.bundler.bundler_url)?;
        match bundler.get_user_operation_receipt(&self.receipt.hash).await? {
            Some(receipt) => info!(
                "User operation {} included in {:?} (success: {}, gas cost: {})",
                receipt.user_operation_hash,
                receipt.tx_receipt.transaction_hash,
                receipt.success,
                receipt.actual_gas_cost
            ),
            None => info!("User operation {} not found", self.receipt.hash),
        }
        Ok(())
    }
}

/// Print the published endpoint defaults of a chain
#[derive(Debug, Parser)]
pub struct DefaultsCommand {
    /// Defaults args
    #[clap(flatten)]
    defaults: DefaultsArgs,
}

impl DefaultsCommand {
    /// Execute the command
    pub async fn execute(self) -> eyre::Result<()> {
        let chain_id = self.defaults.chain.id();
        let source = RemoteNetworkDefaults::new(self.defaults.defaults_url);

        let defaults = source
            .fetch_network_defaults(chain_id)
            .await?
            .ok_or_else(|| eyre::eyre!("No defaults found for chain id {chain_id}"))?;
        info!(
            "Bundler {:?}, paymaster {:?}, paymaster address {:?}",
            defaults.bundler_url, defaults.paymaster_url, defaults.paymaster_address
        );
        Ok(())
    }
}
