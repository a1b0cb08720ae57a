//! shBundler SDK: options, facade and the assembled clients
use crate::{
    account::{to_smart_account, SmartAccount},
    bundler::BundlerClient,
    error::ShBundlerError,
    gas::BundlerGasPriceOracle,
    networks::{NetworkDefaultsSource, RemoteNetworkDefaults},
    paymaster::PaymasterClient,
    smart_account_client::SmartAccountClient,
};
use alloy_chains::Chain;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::Signer,
    types::{Address, Bytes},
};
use shbundler_primitives::{
    constants::bundler::NAME, Call, EntryPointVersion, PaymasterContext, UserOperationHash,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Options of [create_sh_bundler_client]
///
/// Signer, RPC URL and chain are required. Missing bundler URL, paymaster URL or paymaster
/// address are filled from the network defaults of the chain.
#[derive(Clone, Debug)]
pub struct ShBundlerClientOptions<S> {
    pub signer: Option<S>,
    pub rpc_url: Option<String>,
    pub chain: Option<Chain>,
    pub bundler_url: Option<String>,
    pub paymaster_url: Option<String>,
    pub paymaster_address: Option<Address>,
    pub entry_point_version: EntryPointVersion,
}

impl<S> Default for ShBundlerClientOptions<S> {
    fn default() -> Self {
        Self {
            signer: None,
            rpc_url: None,
            chain: None,
            bundler_url: None,
            paymaster_url: None,
            paymaster_address: None,
            entry_point_version: EntryPointVersion::V08,
        }
    }
}

impl<S> ShBundlerClientOptions<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signer(mut self, signer: S) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = Some(rpc_url.into());
        self
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn bundler_url(mut self, bundler_url: impl Into<String>) -> Self {
        self.bundler_url = Some(bundler_url.into());
        self
    }

    pub fn paymaster_url(mut self, paymaster_url: impl Into<String>) -> Self {
        self.paymaster_url = Some(paymaster_url.into());
        self
    }

    pub fn paymaster_address(mut self, paymaster_address: Address) -> Self {
        self.paymaster_address = Some(paymaster_address);
        self
    }

    pub fn entry_point_version(mut self, entry_point_version: EntryPointVersion) -> Self {
        self.entry_point_version = entry_point_version;
        self
    }

    fn missing_endpoints(&self) -> bool {
        self.bundler_url.is_none() ||
            self.paymaster_url.is_none() ||
            self.paymaster_address.is_none()
    }
}

/// Endpoints every assembled SDK is built from
struct Endpoints {
    rpc_url: String,
    chain: Chain,
    bundler_url: String,
    paymaster_url: String,
    paymaster_address: Address,
}

/// Parameters of [ShBundlerSdk::send_user_operation]
#[derive(Clone, Debug)]
pub struct SendUserOperationParams {
    /// Target of the single call
    pub to: Address,
    /// Call data of the single call
    pub data: Bytes,
    /// Chain the user operation is signed for (the SDK's chain when absent)
    pub chain: Option<Chain>,
    /// Sponsorship context forwarded to the paymaster
    pub paymaster_context: Option<PaymasterContext>,
}

impl SendUserOperationParams {
    pub fn new(to: Address, data: Bytes) -> Self {
        Self { to, data, chain: None, paymaster_context: None }
    }

    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn paymaster_context(mut self, paymaster_context: PaymasterContext) -> Self {
        self.paymaster_context = Some(paymaster_context);
        self
    }
}

/// Clients assembled around one smart account
///
/// The smart account is fixed for the lifetime of the SDK. Every submission builds its own
/// transient [SmartAccountClient].
#[derive(Debug)]
pub struct ShBundlerSdk<S: Signer> {
    public_client: Arc<Provider<Http>>,
    wallet_client: SignerMiddleware<Arc<Provider<Http>>, S>,
    smart_account: Arc<dyn SmartAccount>,
    paymaster_client: Arc<PaymasterClient<Http>>,
    bundler_client: Arc<BundlerClient<Http>>,
    chain: Chain,
    bundler_url: String,
    paymaster_address: Address,
}

impl<S: Signer + 'static> ShBundlerSdk<S> {
    /// Read-only chain client
    pub fn public_client(&self) -> &Arc<Provider<Http>> {
        &self.public_client
    }

    /// Chain client signing with the owner
    pub fn wallet_client(&self) -> &SignerMiddleware<Arc<Provider<Http>>, S> {
        &self.wallet_client
    }

    pub fn smart_account(&self) -> &Arc<dyn SmartAccount> {
        &self.smart_account
    }

    pub fn paymaster_client(&self) -> &Arc<PaymasterClient<Http>> {
        &self.paymaster_client
    }

    /// Bundler client whose fee estimator is its own gas price oracle
    pub fn bundler_client(&self) -> &Arc<BundlerClient<Http>> {
        &self.bundler_client
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Paymaster address, for building sponsorship contexts
    pub fn paymaster_address(&self) -> Address {
        self.paymaster_address
    }

    /// Submits one user operation with a single call
    pub async fn send_user_operation(
        &self,
        params: SendUserOperationParams,
    ) -> Result<UserOperationHash, ShBundlerError> {
        let chain = params.chain.unwrap_or(self.chain);
        debug!("Sending user operation to {:?} on chain {chain}", params.to);

        let bundler = BundlerClient::with_fee_estimator(
            NAME,
            http_provider(&self.bundler_url)?,
            Box::new(BundlerGasPriceOracle::new(Arc::downgrade(&self.bundler_client))),
        );
        let client = SmartAccountClient::new(self.smart_account.clone(), bundler, chain.id())
            .paymaster(self.paymaster_client.clone(), params.paymaster_context);

        client.send_user_operation(&[Call::new(params.to, params.data)]).await
    }
}

fn http_provider(url: &str) -> Result<Provider<Http>, ShBundlerError> {
    Provider::<Http>::try_from(url)
        .map_err(|e| ShBundlerError::InvalidUrl { url: url.into(), inner: e.to_string() })
}

/// Creates the SDK, filling missing endpoints from the published network defaults
pub async fn create_sh_bundler_client<S>(
    options: ShBundlerClientOptions<S>,
) -> Result<ShBundlerSdk<S>, ShBundlerError>
where
    S: Signer + Clone + 'static,
{
    create_sh_bundler_client_with_defaults(options, &RemoteNetworkDefaults::default()).await
}

/// Creates the SDK, filling missing endpoints from the given defaults source
///
/// The defaults source is only queried when one of bundler URL, paymaster URL or paymaster
/// address is missing.
pub async fn create_sh_bundler_client_with_defaults<S>(
    mut options: ShBundlerClientOptions<S>,
    defaults: &dyn NetworkDefaultsSource,
) -> Result<ShBundlerSdk<S>, ShBundlerError>
where
    S: Signer + Clone + 'static,
{
    let signer = options.signer.take().ok_or(ShBundlerError::MissingOption("signer"))?;
    let rpc_url = options.rpc_url.clone().ok_or(ShBundlerError::MissingOption("rpc_url"))?;
    let chain = options.chain.ok_or(ShBundlerError::MissingOption("chain"))?;

    let public_client = Arc::new(http_provider(&rpc_url)?);
    let chain_id = public_client.get_chainid().await?.as_u64();

    if options.missing_endpoints() {
        let network_defaults = defaults
            .fetch_network_defaults(chain_id)
            .await?
            .ok_or(ShBundlerError::NoNetworkDefaults { chain_id })?;
        options.bundler_url = options.bundler_url.or(network_defaults.bundler_url);
        options.paymaster_url = options.paymaster_url.or(network_defaults.paymaster_url);
        options.paymaster_address =
            options.paymaster_address.or(network_defaults.paymaster_address);
    }

    let endpoints = Endpoints {
        rpc_url,
        chain,
        bundler_url: options.bundler_url.ok_or(ShBundlerError::MissingOption("bundler_url"))?,
        paymaster_url: options
            .paymaster_url
            .ok_or(ShBundlerError::MissingOption("paymaster_url"))?,
        paymaster_address: options
            .paymaster_address
            .ok_or(ShBundlerError::MissingOption("paymaster_address"))?,
    };

    let smart_account = to_smart_account(
        public_client.clone(),
        signer.clone(),
        chain_id,
        options.entry_point_version,
    )
    .await?;

    assemble(smart_account, signer, public_client, endpoints)
}

/// Creates the SDK around an already built smart account
///
/// All endpoints are required, network defaults are not consulted.
pub async fn create_sh_bundler_client_from_smart_account<S>(
    smart_account: Arc<dyn SmartAccount>,
    options: ShBundlerClientOptions<S>,
) -> Result<ShBundlerSdk<S>, ShBundlerError>
where
    S: Signer + Clone + 'static,
{
    let signer = options.signer.ok_or(ShBundlerError::MissingOption("signer"))?;
    let endpoints = Endpoints {
        rpc_url: options.rpc_url.ok_or(ShBundlerError::MissingOption("rpc_url"))?,
        chain: options.chain.ok_or(ShBundlerError::MissingOption("chain"))?,
        bundler_url: options.bundler_url.ok_or(ShBundlerError::MissingOption("bundler_url"))?,
        paymaster_url: options
            .paymaster_url
            .ok_or(ShBundlerError::MissingOption("paymaster_url"))?,
        paymaster_address: options
            .paymaster_address
            .ok_or(ShBundlerError::MissingOption("paymaster_address"))?,
    };
    let public_client = Arc::new(http_provider(&endpoints.rpc_url)?);

    assemble(smart_account, signer, public_client, endpoints)
}

fn assemble<S: Signer + 'static>(
    smart_account: Arc<dyn SmartAccount>,
    signer: S,
    public_client: Arc<Provider<Http>>,
    endpoints: Endpoints,
) -> Result<ShBundlerSdk<S>, ShBundlerError> {
    let Endpoints { rpc_url, chain, bundler_url, paymaster_url, paymaster_address } = endpoints;

    let wallet_client =
        SignerMiddleware::new(public_client.clone(), signer.with_chain_id(chain.id()));
    let paymaster_client = Arc::new(PaymasterClient::connect(&paymaster_url)?);
    let bundler_client = BundlerClient::connect(NAME, &bundler_url)?;

    info!(
        "shBundler client ready on chain {chain} (rpc {rpc_url}, bundler {bundler_url}, paymaster {paymaster_url}) for smart account {:?}",
        smart_account.address()
    );

    Ok(ShBundlerSdk {
        public_client,
        wallet_client,
        smart_account,
        paymaster_client,
        bundler_client,
        chain,
        bundler_url,
        paymaster_address,
    })
}
