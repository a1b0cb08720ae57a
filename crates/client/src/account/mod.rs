//! Smart accounts owned by a local signer
//!
//! Two variants share the [SmartAccount] capability surface: a minimal single-owner
//! [SimpleAccount] and a Safe-style [SafeAccount] used on Monad testnet until entry point v0.8
//! accounts are deployed there.

mod safe;
mod simple;

pub use safe::{SafeAccount, SafeAddresses, SafeOperation};
pub use simple::SimpleAccount;

use crate::error::ShBundlerError;
use async_trait::async_trait;
use ethers::{
    providers::Middleware,
    signers::Signer,
    types::{Address, Bytes, U256},
};
use shbundler_contracts::EntryPoint as EntryPointContract;
use shbundler_primitives::{
    constants::{chains::MONAD_TESTNET, entry_point::NONCE_KEY},
    Call, EntryPoint, EntryPointVersion, UserOperation,
};
use std::{fmt::Debug, sync::Arc};
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Smart account variants
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SmartAccountKind {
    /// Minimal single-owner account
    Simple,
    /// Safe with the 4337 module
    Safe,
}

/// Capabilities of a smart account needed to build and sign user operations
#[async_trait]
pub trait SmartAccount: Send + Sync + Debug {
    fn kind(&self) -> SmartAccountKind;

    /// Counterfactual (or deployed) address of the account
    fn address(&self) -> Address;

    /// Entry point the account is bound to
    fn entry_point(&self) -> EntryPoint;

    /// Address of the owning signer
    fn owner(&self) -> Address;

    /// Next nonce of the account
    async fn get_nonce(&self) -> Result<U256, ShBundlerError>;

    /// Factory and factory data while the account is not deployed yet, `None` afterwards
    async fn get_factory_args(&self) -> Result<Option<(Address, Bytes)>, ShBundlerError>;

    /// Call data executing the calls from the account
    fn encode_calls(&self, calls: &[Call]) -> Result<Bytes, ShBundlerError>;

    /// Signature of the right shape used while estimating gas
    fn stub_signature(&self) -> Bytes;

    /// Signature validated by the account for the user operation
    async fn sign_user_operation(
        &self,
        uo: &UserOperation,
        chain_id: u64,
    ) -> Result<Bytes, ShBundlerError>;
}

/// Account variant chosen for a chain and entry point version
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountSelection {
    /// Simple account on the entry point of the requested version
    Simple { entry_point: EntryPoint },
    /// Safe account with the given entry point and contract set
    Safe { entry_point: EntryPoint, version: &'static str, addresses: SafeAddresses },
}

impl AccountSelection {
    pub fn kind(&self) -> SmartAccountKind {
        match self {
            AccountSelection::Simple { .. } => SmartAccountKind::Simple,
            AccountSelection::Safe { .. } => SmartAccountKind::Safe,
        }
    }

    pub fn entry_point(&self) -> EntryPoint {
        match self {
            AccountSelection::Simple { entry_point } |
            AccountSelection::Safe { entry_point, .. } => *entry_point,
        }
    }
}

/// Picks the account variant for the chain and entry point version
///
/// Monad testnet has no entry point v0.8 simple account: a v0.8 request there gets a Safe talking
/// to the v0.8 entry point address with the v0.7 protocol.
pub fn select_account(chain_id: u64, version: EntryPointVersion) -> AccountSelection {
    match (chain_id, version) {
        (MONAD_TESTNET, EntryPointVersion::V08) => AccountSelection::Safe {
            entry_point: EntryPoint::new(EntryPointVersion::V08.address(), EntryPointVersion::V07),
            version: shbundler_primitives::constants::safe::VERSION,
            addresses: SafeAddresses::monad_testnet(),
        },
        _ => AccountSelection::Simple { entry_point: version.into() },
    }
}

/// Builds the smart account selected for the chain and entry point version
///
/// Only the selected variant is constructed. Construction derives the counterfactual address
/// through the entry point (one RPC round-trip).
pub async fn to_smart_account<M, S>(
    eth_client: Arc<M>,
    signer: S,
    chain_id: u64,
    version: EntryPointVersion,
) -> Result<Arc<dyn SmartAccount>, ShBundlerError>
where
    M: Middleware + 'static,
    S: Signer + 'static,
{
    let selection = select_account(chain_id, version);
    debug!("Selected {} account for chain {chain_id} (entry point {version})", selection.kind());

    let account: Arc<dyn SmartAccount> = match selection {
        AccountSelection::Simple { entry_point } => {
            Arc::new(SimpleAccount::new(eth_client, signer, entry_point).await?)
        }
        AccountSelection::Safe { entry_point, addresses, .. } => {
            Arc::new(SafeAccount::new(eth_client, signer, entry_point, addresses).await?)
        }
    };

    debug!("Smart account address {:?}", account.address());
    Ok(account)
}

/// Counterfactual address of the account deployed by `factory` with `factory_data`
pub(crate) async fn counterfactual_address<M: Middleware + 'static>(
    eth_client: Arc<M>,
    entry_point: Address,
    factory: Address,
    factory_data: &Bytes,
) -> Result<Address, ShBundlerError> {
    let init_code: Bytes = [factory.as_bytes(), factory_data.as_ref()].concat().into();
    Ok(EntryPointContract::new(eth_client, entry_point).get_sender_address(init_code).await?)
}

/// Nonce of the account under the default nonce key
pub(crate) async fn account_nonce<M: Middleware + 'static>(
    eth_client: Arc<M>,
    entry_point: Address,
    account: Address,
) -> Result<U256, ShBundlerError> {
    Ok(EntryPointContract::new(eth_client, entry_point)
        .get_nonce(&account, NONCE_KEY.into())
        .await?)
}

/// Factory arguments, only while the account has no code
pub(crate) async fn factory_args<M: Middleware + 'static>(
    eth_client: &M,
    account: Address,
    factory: Address,
    factory_data: &Bytes,
) -> Result<Option<(Address, Bytes)>, ShBundlerError> {
    let code = eth_client.get_code(account, None).await.map_err(ShBundlerError::middleware)?;
    if code.is_empty() {
        Ok(Some((factory, factory_data.clone())))
    } else {
        Ok(None)
    }
}
