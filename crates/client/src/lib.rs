//! shBundler client: ERC-4337 smart accounts submitting user operations through shBundler
//!
//! [create_sh_bundler_client] resolves the endpoints of the chain (falling back to the published
//! network defaults), builds the smart account selected for the chain and entry point version,
//! and assembles the chain, paymaster and bundler clients around it.

pub mod account;
mod bundler;
pub mod error;
mod gas;
mod networks;
mod paymaster;
mod sdk;
mod smart_account_client;

pub use account::{
    select_account, to_smart_account, AccountSelection, SafeAccount, SafeAddresses,
    SafeOperation, SimpleAccount, SmartAccount, SmartAccountKind,
};
pub use bundler::BundlerClient;
pub use error::ShBundlerError;
pub use gas::{get_user_operation_gas_price, BundlerGasPriceOracle, FeeEstimator};
pub use networks::{lookup_network_defaults, NetworkDefaultsSource, RemoteNetworkDefaults};
pub use paymaster::PaymasterClient;
pub use sdk::{
    create_sh_bundler_client, create_sh_bundler_client_from_smart_account,
    create_sh_bundler_client_with_defaults, SendUserOperationParams, ShBundlerClientOptions,
    ShBundlerSdk,
};
pub use smart_account_client::SmartAccountClient;
