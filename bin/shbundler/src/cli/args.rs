use crate::utils::{
    parse_address, parse_bytes, parse_chain, parse_entry_point_version, parse_paymaster_mode,
    parse_u256, parse_user_operation_hash, validate_private_key,
};
use alloy_chains::Chain;
use clap::Parser;
use ethers::{
    signers::LocalWallet,
    types::{Address, Bytes, U256},
};
use expanded_pathbuf::ExpandedPathBuf;
use shbundler_client::{RemoteNetworkDefaults, ShBundlerClientOptions};
use shbundler_primitives::{
    constants::networks::DEFAULTS_URL, EntryPointVersion, PaymasterContext, PaymasterMode,
    UserOperationHash, Wallet,
};

/// Chain and service endpoints args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct ClientArgs {
    /// Chain node RPC endpoint.
    #[clap(long)]
    pub rpc_url: String,

    /// Chain (name or id) the smart account lives on.
    #[clap(long, value_parser=parse_chain)]
    pub chain: Chain,

    /// shBundler endpoint.
    ///
    /// By default, the endpoint published for the chain is used.
    #[clap(long)]
    pub bundler_url: Option<String>,

    /// Paymaster endpoint.
    ///
    /// By default, the endpoint published for the chain is used.
    #[clap(long)]
    pub paymaster_url: Option<String>,

    /// Paymaster contract address.
    ///
    /// By default, the address published for the chain is used.
    #[clap(long, value_parser=parse_address)]
    pub paymaster_address: Option<Address>,

    /// Entry point version of the smart account (0.7 or 0.8).
    #[clap(long, default_value = "0.8", value_parser=parse_entry_point_version)]
    pub entry_point_version: EntryPointVersion,

    /// Document with the per-chain endpoint defaults.
    #[clap(long, default_value = DEFAULTS_URL)]
    pub defaults_url: String,
}

impl ClientArgs {
    /// Options of the shBundler client owned by the wallet
    pub fn options(&self, wallet: Wallet) -> ShBundlerClientOptions<LocalWallet> {
        let mut options = ShBundlerClientOptions::new()
            .signer(wallet.signer)
            .rpc_url(self.rpc_url.clone())
            .chain(self.chain)
            .entry_point_version(self.entry_point_version);
        options.bundler_url = self.bundler_url.clone();
        options.paymaster_url = self.paymaster_url.clone();
        options.paymaster_address = self.paymaster_address;
        options
    }

    pub fn network_defaults(&self) -> RemoteNetworkDefaults {
        RemoteNetworkDefaults::new(self.defaults_url.clone())
    }
}

/// Owner key args (exactly one source)
#[derive(Debug, Clone, Parser)]
#[group(required = true, multiple = false)]
pub struct WalletArgs {
    /// Hex-encoded private key of the owner.
    #[clap(long, value_parser=validate_private_key)]
    pub private_key: Option<String>,

    /// Mnemonic phrase of the owner.
    #[clap(long)]
    pub mnemonic_phrase: Option<String>,

    /// Path to the file with the mnemonic phrase of the owner.
    #[clap(long)]
    pub mnemonic_file: Option<ExpandedPathBuf>,
}

impl WalletArgs {
    /// Loads the owner key
    pub fn wallet(&self, chain_id: u64) -> eyre::Result<Wallet> {
        if let Some(key) = &self.private_key {
            Wallet::from_private_key(key, chain_id)
        } else if let Some(phrase) = &self.mnemonic_phrase {
            Wallet::from_phrase(phrase, chain_id)
        } else if let Some(path) = &self.mnemonic_file {
            Wallet::from_file(path.clone(), chain_id)
        } else {
            Err(eyre::eyre!("No private key, mnemonic phrase or mnemonic file given"))
        }
    }
}

/// User operation args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct SendArgs {
    /// Target of the call.
    #[clap(long, value_parser=parse_address)]
    pub to: Address,

    /// Hex-encoded call data.
    #[clap(long, default_value = "0x", value_parser=parse_bytes)]
    pub data: Bytes,

    /// Sponsorship mode, no paymaster context is sent without it.
    #[clap(long, value_parser=parse_paymaster_mode)]
    pub paymaster_mode: Option<PaymasterMode>,

    /// Sponsor paying for the user operation (sponsor mode).
    #[clap(long, value_parser=parse_address)]
    pub sponsor: Option<Address>,

    /// Signature of the sponsor (sponsor mode).
    #[clap(long, value_parser=parse_bytes)]
    pub sponsor_signature: Option<Bytes>,

    /// Timestamp the sponsorship is valid after.
    #[clap(long, value_parser=parse_u256)]
    pub valid_after: Option<U256>,

    /// Timestamp the sponsorship is valid until.
    #[clap(long, value_parser=parse_u256)]
    pub valid_until: Option<U256>,
}

impl SendArgs {
    /// Paymaster context for the paymaster address, when a sponsorship mode is given
    pub fn paymaster_context(&self, paymaster_address: Address) -> Option<PaymasterContext> {
        let mode = self.paymaster_mode?;
        Some(PaymasterContext {
            paymaster_address,
            mode,
            sponsor: self.sponsor,
            sponsor_signature: self.sponsor_signature.clone(),
            valid_until: self.valid_until,
            valid_after: self.valid_after,
        })
    }
}

/// Bundler endpoint args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct BundlerArgs {
    /// shBundler endpoint.
    #[clap(long)]
    pub bundler_url: String,
}

/// User operation receipt args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct ReceiptArgs {
    /// Hash of the user operation.
    #[clap(long, value_parser=parse_user_operation_hash)]
    pub hash: UserOperationHash,
}

/// Network defaults args
#[derive(Debug, Clone, Parser, PartialEq)]
pub struct DefaultsArgs {
    /// Chain (name or id) to look up.
    #[clap(long, value_parser=parse_chain)]
    pub chain: Chain,

    /// Document with the per-chain endpoint defaults.
    #[clap(long, default_value = DEFAULTS_URL)]
    pub defaults_url: String,
}
