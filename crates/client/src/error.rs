use ethers::providers::ProviderError;
use shbundler_contracts::EntryPointError;
use thiserror::Error;

/// Errors of the shBundler client
#[derive(Debug, Error)]
pub enum ShBundlerError {
    /// Required option is not set (and could not be filled from network defaults)
    #[error("missing required option: {0}")]
    MissingOption(&'static str),

    /// No network defaults are published for the chain
    #[error("no defaults found for chain id {chain_id}")]
    NoNetworkDefaults {
        /// Chain id reported by the RPC endpoint
        chain_id: u64,
    },

    /// Endpoint URL can't be parsed
    #[error("invalid url {url}: {inner}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// The inner error message
        inner: String,
    },

    /// JSON-RPC transport or provider error
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Middleware error (wallet or chain client)
    #[error("middleware error: {inner}")]
    Middleware {
        /// The inner error message
        inner: String,
    },

    /// Network defaults could not be fetched
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Entry point call failed
    #[error(transparent)]
    EntryPoint(#[from] EntryPointError),

    /// Response could not be decoded
    #[error("decode error: {inner}")]
    Decode {
        /// The inner error message
        inner: String,
    },

    /// Signer failed to sign
    #[error("signer error: {inner}")]
    Signer {
        /// The inner error message
        inner: String,
    },

    /// User operation without any call
    #[error("user operation needs at least one call")]
    EmptyCalls,

    /// The bundler client the fee estimator is bound to no longer exists
    #[error("bundler client was dropped")]
    BundlerDropped,
}

impl ShBundlerError {
    pub fn decode<E: std::fmt::Display>(err: E) -> Self {
        Self::Decode { inner: err.to_string() }
    }

    pub fn signer<E: std::fmt::Display>(err: E) -> Self {
        Self::Signer { inner: err.to_string() }
    }

    pub fn middleware<E: std::fmt::Display>(err: E) -> Self {
        Self::Middleware { inner: err.to_string() }
    }
}
