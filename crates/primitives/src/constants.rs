//! Account abstraction (ERC-4337) and shBundler-related constants

/// Entry point smart contracts
pub mod entry_point {
    /// Address of the entry point v0.7 smart contract
    pub const ADDRESS_V07: &str = "0x0000000071727De22E5E9d8BAf0edAc6f37da032";
    /// Address of the entry point v0.8 smart contract
    pub const ADDRESS_V08: &str = "0x4337084D9e255Ff0702461CF8895CE9E3B5Ff108";
    /// Nonce key used for all user operations sent by this client
    pub const NONCE_KEY: u64 = 0;
    /// EIP-712 domain name of the v0.8 entry point
    pub const EIP712_NAME: &str = "ERC4337";
    /// EIP-712 domain version of the v0.8 entry point
    pub const EIP712_VERSION: &str = "1";
    /// EIP-712 type of the packed user operation (v0.8 hashing)
    pub const PACKED_USER_OPERATION_TYPE: &str = "PackedUserOperation(address sender,uint256 nonce,bytes initCode,bytes callData,bytes32 accountGasLimits,uint256 preVerificationGas,bytes32 gasFees,bytes paymasterAndData)";
}

/// Minimal single-owner account (eth-infinitism `SimpleAccount`)
pub mod simple_account {
    /// Simple account factory for entry point v0.7
    pub const FACTORY_V07: &str = "0x91E60e0613810449d098b0b5Ec8b51A0FE8c8985";
    /// Simple account factory for entry point v0.8
    pub const FACTORY_V08: &str = "0x13E9ed32155810FDbd067D4522C492D6f68E5944";
    /// Salt used for the counterfactual deployment
    pub const SALT: u64 = 0;
    /// Signature used while estimating gas (never valid, but of the right shape)
    pub const DUMMY_SIGNATURE: &str = "0xfffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c";
}

/// Safe-style multi-owner account (Safe + 4337 module)
pub mod safe {
    /// Safe contracts version
    pub const VERSION: &str = "1.4.1";
    /// Owners threshold
    pub const THRESHOLD: u64 = 1;
    /// Salt nonce used for the proxy deployment
    pub const SALT_NONCE: u64 = 0;
    /// EIP-712 type of the Safe operation signed by the owners
    pub const SAFE_OP_TYPE: &str = "SafeOp(address safe,uint256 nonce,bytes initCode,bytes callData,uint128 verificationGasLimit,uint128 callGasLimit,uint256 preVerificationGas,uint128 maxPriorityFeePerGas,uint128 maxFeePerGas,bytes paymasterAndData,uint48 validAfter,uint48 validUntil,address entryPoint)";
    /// Owner signature used while estimating gas
    pub const DUMMY_SIGNATURE: &str = "0xfffffffffffffffffffffffffffffff0000000000000000000000000000000007aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1c";

    /// Contracts deployed on Monad testnet (used until entry point v0.8 accounts are deployed)
    pub mod monad_testnet {
        pub const SAFE_4337_MODULE: &str = "0x02b336F533F2de3F221540eF56583e9cb8E65203";
        pub const SAFE_PROXY_FACTORY: &str = "0xd9d2Ba03a7754250FDD71333F444636471CACBC4";
        pub const SAFE_SINGLETON: &str = "0x639245e8476E03e789a244f279b5843b9633b2E7";
        pub const SAFE_MODULE_SETUP: &str = "0x2dd68b007B46fBe91B9A7c3EDa5A7a1063cB5b47";
        pub const MULTI_SEND: &str = "0x7B21BBDBdE8D01Df591fdc2dc0bE9956Dde1e16C";
        pub const MULTI_SEND_CALL_ONLY: &str = "0x32228dDEA8b9A2bd7f2d71A958fF241D79ca5eEC";
    }
}

/// Chains with special handling
pub mod chains {
    /// Monad testnet
    pub const MONAD_TESTNET: u64 = 10143;
}

/// Network defaults
pub mod networks {
    /// Hosted document with bundler/paymaster endpoints per chain id
    pub const DEFAULTS_URL: &str =
        "https://raw.githubusercontent.com/FastLane-Labs/shbundler-sdk/main/configs/networks.json";
}

/// Bundler
pub mod bundler {
    /// Name of the bundler client
    pub const NAME: &str = "shBundler";
}

/// JSON-RPC methods of the bundler and paymaster
pub mod rpc_methods {
    pub const GAS_PRICE: &str = "gas_getUserOperationGasPrice";
    pub const SEND_USER_OPERATION: &str = "eth_sendUserOperation";
    pub const ESTIMATE_USER_OPERATION_GAS: &str = "eth_estimateUserOperationGas";
    pub const GET_USER_OPERATION_RECEIPT: &str = "eth_getUserOperationReceipt";
    pub const SUPPORTED_ENTRY_POINTS: &str = "eth_supportedEntryPoints";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const PAYMASTER_STUB_DATA: &str = "pm_getPaymasterStubData";
    pub const PAYMASTER_DATA: &str = "pm_getPaymasterData";
}
