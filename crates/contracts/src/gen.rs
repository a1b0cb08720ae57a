use ethers::contract::abigen;

abigen!(
    EntryPointAPI,
    r#"[
        function getNonce(address sender, uint192 key) public view returns (uint256 nonce)
        function getSenderAddress(bytes memory initCode) external
        error FailedOp(uint256 opIndex, string reason)
        error FailedOpWithRevert(uint256 opIndex, string reason, bytes inner)
        error SenderAddressResult(address sender)
    ]"#
);

abigen!(
    SimpleAccountFactory,
    r#"[
        function createAccount(address owner, uint256 salt) public returns (address ret)
    ]"#
);

abigen!(
    SimpleAccount,
    r#"[
        function execute(address dest, uint256 value, bytes calldata func) external
        function executeBatch(address[] calldata dest, uint256[] calldata value, bytes[] calldata func) external
    ]"#
);

abigen!(
    SafeProxyFactory,
    r#"[
        function createProxyWithNonce(address singleton, bytes memory initializer, uint256 saltNonce) public returns (address proxy)
    ]"#
);

abigen!(
    Safe,
    r#"[
        function setup(address[] calldata owners, uint256 threshold, address to, bytes calldata data, address fallbackHandler, address paymentToken, uint256 payment, address paymentReceiver) external
    ]"#
);

abigen!(
    SafeModuleSetup,
    r#"[
        function enableModules(address[] calldata modules) external
    ]"#
);

abigen!(
    SafeUserOperationModule,
    r#"[
        function executeUserOp(address to, uint256 value, bytes memory data, uint8 operation) external
    ]"#
);

abigen!(
    MultiSend,
    r#"[
        function multiSend(bytes memory transactions) public payable
    ]"#
);
