//! Account abstraction (ERC-4337) primitive types used by the shBundler client
//!
//! This crate contains the user operation, entry point, paymaster and gas types shared by the
//! client and the command line, together with packing helpers and wallet loading.

mod call;
pub mod constants;
mod entry_point;
mod gas;
mod networks;
mod paymaster;
mod user_operation;
pub mod utils;
mod wallet;

pub use call::Call;
pub use entry_point::{EntryPoint, EntryPointVersion};
pub use gas::{GasPrice, GasPriceResponse, GasPriceTier};
pub use networks::NetworkDefaults;
pub use paymaster::{
    PaymasterContext, PaymasterData, PaymasterMode, PaymasterSponsor, PaymasterStubData,
};
pub use user_operation::{
    UserOperation, UserOperationGasEstimation, UserOperationHash, UserOperationReceipt,
    UserOperationTypedData,
};
pub use utils::get_address;
pub use wallet::Wallet;
