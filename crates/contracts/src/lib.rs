//! Smart contract interfaces used by the shBundler client (entry point, simple account, Safe)

pub mod entry_point;
mod error;
pub mod gen;

pub use entry_point::EntryPoint;
pub use error::{decode_revert_error, decode_revert_string, EntryPointError};
pub use gen::{EntryPointAPIErrors, FailedOp, SenderAddressResult};
