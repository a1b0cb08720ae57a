use alloy_chains::Chain;
use ethers::types::{Address, Bytes, U256};
use pin_utils::pin_mut;
use shbundler_primitives::{EntryPointVersion, PaymasterMode, UserOperationHash};
use std::{future::Future, str::FromStr};
use tracing::info;

/// Parses address from string
pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|_| format!("String {s} is not a valid address"))
}

/// Parses U256 from string
pub fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str_radix(s, 10).map_err(|_| format!("String {s} is not a valid U256"))
}

/// Parses hex-encoded bytes from string
pub fn parse_bytes(s: &str) -> Result<Bytes, String> {
    Bytes::from_str(s).map_err(|_| format!("String {s} is not valid hex data"))
}

/// Parses chain from its name or id
pub fn parse_chain(s: &str) -> Result<Chain, String> {
    Chain::from_str(s).map_err(|_| format!("String {s} is not a valid chain"))
}

/// Parses EntryPointVersion from string
pub fn parse_entry_point_version(s: &str) -> Result<EntryPointVersion, String> {
    EntryPointVersion::from_str(s)
        .map_err(|_| format!("String {s} is not a valid entry point version (0.7 or 0.8)"))
}

/// Parses PaymasterMode from string
pub fn parse_paymaster_mode(s: &str) -> Result<PaymasterMode, String> {
    PaymasterMode::from_str(s).map_err(|_| format!("String {s} is not a valid PaymasterMode"))
}

/// Parses UserOperationHash from string
pub fn parse_user_operation_hash(s: &str) -> Result<UserOperationHash, String> {
    UserOperationHash::from_str(s)
        .map_err(|_| format!("String {s} is not a valid user operation hash"))
}

/// Runs the future to completion or until:
/// - `ctrl-c` is received.
/// - `SIGTERM` is received (unix only).
pub async fn run_until_ctrl_c<F, E>(fut: F) -> Result<(), E>
where
    F: Future<Output = Result<(), E>>,
    E: Send + Sync + 'static + From<std::io::Error>,
{
    let ctrl_c = tokio::signal::ctrl_c();

    let mut stream = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let sigterm = stream.recv();
    pin_mut!(sigterm, ctrl_c, fut);

    tokio::select! {
        _ = ctrl_c => {
            info!("Received ctrl-c signal.");
        },
        _ = sigterm => {
            info!("Received SIGTERM signal.");
        },
        res = fut => res?,
    }

    Ok(())
}

pub fn validate_private_key(hex_string: &str) -> Result<String, String> {
    let key = hex_string.strip_prefix("0x").unwrap_or(hex_string);

    if key.chars().count() != 64 {
        return Err(format!("{hex_string} is not a valid private key"));
    }

    if !key.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{hex_string} is not a valid hexadecimal string"));
    }

    Ok(String::from(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_key_validation() {
        let key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        assert_eq!(validate_private_key(key).unwrap(), key);
        assert_eq!(validate_private_key(&format!("0x{key}")).unwrap(), key);
        assert!(validate_private_key("ac09").is_err());
        assert!(validate_private_key(&key.replace('a', "z")).is_err());
    }

    #[test]
    fn chain_by_name_or_id() {
        assert_eq!(parse_chain("mainnet").unwrap().id(), 1);
        assert_eq!(parse_chain("10143").unwrap().id(), 10143);
    }

    #[test]
    fn entry_point_versions() {
        assert_eq!(parse_entry_point_version("0.7").unwrap(), EntryPointVersion::V07);
        assert_eq!(parse_entry_point_version("0.8").unwrap(), EntryPointVersion::V08);
        assert!(parse_entry_point_version("0.6").is_err());
    }
}
