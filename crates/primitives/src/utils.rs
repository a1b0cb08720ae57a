//! Misc utils

use ethers::{
    abi::AbiEncode,
    types::{Address, Bytes, U128, U256},
    utils::to_checksum,
};

/// Converts address to checksum address
pub fn as_checksum_addr<S>(val: &Address, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&to_checksum(val, None))
}

/// Decodes a `0x`-prefixed hexadecimal quantity into U256
pub fn parse_hex_u256(s: &str) -> Result<U256, String> {
    let digits = s.strip_prefix("0x").ok_or_else(|| format!("{s} is not 0x-prefixed"))?;
    if digits.is_empty() {
        return Err(format!("{s} has no digits"));
    }
    U256::from_str_radix(digits, 16).map_err(|e| format!("{s} is not a valid hex quantity: {e}"))
}

/// If possible, parses address from the first 20 bytes
pub fn get_address(buf: &[u8]) -> Option<Address> {
    if buf.len() >= 20 {
        Some(Address::from_slice(&buf[0..20]))
    } else {
        None
    }
}

pub fn pack_paymaster_data(
    addr: Address,
    paymaster_verification_gas_limit: U256,
    paymaster_post_op_gas_limit: U256,
    paymaster_data: &Bytes,
) -> Vec<u8> {
    if addr.is_zero() {
        vec![]
    } else {
        let gas_data = pack_uint128(paymaster_verification_gas_limit, paymaster_post_op_gas_limit);
        [addr.0.to_vec(), gas_data.encode(), paymaster_data.to_vec()].concat()
    }
}

pub fn pack_factory_data(factory: Address, factory_data: &Bytes) -> Vec<u8> {
    if factory.is_zero() {
        vec![]
    } else {
        [factory.0.to_vec(), factory_data.to_vec()].concat()
    }
}

/// Packs two uint128
pub fn pack_uint128(a: U256, b: U256) -> [u8; 32] {
    let mut res = [0u8; 32];
    let a: U128 = {
        let mut tem = [0; 32];
        a.to_big_endian(&mut tem);
        U128::from_big_endian(&tem[16..32])
    };
    let b: U128 = {
        let mut tem = [0; 32];
        b.to_big_endian(&mut tem);
        U128::from_big_endian(&tem[16..32])
    };
    a.to_big_endian(&mut res[0..16]);
    b.to_big_endian(&mut res[16..32]);
    res
}

/// Unpacks two uint128 from bytes
pub fn unpack_uint128(buf: &[u8]) -> (U256, U256) {
    let mut a = [0u8; 16];
    let mut b = [0u8; 16];
    a.copy_from_slice(&buf[0..16]);
    b.copy_from_slice(&buf[16..32]);
    (U256::from_big_endian(&a), U256::from_big_endian(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_u128() {
        let a: U256 = 100.into();
        let b: U256 = 200.into();
        let packed = pack_uint128(a, b);
        let (new_a, new_b) = unpack_uint128(&packed);
        assert_eq!(a, new_a, "unpack a worked");
        assert_eq!(b, new_b, "unpack b worked");
    }

    #[test]
    fn pack_factory_data_prefix() {
        let addr: Address = "0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5".parse().unwrap();
        let data: Bytes = "0x12345678".parse().unwrap();
        let packed = pack_factory_data(addr, &data);
        assert_eq!(get_address(&packed), Some(addr));
        assert_eq!(&packed[20..], data.as_ref());
        assert!(pack_factory_data(Address::zero(), &data).is_empty());
    }

    #[test]
    fn pack_paymaster_data_layout() {
        let addr: Address = "0x95222290DD7278Aa3Ddd389Cc1E1d165CC4BAfe5".parse().unwrap();
        let data: Bytes = "0xabcd".parse().unwrap();
        let packed = pack_paymaster_data(addr, 50_000.into(), 10_000.into(), &data);
        assert_eq!(packed.len(), 20 + 32 + 2);
        let (verification, post_op) = unpack_uint128(&packed[20..52]);
        assert_eq!(verification, 50_000.into());
        assert_eq!(post_op, 10_000.into());
        assert!(pack_paymaster_data(Address::zero(), 1.into(), 1.into(), &data).is_empty());
    }

    #[test]
    fn parse_hex_quantities() {
        assert_eq!(parse_hex_u256("0x3b9aca00").unwrap(), U256::from(1_000_000_000u64));
        assert_eq!(parse_hex_u256("0x1").unwrap(), U256::one());
        assert!(parse_hex_u256("3b9aca00").is_err());
        assert!(parse_hex_u256("0x").is_err());
        assert!(parse_hex_u256("0xzz").is_err());
    }
}
