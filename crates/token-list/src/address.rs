use tiny_keccak::{Hasher, Keccak};

use crate::error::Error;
use crate::network::NetworkId;

/// Lowercase form of an address, used for every comparison.
pub fn normalize_address(address: &str) -> String {
    address.to_lowercase()
}

/// Composite index key: `{lowercase address}|{network id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressNetworkKey(String);

impl AddressNetworkKey {
    pub fn new(address: &str, network_id: NetworkId) -> Self {
        Self(format!("{}|{}", normalize_address(address), network_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Whether `address` is `0x` followed by 40 hex digits (any case).
pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x").or_else(|| address.strip_prefix("0X")) {
        Some(digits) => digits.len() == 40 && hex::decode(digits).is_ok(),
        None => false,
    }
}

/// EIP-55 mixed-case checksum encoding.
pub fn to_checksum_address(address: &str) -> Result<String, Error> {
    if !is_valid_address(address) {
        return Err(Error::InvalidAddress(address.to_string()));
    }
    let hex_addr = normalize_address(&address[2..]);

    let mut hasher = Keccak::v256();
    hasher.update(hex_addr.as_bytes());
    let mut hash = [0u8; 32];
    hasher.finalize(&mut hash);

    let mut result = String::with_capacity(42);
    result.push_str("0x");
    for (i, c) in hex_addr.chars().enumerate() {
        let hash_nibble = if i % 2 == 0 {
            (hash[i / 2] >> 4) & 0x0f
        } else {
            hash[i / 2] & 0x0f
        };
        if hash_nibble >= 8 {
            result.push(c.to_ascii_uppercase());
        } else {
            result.push(c);
        }
    }
    Ok(result)
}
