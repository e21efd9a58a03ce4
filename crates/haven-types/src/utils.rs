//! Utility functions for address parsing and hex formatting.
//!
//! This module provides helper functions for converting between hex strings
//! and addresses, plus timestamp retrieval, used throughout the recovery
//! service.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors that can occur when parsing an address from a hex string.
#[derive(Debug, Error)]
pub enum AddressParseError {
	/// The string is not valid hex.
	#[error("Invalid hex: {0}")]
	InvalidHex(String),
	/// The decoded value is not 20 bytes long.
	#[error("Invalid address length: expected 20 bytes, got {0}")]
	InvalidLength(usize),
}

/// Parses a 20-byte address from a hex string, with or without "0x" prefix.
pub fn parse_address(input: &str) -> Result<Address, AddressParseError> {
	let bytes = hex::decode(without_0x_prefix(input))
		.map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
	if bytes.len() != 20 {
		return Err(AddressParseError::InvalidLength(bytes.len()));
	}
	Ok(Address::from_slice(&bytes))
}

/// Adds "0x" prefix to a hex string if it doesn't already have one.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.to_lowercase().starts_with("0x") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Removes "0x" or "0X" prefix from a hex string if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Helper function to get current timestamp, returns 0 if system time is before UNIX epoch.
pub fn current_timestamp() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_address_roundtrip() {
		let addr = parse_address("0x5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();
		assert_eq!(
			with_0x_prefix(&hex::encode(addr.as_slice())),
			"0x5fbdb2315678afecb367f032d93f642f64180aa3"
		);

		// Prefix is optional
		let bare = parse_address("5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();
		assert_eq!(addr, bare);
	}

	#[test]
	fn test_parse_address_rejects_bad_input() {
		assert!(matches!(
			parse_address("0xzz"),
			Err(AddressParseError::InvalidHex(_))
		));
		assert!(matches!(
			parse_address("0x1234"),
			Err(AddressParseError::InvalidLength(2))
		));
	}

	#[test]
	fn test_prefix_helpers() {
		assert_eq!(with_0x_prefix("abcd"), "0xabcd");
		assert_eq!(with_0x_prefix("0xabcd"), "0xabcd");
		assert_eq!(without_0x_prefix("0Xabcd"), "abcd");
		assert_eq!(without_0x_prefix("abcd"), "abcd");
	}
}
