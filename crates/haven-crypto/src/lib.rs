//! Typed-data hashing and signature recovery for the Haven recovery system.
//!
//! This crate implements the verification core:
//! - EIP-712 domain separator construction bound to the deployment
//!   (token name, optional version, chain id, contract address)
//! - Canonical struct hashing for the `EmergencyWithdraw` message and the
//!   final signing digest (`0x19 0x01 || domainSeparator || structHash`)
//! - secp256k1 public-key recovery with explicit r/s/v validation and
//!   EIP-2 low-s enforcement

pub mod eip712;
pub mod recover;

pub use eip712::{
	Eip712Domain, Eip712Signing, DOMAIN_TYPE_MINIMAL, DOMAIN_TYPE_WITH_VERSION,
	EMERGENCY_WITHDRAW_TYPE,
};
pub use recover::{public_key_address, recover_signer, SignatureError};
