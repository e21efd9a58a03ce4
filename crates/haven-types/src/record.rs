//! Emergency recovery record and authorization types.
//!
//! These are the durable and ephemeral data shapes the withdraw pipeline
//! operates on: the per-holder registry record, the one-shot signed
//! authorization, and the settlement receipt.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Per-holder registry entry.
///
/// Created lazily on first registration. The `blacklisted` flag is terminal:
/// once set it never reverts, which is what makes a settled emergency
/// withdraw non-replayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyRecord {
	/// Destination for an emergency withdraw. `Address::ZERO` means unset.
	pub backup_address: Address,
	/// Terminal marker set when this holder's authorization has been consumed.
	pub blacklisted: bool,
}

impl Default for EmergencyRecord {
	fn default() -> Self {
		Self {
			backup_address: Address::ZERO,
			blacklisted: false,
		}
	}
}

/// A one-shot, offline-signed emergency withdraw authorization.
///
/// Never persisted; carried from the request layer into the core, verified,
/// and discarded. The `holder` field is bound into the signed struct hash,
/// so a signature only verifies against the holder it was minted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawAuthorization {
	/// The holder whose funds the signature claims to move.
	pub holder: Address,
	/// Unix timestamp (seconds); the signature is valid strictly before this.
	pub expiration: u64,
	/// Recovery id in Electrum notation (27 or 28).
	pub v: u8,
	/// ECDSA signature r component.
	pub r: B256,
	/// ECDSA signature s component.
	pub s: B256,
}

/// Outcome of a settled emergency withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
	/// The account that submitted the authorization.
	pub caller: Address,
	/// The recovered signer whose balance moved.
	pub signer: Address,
	/// Where the funds landed (the backup, or its backup if blacklisted).
	pub destination: Address,
	/// Full balance that was moved.
	pub amount: U256,
}
