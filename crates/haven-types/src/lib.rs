//! Common types module for the Haven recovery system.
//!
//! This module defines the core data types and structures shared across the
//! recovery service. It provides a centralized location for the emergency
//! record, authorization and receipt types, the clock abstraction, and a
//! handful of formatting utilities.

/// Clock abstraction for expiry checks.
pub mod clock;
/// Emergency record, authorization and receipt types.
pub mod record;
/// Address parsing and hex formatting helpers.
pub mod utils;

// Re-export the primitive types used throughout the workspace so that
// downstream crates agree on a single alloy-primitives version.
pub use alloy_primitives::{Address, B256, U256};

pub use clock::{Clock, SystemClock};
pub use record::{EmergencyRecord, WithdrawAuthorization, WithdrawReceipt};
pub use utils::{
	current_timestamp, parse_address, with_0x_prefix, without_0x_prefix, AddressParseError,
};
