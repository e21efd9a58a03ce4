//! Clock abstraction used for signature expiry checks.
//!
//! The withdraw state machine compares the authorization's expiration against
//! a host-provided timestamp. Injecting the clock keeps the expiry boundary
//! testable without sleeping.

use crate::utils::current_timestamp;

/// Source of the current Unix timestamp in seconds.
pub trait Clock: Send + Sync {
	/// Returns the current time as seconds since the Unix epoch.
	fn now(&self) -> u64;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> u64 {
		current_timestamp()
	}
}
