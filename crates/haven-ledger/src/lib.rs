//! Token ledger collaborator module for the Haven recovery system.
//!
//! The withdraw state machine does not own token accounting; it consumes the
//! two primitives defined here: a balance lookup and an atomic balance move.
//! This module provides the collaborator interface plus a service wrapper.

use async_trait::async_trait;
use haven_types::{Address, U256};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
	/// Error that occurs when a move exceeds the source balance.
	#[error("Insufficient balance: have {have}, need {need}")]
	InsufficientBalance { have: U256, need: U256 },
	/// Error that occurs when a credit would overflow the destination balance.
	#[error("Balance overflow for {0}")]
	BalanceOverflow(Address),
	/// Error that occurs in the ledger backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the balance primitives the withdraw core consumes.
///
/// `move_balance` must be atomic with respect to concurrent moves: the debit
/// and credit happen as one isolated step, and it fails loudly when the
/// source balance is insufficient even though callers are expected to check
/// first. That keeps a concurrent drain from turning a checked move into a
/// silent partial one.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	/// Returns the current balance of `address` (zero for unknown accounts).
	async fn balance_of(&self, address: Address) -> Result<U256, LedgerError>;

	/// Moves `amount` from `from` to `to`, failing with `InsufficientBalance`
	/// when `balance_of(from) < amount`.
	async fn move_balance(&self, from: Address, to: Address, amount: U256)
		-> Result<(), LedgerError>;
}

#[async_trait]
impl<T: LedgerInterface + ?Sized> LedgerInterface for std::sync::Arc<T> {
	async fn balance_of(&self, address: Address) -> Result<U256, LedgerError> {
		(**self).balance_of(address).await
	}

	async fn move_balance(
		&self,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		(**self).move_balance(from, to, amount).await
	}
}

/// Service that manages ledger operations.
///
/// This struct provides a high-level interface for balance access,
/// wrapping an underlying ledger implementation.
pub struct LedgerService {
	/// The underlying ledger implementation.
	implementation: Box<dyn LedgerInterface>,
}

impl LedgerService {
	/// Creates a new LedgerService with the specified implementation.
	pub fn new(implementation: Box<dyn LedgerInterface>) -> Self {
		Self { implementation }
	}

	/// Returns the current balance of `address`.
	pub async fn balance_of(&self, address: Address) -> Result<U256, LedgerError> {
		self.implementation.balance_of(address).await
	}

	/// Moves `amount` from `from` to `to` atomically.
	pub async fn move_balance(
		&self,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		self.implementation.move_balance(from, to, amount).await
	}
}
