//! In-memory token ledger implementation.
//!
//! This module provides a memory-based implementation of the LedgerInterface
//! trait, useful for testing and for running the service against a local
//! balance table. A move holds the write lock across the debit and credit,
//! so it is atomic with respect to other moves and reads.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use haven_types::{Address, U256};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory ledger implementation.
pub struct MemoryLedger {
	/// Per-account balances protected by a read-write lock.
	balances: RwLock<HashMap<Address, U256>>,
}

impl MemoryLedger {
	/// Creates a new MemoryLedger with all balances at zero.
	pub fn new() -> Self {
		Self {
			balances: RwLock::new(HashMap::new()),
		}
	}

	/// Credits `amount` to `address`. Used to seed balances.
	pub async fn credit(&self, address: Address, amount: U256) -> Result<(), LedgerError> {
		let mut balances = self.balances.write().await;
		let balance = balances.entry(address).or_default();
		*balance = balance
			.checked_add(amount)
			.ok_or(LedgerError::BalanceOverflow(address))?;
		Ok(())
	}
}

impl Default for MemoryLedger {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl LedgerInterface for MemoryLedger {
	async fn balance_of(&self, address: Address) -> Result<U256, LedgerError> {
		let balances = self.balances.read().await;
		Ok(balances.get(&address).copied().unwrap_or(U256::ZERO))
	}

	async fn move_balance(
		&self,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		let mut balances = self.balances.write().await;

		let have = balances.get(&from).copied().unwrap_or(U256::ZERO);
		if have < amount {
			return Err(LedgerError::InsufficientBalance { have, need: amount });
		}
		// A self-move is a funded no-op, not a double credit.
		if from == to {
			return Ok(());
		}
		let credited = balances
			.get(&to)
			.copied()
			.unwrap_or(U256::ZERO)
			.checked_add(amount)
			.ok_or(LedgerError::BalanceOverflow(to))?;

		balances.insert(from, have - amount);
		balances.insert(to, credited);
		tracing::debug!(from = %from, to = %to, amount = %amount, "Balance moved");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ALICE: Address = Address::repeat_byte(0x01);
	const BOB: Address = Address::repeat_byte(0x02);

	#[tokio::test]
	async fn test_unknown_account_has_zero_balance() {
		let ledger = MemoryLedger::new();
		assert_eq!(ledger.balance_of(ALICE).await.unwrap(), U256::ZERO);
	}

	#[tokio::test]
	async fn test_move_balance() {
		let ledger = MemoryLedger::new();
		ledger.credit(ALICE, U256::from(1_000u64)).await.unwrap();

		ledger
			.move_balance(ALICE, BOB, U256::from(400u64))
			.await
			.unwrap();
		assert_eq!(ledger.balance_of(ALICE).await.unwrap(), U256::from(600u64));
		assert_eq!(ledger.balance_of(BOB).await.unwrap(), U256::from(400u64));
	}

	#[tokio::test]
	async fn test_move_fails_loudly_on_insufficient_funds() {
		let ledger = MemoryLedger::new();
		ledger.credit(ALICE, U256::from(10u64)).await.unwrap();

		let result = ledger.move_balance(ALICE, BOB, U256::from(11u64)).await;
		assert_eq!(
			result,
			Err(LedgerError::InsufficientBalance {
				have: U256::from(10u64),
				need: U256::from(11u64),
			})
		);

		// No partial effect
		assert_eq!(ledger.balance_of(ALICE).await.unwrap(), U256::from(10u64));
		assert_eq!(ledger.balance_of(BOB).await.unwrap(), U256::ZERO);
	}
}
