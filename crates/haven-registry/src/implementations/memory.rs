//! In-memory emergency registry implementation.
//!
//! This module provides a memory-based implementation of the RegistryInterface
//! trait. All records live in a HashMap behind a read-write lock; each mutating
//! operation holds the write guard for its full check-then-update sequence, so
//! the registration invariants are enforced atomically.

use crate::{RegistryError, RegistryInterface};
use async_trait::async_trait;
use haven_types::{Address, EmergencyRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory registry implementation.
///
/// Records are created lazily on first registration or blacklisting.
/// There is no delete operation; a record only ever grows more restrictive.
pub struct MemoryRegistry {
	/// Per-holder records protected by a read-write lock.
	records: RwLock<HashMap<Address, EmergencyRecord>>,
}

impl MemoryRegistry {
	/// Creates a new empty MemoryRegistry.
	pub fn new() -> Self {
		Self {
			records: RwLock::new(HashMap::new()),
		}
	}
}

impl Default for MemoryRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl RegistryInterface for MemoryRegistry {
	async fn register(&self, holder: Address, backup: Address) -> Result<(), RegistryError> {
		if backup == holder {
			return Err(RegistryError::SelfReferential);
		}
		if backup == Address::ZERO {
			return Err(RegistryError::ZeroBackup);
		}

		let mut records = self.records.write().await;
		if records.get(&holder).is_some_and(|r| r.blacklisted) {
			return Err(RegistryError::BlacklistedParty(holder));
		}
		if records.get(&backup).is_some_and(|r| r.blacklisted) {
			return Err(RegistryError::BlacklistedParty(backup));
		}

		records.entry(holder).or_default().backup_address = backup;
		Ok(())
	}

	async fn lookup(&self, holder: Address) -> Result<Address, RegistryError> {
		let records = self.records.read().await;
		Ok(records
			.get(&holder)
			.map(|r| r.backup_address)
			.unwrap_or(Address::ZERO))
	}

	async fn is_blacklisted(&self, holder: Address) -> Result<bool, RegistryError> {
		let records = self.records.read().await;
		Ok(records.get(&holder).is_some_and(|r| r.blacklisted))
	}

	async fn blacklist(&self, holder: Address) -> Result<(), RegistryError> {
		let mut records = self.records.write().await;
		let record = records.entry(holder).or_default();
		if !record.blacklisted {
			record.blacklisted = true;
			tracing::debug!(holder = %holder, "Holder blacklisted");
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const HOLDER: Address = Address::repeat_byte(0xaa);
	const BACKUP: Address = Address::repeat_byte(0xbb);
	const OTHER: Address = Address::repeat_byte(0xcc);

	#[tokio::test]
	async fn test_register_and_lookup() {
		let registry = MemoryRegistry::new();

		assert_eq!(registry.lookup(HOLDER).await.unwrap(), Address::ZERO);
		registry.register(HOLDER, BACKUP).await.unwrap();
		assert_eq!(registry.lookup(HOLDER).await.unwrap(), BACKUP);

		// Re-registration overwrites
		registry.register(HOLDER, OTHER).await.unwrap();
		assert_eq!(registry.lookup(HOLDER).await.unwrap(), OTHER);
	}

	#[tokio::test]
	async fn test_register_rejects_self_and_zero() {
		let registry = MemoryRegistry::new();

		assert_eq!(
			registry.register(HOLDER, HOLDER).await,
			Err(RegistryError::SelfReferential)
		);
		assert_eq!(
			registry.register(HOLDER, Address::ZERO).await,
			Err(RegistryError::ZeroBackup)
		);
	}

	#[tokio::test]
	async fn test_register_rejects_blacklisted_parties() {
		let registry = MemoryRegistry::new();
		registry.blacklist(BACKUP).await.unwrap();

		assert_eq!(
			registry.register(HOLDER, BACKUP).await,
			Err(RegistryError::BlacklistedParty(BACKUP))
		);

		registry.blacklist(HOLDER).await.unwrap();
		assert_eq!(
			registry.register(HOLDER, OTHER).await,
			Err(RegistryError::BlacklistedParty(HOLDER))
		);
	}

	#[tokio::test]
	async fn test_blacklist_is_terminal_and_idempotent() {
		let registry = MemoryRegistry::new();
		registry.register(HOLDER, BACKUP).await.unwrap();

		registry.blacklist(HOLDER).await.unwrap();
		assert!(registry.is_blacklisted(HOLDER).await.unwrap());

		// Second call is a no-op: still blacklisted, backup untouched
		registry.blacklist(HOLDER).await.unwrap();
		assert!(registry.is_blacklisted(HOLDER).await.unwrap());
		assert_eq!(registry.lookup(HOLDER).await.unwrap(), BACKUP);
	}
}
