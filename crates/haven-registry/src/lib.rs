//! Emergency registry module for the Haven recovery system.
//!
//! This module provides abstractions for the per-holder emergency records:
//! the registered backup address and the terminal blacklist flag. It defines
//! the interface registries must implement plus a service wrapper used by the
//! withdraw state machine.

use async_trait::async_trait;
use haven_types::Address;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during registry operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
	/// Error that occurs when a holder tries to register itself as backup.
	#[error("Backup address must differ from the holder")]
	SelfReferential,
	/// Error that occurs when the backup is the zero address.
	#[error("Backup address must not be the zero address")]
	ZeroBackup,
	/// Error that occurs when either party of a registration is blacklisted.
	#[error("Blacklisted party: {0}")]
	BlacklistedParty(Address),
	/// Error that occurs in the registry backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining the interface for emergency registry implementations.
///
/// Stores one `EmergencyRecord` per holder, created lazily. Implementations
/// must enforce the registration invariants and keep the blacklist flag
/// monotonic: once set it never reverts.
#[async_trait]
pub trait RegistryInterface: Send + Sync {
	/// Registers (or re-registers) `backup` as the emergency address for
	/// `holder`, overwriting any prior value.
	///
	/// Fails with `SelfReferential` if `backup == holder`, `ZeroBackup` if
	/// `backup` is the zero address, and `BlacklistedParty` if either party
	/// is blacklisted.
	async fn register(&self, holder: Address, backup: Address) -> Result<(), RegistryError>;

	/// Returns the registered backup for `holder`, or `Address::ZERO` when
	/// none has been registered.
	async fn lookup(&self, holder: Address) -> Result<Address, RegistryError>;

	/// Returns whether `holder` is blacklisted.
	async fn is_blacklisted(&self, holder: Address) -> Result<bool, RegistryError>;

	/// Marks `holder` as blacklisted. One-way transition: calling this for an
	/// already-blacklisted holder is a no-op with no observable side effects.
	async fn blacklist(&self, holder: Address) -> Result<(), RegistryError>;
}

#[async_trait]
impl<T: RegistryInterface + ?Sized> RegistryInterface for std::sync::Arc<T> {
	async fn register(&self, holder: Address, backup: Address) -> Result<(), RegistryError> {
		(**self).register(holder, backup).await
	}

	async fn lookup(&self, holder: Address) -> Result<Address, RegistryError> {
		(**self).lookup(holder).await
	}

	async fn is_blacklisted(&self, holder: Address) -> Result<bool, RegistryError> {
		(**self).is_blacklisted(holder).await
	}

	async fn blacklist(&self, holder: Address) -> Result<(), RegistryError> {
		(**self).blacklist(holder).await
	}
}

/// Service that manages emergency registry operations.
///
/// This struct provides a high-level interface for registry access,
/// wrapping an underlying registry implementation.
pub struct RegistryService {
	/// The underlying registry implementation.
	implementation: Box<dyn RegistryInterface>,
}

impl RegistryService {
	/// Creates a new RegistryService with the specified implementation.
	pub fn new(implementation: Box<dyn RegistryInterface>) -> Self {
		Self { implementation }
	}

	/// Registers `backup` as the emergency address for `holder`.
	pub async fn register(&self, holder: Address, backup: Address) -> Result<(), RegistryError> {
		self.implementation.register(holder, backup).await
	}

	/// Returns the registered backup for `holder` (`Address::ZERO` when unset).
	pub async fn lookup(&self, holder: Address) -> Result<Address, RegistryError> {
		self.implementation.lookup(holder).await
	}

	/// Returns whether `holder` is blacklisted.
	pub async fn is_blacklisted(&self, holder: Address) -> Result<bool, RegistryError> {
		self.implementation.is_blacklisted(holder).await
	}

	/// Marks `holder` as blacklisted (terminal, idempotent).
	pub async fn blacklist(&self, holder: Address) -> Result<(), RegistryError> {
		self.implementation.blacklist(holder).await
	}
}
