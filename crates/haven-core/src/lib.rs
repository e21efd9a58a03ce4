//! Core engine for the Haven recovery system.
//!
//! This crate hosts the emergency withdraw state machine: it turns a raw
//! signed authorization into a settled balance move by running, in order,
//! digest construction, signature recovery, expiry and registry checks, the
//! balance transfer, and the terminal blacklist flip. Every check is a hard
//! precondition; the first failure aborts the whole operation with no
//! partial effect.

use dashmap::DashMap;
use haven_crypto::{recover_signer, Eip712Signing, SignatureError};
use haven_ledger::{LedgerError, LedgerService};
use haven_registry::{RegistryError, RegistryService};
use haven_types::{Address, Clock, WithdrawAuthorization, WithdrawReceipt};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that can occur while processing recovery operations.
///
/// All failures are scoped to the single invocation and non-retryable
/// without caller corrective action (re-sign with a new expiration, register
/// a backup first, and so on).
#[derive(Debug, Error)]
pub enum WithdrawError {
	/// The signature is malformed or does not recover.
	#[error("Invalid signature: {0}")]
	InvalidSignature(#[from] SignatureError),
	/// The signature recovers, but not to the holder it claims to act for.
	#[error("Recovered signer {recovered} does not match claimed holder {claimed}")]
	SignerMismatch { claimed: Address, recovered: Address },
	/// The authorization's expiration is not strictly in the future.
	#[error("Signature expired")]
	SignatureExpired,
	/// The signer has no backup address registered.
	#[error("No backup address registered")]
	NoBackupRegistered,
	/// The signer's authorization has already been consumed.
	#[error("Signer is blacklisted")]
	SignerBlacklisted,
	/// The signer holds no balance to recover.
	#[error("Signer balance is zero")]
	ZeroBalance,
	/// The queried holder is the zero address.
	#[error("Holder must not be the zero address")]
	ZeroHolder,
	/// Error from the emergency registry.
	#[error(transparent)]
	Registry(#[from] RegistryError),
	/// Error from the token ledger collaborator.
	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

/// The emergency recovery engine.
///
/// Holds the signing context (with its memoized domain separator), the
/// registry owning the durable per-holder records, the ledger collaborator,
/// and the clock used for expiry checks.
///
/// The registry's blacklist flag is the only durable marker an authorization
/// leaves behind; because it is checked before and set after the balance
/// move, at most one withdraw per signer ever settles.
pub struct RecoveryEngine {
	/// Emergency registry service.
	registry: Arc<RegistryService>,
	/// Token ledger collaborator.
	ledger: Arc<LedgerService>,
	/// EIP-712 signing context.
	signing: Eip712Signing,
	/// Timestamp source for expiry checks.
	clock: Arc<dyn Clock>,
	/// Per-holder exclusive sections. The check-then-blacklist sequence for a
	/// signer must not interleave with itself or with a registration for the
	/// same holder.
	holder_locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl RecoveryEngine {
	/// Creates a new engine from its collaborators.
	pub fn new(
		registry: Arc<RegistryService>,
		ledger: Arc<LedgerService>,
		signing: Eip712Signing,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			registry,
			ledger,
			signing,
			clock,
			holder_locks: DashMap::new(),
		}
	}

	/// Returns the EIP-712 signing context (for request layers and tooling
	/// that need to present the digest being signed).
	pub fn signing(&self) -> &Eip712Signing {
		&self.signing
	}

	fn lock_handle(&self, key: Address) -> Arc<Mutex<()>> {
		self.holder_locks.entry(key).or_default().value().clone()
	}

	/// Registers `backup` as the caller's emergency address.
	///
	/// Guards (self-reference, zero backup, blacklisted parties) are enforced
	/// by the registry; this wrapper serializes against a concurrent withdraw
	/// for the same holder.
	pub async fn register_emergency_address(
		&self,
		caller: Address,
		backup: Address,
	) -> Result<(), WithdrawError> {
		let lock = self.lock_handle(caller);
		let _guard = lock.lock().await;

		self.registry.register(caller, backup).await?;
		tracing::info!(holder = %caller, backup = %backup, "Registered emergency address");
		Ok(())
	}

	/// Returns the registered emergency address for `holder`
	/// (`Address::ZERO` when none is registered).
	pub async fn get_emergency_address(&self, holder: Address) -> Result<Address, WithdrawError> {
		if holder == Address::ZERO {
			return Err(WithdrawError::ZeroHolder);
		}
		Ok(self.registry.lookup(holder).await?)
	}

	/// Verifies a signed emergency withdraw authorization and, if every
	/// precondition holds, moves the signer's full balance to the registered
	/// backup and blacklists the signer.
	///
	/// Check order (each a hard precondition, all-or-nothing):
	/// 1. digest over (holder, expiration), 2. signature recovery and holder
	/// binding, 3. strict expiry, 4. backup registered, 5. signer not
	/// blacklisted, 6. non-zero balance, 7. balance move (with one level of
	/// backup indirection), 8. terminal blacklist, 9. receipt.
	pub async fn emergency_withdraw_with_sig(
		&self,
		caller: Address,
		auth: &WithdrawAuthorization,
	) -> Result<WithdrawReceipt, WithdrawError> {
		let digest = self.signing.signing_digest(&auth.holder, auth.expiration);
		let signer = recover_signer(&digest, auth.v, &auth.r, &auth.s)?;
		if signer != auth.holder {
			tracing::warn!(
				claimed = %auth.holder,
				recovered = %signer,
				"Withdraw authorization recovered to an unexpected signer"
			);
			return Err(WithdrawError::SignerMismatch {
				claimed: auth.holder,
				recovered: signer,
			});
		}

		// Time must be strictly before expiration.
		if self.clock.now() >= auth.expiration {
			return Err(WithdrawError::SignatureExpired);
		}

		// Steps 4-8 form one exclusive section per signer: two concurrent
		// attempts must not both observe "not yet blacklisted".
		let lock = self.lock_handle(signer);
		let _guard = lock.lock().await;

		let backup = self.registry.lookup(signer).await?;
		if backup == Address::ZERO {
			return Err(WithdrawError::NoBackupRegistered);
		}
		if self.registry.is_blacklisted(signer).await? {
			return Err(WithdrawError::SignerBlacklisted);
		}
		let amount = self.ledger.balance_of(signer).await?;
		if amount.is_zero() {
			return Err(WithdrawError::ZeroBalance);
		}

		// If the backup was blacklisted after registration its own backup is
		// the true destination. One level of indirection only.
		let destination = if self.registry.is_blacklisted(backup).await? {
			let fallback = self.registry.lookup(backup).await?;
			if fallback == Address::ZERO {
				return Err(WithdrawError::NoBackupRegistered);
			}
			fallback
		} else {
			backup
		};

		self.ledger.move_balance(signer, destination, amount).await?;
		self.registry.blacklist(signer).await?;

		tracing::info!(
			caller = %caller,
			signer = %signer,
			destination = %destination,
			amount = %amount,
			"Emergency withdraw settled"
		);
		Ok(WithdrawReceipt {
			caller,
			signer,
			destination,
			amount,
		})
	}
}
