//! EIP-712 domain separator and `EmergencyWithdraw` message hashing.
//!
//! These helpers provide:
//! - Domain separator computation bound to the deployment constants
//! - Struct hash computation for the emergency withdraw authorization
//! - Final digest computation (0x1901 || domainSeparator || structHash)
//! - A minimal ABI encoder for the static field types involved

use alloy_primitives::{keccak256, Address, B256, U256};
use std::sync::LazyLock;

/// Domain type string including the optional `version` field.
pub const DOMAIN_TYPE_WITH_VERSION: &str =
	"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
/// Domain type string for deployments that omit `version`.
pub const DOMAIN_TYPE_MINIMAL: &str =
	"EIP712Domain(string name,uint256 chainId,address verifyingContract)";
/// Canonical emergency withdraw schema. The holder address is bound into the
/// struct hash so the signed payload is self-describing; a signature minted
/// for one holder recovers to an unrelated address when replayed for another.
pub const EMERGENCY_WITHDRAW_TYPE: &str = "EmergencyWithdraw(address holder,uint256 expiration)";

static EMERGENCY_WITHDRAW_TYPE_HASH: LazyLock<B256> =
	LazyLock::new(|| keccak256(EMERGENCY_WITHDRAW_TYPE.as_bytes()));

/// Deployment-time EIP-712 domain parameters.
///
/// Pure configuration: every field is fixed at construction, so the separator
/// derived from it is a constant for the lifetime of the deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
	/// Token name bound into the separator.
	pub name: String,
	/// Optional version tag. When `None` the minimal domain type (without a
	/// `version` field) is used; presence must match the signing tooling.
	pub version: Option<String>,
	/// Chain identifier.
	pub chain_id: u64,
	/// Address of the contract instance signatures are bound to.
	pub verifying_contract: Address,
}

impl Eip712Domain {
	/// Computes the 32-byte domain separator:
	/// `keccak256(typeHash ++ keccak256(name) [++ keccak256(version)] ++ chainId ++ verifyingContract)`.
	pub fn separator(&self) -> B256 {
		let mut enc = AbiWords::new();
		match &self.version {
			Some(version) => {
				enc.push_b256(&keccak256(DOMAIN_TYPE_WITH_VERSION.as_bytes()));
				enc.push_b256(&keccak256(self.name.as_bytes()));
				enc.push_b256(&keccak256(version.as_bytes()));
			}
			None => {
				enc.push_b256(&keccak256(DOMAIN_TYPE_MINIMAL.as_bytes()));
				enc.push_b256(&keccak256(self.name.as_bytes()));
			}
		}
		enc.push_u256(U256::from(self.chain_id));
		enc.push_address(&self.verifying_contract);
		keccak256(enc.finish())
	}
}

/// Signing context holding the domain and its memoized separator.
///
/// The separator is computed once at construction; since none of the domain
/// fields change afterwards this is bit-identical to recomputing per call.
#[derive(Debug, Clone)]
pub struct Eip712Signing {
	domain: Eip712Domain,
	separator: B256,
}

impl Eip712Signing {
	/// Builds a signing context, caching the domain separator.
	pub fn new(domain: Eip712Domain) -> Self {
		let separator = domain.separator();
		Self { domain, separator }
	}

	/// Returns the cached domain separator.
	pub fn domain_separator(&self) -> B256 {
		self.separator
	}

	/// Returns the domain parameters this context was built from.
	pub fn domain(&self) -> &Eip712Domain {
		&self.domain
	}

	/// Computes the struct hash for an `EmergencyWithdraw` authorization.
	pub fn struct_hash(&self, holder: &Address, expiration: u64) -> B256 {
		let mut enc = AbiWords::new();
		enc.push_b256(&EMERGENCY_WITHDRAW_TYPE_HASH);
		enc.push_address(holder);
		enc.push_u256(U256::from(expiration));
		keccak256(enc.finish())
	}

	/// Computes the final signing digest:
	/// `keccak256(0x19 ++ 0x01 ++ domainSeparator ++ structHash)`.
	///
	/// The `0x19 0x01` prefix marks this as structured-data signing and keeps
	/// the digest disjoint from raw message signatures.
	pub fn signing_digest(&self, holder: &Address, expiration: u64) -> B256 {
		let struct_hash = self.struct_hash(holder, expiration);
		let mut out = Vec::with_capacity(2 + 32 + 32);
		out.push(0x19);
		out.push(0x01);
		out.extend_from_slice(self.separator.as_slice());
		out.extend_from_slice(struct_hash.as_slice());
		keccak256(out)
	}
}

/// Minimal ABI encoder for the static types used in EIP-712 hashing.
///
/// Each pushed value occupies one 32-byte big-endian slot.
pub struct AbiWords {
	buf: Vec<u8>,
}

impl Default for AbiWords {
	fn default() -> Self {
		Self::new()
	}
}

impl AbiWords {
	pub fn new() -> Self {
		Self { buf: Vec::new() }
	}

	pub fn push_b256(&mut self, v: &B256) {
		self.buf.extend_from_slice(v.as_slice());
	}

	pub fn push_address(&mut self, addr: &Address) {
		let mut word = [0u8; 32];
		word[12..].copy_from_slice(addr.as_slice());
		self.buf.extend_from_slice(&word);
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn domain(chain_id: u64, version: Option<&str>) -> Eip712Domain {
		Eip712Domain {
			name: "Haven Token".to_string(),
			version: version.map(str::to_string),
			chain_id,
			verifying_contract: address!("5fbdb2315678afecb367f032d93f642f64180aa3"),
		}
	}

	#[test]
	fn test_separator_is_deterministic() {
		let d = domain(1, Some("1"));
		assert_eq!(d.separator(), d.separator());
		assert_eq!(d.separator(), Eip712Signing::new(d.clone()).domain_separator());
	}

	#[test]
	fn test_separator_binds_deployment_constants() {
		let base = domain(1, Some("1")).separator();
		assert_ne!(base, domain(2, Some("1")).separator());
		assert_ne!(base, domain(1, Some("2")).separator());
		assert_ne!(base, domain(1, None).separator());

		let mut other_contract = domain(1, Some("1"));
		other_contract.verifying_contract =
			address!("0000000000000000000000000000000000000001");
		assert_ne!(base, other_contract.separator());

		let mut other_name = domain(1, Some("1"));
		other_name.name = "Other Token".to_string();
		assert_ne!(base, other_name.separator());
	}

	#[test]
	fn test_minimal_domain_matches_manual_encoding() {
		let d = domain(31337, None);

		let mut raw = Vec::new();
		raw.extend_from_slice(keccak256(DOMAIN_TYPE_MINIMAL.as_bytes()).as_slice());
		raw.extend_from_slice(keccak256(b"Haven Token").as_slice());
		raw.extend_from_slice(&U256::from(31337u64).to_be_bytes::<32>());
		let mut contract_word = [0u8; 32];
		contract_word[12..].copy_from_slice(d.verifying_contract.as_slice());
		raw.extend_from_slice(&contract_word);

		assert_eq!(d.separator(), keccak256(raw));
	}

	#[test]
	fn test_digest_uses_structured_data_prefix() {
		let signing = Eip712Signing::new(domain(1, Some("1")));
		let holder = address!("00000000000000000000000000000000000000aa");
		let expiration = 1_700_000_000u64;

		let struct_hash = signing.struct_hash(&holder, expiration);
		let mut raw = Vec::new();
		raw.extend_from_slice(&[0x19, 0x01]);
		raw.extend_from_slice(signing.domain_separator().as_slice());
		raw.extend_from_slice(struct_hash.as_slice());

		assert_eq!(signing.signing_digest(&holder, expiration), keccak256(raw));
	}

	#[test]
	fn test_struct_hash_binds_holder_and_expiration() {
		let signing = Eip712Signing::new(domain(1, Some("1")));
		let holder = address!("00000000000000000000000000000000000000aa");
		let other = address!("00000000000000000000000000000000000000bb");

		let base = signing.struct_hash(&holder, 100);
		assert_ne!(base, signing.struct_hash(&other, 100));
		assert_ne!(base, signing.struct_hash(&holder, 101));
	}
}
