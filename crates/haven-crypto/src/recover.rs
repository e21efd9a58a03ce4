//! secp256k1 signature recovery with Ethereum address derivation.
//!
//! Recovers the signer address from `(digest, v, r, s)`. The checks mirror
//! the on-chain `ecrecover` conventions: zero scalars are rejected, `s` must
//! be in the lower half of the curve order (EIP-2), and `v` must be one of
//! the two Electrum recovery values.

use alloy_primitives::{keccak256, Address, B256, U256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

/// secp256k1 curve order N / 2.
/// N/2 = 0x7FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF5D576E7357A4501DDFD25E8CD0364140
pub const SECP256K1_N_DIV_2: U256 = U256::from_limbs([
	0xDFD25E8CD0364140,
	0x5D576E7357A4501D,
	0xFFFFFFFFFFFFFFFF,
	0x7FFFFFFFFFFFFFFF,
]);

/// Errors that can occur during signature recovery.
///
/// Every variant means the signature must be rejected; the distinctions are
/// for logging and diagnostics only.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
	/// `r` or `s` is zero.
	#[error("Signature r or s is zero")]
	ZeroScalar,
	/// `s` is in the upper half of the curve order (malleable form).
	#[error("Signature s is not in the lower half of the curve order")]
	MalleableS,
	/// `v` is not 27 or 28.
	#[error("Invalid recovery value: {0}")]
	InvalidRecoveryId(u8),
	/// The signature does not recover to a valid curve point.
	#[error("Recovery failed: no valid public key")]
	Unrecoverable,
	/// Recovery produced the all-zero address. Should be impossible given
	/// the checks above, asserted anyway.
	#[error("Recovered the zero address")]
	ZeroAddress,
}

/// Recovers the 20-byte signer address from a signature over `digest`.
pub fn recover_signer(
	digest: &B256,
	v: u8,
	r: &B256,
	s: &B256,
) -> Result<Address, SignatureError> {
	let r_scalar = U256::from_be_bytes(r.0);
	let s_scalar = U256::from_be_bytes(s.0);
	if r_scalar.is_zero() || s_scalar.is_zero() {
		return Err(SignatureError::ZeroScalar);
	}
	if s_scalar > SECP256K1_N_DIV_2 {
		return Err(SignatureError::MalleableS);
	}
	let recovery_id = match v {
		27 | 28 => RecoveryId::from_byte(v - 27).ok_or(SignatureError::InvalidRecoveryId(v))?,
		_ => return Err(SignatureError::InvalidRecoveryId(v)),
	};

	let mut sig_bytes = [0u8; 64];
	sig_bytes[..32].copy_from_slice(r.as_slice());
	sig_bytes[32..].copy_from_slice(s.as_slice());
	let signature =
		EcdsaSignature::from_slice(&sig_bytes).map_err(|_| SignatureError::Unrecoverable)?;

	let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recovery_id)
		.map_err(|_| SignatureError::Unrecoverable)?;

	let address = public_key_address(&key);
	if address == Address::ZERO {
		return Err(SignatureError::ZeroAddress);
	}
	Ok(address)
}

/// Derives the Ethereum address for a secp256k1 public key:
/// the last 20 bytes of `keccak256(uncompressed_point[1..])`.
pub fn public_key_address(key: &VerifyingKey) -> Address {
	let point = key.to_encoded_point(false);
	let hash = keccak256(&point.as_bytes()[1..]);
	Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
	use super::*;
	use k256::ecdsa::SigningKey;

	/// secp256k1 curve order N.
	const SECP256K1_N: U256 = U256::from_limbs([
		0xBFD25E8CD0364141,
		0xBAAEDCE6AF48A03B,
		0xFFFFFFFFFFFFFFFE,
		0xFFFFFFFFFFFFFFFF,
	]);

	fn test_key() -> SigningKey {
		SigningKey::from_slice(&[0x11u8; 32]).unwrap()
	}

	fn sign(key: &SigningKey, digest: &B256) -> (u8, B256, B256) {
		let (sig, recovery_id) = key.sign_prehash_recoverable(digest.as_slice()).unwrap();
		let bytes = sig.to_bytes();
		(
			27 + recovery_id.to_byte(),
			B256::from_slice(&bytes[..32]),
			B256::from_slice(&bytes[32..]),
		)
	}

	#[test]
	fn test_recover_roundtrip() {
		let key = test_key();
		let expected = public_key_address(key.verifying_key());
		let digest = keccak256(b"emergency withdraw digest");

		let (v, r, s) = sign(&key, &digest);
		let recovered = recover_signer(&digest, v, &r, &s).unwrap();
		assert_eq!(recovered, expected);
	}

	#[test]
	fn test_mutated_signature_never_recovers_signer() {
		let key = test_key();
		let expected = public_key_address(key.verifying_key());
		let digest = keccak256(b"emergency withdraw digest");
		let (v, r, s) = sign(&key, &digest);

		// Flip one bit of r
		let mut bad_r = r;
		bad_r.0[31] ^= 0x01;
		match recover_signer(&digest, v, &bad_r, &s) {
			Ok(addr) => assert_ne!(addr, expected),
			Err(_) => {}
		}

		// Flip one bit of the digest
		let mut bad_digest = digest;
		bad_digest.0[0] ^= 0x80;
		match recover_signer(&bad_digest, v, &r, &s) {
			Ok(addr) => assert_ne!(addr, expected),
			Err(_) => {}
		}
	}

	#[test]
	fn test_zero_scalars_rejected() {
		let digest = keccak256(b"digest");
		let nonzero = B256::from(U256::from(1u64).to_be_bytes::<32>());
		assert_eq!(
			recover_signer(&digest, 27, &B256::ZERO, &nonzero),
			Err(SignatureError::ZeroScalar)
		);
		assert_eq!(
			recover_signer(&digest, 27, &nonzero, &B256::ZERO),
			Err(SignatureError::ZeroScalar)
		);
	}

	#[test]
	fn test_high_s_rejected() {
		let key = test_key();
		let digest = keccak256(b"digest");
		let (_, r, s) = sign(&key, &digest);

		// The complement N - s is the malleable twin of a valid signature.
		let s_scalar = U256::from_be_bytes(s.0);
		let high_s = B256::from((SECP256K1_N - s_scalar).to_be_bytes::<32>());
		assert_eq!(
			recover_signer(&digest, 28, &r, &high_s),
			Err(SignatureError::MalleableS)
		);
	}

	#[test]
	fn test_invalid_recovery_values_rejected() {
		let key = test_key();
		let digest = keccak256(b"digest");
		let (_, r, s) = sign(&key, &digest);

		for v in [0u8, 1, 2, 26, 29, 255] {
			assert_eq!(
				recover_signer(&digest, v, &r, &s),
				Err(SignatureError::InvalidRecoveryId(v))
			);
		}
	}
}
