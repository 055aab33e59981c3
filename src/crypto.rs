use bech32::{Bech32, Hrp};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::error::{Error, Result};

/// Public key type URL for plain Cosmos secp256k1 keys.
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

/// Public key type URL for Ethermint keys, used by Exocore accounts.
pub const ETH_SECP256K1_PUBKEY_TYPE_URL: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";

/// The two secp256k1 flavours a Cosmos-style chain may expect.
///
/// They share a curve but differ in address derivation, the digest that is
/// signed, and the signature encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlgorithm {
	/// keccak256 addresses and 65-byte recoverable signatures.
	#[default]
	EthSecp256k1,
	/// ripemd160(sha256) addresses and 64-byte compact signatures.
	Secp256k1,
}

impl KeyAlgorithm {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::EthSecp256k1 => "eth_secp256k1",
			Self::Secp256k1 => "secp256k1",
		}
	}

	pub fn pubkey_type_url(&self) -> &'static str {
		match self {
			Self::EthSecp256k1 => ETH_SECP256K1_PUBKEY_TYPE_URL,
			Self::Secp256k1 => SECP256K1_PUBKEY_TYPE_URL,
		}
	}

	fn digest(&self, msg: &[u8]) -> [u8; 32] {
		match self {
			Self::EthSecp256k1 => Keccak256::digest(msg).into(),
			Self::Secp256k1 => Sha256::digest(msg).into(),
		}
	}
}

// -- Keys and addresses --

/// 33-byte SEC1 compressed encoding of a public key.
pub fn compressed_public_key(key: &VerifyingKey) -> Vec<u8> {
	key.to_encoded_point(true).as_bytes().to_vec()
}

/// Derive the raw 20-byte account address for a public key.
pub fn address_bytes(algorithm: KeyAlgorithm, key: &VerifyingKey) -> [u8; 20] {
	let mut out = [0u8; 20];
	match algorithm {
		KeyAlgorithm::EthSecp256k1 => {
			let uncompressed = key.to_encoded_point(false);
			// Skip the 0x04 tag; the address is the tail of the keccak hash.
			let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
			out.copy_from_slice(&hash[12..]);
		}
		KeyAlgorithm::Secp256k1 => {
			out = hash160(&compressed_public_key(key));
		}
	}
	out
}

/// Compute HASH160 = RIPEMD160(SHA256(data)).
fn hash160(data: &[u8]) -> [u8; 20] {
	let sha256_hash = Sha256::digest(data);
	let ripemd_hash = Ripemd160::digest(sha256_hash);

	let mut result = [0u8; 20];
	result.copy_from_slice(&ripemd_hash);
	result
}

/// Encode raw address bytes as bech32 under the given prefix.
pub fn encode_address(prefix: &str, bytes: &[u8]) -> Result<String> {
	let invalid = |reason: String| Error::InvalidAddress {
		address: hex::encode(bytes),
		reason,
	};
	let hrp = Hrp::parse(prefix).map_err(|e| invalid(format!("invalid prefix: {e}")))?;
	bech32::encode::<Bech32>(hrp, bytes).map_err(|e| invalid(e.to_string()))
}

/// Decode a bech32 address, insisting on the expected prefix and a
/// 20-byte payload.
pub fn decode_address(prefix: &str, address: &str) -> Result<Vec<u8>> {
	let invalid = |reason: String| Error::InvalidAddress {
		address: address.to_owned(),
		reason,
	};
	let (hrp, data) = bech32::decode(address).map_err(|e| invalid(e.to_string()))?;
	let found = hrp.to_string();
	if !found.eq_ignore_ascii_case(prefix) {
		return Err(invalid(format!("expected prefix `{prefix}`, got `{found}`")));
	}
	if data.len() != 20 {
		return Err(invalid(format!("expected 20 bytes, got {}", data.len())));
	}
	Ok(data)
}

// -- Signatures --

/// Sign `msg` the way the chain expects for this key algorithm.
pub fn sign(algorithm: KeyAlgorithm, key: &SigningKey, msg: &[u8]) -> Result<Vec<u8>> {
	let digest = algorithm.digest(msg);
	match algorithm {
		KeyAlgorithm::EthSecp256k1 => {
			let (sig, recovery_id) = key
				.sign_prehash_recoverable(&digest)
				.map_err(|e| Error::Signing(e.to_string()))?;
			let mut out = sig.to_bytes().to_vec();
			out.push(recovery_id.to_byte());
			Ok(out)
		}
		KeyAlgorithm::Secp256k1 => {
			let sig: Signature = key
				.sign_prehash(&digest)
				.map_err(|e| Error::Signing(e.to_string()))?;
			// Cosmos nodes reject high-S signatures.
			let sig = sig.normalize_s().unwrap_or(sig);
			Ok(sig.to_bytes().to_vec())
		}
	}
}

/// Check `signature` over `msg` against a compressed public key.
///
/// Returns false for malformed keys or signatures rather than erroring:
/// callers only want to know whether the node would accept it.
pub fn verify(algorithm: KeyAlgorithm, public_key: &[u8], msg: &[u8], signature: &[u8]) -> bool {
	let Ok(key) = VerifyingKey::from_sec1_bytes(public_key) else {
		return false;
	};
	let compact = match (algorithm, signature.len()) {
		(KeyAlgorithm::EthSecp256k1, 65) => &signature[..64],
		(_, 64) => signature,
		_ => return false,
	};
	let Ok(sig) = Signature::from_slice(compact) else {
		return false;
	};
	key.verify_prehash(&algorithm.digest(msg), &sig).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key_one() -> SigningKey {
		let mut bytes = [0u8; 32];
		bytes[31] = 1;
		SigningKey::from_slice(&bytes).unwrap()
	}

	#[test]
	fn eth_address_matches_known_vector() {
		let key = key_one();
		let addr = address_bytes(KeyAlgorithm::EthSecp256k1, key.verifying_key());
		assert_eq!(hex::encode(addr), "7e5f4552091a69125d5dfcb7b8c2659029395bdf");
	}

	#[test]
	fn cosmos_address_is_hash160_of_compressed_key() {
		let key = key_one();
		let addr = address_bytes(KeyAlgorithm::Secp256k1, key.verifying_key());
		assert_eq!(hex::encode(addr), "751e76e8199196d454941c45d1b3a323f1433bd6");
	}

	#[test]
	fn bech32_roundtrip_and_prefix_check() {
		let raw = [7u8; 20];
		let addr = encode_address("exo", &raw).unwrap();
		assert!(addr.starts_with("exo1"));
		assert_eq!(decode_address("exo", &addr).unwrap(), raw.to_vec());

		let err = decode_address("cosmos", &addr).unwrap_err();
		assert!(matches!(err, Error::InvalidAddress { .. }));
	}

	#[test]
	fn decode_rejects_garbage() {
		assert!(decode_address("exo", "exo1notanaddress").is_err());
		assert!(decode_address("exo", "").is_err());
	}

	#[test]
	fn eth_signature_is_recoverable_form_and_verifies() {
		let key = key_one();
		let pk = compressed_public_key(key.verifying_key());
		let sig = sign(KeyAlgorithm::EthSecp256k1, &key, b"payload").unwrap();

		assert_eq!(sig.len(), 65);
		assert!(sig[64] <= 1);
		assert!(verify(KeyAlgorithm::EthSecp256k1, &pk, b"payload", &sig));
		assert!(!verify(KeyAlgorithm::EthSecp256k1, &pk, b"payloaD", &sig));
	}

	#[test]
	fn cosmos_signature_is_compact_and_verifies() {
		let key = key_one();
		let pk = compressed_public_key(key.verifying_key());
		let sig = sign(KeyAlgorithm::Secp256k1, &key, b"payload").unwrap();

		assert_eq!(sig.len(), 64);
		assert!(verify(KeyAlgorithm::Secp256k1, &pk, b"payload", &sig));
		// The digests differ, so signatures do not cross algorithms.
		assert!(!verify(KeyAlgorithm::EthSecp256k1, &pk, b"payload", &sig));
	}

	#[test]
	fn verify_rejects_malformed_inputs() {
		let key = key_one();
		let pk = compressed_public_key(key.verifying_key());
		assert!(!verify(KeyAlgorithm::Secp256k1, &pk, b"x", &[0u8; 10]));
		assert!(!verify(KeyAlgorithm::Secp256k1, &[1, 2, 3], b"x", &[0u8; 64]));
	}

	#[test]
	fn algorithm_serializes_snake_case() {
		#[derive(Serialize, Deserialize)]
		struct Wrap {
			algorithm: KeyAlgorithm,
		}
		let s = toml::to_string(&Wrap {
			algorithm: KeyAlgorithm::EthSecp256k1,
		})
		.unwrap();
		assert_eq!(s.trim(), "algorithm = \"eth_secp256k1\"");
		let w: Wrap = toml::from_str("algorithm = \"secp256k1\"").unwrap();
		assert_eq!(w.algorithm, KeyAlgorithm::Secp256k1);
	}
}
