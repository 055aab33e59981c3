pub mod keyring;

pub use keyring::Keyring;

use crate::crypto::KeyAlgorithm;
use crate::error::Result;

/// Public half of a named keyring entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
	pub name: String,
	/// Bech32 account address.
	pub address: String,
	/// 33-byte compressed public key.
	pub public_key: Vec<u8>,
	pub algorithm: KeyAlgorithm,
}

/// A key store that can look up identities by name and sign on their
/// behalf.  Private key material never leaves the implementation.
#[async_trait::async_trait]
pub trait Signer: Send + Sync {
	/// Look up a named identity. Fails with `KeyNotFound` for unknown names.
	fn key(&self, name: &str) -> Result<KeyInfo>;

	/// Sign raw sign-doc bytes with the named key.
	async fn sign(&self, name: &str, sign_bytes: &[u8]) -> Result<Vec<u8>>;
}
