use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};

use super::{KeyInfo, Signer};
use crate::crypto::{self, KeyAlgorithm};
use crate::error::{Error, Result};

/// On-disk form of one key: `<dir>/<name>.toml`.
#[derive(Serialize, Deserialize)]
struct KeyFile {
	name: String,
	algorithm: KeyAlgorithm,
	/// Hex-encoded 32-byte secret scalar.
	private_key: String,
}

struct LocalKey {
	algorithm: KeyAlgorithm,
	signing_key: SigningKey,
}

/// A local keyring holding secp256k1 keys by name.
///
/// Backed by a directory of TOML files, or purely in memory when
/// constructed with [`Keyring::in_memory`].
pub struct Keyring {
	dir: Option<PathBuf>,
	prefix: String,
	keys: BTreeMap<String, LocalKey>,
}

impl Keyring {
	/// An empty keyring that never touches disk.
	pub fn in_memory(prefix: &str) -> Self {
		Self {
			dir: None,
			prefix: prefix.to_owned(),
			keys: BTreeMap::new(),
		}
	}

	/// Load every key in `dir`. A missing directory is an empty keyring.
	pub fn open(dir: &Path, prefix: &str) -> Result<Self> {
		let mut keyring = Self {
			dir: Some(dir.to_owned()),
			prefix: prefix.to_owned(),
			keys: BTreeMap::new(),
		};
		if !dir.exists() {
			return Ok(keyring);
		}

		let entries = std::fs::read_dir(dir).map_err(|e| io_error(dir, e))?;
		for entry in entries {
			let path = entry.map_err(|e| io_error(dir, e))?.path();
			if path.extension().and_then(|e| e.to_str()) != Some("toml") {
				continue;
			}
			let content = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
			let file: KeyFile = toml::from_str(&content)
				.map_err(|e| Error::Keyring(format!("{}: {e}", path.display())))?;
			let signing_key = parse_secret(&file.private_key)?;
			keyring.keys.insert(
				file.name,
				LocalKey {
					algorithm: file.algorithm,
					signing_key,
				},
			);
		}
		tracing::debug!(dir = %dir.display(), keys = keyring.keys.len(), "keyring loaded");
		Ok(keyring)
	}

	/// Create a fresh random key under `name`.
	pub fn generate(&mut self, name: &str, algorithm: KeyAlgorithm) -> Result<KeyInfo> {
		let signing_key = SigningKey::random(&mut rand::rngs::OsRng);
		self.insert(name, algorithm, signing_key)
	}

	/// Import a hex-encoded secret key under `name`.
	pub fn import_hex(&mut self, name: &str, algorithm: KeyAlgorithm, secret: &str) -> Result<KeyInfo> {
		let signing_key = parse_secret(secret)?;
		self.insert(name, algorithm, signing_key)
	}

	/// Add a key, persisting it when the keyring is directory-backed.
	pub fn insert(
		&mut self,
		name: &str,
		algorithm: KeyAlgorithm,
		signing_key: SigningKey,
	) -> Result<KeyInfo> {
		validate_name(name)?;
		if self.keys.contains_key(name) {
			return Err(Error::Keyring(format!("key `{name}` already exists")));
		}

		if let Some(dir) = &self.dir {
			let file = KeyFile {
				name: name.to_owned(),
				algorithm,
				private_key: hex::encode(signing_key.to_bytes()),
			};
			let content = toml::to_string_pretty(&file).map_err(|e| Error::Keyring(e.to_string()))?;
			std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
			let path = dir.join(format!("{name}.toml"));
			write_secret(&path, content.as_bytes())?;
		}

		self.keys.insert(
			name.to_owned(),
			LocalKey {
				algorithm,
				signing_key,
			},
		);
		self.key(name)
	}

	/// All keys, ordered by name.
	pub fn list(&self) -> Result<Vec<KeyInfo>> {
		self.keys.keys().map(|name| self.key(name)).collect()
	}

	fn info(&self, name: &str, key: &LocalKey) -> Result<KeyInfo> {
		let verifying = key.signing_key.verifying_key();
		let raw = crypto::address_bytes(key.algorithm, verifying);
		Ok(KeyInfo {
			name: name.to_owned(),
			address: crypto::encode_address(&self.prefix, &raw)?,
			public_key: crypto::compressed_public_key(verifying),
			algorithm: key.algorithm,
		})
	}
}

#[async_trait::async_trait]
impl Signer for Keyring {
	fn key(&self, name: &str) -> Result<KeyInfo> {
		let key = self
			.keys
			.get(name)
			.ok_or_else(|| Error::KeyNotFound(name.to_owned()))?;
		self.info(name, key)
	}

	async fn sign(&self, name: &str, sign_bytes: &[u8]) -> Result<Vec<u8>> {
		let key = self
			.keys
			.get(name)
			.ok_or_else(|| Error::KeyNotFound(name.to_owned()))?;
		crypto::sign(key.algorithm, &key.signing_key, sign_bytes)
	}
}

// -- Helpers --

fn parse_secret(secret: &str) -> Result<SigningKey> {
	let clean = secret.trim();
	let clean = clean.strip_prefix("0x").unwrap_or(clean);
	let bytes = hex::decode(clean).map_err(|e| Error::Keyring(format!("invalid private key hex: {e}")))?;
	SigningKey::from_slice(&bytes).map_err(|e| Error::Keyring(format!("invalid private key: {e}")))
}

/// Key names become file names, so keep them to a safe alphabet.
fn validate_name(name: &str) -> Result<()> {
	let ok = !name.is_empty()
		&& name
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
	if ok {
		Ok(())
	} else {
		Err(Error::Keyring(format!(
			"invalid key name `{name}`: use letters, digits, `-` or `_`"
		)))
	}
}

fn io_error(path: &Path, e: std::io::Error) -> Error {
	Error::Keyring(format!("{}: {e}", path.display()))
}

/// Create `path` exclusively and write the secret in one step. On unix the
/// file is owner-only from the moment it exists.
fn write_secret(path: &Path, content: &[u8]) -> Result<()> {
	use std::io::Write;

	let mut options = std::fs::OpenOptions::new();
	options.write(true).create_new(true);
	#[cfg(unix)]
	{
		use std::os::unix::fs::OpenOptionsExt;
		options.mode(0o600);
	}
	let mut file = options.open(path).map_err(|e| io_error(path, e))?;
	file.write_all(content).map_err(|e| io_error(path, e))
}
