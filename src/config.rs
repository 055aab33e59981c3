use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::KeyAlgorithm;

/// Missing tables and fields take their value from [`Config::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub network: NetworkConfig,
	pub keyring: KeyringConfig,
	pub fee: FeeConfig,
	pub transfer: TransferConfig,
	pub confirm: ConfirmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
	pub grpc_url: String,
	pub chain_id: String,
	pub bech32_prefix: String,
	pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyringConfig {
	/// Defaults to `~/.exo-transfer/keyring` when unset.
	pub dir: Option<PathBuf>,
	/// Algorithm for newly created keys.
	pub algorithm: KeyAlgorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeConfig {
	pub denom: String,
	/// Price per unit of gas, in `denom`.
	pub gas_price: u64,
	/// Gas limit of the simulation pass.
	pub max_gas: u64,
}

/// The transfer `send` performs when no flags override it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
	pub from: String,
	pub to: String,
	pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
	pub poll_interval_ms: u64,
	pub timeout_secs: u64,
}

/// Floor for `confirm.poll_interval_ms`, so a zero never spins on `GetTx`.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

impl Default for Config {
	fn default() -> Self {
		Self {
			network: NetworkConfig::default(),
			keyring: KeyringConfig::default(),
			fee: FeeConfig::default(),
			transfer: TransferConfig::default(),
			confirm: ConfirmConfig::default(),
		}
	}
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			grpc_url: "http://127.0.0.1:9090".into(),
			chain_id: "exocoretestnet_233-1".into(),
			bech32_prefix: "exo".into(),
			connect_timeout_secs: 10,
		}
	}
}

impl Default for KeyringConfig {
	fn default() -> Self {
		Self {
			dir: None,
			algorithm: KeyAlgorithm::EthSecp256k1,
		}
	}
}

impl Default for FeeConfig {
	fn default() -> Self {
		Self {
			denom: "aexo".into(),
			gas_price: 7,
			max_gas: 10_000_000,
		}
	}
}

impl Default for TransferConfig {
	fn default() -> Self {
		Self {
			from: "dev1".into(),
			to: "dev2".into(),
			amount: 10_000,
		}
	}
}

impl Default for ConfirmConfig {
	fn default() -> Self {
		Self {
			poll_interval_ms: 1000,
			timeout_secs: 30,
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.exo-transfer/).
	pub fn dir() -> PathBuf {
		dirs::home_dir()
			.unwrap_or_else(|| PathBuf::from("."))
			.join(".exo-transfer")
	}

	/// Path to the default config file.
	pub fn path() -> PathBuf {
		Self::dir().join("config.toml")
	}

	/// Load config from `path` (or the default location), falling back to
	/// defaults if no file exists.
	pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
		let path = path.map(Path::to_path_buf).unwrap_or_else(Self::path);
		if path.exists() {
			let content = std::fs::read_to_string(&path)?;
			Ok(toml::from_str(&content)?)
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the config, creating the directory if needed.
	pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
		let path = path.map(Path::to_path_buf).unwrap_or_else(Self::path);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(path)
	}

	pub fn keyring_dir(&self) -> PathBuf {
		self.keyring
			.dir
			.clone()
			.unwrap_or_else(|| Self::dir().join("keyring"))
	}

	pub fn connect_timeout(&self) -> Duration {
		Duration::from_secs(self.network.connect_timeout_secs)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.confirm.poll_interval_ms).max(MIN_POLL_INTERVAL)
	}

	pub fn confirm_timeout(&self) -> Duration {
		Duration::from_secs(self.confirm.timeout_secs)
	}
}
