pub mod account;
pub mod balance;
pub mod config;
pub mod keys;
pub mod send;
pub mod tx;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::rpc::GrpcClient;
use crate::signer::{Keyring, Signer};

/// Load the config file and apply CLI overrides on top.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
	let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
	if let Some(url) = &cli.grpc_url {
		config.network.grpc_url = url.clone();
	}
	if let Some(chain_id) = &cli.chain_id {
		config.network.chain_id = chain_id.clone();
	}
	if let Some(dir) = &cli.keyring_dir {
		config.keyring.dir = Some(dir.clone());
	}
	Ok(config)
}

pub fn open_keyring(config: &Config) -> Result<Keyring> {
	let dir = config.keyring_dir();
	Keyring::open(&dir, &config.network.bech32_prefix)
		.with_context(|| format!("failed to open keyring at {}", dir.display()))
}

pub async fn connect(config: &Config) -> Result<GrpcClient> {
	let url = &config.network.grpc_url;
	GrpcClient::connect(url, config.connect_timeout())
		.await
		.with_context(|| format!("cannot reach node at {url}"))
}

/// Map a keyring name to its address; anything else must already be a
/// valid bech32 address.
pub fn resolve_account(keys: &Keyring, config: &Config, account: &str) -> Result<String> {
	if let Ok(info) = keys.key(account) {
		return Ok(info.address);
	}
	crate::crypto::decode_address(&config.network.bech32_prefix, account)
		.with_context(|| format!("`{account}` is neither a key name nor an address"))?;
	Ok(account.to_owned())
}
