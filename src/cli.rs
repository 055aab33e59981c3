use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::crypto::KeyAlgorithm;

#[derive(Parser)]
#[command(
	name = "exo-transfer",
	about = "Sign, simulate and broadcast bank transfers to an Exocore node over gRPC.",
	version
)]
pub struct Cli {
	/// Config file to read instead of ~/.exo-transfer/config.toml.
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	/// Override the node's gRPC endpoint.
	#[arg(long, global = true)]
	pub grpc_url: Option<String>,

	/// Override the chain ID.
	#[arg(long, global = true)]
	pub chain_id: Option<String>,

	/// Override the keyring directory.
	#[arg(long, global = true)]
	pub keyring_dir: Option<PathBuf>,

	/// Increase log verbosity (-v info, -vv debug).
	#[arg(short, long, action = ArgAction::Count, global = true)]
	pub verbose: u8,

	/// Defaults to `send` with the configured transfer.
	#[command(subcommand)]
	pub command: Option<Command>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
	/// Same spelling as the config file and `keys list`.
	#[value(name = "eth_secp256k1")]
	EthSecp256k1,
	Secp256k1,
}

impl From<AlgorithmArg> for KeyAlgorithm {
	fn from(arg: AlgorithmArg) -> Self {
		match arg {
			AlgorithmArg::EthSecp256k1 => Self::EthSecp256k1,
			AlgorithmArg::Secp256k1 => Self::Secp256k1,
		}
	}
}

#[derive(Subcommand)]
pub enum Command {
	/// Build, sign, simulate and broadcast a bank transfer.
	Send(SendArgs),

	/// Show an account's balance.
	Balance {
		/// Keyring name or bech32 address.
		account: String,

		/// Denomination to query (defaults to the fee denom).
		#[arg(long)]
		denom: Option<String>,
	},

	/// Show an account's number and sequence.
	Account {
		/// Keyring name or bech32 address.
		account: String,
	},

	/// Manage local keys.
	Keys {
		#[command(subcommand)]
		command: KeysCommand,
	},

	/// Query transactions.
	Tx {
		#[command(subcommand)]
		command: TxCommand,
	},

	/// Inspect or write the config file.
	Config {
		#[command(subcommand)]
		command: ConfigCommand,
	},
}

#[derive(clap::Args, Default)]
pub struct SendArgs {
	/// Sender key name.
	#[arg(long)]
	pub from: Option<String>,

	/// Recipient key name or bech32 address.
	#[arg(long)]
	pub to: Option<String>,

	/// Amount in base units.
	#[arg(long)]
	pub amount: Option<u64>,

	/// Denomination to send.
	#[arg(long)]
	pub denom: Option<String>,

	/// Transaction memo.
	#[arg(long, default_value = "")]
	pub memo: String,

	/// Stop after signing and verification; print the fee.
	#[arg(long)]
	pub dry_run: bool,
}

// -- Keys subcommands --

#[derive(Subcommand)]
pub enum KeysCommand {
	/// Generate a new random key.
	Add {
		name: String,

		/// Key algorithm (defaults to the configured one).
		#[arg(long)]
		algorithm: Option<AlgorithmArg>,
	},

	/// Import a hex-encoded private key.
	Import {
		name: String,

		/// 32-byte secret, hex encoded.
		private_key: String,

		#[arg(long)]
		algorithm: Option<AlgorithmArg>,
	},

	/// Show a key's address and public key.
	Show { name: String },

	/// List all keys.
	List,
}

// -- Tx subcommands --

#[derive(Subcommand)]
pub enum TxCommand {
	/// Check inclusion status of a transaction.
	Status {
		/// Transaction hash (hex).
		tx_hash: String,
	},
}

// -- Config subcommands --

#[derive(Subcommand)]
pub enum ConfigCommand {
	/// Print the effective configuration.
	Show,

	/// Write the default configuration to disk.
	Init {
		/// Overwrite an existing file.
		#[arg(long)]
		force: bool,
	},
}
