use thiserror::Error;

/// Everything that can go wrong while driving a transfer through the node.
#[derive(Debug, Error)]
pub enum Error {
	/// The gRPC channel could not be opened.
	#[error("failed to connect to {endpoint}: {source}")]
	Connect {
		endpoint: String,
		#[source]
		source: tonic::transport::Error,
	},

	#[error("invalid endpoint `{endpoint}`: {reason}")]
	InvalidEndpoint { endpoint: String, reason: String },

	/// No key with this name exists in the keyring.
	#[error("key `{0}` not found in keyring")]
	KeyNotFound(String),

	/// The keyring exists but could not be read or written.
	#[error("keyring error: {0}")]
	Keyring(String),

	#[error("invalid address `{address}`: {reason}")]
	InvalidAddress { address: String, reason: String },

	#[error("account query for {address} failed: {status}")]
	AccountQuery {
		address: String,
		status: tonic::Status,
	},

	/// The node returned an account type this client cannot unpack.
	#[error("cannot decode account {address}: {reason}")]
	AccountDecode { address: String, reason: String },

	#[error("balance query for {address} failed: {status}")]
	BalanceQuery {
		address: String,
		status: tonic::Status,
	},

	#[error("invalid coin amount `{0}`")]
	InvalidAmount(String),

	#[error("simulation failed: {0}")]
	Simulation(tonic::Status),

	#[error("signing failed: {0}")]
	Signing(String),

	/// `gas_used * gas_price` does not fit the signed 64-bit coin amount.
	#[error("fee {gas_used} * {gas_price} exceeds the maximum coin amount")]
	FeeOverflow { gas_used: u64, gas_price: u64 },

	#[error("broadcast failed: {0}")]
	Broadcast(tonic::Status),

	/// CheckTx refused the transaction at mempool admission.
	#[error("transaction {tx_hash} rejected with {codespace} code {code}: {log}")]
	BroadcastRejected {
		tx_hash: String,
		codespace: String,
		code: u32,
		log: String,
	},

	#[error("transaction status query failed: {0}")]
	TxQuery(tonic::Status),

	#[error("malformed protobuf: {0}")]
	Decode(#[from] prost::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
