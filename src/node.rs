//! Capabilities the transfer workflow needs from a node.
//!
//! [`crate::rpc::GrpcClient`] implements all of them over one channel;
//! tests substitute an in-process fake.

use crate::error::Result;

/// Server-side signing counters for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
	pub account_number: u64,
	pub sequence: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimate {
	pub gas_wanted: u64,
	pub gas_used: u64,
}

/// What the node said when the transaction was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastResult {
	pub tx_hash: String,
	pub code: u32,
	pub codespace: String,
	pub raw_log: String,
}

impl BroadcastResult {
	pub fn is_accepted(&self) -> bool {
		self.code == 0
	}
}

/// A transaction that has been included in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxStatus {
	pub tx_hash: String,
	pub height: i64,
	pub code: u32,
	pub gas_wanted: i64,
	pub gas_used: i64,
	pub raw_log: String,
}

impl TxStatus {
	pub fn is_success(&self) -> bool {
		self.code == 0
	}
}

#[async_trait::async_trait]
pub trait AccountQuerier: Send + Sync {
	async fn account(&self, address: &str) -> Result<AccountState>;
}

#[async_trait::async_trait]
pub trait BalanceQuerier: Send + Sync {
	/// Balance of `denom` held by `address`. A missing record is zero.
	async fn balance(&self, address: &str, denom: &str) -> Result<u128>;
}

#[async_trait::async_trait]
pub trait Simulator: Send + Sync {
	/// Dry-run a signed transaction without committing it.
	async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasEstimate>;
}

#[async_trait::async_trait]
pub trait Broadcaster: Send + Sync {
	/// Submit in sync mode: returns once CheckTx has admitted or refused the tx.
	async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult>;

	/// Look up a transaction by hash; `None` while it is not yet in a block.
	async fn tx_status(&self, tx_hash: &str) -> Result<Option<TxStatus>>;
}

/// Everything a full transfer needs.
pub trait Node: AccountQuerier + BalanceQuerier + Simulator + Broadcaster {}

impl<T> Node for T where T: AccountQuerier + BalanceQuerier + Simulator + Broadcaster {}
