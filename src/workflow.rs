//! Drives one bank transfer from construction to confirmation.
//!
//! The pipeline is strictly sequential:
//!
//! 1. resolve sender and recipient from the keyring (no network),
//! 2. build the `MsgSend`,
//! 3. sign over a placeholder fee, simulate, re-sign with the real fee,
//! 4. verify the final signature locally,
//! 5. read balances, broadcast, poll for inclusion, read balances again.
//!
//! Every collaborator failure aborts the run except balance lookups, a
//! failed local verification, and a confirmation timeout, which are
//! reported in the result.

use std::time::Duration;

use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
use cosmos_sdk_proto::cosmos::tx::v1beta1::TxRaw;

use crate::config::Config;
use crate::crypto;
use crate::envelope::{SignedTx, UnsignedTx};
use crate::error::{Error, Result};
use crate::node::{AccountState, BroadcastResult, GasEstimate, Node, TxStatus};
use crate::signer::{KeyInfo, Signer};
use crate::tx_builder::{self, SignerData, TxDraft};

pub use crate::tx_builder::build_transfer_message;

/// Chain and fee parameters, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct Settings {
	pub chain_id: String,
	pub bech32_prefix: String,
	pub fee_denom: String,
	pub gas_price: u64,
	pub max_gas: u64,
	pub poll_interval: Duration,
	pub confirm_timeout: Duration,
}

impl Settings {
	pub fn from_config(config: &Config) -> Self {
		Self {
			chain_id: config.network.chain_id.clone(),
			bech32_prefix: config.network.bech32_prefix.clone(),
			fee_denom: config.fee.denom.clone(),
			gas_price: config.fee.gas_price,
			max_gas: config.fee.max_gas,
			poll_interval: config.poll_interval(),
			confirm_timeout: config.confirm_timeout(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
	/// Keyring name of the sender.
	pub from: String,
	/// Keyring name or bech32 address of the recipient.
	pub to: String,
	pub denom: String,
	pub amount: u128,
	pub memo: String,
}

/// A transfer that has been signed with its simulated fee but not sent.
#[derive(Debug, Clone)]
pub struct PreparedTransfer {
	pub sender: KeyInfo,
	pub recipient: String,
	pub denom: String,
	pub amount: u128,
	pub gas: GasEstimate,
	pub tx: SignedTx,
	/// Outcome of the local signature check. Informational only.
	pub verified: bool,
}

/// Outcome of a submitted transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
	pub prepared: PreparedTransfer,
	pub sender_before: Option<u128>,
	pub recipient_before: Option<u128>,
	pub broadcast: BroadcastResult,
	/// `None` if the tx was not seen in a block before the timeout.
	pub confirmation: Option<TxStatus>,
	pub sender_after: Option<u128>,
	pub recipient_after: Option<u128>,
}

/// The orchestrator: borrows a node and a keyring for one run.
pub struct Workflow<'a, N: ?Sized, S: ?Sized> {
	node: &'a N,
	keys: &'a S,
	settings: &'a Settings,
}

impl<'a, N, S> Workflow<'a, N, S>
where
	N: Node + ?Sized,
	S: Signer + ?Sized,
{
	pub fn new(node: &'a N, keys: &'a S, settings: &'a Settings) -> Self {
		Self {
			node,
			keys,
			settings,
		}
	}

	// -- Identity --

	/// Look up a named key. Never touches the network.
	pub fn resolve_address(&self, name: &str) -> Result<KeyInfo> {
		self.keys.key(name)
	}

	/// Accept either a keyring name or a bech32 address.
	pub fn resolve_recipient(&self, name_or_address: &str) -> Result<String> {
		match self.keys.key(name_or_address) {
			Ok(info) => Ok(info.address),
			Err(Error::KeyNotFound(name)) => {
				match crypto::decode_address(&self.settings.bech32_prefix, name_or_address) {
					Ok(_) => Ok(name_or_address.to_owned()),
					Err(_) => Err(Error::KeyNotFound(name)),
				}
			}
			Err(e) => Err(e),
		}
	}

	// -- Node round-trips --

	pub async fn fetch_account_state(&self, address: &str) -> Result<AccountState> {
		self.node.account(address).await
	}

	pub async fn estimate_gas(&self, tx_bytes: Vec<u8>) -> Result<GasEstimate> {
		let gas = self.node.simulate(tx_bytes).await?;
		tracing::info!(gas_wanted = gas.gas_wanted, gas_used = gas.gas_used, "gas estimated");
		Ok(gas)
	}

	/// Read-only balance lookup. Failures are logged and become `None`.
	pub async fn query_balance(&self, address: &str, denom: &str) -> Option<u128> {
		match self.node.balance(address, denom).await {
			Ok(amount) => Some(amount),
			Err(e) => {
				tracing::warn!(address, denom, error = %e, "balance query failed");
				None
			}
		}
	}

	/// Submit in sync mode; a CheckTx rejection is an error.
	pub async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
		let result = self.node.broadcast(tx_bytes).await?;
		if !result.is_accepted() {
			return Err(Error::BroadcastRejected {
				tx_hash: result.tx_hash,
				codespace: result.codespace,
				code: result.code,
				log: result.raw_log,
			});
		}
		tracing::info!(tx_hash = %result.tx_hash, "transaction accepted into mempool");
		Ok(result)
	}

	/// Poll until the tx appears in a block or the timeout elapses.
	///
	/// A failed status query is logged and polling continues.
	pub async fn wait_for_confirmation(&self, tx_hash: &str) -> Option<TxStatus> {
		let deadline = tokio::time::Instant::now() + self.settings.confirm_timeout;
		loop {
			match self.node.tx_status(tx_hash).await {
				Ok(Some(status)) => {
					tracing::info!(tx_hash, height = status.height, code = status.code, "transaction included");
					return Some(status);
				}
				Ok(None) => tracing::debug!(tx_hash, "transaction not yet included"),
				Err(e) => tracing::warn!(tx_hash, error = %e, "transaction status query failed"),
			}
			if tokio::time::Instant::now() >= deadline {
				tracing::warn!(tx_hash, "confirmation timed out");
				return None;
			}
			tokio::time::sleep(self.settings.poll_interval).await;
		}
	}

	// -- Signing --

	fn signer_data(&self, key: &KeyInfo, state: AccountState) -> SignerData {
		SignerData {
			chain_id: self.settings.chain_id.clone(),
			account_number: state.account_number,
			sequence: state.sequence,
			algorithm: key.algorithm,
			public_key: key.public_key.clone(),
		}
	}

	/// Two-pass signing: placeholder fee, simulate, then the real fee.
	///
	/// Account state is fetched before each pass so the final signature
	/// always carries the latest sequence.
	pub async fn sign_envelope(&self, signer: &KeyInfo, draft: TxDraft) -> Result<(SignedTx, GasEstimate)> {
		let state = self.fetch_account_state(&signer.address).await?;
		let unsigned = UnsignedTx::new(
			draft,
			self.signer_data(signer, state),
			self.settings.max_gas,
			&self.settings.fee_denom,
		);
		let simulated = unsigned.sign_for_simulation(self.keys, &signer.name).await?;

		tracing::info!("signing again with simulated gas");
		let gas = self.estimate_gas(simulated.tx_bytes()).await?;
		// Fail on overflow before another round-trip.
		tx_builder::fee_for_gas(gas.gas_used, self.settings.gas_price)?;

		let state = self.fetch_account_state(&signer.address).await?;
		let signed = simulated
			.resign(
				gas.gas_used,
				self.settings.gas_price,
				self.signer_data(signer, state),
				self.keys,
				&signer.name,
			)
			.await?;
		Ok((signed, gas))
	}

	// -- Pipeline --

	/// Resolve, build, sign and verify, without broadcasting.
	pub async fn prepare(&self, request: &TransferRequest) -> Result<PreparedTransfer> {
		let sender = self.resolve_address(&request.from)?;
		let recipient = self.resolve_recipient(&request.to)?;

		let msg: MsgSend = build_transfer_message(&sender.address, &recipient, &request.denom, request.amount);
		let draft = TxDraft::transfer(&msg).with_memo(request.memo.clone());
		let (tx, gas) = self.sign_envelope(&sender, draft).await?;

		let verified = verify_locally(
			tx.raw(),
			tx.signature(),
			&sender,
			&self.settings.chain_id,
			tx.signer_data().account_number,
		);
		if !verified {
			tracing::warn!(signer = %sender.name, "local signature verification failed; the node decides");
		}

		Ok(PreparedTransfer {
			sender,
			recipient,
			denom: request.denom.clone(),
			amount: request.amount,
			gas,
			tx,
			verified,
		})
	}

	/// Broadcast a prepared transfer and observe its effect on balances.
	pub async fn submit(&self, prepared: PreparedTransfer) -> Result<TransferReport> {
		let denom = prepared.denom.clone();
		let sender_before = self.query_balance(&prepared.sender.address, &denom).await;
		let recipient_before = self.query_balance(&prepared.recipient, &denom).await;

		let broadcast = self.broadcast(prepared.tx.to_bytes()).await?;
		let confirmation = self.wait_for_confirmation(&broadcast.tx_hash).await;

		let sender_after = self.query_balance(&prepared.sender.address, &denom).await;
		let recipient_after = self.query_balance(&prepared.recipient, &denom).await;

		Ok(TransferReport {
			prepared,
			sender_before,
			recipient_before,
			broadcast,
			confirmation,
			sender_after,
			recipient_after,
		})
	}

	pub async fn run(&self, request: &TransferRequest) -> Result<TransferReport> {
		let prepared = self.prepare(request).await?;
		self.submit(prepared).await
	}
}

/// Rebuild the SIGN_MODE_DIRECT bytes of `raw` and check `signature`
/// against the signer's public key.
pub fn verify_locally(
	raw: &TxRaw,
	signature: &[u8],
	signer: &KeyInfo,
	chain_id: &str,
	account_number: u64,
) -> bool {
	let doc = tx_builder::sign_doc_bytes(&raw.body_bytes, &raw.auth_info_bytes, chain_id, account_number);
	crypto::verify(signer.algorithm, &signer.public_key, &doc, signature)
}
