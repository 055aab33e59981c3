//! An in-process stand-in for a node: tracks balances and sequences,
//! checks signatures, and applies `MsgSend` transfers on broadcast.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
use cosmos_sdk_proto::cosmos::tx::v1beta1::{AuthInfo, TxBody};
use prost::Message;
use sha2::{Digest, Sha256};

use exo_transfer::crypto::{self, KeyAlgorithm};
use exo_transfer::node::{
	AccountQuerier, AccountState, BalanceQuerier, BroadcastResult, Broadcaster,
	GasEstimate, Simulator, TxStatus,
};
use exo_transfer::signer::{KeyInfo, Keyring, Signer};
use exo_transfer::tx_builder;
use exo_transfer::workflow::{Settings, TransferRequest};
use exo_transfer::{Error, Result};

pub const CHAIN_ID: &str = "exocoretestnet_233-1";
pub const DENOM: &str = "aexo";
pub const GAS_PRICE: u64 = 7;

pub fn settings() -> Settings {
	Settings {
		chain_id: CHAIN_ID.into(),
		bech32_prefix: "exo".into(),
		fee_denom: DENOM.into(),
		gas_price: GAS_PRICE,
		max_gas: 10_000_000,
		poll_interval: Duration::from_millis(1),
		confirm_timeout: Duration::from_millis(200),
	}
}

/// A keyring with `dev1` and `dev2`.
pub fn keyring() -> (Keyring, KeyInfo, KeyInfo) {
	let mut kr = Keyring::in_memory("exo");
	let dev1 = kr.generate("dev1", KeyAlgorithm::EthSecp256k1).unwrap();
	let dev2 = kr.generate("dev2", KeyAlgorithm::EthSecp256k1).unwrap();
	(kr, dev1, dev2)
}

pub fn request(amount: u128) -> TransferRequest {
	TransferRequest {
		from: "dev1".into(),
		to: "dev2".into(),
		denom: DENOM.into(),
		amount,
		memo: String::new(),
	}
}

#[derive(Default)]
struct Chain {
	accounts: HashMap<String, AccountState>,
	pubkeys: HashMap<String, (KeyAlgorithm, Vec<u8>)>,
	balances: HashMap<String, u128>,
	included: HashMap<String, TxStatus>,
	broadcasts: usize,
}

pub struct FakeNode {
	chain: Mutex<Chain>,
	calls: AtomicUsize,
	account_queries: AtomicUsize,
	status_queries: AtomicUsize,
	pub gas_used: u64,
	pub fail_simulation: bool,
	pub fail_balance: bool,
	/// Broadcast responses carry this CheckTx code instead of applying.
	pub reject_code: Option<u32>,
	/// Status queries that report "not found" before inclusion shows.
	pub pending_polls: usize,
	/// Bump the sender's sequence after the first account query, as if
	/// another tx from the same account landed mid-run.
	pub bump_sequence_once: bool,
}

impl FakeNode {
	pub fn new(gas_used: u64) -> Self {
		Self {
			chain: Mutex::new(Chain::default()),
			calls: AtomicUsize::new(0),
			account_queries: AtomicUsize::new(0),
			status_queries: AtomicUsize::new(0),
			gas_used,
			fail_simulation: false,
			fail_balance: false,
			reject_code: None,
			pending_polls: 0,
			bump_sequence_once: false,
		}
	}

	pub fn fund(&self, key: &KeyInfo, account_number: u64, amount: u128) {
		let mut chain = self.chain.lock().unwrap();
		chain.accounts.insert(
			key.address.clone(),
			AccountState {
				account_number,
				sequence: 0,
			},
		);
		chain
			.pubkeys
			.insert(key.address.clone(), (key.algorithm, key.public_key.clone()));
		chain.balances.insert(key.address.clone(), amount);
	}

	pub fn balance_of(&self, address: &str) -> u128 {
		self.chain.lock().unwrap().balances.get(address).copied().unwrap_or(0)
	}

	pub fn sequence_of(&self, address: &str) -> u64 {
		self.chain.lock().unwrap().accounts[address].sequence
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn broadcasts(&self) -> usize {
		self.chain.lock().unwrap().broadcasts
	}

	fn touch(&self) {
		self.calls.fetch_add(1, Ordering::SeqCst);
	}

	/// Apply a signed tx the way the ante handler and bank module would.
	fn deliver(&self, chain: &mut Chain, tx_bytes: &[u8]) -> std::result::Result<TxStatus, (u32, String)> {
		let raw = tx_builder::decode_raw(tx_bytes).map_err(|e| (2, e.to_string()))?;
		let body = TxBody::decode(raw.body_bytes.as_slice()).map_err(|e| (2, e.to_string()))?;
		let auth = AuthInfo::decode(raw.auth_info_bytes.as_slice()).map_err(|e| (2, e.to_string()))?;
		let msg = MsgSend::decode(body.messages[0].value.as_slice()).map_err(|e| (2, e.to_string()))?;

		let account = *chain
			.accounts
			.get(&msg.from_address)
			.ok_or((9, "unknown account".to_string()))?;
		let signer_info = &auth.signer_infos[0];
		if signer_info.sequence != account.sequence {
			return Err((32, format!("account sequence mismatch, expected {}", account.sequence)));
		}

		let (algorithm, pubkey) = chain.pubkeys[&msg.from_address].clone();
		let doc = tx_builder::sign_doc_bytes(
			&raw.body_bytes,
			&raw.auth_info_bytes,
			CHAIN_ID,
			account.account_number,
		);
		if !crypto::verify(algorithm, &pubkey, &doc, &raw.signatures[0]) {
			return Err((4, "signature verification failed".into()));
		}

		let fee = auth.fee.unwrap_or_default();
		if fee.gas_limit < self.gas_used {
			return Err((11, "out of gas".into()));
		}
		let fee_amount: u128 = fee.amount.first().map(|c| c.amount.parse().unwrap()).unwrap_or(0);
		let amount: u128 = msg.amount[0].amount.parse().unwrap();

		let from_balance = chain.balances.get(&msg.from_address).copied().unwrap_or(0);
		if from_balance < amount + fee_amount {
			return Err((5, "insufficient funds".into()));
		}
		chain.balances.insert(msg.from_address.clone(), from_balance - amount - fee_amount);
		*chain.balances.entry(msg.to_address.clone()).or_default() += amount;
		if let Some(acc) = chain.accounts.get_mut(&msg.from_address) {
			acc.sequence += 1;
		}

		Ok(TxStatus {
			tx_hash: tx_hash(tx_bytes),
			height: 100,
			code: 0,
			gas_wanted: fee.gas_limit as i64,
			gas_used: self.gas_used as i64,
			raw_log: String::new(),
		})
	}
}

pub fn tx_hash(tx_bytes: &[u8]) -> String {
	hex::encode_upper(Sha256::digest(tx_bytes))
}

#[async_trait::async_trait]
impl AccountQuerier for FakeNode {
	async fn account(&self, address: &str) -> Result<AccountState> {
		self.touch();
		let n = self.account_queries.fetch_add(1, Ordering::SeqCst);
		let mut chain = self.chain.lock().unwrap();
		let state = chain.accounts.get_mut(address).ok_or_else(|| Error::AccountQuery {
			address: address.to_owned(),
			status: tonic::Status::not_found("account not found"),
		})?;
		if self.bump_sequence_once && n == 1 {
			state.sequence += 1;
		}
		Ok(*state)
	}
}

#[async_trait::async_trait]
impl BalanceQuerier for FakeNode {
	async fn balance(&self, address: &str, _denom: &str) -> Result<u128> {
		self.touch();
		if self.fail_balance {
			return Err(Error::BalanceQuery {
				address: address.to_owned(),
				status: tonic::Status::unavailable("bank module offline"),
			});
		}
		Ok(self.balance_of(address))
	}
}

#[async_trait::async_trait]
impl Simulator for FakeNode {
	async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasEstimate> {
		self.touch();
		if self.fail_simulation {
			return Err(Error::Simulation(tonic::Status::invalid_argument("out of gas")));
		}
		tx_builder::decode_raw(&tx_bytes)?;
		Ok(GasEstimate {
			gas_wanted: 10_000_000,
			gas_used: self.gas_used,
		})
	}
}

#[async_trait::async_trait]
impl Broadcaster for FakeNode {
	async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
		self.touch();
		let hash = tx_hash(&tx_bytes);
		let mut chain = self.chain.lock().unwrap();
		chain.broadcasts += 1;

		if let Some(code) = self.reject_code {
			return Ok(BroadcastResult {
				tx_hash: hash,
				code,
				codespace: "sdk".into(),
				raw_log: "rejected by test".into(),
			});
		}
		match self.deliver(&mut chain, &tx_bytes) {
			Ok(status) => {
				chain.included.insert(hash.clone(), status);
				Ok(BroadcastResult {
					tx_hash: hash,
					code: 0,
					codespace: String::new(),
					raw_log: String::new(),
				})
			}
			Err((code, log)) => Ok(BroadcastResult {
				tx_hash: hash,
				code,
				codespace: "sdk".into(),
				raw_log: log,
			}),
		}
	}

	async fn tx_status(&self, tx_hash: &str) -> Result<Option<TxStatus>> {
		self.touch();
		let n = self.status_queries.fetch_add(1, Ordering::SeqCst);
		if n < self.pending_polls {
			return Ok(None);
		}
		Ok(self.chain.lock().unwrap().included.get(tx_hash).cloned())
	}
}

/// Delegates to a keyring but flips one bit of every signature.
pub struct CorruptingSigner(pub Keyring);

#[async_trait::async_trait]
impl Signer for CorruptingSigner {
	fn key(&self, name: &str) -> Result<KeyInfo> {
		self.0.key(name)
	}

	async fn sign(&self, name: &str, sign_bytes: &[u8]) -> Result<Vec<u8>> {
		let mut sig = self.0.sign(name, sign_bytes).await?;
		sig[0] ^= 0x01;
		Ok(sig)
	}
}
