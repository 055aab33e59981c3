use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend;
use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey as Secp256k1PubKey;
use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
use cosmos_sdk_proto::cosmos::tx::v1beta1::{
	mode_info, AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, TxBody, TxRaw,
};
use cosmos_sdk_proto::Any;
use prost::Message;

use crate::crypto::KeyAlgorithm;
use crate::error::{Error, Result};
use crate::proto::{EthSecp256k1PubKey, MSG_SEND_TYPE_URL};

/// Fee attached to the first signing pass. Large enough that the ante
/// handler never rejects the simulation for an insufficient fee.
pub const PLACEHOLDER_FEE: u64 = i64::MAX as u64;

/// Signer-side values that go into the auth info and sign doc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
	pub chain_id: String,
	pub account_number: u64,
	pub sequence: u64,
	pub algorithm: KeyAlgorithm,
	/// 33-byte compressed public key.
	pub public_key: Vec<u8>,
}

/// Build a single-coin bank transfer.
pub fn build_transfer_message(from: &str, to: &str, denom: &str, amount: u128) -> MsgSend {
	MsgSend {
		from_address: from.to_owned(),
		to_address: to.to_owned(),
		amount: vec![coin(denom, amount)],
	}
}

pub fn coin(denom: &str, amount: u128) -> Coin {
	Coin {
		denom: denom.to_owned(),
		amount: amount.to_string(),
	}
}

/// `gas_used * gas_price`, refusing anything a signed 64-bit coin amount
/// cannot hold.
pub fn fee_for_gas(gas_used: u64, gas_price: u64) -> Result<u64> {
	let fee = u128::from(gas_used) * u128::from(gas_price);
	if fee > i64::MAX as u128 {
		return Err(Error::FeeOverflow {
			gas_used,
			gas_price,
		});
	}
	Ok(fee as u64)
}

/// Wrap a message in an `Any` under the given type URL.
pub fn pack_any<M: Message>(type_url: &str, msg: &M) -> Any {
	Any {
		type_url: type_url.to_owned(),
		value: msg.encode_to_vec(),
	}
}

/// Encode a compressed public key as the `Any` the chain expects for it.
pub fn public_key_any(algorithm: KeyAlgorithm, key: &[u8]) -> Any {
	let key = key.to_vec();
	match algorithm {
		KeyAlgorithm::EthSecp256k1 => {
			pack_any(algorithm.pubkey_type_url(), &EthSecp256k1PubKey { key })
		}
		KeyAlgorithm::Secp256k1 => pack_any(algorithm.pubkey_type_url(), &Secp256k1PubKey { key }),
	}
}

/// The mutable parts of a transaction before it is signed: messages,
/// memo, gas limit and fee.
#[derive(Debug, Clone, PartialEq)]
pub struct TxDraft {
	messages: Vec<Any>,
	memo: String,
	gas_limit: u64,
	fee: Vec<Coin>,
}

impl TxDraft {
	pub fn new(messages: Vec<Any>) -> Self {
		Self {
			messages,
			memo: String::new(),
			gas_limit: 0,
			fee: Vec::new(),
		}
	}

	pub fn transfer(msg: &MsgSend) -> Self {
		Self::new(vec![pack_any(MSG_SEND_TYPE_URL, msg)])
	}

	pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
		self.memo = memo.into();
		self
	}

	/// Set the upper-bound gas and fee used for the simulation pass.
	pub fn with_placeholder_fee(mut self, max_gas: u64, denom: &str) -> Self {
		self.set_fee(max_gas, coin(denom, u128::from(PLACEHOLDER_FEE)));
		self
	}

	pub fn set_fee(&mut self, gas_limit: u64, fee: Coin) {
		self.gas_limit = gas_limit;
		self.fee = vec![fee];
	}

	pub fn gas_limit(&self) -> u64 {
		self.gas_limit
	}

	pub fn fee(&self) -> &[Coin] {
		&self.fee
	}

	pub fn body_bytes(&self) -> Vec<u8> {
		TxBody {
			messages: self.messages.clone(),
			memo: self.memo.clone(),
			..Default::default()
		}
		.encode_to_vec()
	}

	/// Auth info for a single SIGN_MODE_DIRECT signer.
	pub fn auth_info_bytes(&self, signer: &SignerData) -> Vec<u8> {
		let signer_info = SignerInfo {
			public_key: Some(public_key_any(signer.algorithm, &signer.public_key)),
			mode_info: Some(ModeInfo {
				sum: Some(mode_info::Sum::Single(mode_info::Single {
					mode: SignMode::Direct as i32,
				})),
			}),
			sequence: signer.sequence,
		};
		AuthInfo {
			signer_infos: vec![signer_info],
			fee: Some(Fee {
				amount: self.fee.clone(),
				gas_limit: self.gas_limit,
				..Default::default()
			}),
			..Default::default()
		}
		.encode_to_vec()
	}
}

/// The exact bytes a SIGN_MODE_DIRECT signer signs.
pub fn sign_doc_bytes(
	body_bytes: &[u8],
	auth_info_bytes: &[u8],
	chain_id: &str,
	account_number: u64,
) -> Vec<u8> {
	SignDoc {
		body_bytes: body_bytes.to_vec(),
		auth_info_bytes: auth_info_bytes.to_vec(),
		chain_id: chain_id.to_owned(),
		account_number,
	}
	.encode_to_vec()
}

pub fn encode_raw(raw: &TxRaw) -> Vec<u8> {
	raw.encode_to_vec()
}

pub fn decode_raw(bytes: &[u8]) -> Result<TxRaw> {
	Ok(TxRaw::decode(bytes)?)
}
