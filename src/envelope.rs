//! The two-pass signing protocol as a typed state machine.
//!
//! ```text
//! UnsignedTx --sign_for_simulation--> SimulatedTx --resign--> SignedTx
//! ```
//!
//! `SimulatedTx` carries a placeholder fee and is only good for the
//! `Simulate` RPC. `resign` consumes it, so its signature cannot leak into
//! the broadcast path.

use std::fmt;

use cosmos_sdk_proto::cosmos::tx::v1beta1::TxRaw;

use crate::error::Result;
use crate::signer::Signer;
use crate::tx_builder::{self, SignerData, TxDraft};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Unsigned,
	SimulatedOnce,
	FinalSigned,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Unsigned => "unsigned",
			Self::SimulatedOnce => "simulated-once",
			Self::FinalSigned => "final-signed",
		})
	}
}

/// A draft with the placeholder fee, not yet signed.
#[derive(Debug, Clone)]
pub struct UnsignedTx {
	draft: TxDraft,
	signer: SignerData,
	fee_denom: String,
}

impl UnsignedTx {
	/// Attach the upper-bound `max_gas` and maximal fee so the envelope can
	/// be simulated.
	pub fn new(draft: TxDraft, signer: SignerData, max_gas: u64, fee_denom: &str) -> Self {
		Self {
			draft: draft.with_placeholder_fee(max_gas, fee_denom),
			signer,
			fee_denom: fee_denom.to_owned(),
		}
	}

	pub fn stage(&self) -> Stage {
		Stage::Unsigned
	}

	pub fn draft(&self) -> &TxDraft {
		&self.draft
	}

	/// First signing pass, over the placeholder fee.
	pub async fn sign_for_simulation<S>(self, keys: &S, key_name: &str) -> Result<SimulatedTx>
	where
		S: Signer + ?Sized,
	{
		let raw = sign_draft(&self.draft, &self.signer, keys, key_name).await?;
		tracing::debug!(stage = %Stage::SimulatedOnce, gas_limit = self.draft.gas_limit(), "signed with placeholder fee");
		Ok(SimulatedTx {
			draft: self.draft,
			signer: self.signer,
			fee_denom: self.fee_denom,
			raw,
		})
	}
}

/// Signed over the placeholder fee; its bytes feed the gas estimate.
#[derive(Debug, Clone)]
pub struct SimulatedTx {
	draft: TxDraft,
	signer: SignerData,
	fee_denom: String,
	raw: TxRaw,
}

impl SimulatedTx {
	pub fn stage(&self) -> Stage {
		Stage::SimulatedOnce
	}

	pub fn tx_bytes(&self) -> Vec<u8> {
		tx_builder::encode_raw(&self.raw)
	}

	pub fn raw(&self) -> &TxRaw {
		&self.raw
	}

	/// Replace gas and fee with the simulated values and sign again.
	///
	/// `signer` must be the account state observed just before this call;
	/// the placeholder signature is discarded.
	pub async fn resign<S>(
		self,
		gas_used: u64,
		gas_price: u64,
		signer: SignerData,
		keys: &S,
		key_name: &str,
	) -> Result<SignedTx>
	where
		S: Signer + ?Sized,
	{
		let fee = tx_builder::fee_for_gas(gas_used, gas_price)?;
		if signer.sequence != self.signer.sequence {
			tracing::debug!(
				simulated = self.signer.sequence,
				current = signer.sequence,
				"sequence moved since simulation"
			);
		}
		let mut draft = self.draft;
		draft.set_fee(gas_used, tx_builder::coin(&self.fee_denom, u128::from(fee)));

		let raw = sign_draft(&draft, &signer, keys, key_name).await?;
		tracing::debug!(stage = %Stage::FinalSigned, gas_used, fee, "re-signed with simulated fee");
		Ok(SignedTx {
			draft,
			signer,
			raw,
			fee,
		})
	}
}

/// Ready to broadcast: fee and gas come from simulation.
#[derive(Debug, Clone)]
pub struct SignedTx {
	draft: TxDraft,
	signer: SignerData,
	raw: TxRaw,
	fee: u64,
}

impl SignedTx {
	pub fn stage(&self) -> Stage {
		Stage::FinalSigned
	}

	pub fn raw(&self) -> &TxRaw {
		&self.raw
	}

	pub fn to_bytes(&self) -> Vec<u8> {
		tx_builder::encode_raw(&self.raw)
	}

	/// The single signer's signature.
	pub fn signature(&self) -> &[u8] {
		self.raw.signatures.first().map(Vec::as_slice).unwrap_or_default()
	}

	pub fn signer_data(&self) -> &SignerData {
		&self.signer
	}

	pub fn gas_limit(&self) -> u64 {
		self.draft.gas_limit()
	}

	pub fn fee(&self) -> u64 {
		self.fee
	}
}

async fn sign_draft<S>(draft: &TxDraft, signer: &SignerData, keys: &S, key_name: &str) -> Result<TxRaw>
where
	S: Signer + ?Sized,
{
	let body_bytes = draft.body_bytes();
	let auth_info_bytes = draft.auth_info_bytes(signer);
	let doc = tx_builder::sign_doc_bytes(
		&body_bytes,
		&auth_info_bytes,
		&signer.chain_id,
		signer.account_number,
	);
	let signature = keys.sign(key_name, &doc).await?;
	Ok(TxRaw {
		body_bytes,
		auth_info_bytes,
		signatures: vec![signature],
	})
}
