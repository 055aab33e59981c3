use std::time::Duration;

use cosmos_sdk_proto::cosmos::auth::v1beta1::{
	query_client::QueryClient as AuthQueryClient, BaseAccount, QueryAccountInfoRequest,
	QueryAccountRequest,
};
use cosmos_sdk_proto::cosmos::bank::v1beta1::{
	query_client::QueryClient as BankQueryClient, QueryBalanceRequest,
};
use cosmos_sdk_proto::cosmos::tx::v1beta1::{
	service_client::ServiceClient, BroadcastMode as ProtoBroadcastMode, BroadcastTxRequest,
	GetTxRequest, SimulateRequest,
};
use cosmos_sdk_proto::Any;
use prost::Message;
use tonic::transport::{Channel, Endpoint, Uri};
use tonic::Code;

use crate::error::{Error, Result};
use crate::node::{
	AccountQuerier, AccountState, BalanceQuerier, BroadcastResult, Broadcaster,
	GasEstimate, Simulator, TxStatus,
};
use crate::proto::{EthAccount, BASE_ACCOUNT_TYPE_URL, ETH_ACCOUNT_TYPE_URL};

/// One plaintext gRPC channel to a node, serving the tx, auth and bank
/// services.
///
/// Account lookups prefer `AccountInfo`, which returns a plain
/// `BaseAccount`; nodes older than SDK 0.47 only offer `Account`, whose
/// `Any` payload is unpacked by hand.
#[derive(Clone)]
pub struct GrpcClient {
	channel: Channel,
}

impl GrpcClient {
	pub async fn connect(endpoint: &str, connect_timeout: Duration) -> Result<Self> {
		let uri: Uri = endpoint.parse().map_err(|e| Error::InvalidEndpoint {
			endpoint: endpoint.to_owned(),
			reason: format!("{e}"),
		})?;
		let channel = Endpoint::from(uri)
			.connect_timeout(connect_timeout)
			.connect()
			.await
			.map_err(|source| Error::Connect {
				endpoint: endpoint.to_owned(),
				source,
			})?;
		tracing::debug!(endpoint, "grpc channel open");
		Ok(Self { channel })
	}

	fn tx(&self) -> ServiceClient<Channel> {
		ServiceClient::new(self.channel.clone())
	}

	fn auth(&self) -> AuthQueryClient<Channel> {
		AuthQueryClient::new(self.channel.clone())
	}

	fn bank(&self) -> BankQueryClient<Channel> {
		BankQueryClient::new(self.channel.clone())
	}
}

#[async_trait::async_trait]
impl AccountQuerier for GrpcClient {
	async fn account(&self, address: &str) -> Result<AccountState> {
		let query_err = |status| Error::AccountQuery {
			address: address.to_owned(),
			status,
		};
		let mut auth = self.auth();

		let request = QueryAccountInfoRequest {
			address: address.to_owned(),
		};
		match auth.account_info(request).await {
			Ok(resp) => {
				let info = resp.into_inner().info.ok_or_else(|| Error::AccountDecode {
					address: address.to_owned(),
					reason: "empty AccountInfo response".into(),
				})?;
				let state = state_of(&info);
				tracing::debug!(address, ?state, "account info");
				return Ok(state);
			}
			Err(status) if status.code() == Code::Unimplemented => {
				tracing::debug!(address, "AccountInfo unimplemented, falling back to Account");
			}
			Err(status) => return Err(query_err(status)),
		}

		let request = QueryAccountRequest {
			address: address.to_owned(),
		};
		let resp = auth.account(request).await.map_err(query_err)?.into_inner();
		let any = resp.account.ok_or_else(|| Error::AccountDecode {
			address: address.to_owned(),
			reason: "empty Account response".into(),
		})?;
		let state = decode_account(address, &any)?;
		tracing::debug!(address, ?state, type_url = %any.type_url, "account");
		Ok(state)
	}
}

#[async_trait::async_trait]
impl BalanceQuerier for GrpcClient {
	async fn balance(&self, address: &str, denom: &str) -> Result<u128> {
		let request = QueryBalanceRequest {
			address: address.to_owned(),
			denom: denom.to_owned(),
		};
		let resp = self
			.bank()
			.balance(request)
			.await
			.map_err(|status| Error::BalanceQuery {
				address: address.to_owned(),
				status,
			})?
			.into_inner();

		let amount = match resp.balance {
			Some(coin) => parse_amount(&coin.amount)?,
			None => 0,
		};
		tracing::debug!(address, denom, amount, "balance");
		Ok(amount)
	}
}

#[async_trait::async_trait]
impl Simulator for GrpcClient {
	async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasEstimate> {
		let request = SimulateRequest {
			tx_bytes,
			..Default::default()
		};
		let resp = self
			.tx()
			.simulate(request)
			.await
			.map_err(Error::Simulation)?
			.into_inner();
		let gas = resp
			.gas_info
			.ok_or_else(|| Error::Simulation(tonic::Status::internal("response carried no gas info")))?;
		tracing::debug!(gas_wanted = gas.gas_wanted, gas_used = gas.gas_used, "simulated");
		Ok(GasEstimate {
			gas_wanted: gas.gas_wanted,
			gas_used: gas.gas_used,
		})
	}
}

#[async_trait::async_trait]
impl Broadcaster for GrpcClient {
	async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult> {
		let request = BroadcastTxRequest {
			tx_bytes,
			mode: ProtoBroadcastMode::Sync as i32,
		};
		let resp = self
			.tx()
			.broadcast_tx(request)
			.await
			.map_err(Error::Broadcast)?
			.into_inner();
		let tx = resp
			.tx_response
			.ok_or_else(|| Error::Broadcast(tonic::Status::internal("response carried no tx_response")))?;
		tracing::debug!(tx_hash = %tx.txhash, code = tx.code, "broadcast");
		Ok(BroadcastResult {
			tx_hash: tx.txhash,
			code: tx.code,
			codespace: tx.codespace,
			raw_log: tx.raw_log,
		})
	}

	async fn tx_status(&self, tx_hash: &str) -> Result<Option<TxStatus>> {
		let request = GetTxRequest {
			hash: tx_hash.to_owned(),
		};
		let resp = match self.tx().get_tx(request).await {
			Ok(resp) => resp.into_inner(),
			Err(status) if is_not_found(&status) => return Ok(None),
			Err(status) => return Err(Error::TxQuery(status)),
		};
		Ok(resp.tx_response.map(|tx| TxStatus {
			tx_hash: tx.txhash,
			height: tx.height,
			code: tx.code,
			gas_wanted: tx.gas_wanted,
			gas_used: tx.gas_used,
			raw_log: tx.raw_log,
		}))
	}
}

// -- Helpers --

/// Unpack the account types a node may return from the `Account` query.
pub fn decode_account(address: &str, any: &Any) -> Result<AccountState> {
	let base = match any.type_url.as_str() {
		BASE_ACCOUNT_TYPE_URL => BaseAccount::decode(any.value.as_slice())?,
		ETH_ACCOUNT_TYPE_URL => EthAccount::decode(any.value.as_slice())?
			.base_account
			.ok_or_else(|| Error::AccountDecode {
				address: address.to_owned(),
				reason: "EthAccount without base_account".into(),
			})?,
		other => {
			return Err(Error::AccountDecode {
				address: address.to_owned(),
				reason: format!("unsupported account type {other}"),
			})
		}
	};
	Ok(state_of(&base))
}

fn state_of(account: &BaseAccount) -> AccountState {
	AccountState {
		account_number: account.account_number,
		sequence: account.sequence,
	}
}

fn parse_amount(amount: &str) -> Result<u128> {
	amount
		.parse()
		.map_err(|_| Error::InvalidAmount(amount.to_owned()))
}

/// Pending txs surface as NotFound, though some nodes wrap the message in
/// a different code.
fn is_not_found(status: &tonic::Status) -> bool {
	status.code() == Code::NotFound || status.message().contains("not found")
}
