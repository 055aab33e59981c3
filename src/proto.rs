//! Ethermint protobuf messages that `cosmos-sdk-proto` does not ship.

use cosmos_sdk_proto::cosmos::auth::v1beta1::BaseAccount;

pub const BASE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.BaseAccount";
pub const ETH_ACCOUNT_TYPE_URL: &str = "/ethermint.types.v1.EthAccount";
pub const MSG_SEND_TYPE_URL: &str = "/cosmos.bank.v1beta1.MsgSend";

/// `ethermint.crypto.v1.ethsecp256k1.PubKey`
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthSecp256k1PubKey {
	#[prost(bytes = "vec", tag = "1")]
	pub key: Vec<u8>,
}

/// `ethermint.types.v1.EthAccount`
#[derive(Clone, PartialEq, prost::Message)]
pub struct EthAccount {
	#[prost(message, optional, tag = "1")]
	pub base_account: Option<BaseAccount>,
	#[prost(string, tag = "2")]
	pub code_hash: String,
}
