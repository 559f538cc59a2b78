/*!
The boundary between transaction building and a Stacks node.

Builders never talk to a node directly: they are generic over a
[NetworkClient], which answers nonce, fee and contract interface queries
and accepts encoded transactions. [http::StacksNodeClient] implements it
over the node HTTP API.
*/

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use url::Url;

use crate::{
	address::StacksAddress,
	clarity::abi::ContractAbi,
	transaction::{payload::PayloadType, TransactionVersion, TxId},
	validated_strings::ContractName,
	Network, StacksResult,
};

/// HTTP implementation of the collaborator
pub mod http;

/// Default node of mainnet
pub static MAINNET_NODE_URL: Lazy<Url> =
	Lazy::new(|| Url::parse("https://api.mainnet.hiro.so").unwrap());
/// Default node of testnet
pub static TESTNET_NODE_URL: Lazy<Url> =
	Lazy::new(|| Url::parse("https://api.testnet.hiro.so").unwrap());

/// Network a transaction is built for and the node it is sent to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StacksNetwork {
	/// Transaction version
	pub version: TransactionVersion,
	/// Chain id
	pub chain_id: u32,
	/// Node base URL
	pub node_url: Url,
}

impl StacksNetwork {
	/// Mainnet with the default node
	pub fn mainnet() -> Self {
		Self::custom(Network::Mainnet, MAINNET_NODE_URL.clone())
	}

	/// Testnet with the default node
	pub fn testnet() -> Self {
		Self::custom(Network::Testnet, TESTNET_NODE_URL.clone())
	}

	/// A network kind with its default chain id served by a custom node
	pub fn custom(network: Network, node_url: Url) -> Self {
		let version = TransactionVersion::from(network);

		Self {
			version,
			chain_id: version.chain_id(),
			node_url,
		}
	}

	/// Network kind
	pub fn network(&self) -> Network {
		self.version.network()
	}
}

/// Why a node refused a transaction
#[derive(
	Serialize,
	Deserialize,
	Display,
	EnumString,
	EnumIter,
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
)]
pub enum RejectReason {
	/// The transaction could not be encoded
	Serialization,
	/// The transaction could not be decoded
	Deserialization,
	/// A signature does not verify
	SignatureValidation,
	/// The fee is below the minimum
	FeeTooLow,
	/// The nonce is not the next account nonce
	BadNonce,
	/// The payer cannot cover the fee and transfer
	NotEnoughFunds,
	/// The called contract does not exist
	NoSuchContract,
	/// The called function is not public
	NoSuchPublicFunction,
	/// An argument does not match the function
	BadFunctionArgument,
	/// A contract with the name is already deployed
	ContractAlreadyExists,
	/// The reported microblocks do not conflict
	PoisonMicroblocksDoNotConflict,
	/// The reported microblock signer is unknown
	PoisonMicroblockHasUnknownPubKeyHash,
	/// The reported microblock is invalid
	PoisonMicroblockIsInvalid,
	/// An address version does not match the network
	BadAddressVersionByte,
	/// Coinbase transactions cannot enter the mempool
	NoCoinbaseViaMempool,
	/// The node has no chain tip
	ServerFailureNoSuchChainTip,
	/// The node database failed
	ServerFailureDatabase,
	/// Any other node failure
	ServerFailureOther,
}

/// Rejection body returned by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxRejection {
	/// Short error text
	pub error: String,
	/// Rejection reason
	pub reason: RejectReason,
	/// Reason specific details
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reason_data: Option<serde_json::Value>,
	/// Id of the rejected transaction
	pub txid: String,
}

/// Outcome of a broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxBroadcastResult {
	/// Accepted into the mempool
	Accepted(TxId),
	/// Refused by the node
	Rejected(TxRejection),
}

impl TxBroadcastResult {
	/// Returns true when the node accepted the transaction
	pub fn is_accepted(&self) -> bool {
		matches!(self, Self::Accepted(_))
	}
}

/// Queries and submissions a transaction pipeline needs from a node
#[allow(async_fn_in_trait)]
pub trait NetworkClient {
	/// Next nonce of an account
	async fn get_nonce(&self, address: &StacksAddress) -> StacksResult<u64>;

	/// Fee for a transaction of the given encoded length
	async fn estimate_fee(
		&self,
		byte_length: usize,
		payload_type: PayloadType,
	) -> StacksResult<u64>;

	/// Published interface of a deployed contract
	async fn get_interface(
		&self,
		address: &StacksAddress,
		contract_name: &ContractName,
	) -> StacksResult<ContractAbi>;

	/// Submits an encoded transaction with an optional attachment
	async fn broadcast(
		&self,
		transaction: &[u8],
		attachment: Option<&[u8]>,
	) -> StacksResult<TxBroadcastResult>;
}

#[cfg(test)]
mod tests {
	use std::str::FromStr;

	use strum::IntoEnumIterator;

	use super::*;
	use crate::transaction::CHAIN_ID_TESTNET;

	#[test]
	fn should_build_default_networks() {
		let testnet = StacksNetwork::testnet();

		assert_eq!(testnet.version, TransactionVersion::Testnet);
		assert_eq!(testnet.chain_id, CHAIN_ID_TESTNET);
		assert_eq!(testnet.node_url.as_str(), "https://api.testnet.hiro.so/");
		assert_eq!(StacksNetwork::mainnet().network(), Network::Mainnet);
	}

	#[test]
	fn should_preserve_reject_reason_names() {
		assert_eq!(RejectReason::iter().count(), 18);

		for reason in RejectReason::iter() {
			assert_eq!(RejectReason::from_str(&reason.to_string()).unwrap(), reason);
		}
	}

	#[test]
	fn should_parse_node_rejection() {
		let body = r#"{
			"error": "transaction rejected",
			"reason": "BadNonce",
			"reason_data": {"expected": 3, "actual": 1},
			"txid": "0a8f"
		}"#;

		let rejection: TxRejection = serde_json::from_str(body).unwrap();

		assert_eq!(rejection.reason, RejectReason::BadNonce);
		assert_eq!(rejection.reason_data.unwrap()["expected"], 3);
	}
}
