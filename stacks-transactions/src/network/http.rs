//! [NetworkClient] over the Stacks node HTTP API

use reqwest::{header::CONTENT_TYPE, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::{
	address::StacksAddress,
	clarity::abi::ContractAbi,
	crypto::Hashing,
	network::{
		NetworkClient, StacksNetwork, TxBroadcastResult, TxRejection,
	},
	transaction::{payload::PayloadType, TxId},
	validated_strings::ContractName,
	StacksError, StacksResult,
};

/// Client of a single Stacks node
#[derive(Debug, Clone)]
pub struct StacksNodeClient {
	node_url: Url,
	http_client: reqwest::Client,
}

#[derive(Deserialize)]
struct AccountInfo {
	nonce: u64,
}

impl StacksNodeClient {
	/// Client of the node at the URL
	pub fn new(node_url: Url) -> Self {
		Self::with_client(node_url, reqwest::Client::new())
	}

	/// Client sharing an existing HTTP client
	pub fn with_client(node_url: Url, http_client: reqwest::Client) -> Self {
		Self {
			node_url,
			http_client,
		}
	}

	/// Client of the node of a network
	pub fn from_network(network: &StacksNetwork) -> Self {
		Self::new(network.node_url.clone())
	}

	/// Node base URL
	pub fn node_url(&self) -> &Url {
		&self.node_url
	}

	fn account_url(&self, address: &StacksAddress) -> StacksResult<Url> {
		Ok(self
			.node_url
			.join(&format!("/v2/accounts/{}?proof=0", address))?)
	}

	fn fee_url(&self) -> StacksResult<Url> {
		Ok(self.node_url.join("/v2/fees/transfer")?)
	}

	fn interface_url(
		&self,
		address: &StacksAddress,
		contract_name: &ContractName,
	) -> StacksResult<Url> {
		Ok(self.node_url.join(&format!(
			"/v2/contracts/interface/{}/{}",
			address, contract_name
		))?)
	}

	fn broadcast_url(&self) -> StacksResult<Url> {
		Ok(self.node_url.join("/v2/transactions")?)
	}
}

async fn successful(response: Response) -> StacksResult<Response> {
	let status = response.status();

	if status.is_success() {
		return Ok(response);
	}

	let url = response.url().clone();
	let body = response.text().await.unwrap_or_default();
	debug!("Request to {} failed with {}: {}", url, status, body);

	Err(StacksError::NetworkError(format!(
		"Request to {} failed with {}: {}",
		url, status, body
	)))
}

impl NetworkClient for StacksNodeClient {
	async fn get_nonce(&self, address: &StacksAddress) -> StacksResult<u64> {
		let response = self
			.http_client
			.get(self.account_url(address)?)
			.send()
			.await?;
		let account: AccountInfo = successful(response).await?.json().await?;

		Ok(account.nonce)
	}

	async fn estimate_fee(
		&self,
		byte_length: usize,
		payload_type: PayloadType,
	) -> StacksResult<u64> {
		let response = self.http_client.get(self.fee_url()?).send().await?;
		let fee_rate: u64 = successful(response).await?.json().await?;

		debug!(
			"Fee rate {} for {} bytes of {}",
			fee_rate, byte_length, payload_type
		);

		Ok(fee_rate.saturating_mul(byte_length as u64))
	}

	async fn get_interface(
		&self,
		address: &StacksAddress,
		contract_name: &ContractName,
	) -> StacksResult<ContractAbi> {
		let response = self
			.http_client
			.get(self.interface_url(address, contract_name)?)
			.send()
			.await?;

		Ok(successful(response).await?.json().await?)
	}

	async fn broadcast(
		&self,
		transaction: &[u8],
		attachment: Option<&[u8]>,
	) -> StacksResult<TxBroadcastResult> {
		let request = self.http_client.post(self.broadcast_url()?);
		let request = match attachment {
			Some(attachment) => request.json(&json!({
				"tx": hex::encode(transaction),
				"attachment": hex::encode(attachment),
			})),
			None => request
				.header(CONTENT_TYPE, "application/octet-stream")
				.body(transaction.to_vec()),
		};

		let response = request.send().await?;
		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			debug!("Broadcast rejected with {}: {}", status, body);

			let rejection: TxRejection =
				serde_json::from_str(&body).map_err(|err| {
					StacksError::NetworkError(format!(
						"Failed to broadcast transaction: {}",
						err
					))
				})?;

			return Ok(TxBroadcastResult::Rejected(rejection));
		}

		let txid = body.replace('"', "");

		match TxId::from_hex(txid.trim()) {
			Ok(txid) => Ok(TxBroadcastResult::Accepted(txid)),
			Err(_) => {
				debug!("Broadcast answered with an invalid txid: {}", body);

				Err(StacksError::NetworkError(body))
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_build_node_urls() {
		let client = StacksNodeClient::from_network(&StacksNetwork::testnet());
		let address: StacksAddress =
			"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap();
		let contract_name = ContractName::new("hello-world").unwrap();

		assert_eq!(
			client.account_url(&address).unwrap().as_str(),
			"https://api.testnet.hiro.so/v2/accounts/ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM?proof=0"
		);
		assert_eq!(
			client
				.interface_url(&address, &contract_name)
				.unwrap()
				.as_str(),
			"https://api.testnet.hiro.so/v2/contracts/interface/ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM/hello-world"
		);
		assert_eq!(
			client.broadcast_url().unwrap().path(),
			"/v2/transactions"
		);
	}
}
