use std::sync::{
	atomic::{AtomicUsize, Ordering},
	Mutex,
};

use stacks_transactions::{
	address::StacksAddress,
	crypto::Hashing,
	clarity::ContractAbi,
	network::{NetworkClient, TxBroadcastResult},
	transaction::{payload::PayloadType, TxId},
	validated_strings::ContractName,
	StacksError, StacksResult,
};

/// In-memory node answering with fixed values
#[derive(Default)]
pub struct MockClient {
	pub nonce: u64,
	pub fee_rate: u64,
	pub abi: Option<ContractAbi>,
	pub nonce_queries: AtomicUsize,
	pub fee_queries: AtomicUsize,
	pub broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl MockClient {
	pub fn new(nonce: u64, fee_rate: u64) -> Self {
		Self {
			nonce,
			fee_rate,
			..Default::default()
		}
	}

	pub fn with_abi(mut self, abi: ContractAbi) -> Self {
		self.abi = Some(abi);
		self
	}

	pub fn nonce_queries(&self) -> usize {
		self.nonce_queries.load(Ordering::SeqCst)
	}

	pub fn fee_queries(&self) -> usize {
		self.fee_queries.load(Ordering::SeqCst)
	}
}

impl NetworkClient for MockClient {
	async fn get_nonce(&self, _address: &StacksAddress) -> StacksResult<u64> {
		self.nonce_queries.fetch_add(1, Ordering::SeqCst);

		Ok(self.nonce)
	}

	async fn estimate_fee(
		&self,
		byte_length: usize,
		_payload_type: PayloadType,
	) -> StacksResult<u64> {
		self.fee_queries.fetch_add(1, Ordering::SeqCst);

		Ok(self.fee_rate * byte_length as u64)
	}

	async fn get_interface(
		&self,
		_address: &StacksAddress,
		_contract_name: &ContractName,
	) -> StacksResult<ContractAbi> {
		self.abi.clone().ok_or_else(|| {
			StacksError::NetworkError("no such contract".to_string())
		})
	}

	async fn broadcast(
		&self,
		transaction: &[u8],
		_attachment: Option<&[u8]>,
	) -> StacksResult<TxBroadcastResult> {
		self.broadcasts.lock().unwrap().push(transaction.to_vec());

		Ok(TxBroadcastResult::Accepted(TxId::new(transaction)))
	}
}
