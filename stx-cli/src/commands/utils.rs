use std::io::stdout;

use clap::Args;
use serde::Serialize;
use stacks_transactions::{
	builders::{broadcast_transaction, TransactionOptions},
	crypto::StacksPrivateKey,
	network::{http::StacksNodeClient, StacksNetwork},
	transaction::Transaction,
};
use tracing::info;

/// Options shared by the transaction building subcommands
#[derive(Args, Debug, Clone)]
pub struct TransactionArgs {
	/// Hex encoded private key of the sender
	#[clap(short = 'k', long)]
	pub private_key: String,
	/// Fee in micro-STX, estimated by the node when missing
	#[clap(long)]
	pub fee: Option<u64>,
	/// Account nonce, fetched from the node when missing
	#[clap(long)]
	pub nonce: Option<u64>,
	/// Build a sponsored transaction for a sponsor to complete
	#[clap(long)]
	pub sponsored: bool,
	/// Broadcast the transaction instead of printing it
	#[clap(long)]
	pub broadcast: bool,
}

impl TransactionArgs {
	/// Parses the sender key
	pub fn private_key(&self) -> anyhow::Result<StacksPrivateKey> {
		Ok(StacksPrivateKey::from_hex(&self.private_key)?)
	}

	/// Builder options for a network
	pub fn options(&self, network: StacksNetwork) -> TransactionOptions {
		let mut options = TransactionOptions::new(network);
		options.fee = self.fee;
		options.nonce = self.nonce;
		options.sponsored = self.sponsored;

		options
	}
}

/// Printed form of an encoded transaction
#[derive(Serialize)]
pub struct TransactionData {
	/// Transaction id
	pub txid: String,
	/// Hex encoded transaction
	pub hex: String,
}

impl TransactionData {
	/// Describes a transaction
	pub fn new(transaction: &Transaction) -> anyhow::Result<Self> {
		Ok(Self {
			txid: transaction.txid()?.to_string(),
			hex: transaction.to_hex()?,
		})
	}
}

/// Writes a value to stdout as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
	serde_json::to_writer_pretty(stdout(), value)?;
	println!();

	Ok(())
}

/// Prints the transaction, or broadcasts it and prints the node's answer
pub async fn output_transaction(
	client: &StacksNodeClient,
	transaction: &Transaction,
	broadcast: bool,
) -> anyhow::Result<()> {
	if !broadcast {
		return print_json(&TransactionData::new(transaction)?);
	}

	let result = broadcast_transaction(client, transaction, None).await?;
	info!("Broadcast to {}", client.node_url());

	print_json(&result)
}
