use clap::Parser;
use stacks_transactions::{
	codec::Codec,
	network::{http::StacksNodeClient, NetworkClient, StacksNetwork},
	transaction::Transaction,
};

use crate::commands::utils::print_json;

/// Arguments of `stx broadcast`
#[derive(Parser, Debug, Clone)]
pub struct BroadcastArgs {
	/// Hex encoded transaction
	tx: String,
	/// Hex encoded attachment
	#[clap(short, long)]
	attachment: Option<String>,
}

/// Submits an encoded transaction to the node
pub async fn broadcast(
	args: &BroadcastArgs,
	network: StacksNetwork,
) -> anyhow::Result<()> {
	// decoding first refuses malformed transactions locally
	let transaction = Transaction::from_hex(&args.tx)?;
	let attachment = args
		.attachment
		.as_deref()
		.map(|attachment| hex::decode(attachment.trim_start_matches("0x")))
		.transpose()?;

	let client = StacksNodeClient::from_network(&network);
	let result = client
		.broadcast(&transaction.serialize_to_vec()?, attachment.as_deref())
		.await?;

	print_json(&result)
}
