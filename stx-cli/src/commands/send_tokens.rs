use clap::Parser;
use stacks_transactions::{
	builders::{make_stx_token_transfer, TokenTransferOptions},
	memo::MemoString,
	network::{http::StacksNodeClient, StacksNetwork},
	principal::PrincipalData,
};

use crate::commands::utils::{output_transaction, TransactionArgs};

/// Arguments of `stx send-tokens`
#[derive(Parser, Debug, Clone)]
pub struct SendTokensArgs {
	/// Receiving address or contract principal
	#[clap(short, long)]
	recipient: String,
	/// Amount in micro-STX
	#[clap(short, long)]
	amount: u64,
	/// Memo of at most 34 bytes
	#[clap(short, long, default_value = "")]
	memo: String,
	#[command(flatten)]
	transaction: TransactionArgs,
}

/// Builds and signs an STX transfer
pub async fn send_tokens(
	args: &SendTokensArgs,
	network: StacksNetwork,
) -> anyhow::Result<()> {
	let client = StacksNodeClient::from_network(&network);
	let transfer = TokenTransferOptions {
		recipient: args.recipient.parse::<PrincipalData>()?,
		amount: args.amount,
		memo: MemoString::new(&args.memo)?,
	};

	let transaction = make_stx_token_transfer(
		&client,
		transfer,
		&args.transaction.private_key()?,
		args.transaction.options(network),
	)
	.await?;

	output_transaction(&client, &transaction, args.transaction.broadcast).await
}
