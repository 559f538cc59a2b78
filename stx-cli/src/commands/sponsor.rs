use clap::Parser;
use stacks_transactions::{
	builders::{sponsor_transaction, SponsorOptions},
	crypto::StacksPrivateKey,
	network::{http::StacksNodeClient, StacksNetwork},
	transaction::{auth::SingleSigHashMode, Transaction},
};

use crate::commands::utils::output_transaction;

/// Arguments of `stx sponsor`
#[derive(Parser, Debug, Clone)]
pub struct SponsorArgs {
	/// Hex encoded sponsored transaction with a signed origin
	tx: String,
	/// Hex encoded private key of the sponsor
	#[clap(short = 'k', long)]
	private_key: String,
	/// Sponsor fee in micro-STX, estimated by the node when missing
	#[clap(long)]
	fee: Option<u64>,
	/// Sponsor nonce, fetched from the node when missing
	#[clap(long)]
	nonce: Option<u64>,
	/// Use a P2WPKH sponsor condition instead of P2PKH
	#[clap(long)]
	segwit: bool,
	/// Broadcast the transaction instead of printing it
	#[clap(long)]
	broadcast: bool,
}

impl SponsorArgs {
	/// Sponsorship options for the builder
	pub fn options(&self) -> anyhow::Result<SponsorOptions> {
		let mut options =
			SponsorOptions::new(StacksPrivateKey::from_hex(&self.private_key)?);
		options.fee = self.fee;
		options.sponsor_nonce = self.nonce;
		if self.segwit {
			options.hash_mode = SingleSigHashMode::P2WPKH;
		}

		Ok(options)
	}
}

/// Signs a sponsored transaction as its sponsor
pub async fn sponsor(
	args: &SponsorArgs,
	network: StacksNetwork,
) -> anyhow::Result<()> {
	let transaction = Transaction::from_hex(&args.tx)?;
	let client = StacksNodeClient::from_network(&network);

	let transaction =
		sponsor_transaction(&client, transaction, args.options()?).await?;

	output_transaction(&client, &transaction, args.broadcast).await
}
