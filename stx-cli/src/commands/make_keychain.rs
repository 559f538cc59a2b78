use clap::Parser;
use serde::Serialize;
use stacks_transactions::{wallet::Wallet, Network};

use crate::commands::utils::print_json;

/// Arguments of `stx make-keychain`
#[derive(Parser, Debug, Clone)]
pub struct MakeKeychainArgs {
	/// Restore from this mnemonic instead of generating a new one
	#[clap(short, long)]
	mnemonic: Option<String>,
	/// Account index
	#[clap(short, long, default_value_t = 0)]
	index: u32,
}

#[derive(Debug, Serialize)]
struct KeychainDescription {
	mnemonic: String,
	index: u32,
	private_key: String,
	public_key: String,
	address: String,
}

/// Prints the mnemonic, keys and address of an account
pub fn make_keychain(
	args: &MakeKeychainArgs,
	network: Network,
) -> anyhow::Result<()> {
	let wallet = match &args.mnemonic {
		Some(mnemonic) => Wallet::new(mnemonic)?,
		None => Wallet::random()?,
	};
	let credentials = wallet.credentials(network, args.index)?;

	print_json(&KeychainDescription {
		mnemonic: wallet.mnemonic(),
		index: credentials.index(),
		private_key: credentials.private_key().to_hex(),
		public_key: credentials.public_key().to_hex(),
		address: credentials.address().to_string(),
	})
}
