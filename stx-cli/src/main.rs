#![forbid(missing_docs)]

//! stx is a tool that builds, signs, decodes and broadcasts Stacks
//! transactions.
//!
//! It also generates the keychains needed to sign transactions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stacks_transactions::Network;
use stx_cli::{
	commands::{
		broadcast::{broadcast, BroadcastArgs},
		call_contract::{call_contract, CallContractArgs},
		decode::{decode_tx, DecodeTxArgs},
		deploy_contract::{deploy_contract, DeployContractArgs},
		init::init,
		make_keychain::{make_keychain, MakeKeychainArgs},
		send_tokens::{send_tokens, SendTokensArgs},
		sponsor::{sponsor, SponsorArgs},
	},
	config::{default_config_path, read_config},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
	/// Config file path
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,
	/// Network, overrides the config file
	#[arg(long, global = true)]
	network: Option<Network>,
	/// Stacks node URL, overrides the config file
	#[arg(long, global = true)]
	node_url: Option<Url>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
	/// Write the default config file
	Init,
	/// Generate a keychain or restore one from a mnemonic
	MakeKeychain(MakeKeychainArgs),
	/// Transfer STX
	SendTokens(SendTokensArgs),
	/// Deploy a Clarity contract
	DeployContract(DeployContractArgs),
	/// Call a public contract function
	CallContract(CallContractArgs),
	/// Sign a sponsored transaction as its sponsor
	Sponsor(SponsorArgs),
	/// Decode a hex encoded transaction
	DecodeTx(DecodeTxArgs),
	/// Broadcast a hex encoded transaction
	Broadcast(BroadcastArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
	tracing_subscriber::registry()
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.with(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let args = Cli::parse();

	let config_path = match args.config {
		Some(path) => path,
		None => default_config_path()?,
	};

	if let Command::Init = args.command {
		return init(&config_path);
	}

	let config = read_config(&config_path)?
		.with_overrides(args.network, args.node_url);
	let network = config.stacks_network();

	match args.command {
		Command::Init => init(&config_path),
		Command::MakeKeychain(keychain_args) => {
			make_keychain(&keychain_args, config.network)
		}
		Command::SendTokens(send_args) => send_tokens(&send_args, network).await,
		Command::DeployContract(deploy_args) => {
			deploy_contract(&deploy_args, network).await
		}
		Command::CallContract(call_args) => {
			call_contract(&call_args, network).await
		}
		Command::Sponsor(sponsor_args) => sponsor(&sponsor_args, network).await,
		Command::DecodeTx(decode_args) => decode_tx(&decode_args),
		Command::Broadcast(broadcast_args) => {
			broadcast(&broadcast_args, network).await
		}
	}
}
