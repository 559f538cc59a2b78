use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stacks_transactions::{
	builders::{make_contract_deploy, ContractDeployOptions},
	network::{http::StacksNodeClient, StacksNetwork},
	validated_strings::{ContractName, StacksString},
};

use crate::commands::utils::{output_transaction, TransactionArgs};

/// Arguments of `stx deploy-contract`
#[derive(Parser, Debug, Clone)]
pub struct DeployContractArgs {
	/// Name of the deployed contract
	#[clap(short = 'n', long)]
	contract_name: String,
	/// Path of the Clarity source file
	source: PathBuf,
	#[command(flatten)]
	transaction: TransactionArgs,
}

/// Builds and signs a contract deployment
pub async fn deploy_contract(
	args: &DeployContractArgs,
	network: StacksNetwork,
) -> anyhow::Result<()> {
	let code = tokio::fs::read_to_string(&args.source)
		.await
		.with_context(|| format!("Could not read {}", args.source.display()))?;

	let client = StacksNodeClient::from_network(&network);
	let deploy = ContractDeployOptions {
		contract_name: ContractName::new(&args.contract_name)?,
		code_body: StacksString::new(&code)?,
	};

	let transaction = make_contract_deploy(
		&client,
		deploy,
		&args.transaction.private_key()?,
		args.transaction.options(network),
	)
	.await?;

	output_transaction(&client, &transaction, args.transaction.broadcast).await
}
