use anyhow::anyhow;
use clap::Parser;
use stacks_transactions::{
	address::StacksAddress,
	builders::{make_contract_call, AbiValidation, ContractCallOptions},
	clarity::parse_to_clarity_value,
	network::{http::StacksNodeClient, NetworkClient, StacksNetwork},
	validated_strings::{ClarityName, ContractName},
};
use tracing::debug;

use crate::commands::utils::{output_transaction, TransactionArgs};

/// Arguments of `stx call-contract`
#[derive(Parser, Debug, Clone)]
pub struct CallContractArgs {
	/// Contract principal, `address.contract-name`
	contract: String,
	/// Called function
	function_name: String,
	/// Function arguments, parsed with the types of the contract interface
	args: Vec<String>,
	#[command(flatten)]
	transaction: TransactionArgs,
}

/// Builds and signs a contract call with arguments typed by the interface
pub async fn call_contract(
	args: &CallContractArgs,
	network: StacksNetwork,
) -> anyhow::Result<()> {
	let (address, name) = args
		.contract
		.split_once('.')
		.ok_or_else(|| anyhow!("Expected a contract principal address.name"))?;
	let contract_address: StacksAddress = address.parse()?;
	let contract_name = ContractName::new(name)?;
	let function_name = ClarityName::new(&args.function_name)?;

	let client = StacksNodeClient::from_network(&network);
	let abi = client.get_interface(&contract_address, &contract_name).await?;
	let function = abi.function(function_name.as_str())?;

	if function.args.len() != args.args.len() {
		return Err(anyhow!(
			"Function {} takes {} argument(s), {} given",
			function_name,
			function.args.len(),
			args.args.len()
		));
	}

	let function_args = function
		.args
		.iter()
		.zip(&args.args)
		.map(|(arg, input)| {
			debug!("Parsing {} as {}", arg.name, arg.arg_type);
			parse_to_clarity_value(input, &arg.arg_type)
		})
		.collect::<Result<Vec<_>, _>>()?;

	let call = ContractCallOptions {
		contract_address,
		contract_name,
		function_name,
		function_args,
		validation: AbiValidation::Provided(abi),
	};

	let transaction = make_contract_call(
		&client,
		call,
		&args.transaction.private_key()?,
		args.transaction.options(network),
	)
	.await?;

	output_transaction(&client, &transaction, args.transaction.broadcast).await
}
