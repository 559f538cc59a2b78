use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use stacks_transactions::transaction::{
	auth::AuthType,
	payload::TransactionPayload,
	post_condition::PostConditionMode,
	AnchorMode, Transaction, TransactionVersion,
};

use crate::commands::utils::print_json;

/// Arguments of `stx decode-tx`
#[derive(Parser, Debug, Clone)]
pub struct DecodeTxArgs {
	/// Hex encoded transaction, optionally 0x prefixed
	tx: String,
}

#[derive(Debug, Serialize)]
struct DecodedTransaction {
	txid: String,
	version: TransactionVersion,
	chain_id: u32,
	auth_type: AuthType,
	origin_address: String,
	sponsor_address: Option<String>,
	fee: u64,
	nonce: u64,
	signatures: usize,
	signatures_required: u16,
	anchor_mode: AnchorMode,
	post_condition_mode: PostConditionMode,
	post_conditions: usize,
	payload: Value,
}

fn describe_payload(payload: &TransactionPayload) -> Value {
	match payload {
		TransactionPayload::TokenTransfer(transfer) => json!({
			"type": payload.payload_type().to_string(),
			"recipient": transfer.recipient.to_string(),
			"amount": transfer.amount,
			"memo": transfer.memo.to_string(),
		}),
		TransactionPayload::SmartContract(contract) => json!({
			"type": payload.payload_type().to_string(),
			"contract_name": contract.contract_name.to_string(),
			"code_body": contract.code_body.to_string(),
		}),
		TransactionPayload::ContractCall(call) => json!({
			"type": payload.payload_type().to_string(),
			"contract": format!("{}.{}", call.contract_address, call.contract_name),
			"function_name": call.function_name.to_string(),
			"function_args": call
				.function_args
				.iter()
				.map(ToString::to_string)
				.collect::<Vec<_>>(),
		}),
		TransactionPayload::Coinbase(coinbase) => json!({
			"type": payload.payload_type().to_string(),
			"buffer": hex::encode(coinbase.as_bytes()),
		}),
		TransactionPayload::PoisonMicroblock => json!({
			"type": payload.payload_type().to_string(),
		}),
	}
}

/// Prints the fields of an encoded transaction
pub fn decode_tx(args: &DecodeTxArgs) -> anyhow::Result<()> {
	let transaction = Transaction::from_hex(&args.tx)?;
	let origin = transaction.auth.origin();

	print_json(&DecodedTransaction {
		txid: transaction.txid()?.to_string(),
		version: transaction.version,
		chain_id: transaction.chain_id,
		auth_type: transaction.auth.auth_type(),
		origin_address: transaction.origin_address().to_string(),
		sponsor_address: transaction
			.sponsor_address()
			.map(|address| address.to_string()),
		fee: transaction.fee(),
		nonce: transaction.nonce(),
		signatures: origin.num_signatures(),
		signatures_required: origin.signatures_required(),
		anchor_mode: transaction.anchor_mode,
		post_condition_mode: transaction.post_condition_mode,
		post_conditions: transaction.post_conditions.len(),
		payload: describe_payload(&transaction.payload),
	})
}
