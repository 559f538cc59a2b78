/*!
High level transaction builders.

Each builder assembles the payload, wraps the caller's keys into a spending
condition skeleton and fills any missing fee and nonce from a
[NetworkClient] before signing. Fee and nonce are looked up concurrently.

Sponsored transactions are built with an origin fee of zero: the fee is
paid by the sponsor and set by [sponsor_transaction].
*/

use tracing::{debug, instrument};

use crate::{
	address::StacksAddress,
	clarity::{abi::validate_contract_call, value::ClarityValue, ContractAbi},
	codec::Codec,
	crypto::{StacksPrivateKey, StacksPublicKey},
	memo::MemoString,
	network::{NetworkClient, StacksNetwork, TxBroadcastResult},
	principal::PrincipalData,
	transaction::{
		auth::{
			Authorization, MultiSigHashMode, SingleSigHashMode,
			SpendingCondition,
		},
		payload::{ContractCallPayload, TransactionPayload},
		post_condition::{PostCondition, PostConditionMode},
		signer::TransactionSigner,
		AnchorMode, Transaction,
	},
	validated_strings::{ClarityName, ContractName, StacksString},
	StacksResult,
};

/// Options shared by every builder
#[derive(Debug, Clone)]
pub struct TransactionOptions {
	/// Target network
	pub network: StacksNetwork,
	/// Fee, estimated through the client when missing
	pub fee: Option<u64>,
	/// Origin nonce, fetched through the client when missing
	pub nonce: Option<u64>,
	/// Anchor mode, derived from the payload when missing
	pub anchor_mode: Option<AnchorMode>,
	/// Post-condition strictness
	pub post_condition_mode: PostConditionMode,
	/// Post-conditions
	pub post_conditions: Vec<PostCondition>,
	/// Builds a sponsored authorization awaiting its sponsor
	pub sponsored: bool,
}

impl TransactionOptions {
	/// Defaults for a network
	pub fn new(network: StacksNetwork) -> Self {
		Self {
			network,
			fee: None,
			nonce: None,
			anchor_mode: None,
			post_condition_mode: PostConditionMode::default(),
			post_conditions: vec![],
			sponsored: false,
		}
	}
}

/// Key set of a multi signature origin
#[derive(Debug, Clone)]
pub struct MultiSigOptions {
	/// Hash mode of the condition
	pub hash_mode: MultiSigHashMode,
	/// Signature threshold
	pub signatures_required: u16,
	/// Every key of the set, in signing order
	pub public_keys: Vec<StacksPublicKey>,
}

/// An STX transfer
#[derive(Debug, Clone)]
pub struct TokenTransferOptions {
	/// Receiving principal
	pub recipient: PrincipalData,
	/// Amount in micro-STX
	pub amount: u64,
	/// Memo, at most 34 bytes
	pub memo: MemoString,
}

/// A contract deployment
#[derive(Debug, Clone)]
pub struct ContractDeployOptions {
	/// Contract name
	pub contract_name: ContractName,
	/// Contract source
	pub code_body: StacksString,
}

/// How a contract call is checked against the contract interface
#[derive(Debug, Clone, Default)]
pub enum AbiValidation {
	/// No check
	#[default]
	Skip,
	/// Fetch the interface through the client
	Fetch,
	/// Check against a known interface
	Provided(ContractAbi),
}

/// A contract call
#[derive(Debug, Clone)]
pub struct ContractCallOptions {
	/// Address of the contract deployer
	pub contract_address: StacksAddress,
	/// Contract name
	pub contract_name: ContractName,
	/// Called function
	pub function_name: ClarityName,
	/// Ordered arguments
	pub function_args: Vec<ClarityValue>,
	/// Interface check
	pub validation: AbiValidation,
}

/// Sponsorship of a signed sponsored transaction
#[derive(Debug, Clone)]
pub struct SponsorOptions {
	/// Sponsor signing key
	pub sponsor_private_key: StacksPrivateKey,
	/// Sponsor fee, estimated through the client when missing
	pub fee: Option<u64>,
	/// Sponsor nonce, fetched through the client when missing
	pub sponsor_nonce: Option<u64>,
	/// Hash mode of the sponsor condition
	pub hash_mode: SingleSigHashMode,
}

impl SponsorOptions {
	/// Sponsorship with a P2PKH condition and looked up fee and nonce
	pub fn new(sponsor_private_key: StacksPrivateKey) -> Self {
		Self {
			sponsor_private_key,
			fee: None,
			sponsor_nonce: None,
			hash_mode: SingleSigHashMode::P2PKH,
		}
	}
}

impl From<TokenTransferOptions> for TransactionPayload {
	fn from(options: TokenTransferOptions) -> Self {
		Self::token_transfer(options.recipient, options.amount, options.memo)
	}
}

impl From<ContractDeployOptions> for TransactionPayload {
	fn from(options: ContractDeployOptions) -> Self {
		Self::smart_contract(options.contract_name, options.code_body)
	}
}

/// Unsigned STX transfer from a single key
#[instrument(skip_all, fields(amount = transfer.amount))]
pub async fn make_unsigned_stx_token_transfer<C: NetworkClient>(
	client: &C,
	transfer: TokenTransferOptions,
	public_key: &StacksPublicKey,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let origin = single_sig_condition(public_key)?;

	make_unsigned(client, transfer.into(), origin, options).await
}

/// Signed STX transfer from a single key
#[instrument(skip_all, fields(amount = transfer.amount))]
pub async fn make_stx_token_transfer<C: NetworkClient>(
	client: &C,
	transfer: TokenTransferOptions,
	private_key: &StacksPrivateKey,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let transaction = make_unsigned_stx_token_transfer(
		client,
		transfer,
		&private_key.public_key(),
		options,
	)
	.await?;

	sign_single_sig(transaction, private_key)
}

/// Unsigned STX transfer from a multi signature account
#[instrument(skip_all, fields(amount = transfer.amount))]
pub async fn make_unsigned_multisig_stx_token_transfer<C: NetworkClient>(
	client: &C,
	transfer: TokenTransferOptions,
	multisig: &MultiSigOptions,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let origin = multi_sig_condition(multisig)?;

	make_unsigned(client, transfer.into(), origin, options).await
}

/// STX transfer from a multi signature account signed by the given keys.
///
/// Keys of the set without a signing key are appended as public keys.
#[instrument(skip_all, fields(amount = transfer.amount))]
pub async fn make_multisig_stx_token_transfer<C: NetworkClient>(
	client: &C,
	transfer: TokenTransferOptions,
	multisig: &MultiSigOptions,
	signer_keys: &[StacksPrivateKey],
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let transaction = make_unsigned_multisig_stx_token_transfer(
		client, transfer, multisig, options,
	)
	.await?;

	sign_multi_sig(transaction, multisig, signer_keys)
}

/// Unsigned contract deployment
#[instrument(skip_all, fields(contract = %deploy.contract_name))]
pub async fn make_unsigned_contract_deploy<C: NetworkClient>(
	client: &C,
	deploy: ContractDeployOptions,
	public_key: &StacksPublicKey,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let origin = single_sig_condition(public_key)?;

	make_unsigned(client, deploy.into(), origin, options).await
}

/// Signed contract deployment
#[instrument(skip_all, fields(contract = %deploy.contract_name))]
pub async fn make_contract_deploy<C: NetworkClient>(
	client: &C,
	deploy: ContractDeployOptions,
	private_key: &StacksPrivateKey,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let transaction = make_unsigned_contract_deploy(
		client,
		deploy,
		&private_key.public_key(),
		options,
	)
	.await?;

	sign_single_sig(transaction, private_key)
}

/// Unsigned contract call, checked against the interface when asked to
#[instrument(
	skip_all,
	fields(
		contract = %call.contract_name,
		function = %call.function_name,
	)
)]
pub async fn make_unsigned_contract_call<C: NetworkClient>(
	client: &C,
	call: ContractCallOptions,
	public_key: &StacksPublicKey,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let payload = contract_call_payload(client, call).await?;
	let origin = single_sig_condition(public_key)?;

	make_unsigned(client, payload, origin, options).await
}

/// Signed contract call
#[instrument(
	skip_all,
	fields(
		contract = %call.contract_name,
		function = %call.function_name,
	)
)]
pub async fn make_contract_call<C: NetworkClient>(
	client: &C,
	call: ContractCallOptions,
	private_key: &StacksPrivateKey,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let transaction = make_unsigned_contract_call(
		client,
		call,
		&private_key.public_key(),
		options,
	)
	.await?;

	sign_single_sig(transaction, private_key)
}

/// Attaches and signs a sponsor on a transaction whose origin is signed
#[instrument(skip_all)]
pub async fn sponsor_transaction<C: NetworkClient>(
	client: &C,
	mut transaction: Transaction,
	sponsor: SponsorOptions,
) -> StacksResult<Transaction> {
	let network = transaction.version.network();
	let sponsor_key = &sponsor.sponsor_private_key;

	let mut condition = SpendingCondition::new_single_sig(
		sponsor.hash_mode,
		&sponsor_key.public_key(),
	)?;
	let sponsor_address = condition.address(network);
	let (fee, nonce) = (sponsor.fee, sponsor.sponsor_nonce);

	transaction.set_sponsor(condition.clone())?;
	let byte_length = transaction.estimated_byte_length()?;
	let payload_type = transaction.payload.payload_type();

	let (fee, nonce) = futures::try_join!(
		async {
			match fee {
				Some(fee) => Ok(fee),
				None => client.estimate_fee(byte_length, payload_type).await,
			}
		},
		async {
			match nonce {
				Some(nonce) => Ok(nonce),
				None => client.get_nonce(&sponsor_address).await,
			}
		},
	)?;

	debug!("Sponsoring with fee {} and nonce {}", fee, nonce);

	condition.set_fee(fee);
	condition.set_nonce(nonce);

	let mut signer = TransactionSigner::sponsor(transaction, condition)?;
	signer.sign_sponsor(sponsor_key)?;

	Ok(signer.into_transaction())
}

/// Encodes and submits a transaction
#[instrument(skip_all)]
pub async fn broadcast_transaction<C: NetworkClient>(
	client: &C,
	transaction: &Transaction,
	attachment: Option<&[u8]>,
) -> StacksResult<TxBroadcastResult> {
	let bytes = transaction.serialize_to_vec()?;
	let result = client.broadcast(&bytes, attachment).await?;

	if let TxBroadcastResult::Rejected(rejection) = &result {
		debug!("Transaction {} rejected: {}", rejection.txid, rejection.reason);
	}

	Ok(result)
}

async fn make_unsigned<C: NetworkClient>(
	client: &C,
	payload: TransactionPayload,
	origin: SpendingCondition,
	options: TransactionOptions,
) -> StacksResult<Transaction> {
	let network = options.network;
	let auth = if options.sponsored {
		Authorization::sponsored(origin)
	} else {
		Authorization::standard(origin)
	};

	let mut transaction = Transaction::new(network.version, auth, payload);
	transaction.chain_id = network.chain_id;
	transaction.post_condition_mode = options.post_condition_mode;
	transaction.post_conditions = options.post_conditions;
	if let Some(anchor_mode) = options.anchor_mode {
		transaction.anchor_mode = anchor_mode;
	}

	let address = transaction.origin_address();
	let byte_length = transaction.estimated_byte_length()?;
	let payload_type = transaction.payload.payload_type();
	let (fee, nonce, sponsored) =
		(options.fee, options.nonce, options.sponsored);

	let (fee, nonce) = futures::try_join!(
		async {
			match fee {
				Some(fee) => Ok(fee),
				None if sponsored => Ok(0),
				None => client.estimate_fee(byte_length, payload_type).await,
			}
		},
		async {
			match nonce {
				Some(nonce) => Ok(nonce),
				None => client.get_nonce(&address).await,
			}
		},
	)?;

	debug!("Building {} with fee {} and nonce {}", payload_type, fee, nonce);

	transaction.auth.origin_mut().set_fee(fee);
	transaction.set_nonce(nonce);

	Ok(transaction)
}

async fn contract_call_payload<C: NetworkClient>(
	client: &C,
	call: ContractCallOptions,
) -> StacksResult<TransactionPayload> {
	let abi = match call.validation {
		AbiValidation::Skip => None,
		AbiValidation::Fetch => Some(
			client
				.get_interface(&call.contract_address, &call.contract_name)
				.await?,
		),
		AbiValidation::Provided(abi) => Some(abi),
	};

	let payload = ContractCallPayload {
		contract_address: call.contract_address,
		contract_name: call.contract_name,
		function_name: call.function_name,
		function_args: call.function_args,
	};

	if let Some(abi) = abi {
		validate_contract_call(&payload, &abi)?;
	}

	Ok(TransactionPayload::ContractCall(payload))
}

fn single_sig_condition(
	public_key: &StacksPublicKey,
) -> StacksResult<SpendingCondition> {
	SpendingCondition::new_single_sig(SingleSigHashMode::P2PKH, public_key)
}

fn multi_sig_condition(
	multisig: &MultiSigOptions,
) -> StacksResult<SpendingCondition> {
	SpendingCondition::new_multi_sig(
		multisig.hash_mode,
		multisig.signatures_required,
		&multisig.public_keys,
	)
}

fn sign_single_sig(
	transaction: Transaction,
	private_key: &StacksPrivateKey,
) -> StacksResult<Transaction> {
	let mut signer = TransactionSigner::new(transaction)?;
	signer.sign_origin(private_key)?;

	Ok(signer.into_transaction())
}

fn sign_multi_sig(
	transaction: Transaction,
	multisig: &MultiSigOptions,
	signer_keys: &[StacksPrivateKey],
) -> StacksResult<Transaction> {
	let mut signer = TransactionSigner::new(transaction)?;

	for public_key in &multisig.public_keys {
		match signer_keys
			.iter()
			.find(|key| key.public_key() == *public_key)
		{
			Some(key) => signer.sign_origin(key)?,
			None => signer.append_origin(*public_key)?,
		}
	}

	Ok(signer.into_transaction())
}
