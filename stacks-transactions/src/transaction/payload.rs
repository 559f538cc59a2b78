/*!
Types for the payload of a Stacks transaction
*/

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

use crate::{
	address::StacksAddress,
	clarity::value::ClarityValue,
	codec::{invalid_data, read_array, read_u64, read_u8, unsupported, Codec},
	memo::MemoString,
	principal::PrincipalData,
	validated_strings::{ClarityName, ContractName, StacksString},
	StacksError, StacksResult,
};

/// Length of a coinbase buffer
pub const COINBASE_LENGTH: usize = 32;

/// Payload type tags
#[repr(u8)]
#[derive(
	FromRepr, Display, Serialize, Deserialize, Debug, Clone, Copy, PartialEq,
	Eq,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayloadType {
	/// STX transfer
	TokenTransfer = 0x00,
	/// Contract deployment
	SmartContract = 0x01,
	/// Contract function call
	ContractCall = 0x02,
	/// Poison microblock report
	PoisonMicroblock = 0x03,
	/// Coinbase
	Coinbase = 0x04,
}

/// An STX transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransferPayload {
	/// Receiving principal
	pub recipient: PrincipalData,
	/// Amount in micro-STX
	pub amount: u64,
	/// Attached memo
	pub memo: MemoString,
}

/// A call of a public contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCallPayload {
	/// Address of the contract deployer
	pub contract_address: StacksAddress,
	/// Contract name
	pub contract_name: ContractName,
	/// Called function
	pub function_name: ClarityName,
	/// Ordered arguments
	pub function_args: Vec<ClarityValue>,
}

/// A contract deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartContractPayload {
	/// Contract name
	pub contract_name: ContractName,
	/// Contract source
	pub code_body: StacksString,
}

/// The 32 opaque bytes of a coinbase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoinbasePayload([u8; COINBASE_LENGTH]);

impl CoinbasePayload {
	/// Wraps exactly 32 bytes
	pub fn new(bytes: &[u8]) -> StacksResult<Self> {
		let bytes = bytes
			.try_into()
			.map_err(|_| StacksError::InvalidCoinbaseLength(bytes.len()))?;

		Ok(Self(bytes))
	}

	/// Coinbase bytes
	pub fn as_bytes(&self) -> &[u8; COINBASE_LENGTH] {
		&self.0
	}
}

/// The intent of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
	/// STX transfer
	TokenTransfer(TokenTransferPayload),
	/// Contract deployment
	SmartContract(SmartContractPayload),
	/// Contract function call
	ContractCall(ContractCallPayload),
	/// Poison microblock report. Neither encoding nor decoding is supported.
	PoisonMicroblock,
	/// Coinbase
	Coinbase(CoinbasePayload),
}

impl TransactionPayload {
	/// Type tag of the payload
	pub fn payload_type(&self) -> PayloadType {
		match self {
			Self::TokenTransfer(_) => PayloadType::TokenTransfer,
			Self::SmartContract(_) => PayloadType::SmartContract,
			Self::ContractCall(_) => PayloadType::ContractCall,
			Self::PoisonMicroblock => PayloadType::PoisonMicroblock,
			Self::Coinbase(_) => PayloadType::Coinbase,
		}
	}

	/// STX transfer payload
	pub fn token_transfer(
		recipient: PrincipalData,
		amount: u64,
		memo: MemoString,
	) -> Self {
		Self::TokenTransfer(TokenTransferPayload {
			recipient,
			amount,
			memo,
		})
	}

	/// Contract call payload
	pub fn contract_call(
		contract_address: StacksAddress,
		contract_name: ContractName,
		function_name: ClarityName,
		function_args: Vec<ClarityValue>,
	) -> Self {
		Self::ContractCall(ContractCallPayload {
			contract_address,
			contract_name,
			function_name,
			function_args,
		})
	}

	/// Contract deployment payload
	pub fn smart_contract(
		contract_name: ContractName,
		code_body: StacksString,
	) -> Self {
		Self::SmartContract(SmartContractPayload {
			contract_name,
			code_body,
		})
	}

	/// Coinbase payload from exactly 32 bytes
	pub fn coinbase(bytes: &[u8]) -> StacksResult<Self> {
		Ok(Self::Coinbase(CoinbasePayload::new(bytes)?))
	}
}

impl Codec for TransactionPayload {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		if let Self::PoisonMicroblock = self {
			return Err(unsupported(
				"poison microblock payloads cannot be encoded",
			));
		}

		dest.write_all(&[self.payload_type() as u8])?;

		match self {
			Self::TokenTransfer(transfer) => {
				transfer.recipient.codec_serialize(dest)?;
				dest.write_all(&transfer.amount.to_be_bytes())?;
				transfer.memo.codec_serialize(dest)
			}
			Self::SmartContract(contract) => {
				contract.contract_name.codec_serialize(dest)?;
				contract.code_body.codec_serialize(dest)
			}
			Self::ContractCall(call) => {
				call.contract_address.codec_serialize(dest)?;
				call.contract_name.codec_serialize(dest)?;
				call.function_name.codec_serialize(dest)?;
				call.function_args.codec_serialize(dest)
			}
			Self::Coinbase(coinbase) => dest.write_all(coinbase.as_bytes()),
			Self::PoisonMicroblock => Ok(()),
		}
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;
		let payload_type = PayloadType::from_repr(tag).ok_or_else(|| {
			invalid_data(format!("unknown payload type {:#04x}", tag))
		})?;

		match payload_type {
			PayloadType::TokenTransfer => {
				Ok(Self::TokenTransfer(TokenTransferPayload {
					recipient: PrincipalData::codec_deserialize(data)?,
					amount: read_u64(data)?,
					memo: MemoString::codec_deserialize(data)?,
				}))
			}
			PayloadType::SmartContract => {
				Ok(Self::SmartContract(SmartContractPayload {
					contract_name: ContractName::codec_deserialize(data)?,
					code_body: StacksString::codec_deserialize(data)?,
				}))
			}
			PayloadType::ContractCall => {
				Ok(Self::ContractCall(ContractCallPayload {
					contract_address: StacksAddress::codec_deserialize(data)?,
					contract_name: ContractName::codec_deserialize(data)?,
					function_name: ClarityName::codec_deserialize(data)?,
					function_args: Vec::<ClarityValue>::codec_deserialize(data)?,
				}))
			}
			PayloadType::Coinbase => {
				Ok(Self::Coinbase(CoinbasePayload(read_array(data)?)))
			}
			PayloadType::PoisonMicroblock => Err(unsupported(
				"poison microblock payloads cannot be decoded",
			)),
		}
	}
}
