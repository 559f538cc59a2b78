#![forbid(missing_docs)]
/*!
# stacks-transactions: build, encode and sign Stacks transactions

The crate covers the full client-side pipeline of a Stacks transaction:
the consensus wire codec, the chained sighash signing protocol for single
and multi signature spending conditions, sponsorship, post-conditions,
Clarity values and contract interface validation.
*/

use std::array::TryFromSliceError;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Module for interacting with stacks addresses
pub mod address;
/// Module for building transactions from high level options
pub mod builders;
/// Module for c32 encoding and decoding
pub mod c32;
/// Module for Clarity values and contract interfaces
pub mod clarity;
/// Module for the consensus byte codec
pub mod codec;
/// Module for crypto functions
pub mod crypto;
/// Module for the fixed width token transfer memo
pub mod memo;
/// Module for the network collaborator boundary
pub mod network;
/// Module for Clarity principals
pub mod principal;
/// Module for Stacks transactions
pub mod transaction;
/// Module for validated length prefixed strings
pub mod validated_strings;
/// Module for deriving Stacks keys from a mnemonic
pub mod wallet;

/// Error type for the stacks-transactions library
#[derive(Error, Debug)]
pub enum StacksError {
	#[error("Invalid arguments: {0}")]
	/// Invalid arguments
	InvalidArguments(&'static str),
	#[error("Invalid data: {0}")]
	/// Invalid data
	InvalidData(String),
	#[error("Could not crackford32 encode or decode: {0}")]
	/// C32 encoding or decoding error
	C32Error(#[from] c32::C32Error),
	#[error("Address version is invalid: {0}")]
	/// Invalid address version
	InvalidAddressVersion(u8),
	#[error("Could not build array from slice: {0}")]
	/// Invalid slice length
	InvalidSliceLength(#[from] TryFromSliceError),
	#[error("Could not encode or decode hex: {0}")]
	/// Hex encoding or decoding error
	BadHex(#[from] hex::FromHexError),
	#[error("Could not serialize: {0}")]
	/// A value could not be written to the wire format
	SerializationError(String),
	#[error("Could not deserialize: {0}")]
	/// Bytes could not be read as the expected structure
	DeserializationError(String),
	#[error("Unsupported operation: {0}")]
	/// The operation exists in the data model but is not supported
	UnsupportedOperation(String),
	#[error("Signing error: {0}")]
	/// A signing operation is invalid for the current authorization
	SigningError(String),
	#[error("Verification error: {0}")]
	/// Signatures do not replay to the declared signer
	VerificationError(String),
	#[error(
		"Clarity function `{function}` expects argument {index} to be of type {expected}, not {actual}"
	)]
	/// A contract call argument does not match the contract interface
	ValidationError {
		/// Called function
		function: String,
		/// 1-based argument index
		index: usize,
		/// Type declared by the interface
		expected: String,
		/// Type of the supplied value
		actual: String,
	},
	#[error(
		"Clarity function `{function}` expects {expected} argument(s) but received {actual}"
	)]
	/// A contract call has the wrong number of arguments
	ArgumentCountMismatch {
		/// Called function
		function: String,
		/// Number of arguments declared by the interface
		expected: usize,
		/// Number of arguments supplied
		actual: usize,
	},
	#[error("Contract interface error: {0}")]
	/// The contract interface does not describe the called function
	AbiError(String),
	#[error("Coinbase payload must be exactly 32 bytes, got {0}")]
	/// Coinbase buffer of the wrong length
	InvalidCoinbaseLength(usize),
	#[error("Memo must be at most 34 bytes, got {0}")]
	/// Memo longer than the wire field
	InvalidMemoLength(usize),
	#[error("Invalid {kind} key length: {length}")]
	/// Key bytes of an unsupported length
	InvalidKeyLength {
		/// Private or public
		kind: &'static str,
		/// Length that was supplied
		length: usize,
	},
	#[error("Secp256k1 error: {0}")]
	/// Secp256k1 error
	Secp256k1Error(#[from] bdk::bitcoin::secp256k1::Error),
	#[error("Mnemonic error: {0}")]
	/// BIP-39 mnemonic error
	MnemonicError(#[from] bdk::keys::bip39::Error),
	#[error("Key derivation error: {0}")]
	/// BIP-32 derivation error
	DerivationError(#[from] bdk::bitcoin::util::bip32::Error),
	#[error("Network error: {0}")]
	/// The network collaborator returned an unusable response
	NetworkError(String),
	#[error("HTTP error: {0}")]
	/// HTTP transport error
	HttpError(#[from] reqwest::Error),
	#[error("Could not parse URL: {0}")]
	/// URL parsing error
	UrlError(#[from] url::ParseError),
}

/// Result type for the stacks-transactions library
pub type StacksResult<T> = Result<T, StacksError>;

/// Stacks network kind
#[derive(
	Serialize,
	Deserialize,
	Display,
	EnumString,
	EnumIter,
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Network {
	/// Mainnet
	Mainnet,
	/// Testnet
	Testnet,
}
