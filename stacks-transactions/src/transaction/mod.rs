/*!
The Stacks transaction aggregate and its consensus encoding.
*/

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use strum::FromRepr;

use crate::{
	address::StacksAddress,
	codec::{invalid_data, read_u32, read_u8, Codec},
	crypto::{
		keys::strip_hex_prefix, Hashing, Sha512Trunc256Hasher,
		StacksPrivateKey, StacksPublicKey,
	},
	Network, StacksError, StacksResult,
};

/// Spending conditions, authorizations and the sighash protocol
pub mod auth;
/// Transaction payloads
pub mod payload;
/// Post-conditions
pub mod post_condition;
/// Incremental transaction signing
pub mod signer;

use auth::{AuthType, Authorization, Sighash, SpendingCondition};
use payload::TransactionPayload;
use post_condition::{PostCondition, PostConditionMode};

/// Chain id of mainnet
pub const CHAIN_ID_MAINNET: u32 = 0x00000001;
/// Chain id of testnet
pub const CHAIN_ID_TESTNET: u32 = 0x80000000;

/// Extra bytes a missing multi signature field adds to the encoding
const MULTISIG_FIELD_LENGTH: usize = 66;

/// Transaction id, the SHA-512/256 of the encoded transaction
pub type TxId = Sha512Trunc256Hasher;

/// Transaction version byte
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum TransactionVersion {
	/// Mainnet
	Mainnet = 0x00,
	/// Testnet
	Testnet = 0x80,
}

impl TransactionVersion {
	/// Network of the version
	pub fn network(self) -> Network {
		match self {
			Self::Mainnet => Network::Mainnet,
			Self::Testnet => Network::Testnet,
		}
	}

	/// Default chain id of the version
	pub fn chain_id(self) -> u32 {
		match self {
			Self::Mainnet => CHAIN_ID_MAINNET,
			Self::Testnet => CHAIN_ID_TESTNET,
		}
	}
}

impl From<Network> for TransactionVersion {
	fn from(network: Network) -> Self {
		match network {
			Network::Mainnet => Self::Mainnet,
			Network::Testnet => Self::Testnet,
		}
	}
}

/// Which kind of block a transaction may land in
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum AnchorMode {
	/// Anchored blocks only
	OnChainOnly = 0x01,
	/// Microblocks only
	OffChainOnly = 0x02,
	/// Either
	Any = 0x03,
}

impl AnchorMode {
	/// Default anchor mode of a payload
	pub fn for_payload(payload: &TransactionPayload) -> Self {
		match payload {
			TransactionPayload::Coinbase(_)
			| TransactionPayload::PoisonMicroblock => Self::OnChainOnly,
			_ => Self::Any,
		}
	}
}

/// A Stacks transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
	/// Network version
	pub version: TransactionVersion,
	/// Chain id
	pub chain_id: u32,
	/// Signers
	pub auth: Authorization,
	/// Block kind constraint
	pub anchor_mode: AnchorMode,
	/// Post-condition strictness
	pub post_condition_mode: PostConditionMode,
	/// Declared asset movement constraints
	pub post_conditions: Vec<PostCondition>,
	/// Intent
	pub payload: TransactionPayload,
}

impl Transaction {
	/// Transaction with the default chain id, a derived anchor mode and
	/// no post-conditions in deny mode
	pub fn new(
		version: TransactionVersion,
		auth: Authorization,
		payload: TransactionPayload,
	) -> Self {
		Self {
			version,
			chain_id: version.chain_id(),
			auth,
			anchor_mode: AnchorMode::for_payload(&payload),
			post_condition_mode: PostConditionMode::default(),
			post_conditions: vec![],
			payload,
		}
	}

	/// Transaction id
	pub fn txid(&self) -> StacksResult<TxId> {
		Ok(TxId::new(self.serialize_to_vec()?))
	}

	/// Lowercase hex encoding without prefix
	pub fn to_hex(&self) -> StacksResult<String> {
		Ok(hex::encode(self.serialize_to_vec()?))
	}

	/// Decodes hex with an optional `0x` prefix
	pub fn from_hex(data: impl AsRef<str>) -> StacksResult<Self> {
		Self::from_bytes(&hex::decode(strip_hex_prefix(data.as_ref()))?)
	}

	/// Strict decode of a whole buffer
	pub fn from_bytes(bytes: &[u8]) -> StacksResult<Self> {
		Self::deserialize_from_slice(bytes)
	}

	/// Hash every signature chain starts from
	pub fn initial_sighash(&self) -> StacksResult<Sighash> {
		let mut cleared = self.clone();
		cleared.auth = self.auth.into_initial_sighash_auth();

		cleared.txid()
	}

	/// Signs the origin from the running sighash
	pub fn sign_next_origin(
		&mut self,
		cur_sighash: &Sighash,
		private_key: &StacksPrivateKey,
	) -> StacksResult<Sighash> {
		self.auth
			.origin_mut()
			.sign(cur_sighash, AuthType::Standard, private_key)
	}

	/// Signs the sponsor from the running sighash
	pub fn sign_next_sponsor(
		&mut self,
		cur_sighash: &Sighash,
		private_key: &StacksPrivateKey,
	) -> StacksResult<Sighash> {
		self.sponsor_mut()?
			.sign(cur_sighash, AuthType::Sponsored, private_key)
	}

	/// Appends a non-signing key to the origin
	pub fn append_origin_public_key(
		&mut self,
		public_key: StacksPublicKey,
	) -> StacksResult<()> {
		self.auth.origin_mut().append_public_key(public_key)
	}

	/// Appends a non-signing key to the sponsor
	pub fn append_sponsor_public_key(
		&mut self,
		public_key: StacksPublicKey,
	) -> StacksResult<()> {
		self.sponsor_mut()?.append_public_key(public_key)
	}

	/// Verifies the origin, returning its final sighash
	pub fn verify_origin(&self) -> StacksResult<Sighash> {
		self.auth.verify_origin(&self.initial_sighash()?)
	}

	/// Verifies the sponsor, returning its final sighash
	pub fn verify_sponsor(&self) -> StacksResult<Sighash> {
		let origin_sighash = self.verify_origin()?;
		let sponsor = self.auth.sponsor().ok_or_else(|| {
			StacksError::VerificationError(
				"Transaction is not sponsored".to_string(),
			)
		})?;

		sponsor.verify(&origin_sighash, AuthType::Sponsored)
	}

	/// Verifies every signature of the transaction
	pub fn verify(&self) -> StacksResult<()> {
		self.auth.verify(&self.initial_sighash()?)
	}

	/// Fee of the paying condition
	pub fn fee(&self) -> u64 {
		self.paying_condition().fee()
	}

	/// Sets the fee of the paying condition, the sponsor when sponsored
	pub fn set_fee(&mut self, fee: u64) {
		match &mut self.auth {
			Authorization::Standard(origin) => origin.set_fee(fee),
			Authorization::Sponsored(_, sponsor) => sponsor.set_fee(fee),
		}
	}

	/// Origin nonce
	pub fn nonce(&self) -> u64 {
		self.auth.origin().nonce()
	}

	/// Sets the origin nonce
	pub fn set_nonce(&mut self, nonce: u64) {
		self.auth.origin_mut().set_nonce(nonce)
	}

	/// Sets the sponsor nonce
	pub fn set_sponsor_nonce(&mut self, nonce: u64) -> StacksResult<()> {
		self.sponsor_mut()?.set_nonce(nonce);

		Ok(())
	}

	/// Replaces the sponsor condition
	pub fn set_sponsor(
		&mut self,
		sponsor: SpendingCondition,
	) -> StacksResult<()> {
		self.auth.set_sponsor(sponsor)
	}

	/// Address of the origin account
	pub fn origin_address(&self) -> StacksAddress {
		self.auth.origin().address(self.version.network())
	}

	/// Address of the sponsor account
	pub fn sponsor_address(&self) -> Option<StacksAddress> {
		self.auth
			.sponsor()
			.map(|sponsor| sponsor.address(self.version.network()))
	}

	/// Encoded length once every missing origin signature is present
	pub fn estimated_byte_length(&self) -> StacksResult<usize> {
		let length = self.serialize_to_vec()?.len();
		let origin = self.auth.origin();

		match origin {
			SpendingCondition::SingleSig(_) => Ok(length),
			SpendingCondition::MultiSig(condition) => {
				let missing = (condition.signatures_required as usize)
					.saturating_sub(origin.num_signatures());

				Ok(length + missing * MULTISIG_FIELD_LENGTH)
			}
		}
	}

	fn paying_condition(&self) -> &SpendingCondition {
		match &self.auth {
			Authorization::Standard(origin) => origin,
			Authorization::Sponsored(_, sponsor) => sponsor,
		}
	}

	fn sponsor_mut(&mut self) -> StacksResult<&mut SpendingCondition> {
		self.auth.sponsor_mut().ok_or_else(|| {
			StacksError::SigningError(
				"Cannot sponsor sign a non-sponsored transaction".to_string(),
			)
		})
	}
}

impl Codec for Transaction {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		dest.write_all(&[self.version as u8])?;
		dest.write_all(&self.chain_id.to_be_bytes())?;
		self.auth.codec_serialize(dest)?;
		dest.write_all(&[self.anchor_mode as u8])?;
		dest.write_all(&[self.post_condition_mode as u8])?;
		self.post_conditions.codec_serialize(dest)?;
		self.payload.codec_serialize(dest)
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;
		let version = TransactionVersion::from_repr(tag).ok_or_else(|| {
			invalid_data(format!("unknown transaction version {:#04x}", tag))
		})?;
		let chain_id = read_u32(data)?;
		let auth = Authorization::codec_deserialize(data)?;

		let tag = read_u8(data)?;
		let anchor_mode = AnchorMode::from_repr(tag).ok_or_else(|| {
			invalid_data(format!("unknown anchor mode {:#04x}", tag))
		})?;

		let tag = read_u8(data)?;
		let post_condition_mode =
			PostConditionMode::from_repr(tag).ok_or_else(|| {
				invalid_data(format!("unknown post-condition mode {:#04x}", tag))
			})?;

		let post_conditions = Vec::<PostCondition>::codec_deserialize(data)?;
		let payload = TransactionPayload::codec_deserialize(data)?;

		Ok(Self {
			version,
			chain_id,
			auth,
			anchor_mode,
			post_condition_mode,
			post_conditions,
			payload,
		})
	}
}
