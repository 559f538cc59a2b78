/*!
Spending conditions, authorizations and the chained sighash protocol.

Every signature commits to the running sighash. A round hashes the current
sighash with the authorization type, fee and nonce into a pre-sign hash,
signs it, then hashes the pre-sign hash with the key encoding and the
signature into the next sighash. Origin rounds start from the initial
sighash of the transaction; sponsor rounds start from the final origin
sighash.
*/

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use strum::FromRepr;
use tracing::trace;

use crate::{
	address::{AddressHashMode, AddressVersion, StacksAddress},
	codec::{invalid_data, read_array, read_u16, read_u64, read_u8, Codec},
	crypto::{
		Hash160Hasher, Hashing, MessageSignature, PublicKeyEncoding,
		Sha512Trunc256Hasher, StacksPrivateKey, StacksPublicKey,
	},
	Network, StacksError, StacksResult,
};

/// Running hash of the signing protocol
pub type Sighash = Sha512Trunc256Hasher;

/// Authorization type tags, also mixed into every pre-sign hash
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum AuthType {
	/// The origin pays its own fee
	Standard = 0x04,
	/// A sponsor pays the fee
	Sponsored = 0x05,
}

/// Hash modes of single signature conditions
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum SingleSigHashMode {
	/// Pay to public key hash
	P2PKH = 0x00,
	/// Pay to witness public key hash
	P2WPKH = 0x02,
}

/// Hash modes of multi signature conditions
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum MultiSigHashMode {
	/// Pay to script hash
	P2SH = 0x01,
	/// Pay to witness script hash
	P2WSH = 0x03,
}

impl From<SingleSigHashMode> for AddressHashMode {
	fn from(mode: SingleSigHashMode) -> Self {
		match mode {
			SingleSigHashMode::P2PKH => Self::P2PKH,
			SingleSigHashMode::P2WPKH => Self::P2WPKH,
		}
	}
}

impl From<MultiSigHashMode> for AddressHashMode {
	fn from(mode: MultiSigHashMode) -> Self {
		match mode {
			MultiSigHashMode::P2SH => Self::P2SH,
			MultiSigHashMode::P2WSH => Self::P2WSH,
		}
	}
}

#[repr(u8)]
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
enum AuthFieldId {
	PublicKeyCompressed = 0x00,
	PublicKeyUncompressed = 0x01,
	SignatureCompressed = 0x02,
	SignatureUncompressed = 0x03,
}

/// An entry in a multi signature field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAuthField {
	/// A key that did not sign
	PublicKey(StacksPublicKey),
	/// A signature, the key is recovered from it
	Signature(PublicKeyEncoding, MessageSignature),
}

impl TransactionAuthField {
	/// Returns true for signature fields
	pub fn is_signature(&self) -> bool {
		matches!(self, Self::Signature(_, _))
	}

	fn is_compressed(&self) -> bool {
		match self {
			Self::PublicKey(key) => key.compressed(),
			Self::Signature(encoding, _) => encoding.is_compressed(),
		}
	}
}

impl Codec for TransactionAuthField {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		match self {
			Self::PublicKey(key) => {
				let id = if key.compressed() {
					AuthFieldId::PublicKeyCompressed
				} else {
					AuthFieldId::PublicKeyUncompressed
				};

				dest.write_all(&[id as u8])?;
				dest.write_all(&key.to_bytes_compressed())
			}
			Self::Signature(encoding, signature) => {
				let id = match encoding {
					PublicKeyEncoding::Compressed => {
						AuthFieldId::SignatureCompressed
					}
					PublicKeyEncoding::Uncompressed => {
						AuthFieldId::SignatureUncompressed
					}
				};

				dest.write_all(&[id as u8])?;
				signature.codec_serialize(dest)
			}
		}
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;
		let id = AuthFieldId::from_repr(tag).ok_or_else(|| {
			invalid_data(format!("unknown auth field id {:#04x}", tag))
		})?;

		match id {
			AuthFieldId::PublicKeyCompressed
			| AuthFieldId::PublicKeyUncompressed => {
				let bytes: [u8; 33] = read_array(data)?;
				let key = StacksPublicKey::from_slice(&bytes)
					.map_err(|err| invalid_data(err.to_string()))?;

				Ok(Self::PublicKey(key.with_compression(
					id == AuthFieldId::PublicKeyCompressed,
				)))
			}
			AuthFieldId::SignatureCompressed => Ok(Self::Signature(
				PublicKeyEncoding::Compressed,
				MessageSignature::codec_deserialize(data)?,
			)),
			AuthFieldId::SignatureUncompressed => Ok(Self::Signature(
				PublicKeyEncoding::Uncompressed,
				MessageSignature::codec_deserialize(data)?,
			)),
		}
	}
}

/// A condition satisfied by one signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSigSpendingCondition {
	/// Hash mode of the signer hash
	pub hash_mode: SingleSigHashMode,
	/// Hash committing to the signing key
	pub signer: Hash160Hasher,
	/// Account nonce
	pub nonce: u64,
	/// Fee in micro-STX
	pub fee: u64,
	/// Encoding of the signing key
	pub key_encoding: PublicKeyEncoding,
	/// Signature, empty until signed
	pub signature: MessageSignature,
}

/// A condition satisfied by a threshold of signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigSpendingCondition {
	/// Hash mode of the signer hash
	pub hash_mode: MultiSigHashMode,
	/// Hash committing to the key set and threshold
	pub signer: Hash160Hasher,
	/// Account nonce
	pub nonce: u64,
	/// Fee in micro-STX
	pub fee: u64,
	/// Signatures and public keys, in key order
	pub fields: Vec<TransactionAuthField>,
	/// Signature threshold
	pub signatures_required: u16,
}

/// Who must sign and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendingCondition {
	/// One signer
	SingleSig(SingleSigSpendingCondition),
	/// A threshold of signers
	MultiSig(MultiSigSpendingCondition),
}

impl SpendingCondition {
	/// Unsigned single signature condition for a key
	pub fn new_single_sig(
		hash_mode: SingleSigHashMode,
		public_key: &StacksPublicKey,
	) -> StacksResult<Self> {
		let signer = signer_hash(hash_mode.into(), 1, &[*public_key])?;

		Ok(Self::SingleSig(SingleSigSpendingCondition {
			hash_mode,
			signer,
			nonce: 0,
			fee: 0,
			key_encoding: public_key.encoding(),
			signature: MessageSignature::empty(),
		}))
	}

	/// Unsigned multi signature condition for an ordered key set
	pub fn new_multi_sig(
		hash_mode: MultiSigHashMode,
		signatures_required: u16,
		public_keys: &[StacksPublicKey],
	) -> StacksResult<Self> {
		let signer = signer_hash(
			hash_mode.into(),
			signatures_required as usize,
			public_keys,
		)?;

		Ok(Self::MultiSig(MultiSigSpendingCondition {
			hash_mode,
			signer,
			nonce: 0,
			fee: 0,
			fields: vec![],
			signatures_required,
		}))
	}

	/// Placeholder sponsor used while computing the initial sighash
	pub fn sponsor_sentinel() -> Self {
		Self::SingleSig(SingleSigSpendingCondition {
			hash_mode: SingleSigHashMode::P2PKH,
			signer: Hash160Hasher::zeroes(),
			nonce: 0,
			fee: 0,
			key_encoding: PublicKeyEncoding::Compressed,
			signature: MessageSignature::empty(),
		})
	}

	/// Account nonce
	pub fn nonce(&self) -> u64 {
		match self {
			Self::SingleSig(condition) => condition.nonce,
			Self::MultiSig(condition) => condition.nonce,
		}
	}

	/// Fee in micro-STX
	pub fn fee(&self) -> u64 {
		match self {
			Self::SingleSig(condition) => condition.fee,
			Self::MultiSig(condition) => condition.fee,
		}
	}

	/// Sets the account nonce
	pub fn set_nonce(&mut self, nonce: u64) {
		match self {
			Self::SingleSig(condition) => condition.nonce = nonce,
			Self::MultiSig(condition) => condition.nonce = nonce,
		}
	}

	/// Sets the fee
	pub fn set_fee(&mut self, fee: u64) {
		match self {
			Self::SingleSig(condition) => condition.fee = fee,
			Self::MultiSig(condition) => condition.fee = fee,
		}
	}

	/// Hash committing to the signers
	pub fn signer(&self) -> &Hash160Hasher {
		match self {
			Self::SingleSig(condition) => &condition.signer,
			Self::MultiSig(condition) => &condition.signer,
		}
	}

	/// Address hash mode
	pub fn hash_mode(&self) -> AddressHashMode {
		match self {
			Self::SingleSig(condition) => condition.hash_mode.into(),
			Self::MultiSig(condition) => condition.hash_mode.into(),
		}
	}

	/// Address of the paying account on a network
	pub fn address(&self, network: Network) -> StacksAddress {
		StacksAddress::new(
			self.hash_mode().address_version(network),
			*self.signer(),
		)
	}

	/// Returns the required signature count, one for single signature
	pub fn signatures_required(&self) -> u16 {
		match self {
			Self::SingleSig(_) => 1,
			Self::MultiSig(condition) => condition.signatures_required,
		}
	}

	/// Returns the number of signatures present
	pub fn num_signatures(&self) -> usize {
		match self {
			Self::SingleSig(condition) => {
				usize::from(!condition.signature.is_empty())
			}
			Self::MultiSig(condition) => condition
				.fields
				.iter()
				.filter(|field| field.is_signature())
				.count(),
		}
	}

	/// Copy with nonce, fee and signatures cleared
	pub fn clear(&self) -> Self {
		let mut cleared = self.clone();

		match &mut cleared {
			Self::SingleSig(condition) => {
				condition.nonce = 0;
				condition.fee = 0;
				condition.signature = MessageSignature::empty();
			}
			Self::MultiSig(condition) => {
				condition.nonce = 0;
				condition.fee = 0;
				condition.fields.clear();
			}
		}

		cleared
	}

	/// Signs the next round and stores the signature
	pub fn sign(
		&mut self,
		cur_sighash: &Sighash,
		auth_type: AuthType,
		private_key: &StacksPrivateKey,
	) -> StacksResult<Sighash> {
		let (signature, next_sighash) = next_signature(
			cur_sighash,
			auth_type,
			self.fee(),
			self.nonce(),
			private_key,
		)?;

		match self {
			Self::SingleSig(condition) => condition.signature = signature,
			Self::MultiSig(condition) => {
				condition.fields.push(TransactionAuthField::Signature(
					private_key.public_key().encoding(),
					signature,
				))
			}
		}

		Ok(next_sighash)
	}

	/// Appends a non-signing key to a multi signature condition
	pub fn append_public_key(
		&mut self,
		public_key: StacksPublicKey,
	) -> StacksResult<()> {
		match self {
			Self::SingleSig(_) => Err(StacksError::SigningError(
				"Can't append public key to a singlesig condition".to_string(),
			)),
			Self::MultiSig(condition) => {
				condition
					.fields
					.push(TransactionAuthField::PublicKey(public_key));

				Ok(())
			}
		}
	}

	/// Replays the signatures and checks them against the signer hash.
	///
	/// Returns the sighash after the last signature.
	pub fn verify(
		&self,
		initial_sighash: &Sighash,
		auth_type: AuthType,
	) -> StacksResult<Sighash> {
		match self {
			Self::SingleSig(condition) => {
				verify_single_sig(condition, initial_sighash, auth_type)
			}
			Self::MultiSig(condition) => {
				verify_multi_sig(condition, initial_sighash, auth_type)
			}
		}
	}

	/// Replays the signatures present without checking the signer hash
	pub(crate) fn replay(
		&self,
		initial_sighash: &Sighash,
		auth_type: AuthType,
	) -> StacksResult<Sighash> {
		let mut cur_sighash = *initial_sighash;

		if let Self::MultiSig(condition) = self {
			for field in &condition.fields {
				if let TransactionAuthField::Signature(encoding, signature) = field
				{
					let (_, next_sighash) = next_verification(
						&cur_sighash,
						auth_type,
						condition.fee,
						condition.nonce,
						*encoding,
						signature,
					)?;
					cur_sighash = next_sighash;
				}
			}
		}

		Ok(cur_sighash)
	}
}

fn signer_hash(
	hash_mode: AddressHashMode,
	signatures_required: usize,
	public_keys: &[StacksPublicKey],
) -> StacksResult<Hash160Hasher> {
	// The version only affects the textual address, not the hash
	let address = StacksAddress::from_public_keys(
		AddressVersion::MainnetSingleSig,
		hash_mode,
		signatures_required,
		public_keys,
	)?;

	Ok(*address.hash())
}

fn verify_single_sig(
	condition: &SingleSigSpendingCondition,
	initial_sighash: &Sighash,
	auth_type: AuthType,
) -> StacksResult<Sighash> {
	let (public_key, next_sighash) = next_verification(
		initial_sighash,
		auth_type,
		condition.fee,
		condition.nonce,
		condition.key_encoding,
		&condition.signature,
	)?;

	let signer =
		signer_hash(condition.hash_mode.into(), 1, &[public_key]).map_err(
			|err| StacksError::VerificationError(err.to_string()),
		)?;

	if signer != condition.signer {
		return Err(StacksError::VerificationError(format!(
			"Signer hash mismatch: expected {}, recovered {}",
			condition.signer, signer
		)));
	}

	Ok(next_sighash)
}

fn verify_multi_sig(
	condition: &MultiSigSpendingCondition,
	initial_sighash: &Sighash,
	auth_type: AuthType,
) -> StacksResult<Sighash> {
	let mut cur_sighash = *initial_sighash;
	let mut public_keys = Vec::with_capacity(condition.fields.len());
	let mut num_signatures = 0u16;

	for field in &condition.fields {
		let public_key = match field {
			TransactionAuthField::PublicKey(public_key) => *public_key,
			TransactionAuthField::Signature(encoding, signature) => {
				let (public_key, next_sighash) = next_verification(
					&cur_sighash,
					auth_type,
					condition.fee,
					condition.nonce,
					*encoding,
					signature,
				)?;

				cur_sighash = next_sighash;
				num_signatures = num_signatures.saturating_add(1);

				public_key
			}
		};

		public_keys.push(public_key);
	}

	if num_signatures != condition.signatures_required {
		return Err(StacksError::VerificationError(format!(
			"Incorrect number of signatures: expected {}, got {}",
			condition.signatures_required, num_signatures
		)));
	}

	if condition.hash_mode == MultiSigHashMode::P2WSH
		&& condition.fields.iter().any(|field| !field.is_compressed())
	{
		return Err(StacksError::VerificationError(
			"Uncompressed keys are not allowed in P2WSH conditions".to_string(),
		));
	}

	let signer = signer_hash(
		condition.hash_mode.into(),
		condition.signatures_required as usize,
		&public_keys,
	)
	.map_err(|err| StacksError::VerificationError(err.to_string()))?;

	if signer != condition.signer {
		return Err(StacksError::VerificationError(format!(
			"Signer hash mismatch: expected {}, recovered {}",
			condition.signer, signer
		)));
	}

	Ok(cur_sighash)
}

/// `H(cur ‖ auth type ‖ fee ‖ nonce)`
pub fn sighash_presign(
	cur_sighash: &Sighash,
	auth_type: AuthType,
	fee: u64,
	nonce: u64,
) -> Sighash {
	let mut buffer = Vec::with_capacity(32 + 1 + 8 + 8);
	buffer.extend_from_slice(cur_sighash.as_bytes());
	buffer.push(auth_type as u8);
	buffer.extend_from_slice(&fee.to_be_bytes());
	buffer.extend_from_slice(&nonce.to_be_bytes());

	Sighash::new(&buffer)
}

/// `H(presign ‖ key encoding ‖ signature)`
pub fn sighash_postsign(
	presign_sighash: &Sighash,
	key_encoding: PublicKeyEncoding,
	signature: &MessageSignature,
) -> Sighash {
	let mut buffer = Vec::with_capacity(32 + 1 + 65);
	buffer.extend_from_slice(presign_sighash.as_bytes());
	buffer.push(key_encoding as u8);
	buffer.extend_from_slice(signature.as_bytes());

	Sighash::new(&buffer)
}

/// Signs one round, returning the signature and the next sighash
pub fn next_signature(
	cur_sighash: &Sighash,
	auth_type: AuthType,
	fee: u64,
	nonce: u64,
	private_key: &StacksPrivateKey,
) -> StacksResult<(MessageSignature, Sighash)> {
	let presign = sighash_presign(cur_sighash, auth_type, fee, nonce);
	let signature = private_key.sign(presign.as_bytes())?;
	let next_sighash = sighash_postsign(
		&presign,
		private_key.public_key().encoding(),
		&signature,
	);

	trace!(
		"Signed round {} -> {} as {:?}",
		cur_sighash,
		next_sighash,
		auth_type
	);

	Ok((signature, next_sighash))
}

/// Verifies one round, returning the recovered key and the next sighash
pub fn next_verification(
	cur_sighash: &Sighash,
	auth_type: AuthType,
	fee: u64,
	nonce: u64,
	key_encoding: PublicKeyEncoding,
	signature: &MessageSignature,
) -> StacksResult<(StacksPublicKey, Sighash)> {
	let presign = sighash_presign(cur_sighash, auth_type, fee, nonce);
	let public_key = StacksPublicKey::recover(
		presign.as_bytes(),
		signature,
		key_encoding.is_compressed(),
	)
	.map_err(|err| {
		StacksError::VerificationError(format!(
			"Could not recover public key: {}",
			err
		))
	})?;
	let next_sighash = sighash_postsign(&presign, key_encoding, signature);

	trace!("Verified round {} -> {}", cur_sighash, next_sighash);

	Ok((public_key, next_sighash))
}

impl Codec for SpendingCondition {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		match self {
			Self::SingleSig(condition) => {
				dest.write_all(&[condition.hash_mode as u8])?;
				dest.write_all(condition.signer.as_bytes())?;
				dest.write_all(&condition.nonce.to_be_bytes())?;
				dest.write_all(&condition.fee.to_be_bytes())?;
				dest.write_all(&[condition.key_encoding as u8])?;
				condition.signature.codec_serialize(dest)
			}
			Self::MultiSig(condition) => {
				dest.write_all(&[condition.hash_mode as u8])?;
				dest.write_all(condition.signer.as_bytes())?;
				dest.write_all(&condition.nonce.to_be_bytes())?;
				dest.write_all(&condition.fee.to_be_bytes())?;
				condition.fields.codec_serialize(dest)?;
				dest.write_all(&condition.signatures_required.to_be_bytes())
			}
		}
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;

		if let Some(hash_mode) = SingleSigHashMode::from_repr(tag) {
			let signer = Hash160Hasher::from(read_array::<_, 20>(data)?);
			let nonce = read_u64(data)?;
			let fee = read_u64(data)?;

			let encoding_byte = read_u8(data)?;
			let key_encoding = PublicKeyEncoding::from_repr(encoding_byte)
				.ok_or_else(|| {
					invalid_data(format!(
						"unknown key encoding {:#04x}",
						encoding_byte
					))
				})?;

			if hash_mode == SingleSigHashMode::P2WPKH
				&& !key_encoding.is_compressed()
			{
				return Err(invalid_data(
					"P2WPKH conditions require compressed keys",
				));
			}

			let signature = MessageSignature::codec_deserialize(data)?;

			return Ok(Self::SingleSig(SingleSigSpendingCondition {
				hash_mode,
				signer,
				nonce,
				fee,
				key_encoding,
				signature,
			}));
		}

		if let Some(hash_mode) = MultiSigHashMode::from_repr(tag) {
			let signer = Hash160Hasher::from(read_array::<_, 20>(data)?);
			let nonce = read_u64(data)?;
			let fee = read_u64(data)?;
			let fields = Vec::<TransactionAuthField>::codec_deserialize(data)?;
			let signatures_required = read_u16(data)?;

			if hash_mode == MultiSigHashMode::P2WSH
				&& fields.iter().any(|field| !field.is_compressed())
			{
				return Err(invalid_data(
					"P2WSH conditions require compressed keys",
				));
			}

			return Ok(Self::MultiSig(MultiSigSpendingCondition {
				hash_mode,
				signer,
				nonce,
				fee,
				fields,
				signatures_required,
			}));
		}

		Err(invalid_data(format!("unknown hash mode {:#04x}", tag)))
	}
}

/// Signers of a whole transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
	/// The origin pays
	Standard(SpendingCondition),
	/// A sponsor pays, origin first
	Sponsored(SpendingCondition, SpendingCondition),
}

impl Authorization {
	/// Standard authorization
	pub fn standard(origin: SpendingCondition) -> Self {
		Self::Standard(origin)
	}

	/// Sponsored authorization awaiting its sponsor
	pub fn sponsored(origin: SpendingCondition) -> Self {
		Self::Sponsored(origin, SpendingCondition::sponsor_sentinel())
	}

	/// Authorization type tag
	pub fn auth_type(&self) -> AuthType {
		match self {
			Self::Standard(_) => AuthType::Standard,
			Self::Sponsored(_, _) => AuthType::Sponsored,
		}
	}

	/// Origin condition
	pub fn origin(&self) -> &SpendingCondition {
		match self {
			Self::Standard(origin) | Self::Sponsored(origin, _) => origin,
		}
	}

	/// Mutable origin condition
	pub fn origin_mut(&mut self) -> &mut SpendingCondition {
		match self {
			Self::Standard(origin) | Self::Sponsored(origin, _) => origin,
		}
	}

	/// Sponsor condition of a sponsored authorization
	pub fn sponsor(&self) -> Option<&SpendingCondition> {
		match self {
			Self::Standard(_) => None,
			Self::Sponsored(_, sponsor) => Some(sponsor),
		}
	}

	/// Mutable sponsor condition of a sponsored authorization
	pub fn sponsor_mut(&mut self) -> Option<&mut SpendingCondition> {
		match self {
			Self::Standard(_) => None,
			Self::Sponsored(_, sponsor) => Some(sponsor),
		}
	}

	/// Replaces the sponsor condition
	pub fn set_sponsor(
		&mut self,
		sponsor: SpendingCondition,
	) -> StacksResult<()> {
		match self {
			Self::Standard(_) => Err(StacksError::SigningError(
				"Cannot add sponsor to non-sponsored transaction".to_string(),
			)),
			Self::Sponsored(_, current) => {
				*current = sponsor;
				Ok(())
			}
		}
	}

	/// The authorization hashed into the initial sighash
	pub fn into_initial_sighash_auth(&self) -> Self {
		match self {
			Self::Standard(origin) => Self::Standard(origin.clear()),
			Self::Sponsored(origin, _) => Self::Sponsored(
				origin.clear(),
				SpendingCondition::sponsor_sentinel(),
			),
		}
	}

	/// Verifies the origin, returning its final sighash
	pub fn verify_origin(
		&self,
		initial_sighash: &Sighash,
	) -> StacksResult<Sighash> {
		self.origin().verify(initial_sighash, AuthType::Standard)
	}

	/// Verifies the origin and, when sponsored, the sponsor
	pub fn verify(&self, initial_sighash: &Sighash) -> StacksResult<()> {
		let origin_sighash = self.verify_origin(initial_sighash)?;

		if let Self::Sponsored(_, sponsor) = self {
			sponsor.verify(&origin_sighash, AuthType::Sponsored)?;
		}

		Ok(())
	}
}

impl Codec for Authorization {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		dest.write_all(&[self.auth_type() as u8])?;

		match self {
			Self::Standard(origin) => origin.codec_serialize(dest),
			Self::Sponsored(origin, sponsor) => {
				origin.codec_serialize(dest)?;
				sponsor.codec_serialize(dest)
			}
		}
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;

		match AuthType::from_repr(tag) {
			Some(AuthType::Standard) => {
				Ok(Self::Standard(SpendingCondition::codec_deserialize(data)?))
			}
			Some(AuthType::Sponsored) => Ok(Self::Sponsored(
				SpendingCondition::codec_deserialize(data)?,
				SpendingCondition::codec_deserialize(data)?,
			)),
			None => Err(invalid_data(format!("unknown auth type {:#04x}", tag))),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn keys(count: usize) -> Vec<StacksPrivateKey> {
		(0..count).map(|_| StacksPrivateKey::random()).collect()
	}

	fn public_keys(keys: &[StacksPrivateKey]) -> Vec<StacksPublicKey> {
		keys.iter().map(StacksPrivateKey::public_key).collect()
	}

	fn round_trip(condition: &SpendingCondition) -> Vec<u8> {
		let bytes = condition.serialize_to_vec().unwrap();
		let decoded = SpendingCondition::deserialize_from_slice(&bytes).unwrap();

		assert_eq!(&decoded, condition);

		bytes
	}

	#[test]
	fn should_lay_out_single_sig_condition() {
		let key = StacksPrivateKey::random();
		let mut condition =
			SpendingCondition::new_single_sig(SingleSigHashMode::P2PKH, &key.public_key())
				.unwrap();
		condition.set_nonce(1);
		condition.set_fee(180);

		let bytes = round_trip(&condition);

		assert_eq!(bytes.len(), 1 + 20 + 8 + 8 + 1 + 65);
		assert_eq!(bytes[0], 0x00);
		assert_eq!(&bytes[21..29], &1u64.to_be_bytes());
		assert_eq!(&bytes[29..37], &180u64.to_be_bytes());
		assert_eq!(bytes[37], 0x00);
	}

	#[test]
	fn should_round_trip_partially_signed_multi_sig() {
		let keys = keys(3);
		let mut condition = SpendingCondition::new_multi_sig(
			MultiSigHashMode::P2SH,
			2,
			&public_keys(&keys),
		)
		.unwrap();

		let sighash = Sighash::new("initial");
		condition
			.sign(&sighash, AuthType::Standard, &keys[0])
			.unwrap();
		condition.append_public_key(keys[1].public_key()).unwrap();

		let bytes = round_trip(&condition);

		assert_eq!(condition.num_signatures(), 1);
		assert_eq!(&bytes[bytes.len() - 2..], &[0, 2]);
	}

	#[test]
	fn should_sign_and_verify_single_sig() {
		let key = StacksPrivateKey::random();
		let mut condition = SpendingCondition::new_single_sig(
			SingleSigHashMode::P2WPKH,
			&key.public_key(),
		)
		.unwrap();
		condition.set_fee(10);

		let initial = Sighash::new("initial");
		let signed = condition.sign(&initial, AuthType::Standard, &key).unwrap();

		assert_eq!(condition.verify(&initial, AuthType::Standard).unwrap(), signed);
		assert!(condition.verify(&initial, AuthType::Sponsored).is_err());
	}

	#[test]
	fn should_sign_with_uncompressed_key() {
		let key = StacksPrivateKey::from_slice(&[7; 32]).unwrap();
		let mut condition = SpendingCondition::new_single_sig(
			SingleSigHashMode::P2PKH,
			&key.public_key(),
		)
		.unwrap();

		let initial = Sighash::new("initial");
		condition.sign(&initial, AuthType::Standard, &key).unwrap();

		let bytes = round_trip(&condition);

		assert_eq!(bytes[37], 0x01);
		assert!(condition.verify(&initial, AuthType::Standard).is_ok());
	}

	#[test]
	fn should_reject_uncompressed_p2wpkh() {
		let key = StacksPrivateKey::from_slice(&[7; 32]).unwrap();

		assert!(SpendingCondition::new_single_sig(
			SingleSigHashMode::P2WPKH,
			&key.public_key()
		)
		.is_err());

		let mut bytes = SpendingCondition::sponsor_sentinel()
			.serialize_to_vec()
			.unwrap();
		bytes[0] = 0x02;
		bytes[37] = 0x01;

		assert!(SpendingCondition::deserialize_from_slice(&bytes).is_err());
	}

	#[test]
	fn should_require_exact_signature_count() {
		let keys = keys(3);
		let mut condition = SpendingCondition::new_multi_sig(
			MultiSigHashMode::P2SH,
			2,
			&public_keys(&keys),
		)
		.unwrap();

		let initial = Sighash::new("initial");
		condition.sign(&initial, AuthType::Standard, &keys[0]).unwrap();
		condition.append_public_key(keys[1].public_key()).unwrap();
		condition.append_public_key(keys[2].public_key()).unwrap();

		assert!(matches!(
			condition.verify(&initial, AuthType::Standard),
			Err(StacksError::VerificationError(_))
		));
	}

	#[test]
	fn should_be_sensitive_to_field_order() {
		let keys = keys(2);
		let initial = Sighash::new("initial");
		let mut condition = SpendingCondition::new_multi_sig(
			MultiSigHashMode::P2SH,
			1,
			&public_keys(&keys),
		)
		.unwrap();

		let mut in_order = condition.clone();
		in_order.sign(&initial, AuthType::Standard, &keys[0]).unwrap();
		in_order.append_public_key(keys[1].public_key()).unwrap();

		assert!(in_order.verify(&initial, AuthType::Standard).is_ok());

		condition.append_public_key(keys[1].public_key()).unwrap();
		condition.sign(&initial, AuthType::Standard, &keys[0]).unwrap();

		assert!(condition.verify(&initial, AuthType::Standard).is_err());
	}

	#[test]
	fn should_chain_presign_and_postsign() {
		let cur = Sighash::new("cur");
		let presign = sighash_presign(&cur, AuthType::Standard, 1, 2);

		let mut buffer = cur.as_bytes().to_vec();
		buffer.push(0x04);
		buffer.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 1]);
		buffer.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 2]);

		assert_eq!(presign, Sighash::new(&buffer));

		let signature = MessageSignature::new([9; 65]);
		let postsign =
			sighash_postsign(&presign, PublicKeyEncoding::Uncompressed, &signature);

		let mut buffer = presign.as_bytes().to_vec();
		buffer.push(0x01);
		buffer.extend_from_slice(&[9; 65]);

		assert_eq!(postsign, Sighash::new(&buffer));
	}

	#[test]
	fn should_clear_conditions() {
		let keys = keys(2);
		let mut condition = SpendingCondition::new_multi_sig(
			MultiSigHashMode::P2WSH,
			1,
			&public_keys(&keys),
		)
		.unwrap();
		condition.set_fee(5);
		condition.set_nonce(6);
		condition.append_public_key(keys[0].public_key()).unwrap();

		let cleared = condition.clear();

		assert_eq!(cleared.fee(), 0);
		assert_eq!(cleared.nonce(), 0);
		assert_eq!(cleared.signer(), condition.signer());
		assert!(matches!(cleared, SpendingCondition::MultiSig(c) if c.fields.is_empty()));
	}

	#[test]
	fn should_refuse_public_key_on_single_sig() {
		let key = StacksPrivateKey::random();
		let mut condition = SpendingCondition::new_single_sig(
			SingleSigHashMode::P2PKH,
			&key.public_key(),
		)
		.unwrap();

		assert!(matches!(
			condition.append_public_key(key.public_key()),
			Err(StacksError::SigningError(_))
		));
	}

	#[test]
	fn should_derive_condition_addresses() {
		let key = StacksPrivateKey::from_hex(
			"753b7cc01a1a2e86221266a154af739463fce51219d97e4f856cd7200c3bd2a601",
		)
		.unwrap();
		let condition = SpendingCondition::new_single_sig(
			SingleSigHashMode::P2PKH,
			&key.public_key(),
		)
		.unwrap();

		assert_eq!(
			condition.address(Network::Testnet).to_string(),
			"ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"
		);
	}

	#[test]
	fn should_reject_unknown_tags() {
		let mut bytes = SpendingCondition::sponsor_sentinel()
			.serialize_to_vec()
			.unwrap();
		bytes[0] = 0x04;

		assert!(SpendingCondition::deserialize_from_slice(&bytes).is_err());
		assert!(Authorization::deserialize_from_slice(&[0x06]).is_err());
	}

	#[test]
	fn should_only_set_sponsor_on_sponsored_auth() {
		let sentinel = SpendingCondition::sponsor_sentinel();
		let mut standard = Authorization::standard(sentinel.clone());
		let mut sponsored = Authorization::sponsored(sentinel.clone());

		assert!(standard.set_sponsor(sentinel.clone()).is_err());
		assert!(sponsored.set_sponsor(sentinel).is_ok());
		assert_eq!(sponsored.auth_type(), AuthType::Sponsored);
	}
}
