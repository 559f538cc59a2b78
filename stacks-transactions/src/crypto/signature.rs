//! Recoverable signature in the Stacks wire layout.
//!
//! The 65 bytes are the recovery id followed by the compact `r ‖ s`
//! encoding. An all-zero signature marks an unsigned slot, so decoding
//! does not check that the bytes form a valid signature.

use std::{
	fmt,
	io::{self, Read, Write},
};

use bdk::bitcoin::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};

use crate::{
	codec::{read_array, Codec},
	StacksResult,
};

/// Length of a wire signature
pub const MESSAGE_SIGNATURE_LENGTH: usize = 65;

/// A recoverable secp256k1 signature, `recovery id ‖ r ‖ s`
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageSignature([u8; MESSAGE_SIGNATURE_LENGTH]);

impl MessageSignature {
	/// The empty signature of an unsigned condition
	pub fn empty() -> Self {
		Self([0; MESSAGE_SIGNATURE_LENGTH])
	}

	/// Wraps raw signature bytes
	pub fn new(bytes: [u8; MESSAGE_SIGNATURE_LENGTH]) -> Self {
		Self(bytes)
	}

	/// Returns true for the empty signature
	pub fn is_empty(&self) -> bool {
		self.0.iter().all(|byte| *byte == 0)
	}

	/// Signature bytes
	pub fn as_bytes(&self) -> &[u8; MESSAGE_SIGNATURE_LENGTH] {
		&self.0
	}

	/// Lowercase hex encoding of the signature
	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}

	/// Converts a secp256k1 recoverable signature
	pub fn from_recoverable(signature: &RecoverableSignature) -> Self {
		let (id, compact) = signature.serialize_compact();

		let mut bytes = [0; MESSAGE_SIGNATURE_LENGTH];
		// Recovery ids are always within 0..=3
		bytes[0] = id.to_i32() as u8;
		bytes[1..].copy_from_slice(&compact);

		Self(bytes)
	}

	/// Parses the bytes as a secp256k1 recoverable signature
	pub fn to_recoverable(&self) -> StacksResult<RecoverableSignature> {
		let id = RecoveryId::from_i32(self.0[0] as i32)?;

		Ok(RecoverableSignature::from_compact(&self.0[1..], id)?)
	}
}

impl Default for MessageSignature {
	fn default() -> Self {
		Self::empty()
	}
}

impl fmt::Debug for MessageSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "MessageSignature({})", self.to_hex())
	}
}

impl Codec for MessageSignature {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		dest.write_all(&self.0)
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		Ok(Self(read_array(data)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::{crypto::StacksPrivateKey, StacksError};

	const SIGNATURE_HEX: &str = "0119874ebfb457c08cedb5ebf01fe13bf4b6ac216b6f4044763ad95a69022bf1ba3cdba26d7ebb695a7144c8de4ba672dddfc602ffa9e62a745d8f7e4206ae6a93";

	fn signature() -> anyhow::Result<MessageSignature> {
		let private_key = StacksPrivateKey::from_hex(
			"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
		)?;
		let message = hex::decode(
			"1bf9ad7ce49adf6cbc707a689b6e17653151e95c1cd8a53f9fce54d3d51a2a24",
		)?;

		Ok(private_key.sign(&message)?)
	}

	#[test]
	fn should_serialize_recoverable_signature() {
		let serialized = signature().unwrap().serialize_to_vec().unwrap();

		assert_eq!(hex::encode(serialized), SIGNATURE_HEX);
	}

	#[test]
	fn should_deserialize_recoverable_signature() {
		let bytes = hex::decode(SIGNATURE_HEX).unwrap();
		let signature_from_bytes =
			MessageSignature::deserialize_from_slice(&bytes).unwrap();

		assert_eq!(signature_from_bytes, signature().unwrap());
		assert!(signature_from_bytes.to_recoverable().is_ok());
	}

	#[test]
	fn should_fail_converting_signature_with_recovery_id_out_of_bounds() {
		let mut bytes = [0; MESSAGE_SIGNATURE_LENGTH];
		bytes[0] = 4;

		let result = MessageSignature::new(bytes).to_recoverable();

		assert!(matches!(result, Err(StacksError::Secp256k1Error(_))));
	}

	#[test]
	fn should_fail_converting_non_ecdsa_signature_bytes() {
		let mut bytes = [255; MESSAGE_SIGNATURE_LENGTH];
		bytes[0] = 1;

		let result = MessageSignature::new(bytes).to_recoverable();

		assert!(matches!(result, Err(StacksError::Secp256k1Error(_))));
	}

	#[test]
	fn should_decode_empty_signature_without_validation() {
		let signature = MessageSignature::deserialize_from_slice(
			&[0; MESSAGE_SIGNATURE_LENGTH],
		)
		.unwrap();

		assert!(signature.is_empty());
	}
}
