//! Stacks private and public keys.
//!
//! Both key kinds carry a compression flag. The flag of a private key
//! decides the encoding of its public key, which in turn decides the
//! address hash and the key encoding byte of a spending condition.

use std::{fmt, str::FromStr};

use bdk::bitcoin::secp256k1::{
	All, Message, PublicKey, Secp256k1, SecretKey,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::FromRepr;

use crate::{
	crypto::signature::MessageSignature, StacksError, StacksResult,
};

pub(crate) static SECP256K1: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

const PRIVATE_KEY_LENGTH: usize = 32;
const COMPRESSED_FLAG: u8 = 0x01;

/// Public key encoding used by a signature or spending condition
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
	Hash,
)]
pub enum PublicKeyEncoding {
	/// 33 byte compressed point
	Compressed = 0x00,
	/// 65 byte uncompressed point
	Uncompressed = 0x01,
}

impl PublicKeyEncoding {
	/// Returns true for the compressed encoding
	pub fn is_compressed(self) -> bool {
		self == Self::Compressed
	}
}

/// A secp256k1 private key with the compression flag of its public key
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct StacksPrivateKey {
	key: SecretKey,
	compressed: bool,
}

impl StacksPrivateKey {
	/// Wraps a secret key whose public key is compressed
	pub fn new(key: SecretKey) -> Self {
		Self {
			key,
			compressed: true,
		}
	}

	/// Generates a random key with a compressed public key
	pub fn random() -> Self {
		loop {
			let bytes: [u8; PRIVATE_KEY_LENGTH] = rand::random();

			// Out of range scalars are astronomically rare, draw again
			if let Ok(key) = SecretKey::from_slice(&bytes) {
				return Self::new(key);
			}
		}
	}

	/// Parses 32 raw bytes, or 33 bytes ending in 0x01 to mark compression
	pub fn from_slice(bytes: &[u8]) -> StacksResult<Self> {
		let compressed = match bytes.len() {
			PRIVATE_KEY_LENGTH => false,
			33 if bytes[PRIVATE_KEY_LENGTH] == COMPRESSED_FLAG => true,
			33 => {
				return Err(StacksError::InvalidArguments(
					"33 byte private keys must end with 0x01",
				))
			}
			length => {
				return Err(StacksError::InvalidKeyLength {
					kind: "private",
					length,
				})
			}
		};

		Ok(Self {
			key: SecretKey::from_slice(&bytes[..PRIVATE_KEY_LENGTH])?,
			compressed,
		})
	}

	/// Parses a hex encoded key, see [StacksPrivateKey::from_slice]
	pub fn from_hex(data: impl AsRef<str>) -> StacksResult<Self> {
		Self::from_slice(&hex::decode(strip_hex_prefix(data.as_ref()))?)
	}

	/// Key bytes, with the trailing compression flag when compressed
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut bytes = self.key.secret_bytes().to_vec();

		if self.compressed {
			bytes.push(COMPRESSED_FLAG);
		}

		bytes
	}

	/// Hex encoding of [StacksPrivateKey::to_bytes]
	pub fn to_hex(&self) -> String {
		hex::encode(self.to_bytes())
	}

	/// Returns true when the public key is compressed
	pub fn compressed(&self) -> bool {
		self.compressed
	}

	/// Underlying secret key
	pub fn secret_key(&self) -> &SecretKey {
		&self.key
	}

	/// Derives the public key with the matching compression
	pub fn public_key(&self) -> StacksPublicKey {
		StacksPublicKey {
			key: PublicKey::from_secret_key(&SECP256K1, &self.key),
			compressed: self.compressed,
		}
	}

	/// Produces a recoverable signature over a 32 byte message hash
	pub fn sign(&self, message_hash: &[u8]) -> StacksResult<MessageSignature> {
		let message = Message::from_slice(message_hash)?;
		let signature = SECP256K1.sign_ecdsa_recoverable(&message, &self.key);

		Ok(MessageSignature::from_recoverable(&signature))
	}
}

impl fmt::Debug for StacksPrivateKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StacksPrivateKey")
			.field("compressed", &self.compressed)
			.finish_non_exhaustive()
	}
}

impl FromStr for StacksPrivateKey {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_hex(s)
	}
}

/// A secp256k1 public key with its encoding
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StacksPublicKey {
	key: PublicKey,
	compressed: bool,
}

impl StacksPublicKey {
	/// Wraps a public key with the given compression
	pub fn new(key: PublicKey, compressed: bool) -> Self {
		Self { key, compressed }
	}

	/// Parses a 33 byte compressed or 65 byte uncompressed key
	pub fn from_slice(bytes: &[u8]) -> StacksResult<Self> {
		let compressed = match bytes.len() {
			33 => true,
			65 => false,
			length => {
				return Err(StacksError::InvalidKeyLength {
					kind: "public",
					length,
				})
			}
		};

		Ok(Self {
			key: PublicKey::from_slice(bytes)?,
			compressed,
		})
	}

	/// Parses a hex encoded key, see [StacksPublicKey::from_slice]
	pub fn from_hex(data: impl AsRef<str>) -> StacksResult<Self> {
		Self::from_slice(&hex::decode(strip_hex_prefix(data.as_ref()))?)
	}

	/// Recovers the signing key of a message hash
	pub fn recover(
		message_hash: &[u8],
		signature: &MessageSignature,
		compressed: bool,
	) -> StacksResult<Self> {
		let message = Message::from_slice(message_hash)?;
		let key =
			SECP256K1.recover_ecdsa(&message, &signature.to_recoverable()?)?;

		Ok(Self { key, compressed })
	}

	/// Key bytes in the key's own encoding
	pub fn to_bytes(&self) -> Vec<u8> {
		if self.compressed {
			self.key.serialize().to_vec()
		} else {
			self.key.serialize_uncompressed().to_vec()
		}
	}

	/// Compressed key bytes regardless of the key's own encoding
	pub fn to_bytes_compressed(&self) -> [u8; 33] {
		self.key.serialize()
	}

	/// Hex encoding of [StacksPublicKey::to_bytes]
	pub fn to_hex(&self) -> String {
		hex::encode(self.to_bytes())
	}

	/// Returns true for compressed keys
	pub fn compressed(&self) -> bool {
		self.compressed
	}

	/// Returns the key encoding
	pub fn encoding(&self) -> PublicKeyEncoding {
		if self.compressed {
			PublicKeyEncoding::Compressed
		} else {
			PublicKeyEncoding::Uncompressed
		}
	}

	/// Returns the same point with the given compression
	pub fn with_compression(self, compressed: bool) -> Self {
		Self { compressed, ..self }
	}

	/// Underlying public key
	pub fn inner(&self) -> &PublicKey {
		&self.key
	}
}

impl fmt::Debug for StacksPublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "StacksPublicKey({})", self.to_hex())
	}
}

impl fmt::Display for StacksPublicKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl FromStr for StacksPublicKey {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_hex(s)
	}
}

impl TryFrom<String> for StacksPublicKey {
	type Error = StacksError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::from_hex(value)
	}
}

impl From<StacksPublicKey> for String {
	fn from(value: StacksPublicKey) -> Self {
		value.to_hex()
	}
}

pub(crate) fn strip_hex_prefix(data: &str) -> &str {
	data.strip_prefix("0x").unwrap_or(data)
}

#[cfg(test)]
mod tests {
	use super::*;

	const PRIVATE_KEY_HEX: &str =
		"753b7cc01a1a2e86221266a154af739463fce51219d97e4f856cd7200c3bd2a601";
	const PUBLIC_KEY_HEX: &str =
		"0390a5cac7c33fda49f70bc1b0866fa0ba7a9440d9de647fecb8132ceb76a94dfa";

	#[test]
	fn should_derive_compressed_public_key() {
		let private_key = StacksPrivateKey::from_hex(PRIVATE_KEY_HEX).unwrap();

		assert!(private_key.compressed());
		assert_eq!(private_key.public_key().to_hex(), PUBLIC_KEY_HEX);
		assert_eq!(private_key.to_hex(), PRIVATE_KEY_HEX);
	}

	#[test]
	fn should_derive_uncompressed_public_key_from_32_bytes() {
		let private_key =
			StacksPrivateKey::from_hex(&PRIVATE_KEY_HEX[..64]).unwrap();
		let public_key = private_key.public_key();

		assert!(!private_key.compressed());
		assert_eq!(public_key.to_bytes().len(), 65);
		assert_eq!(hex::encode(public_key.to_bytes_compressed()), PUBLIC_KEY_HEX);
	}

	#[test]
	fn should_reject_bad_private_key_lengths() {
		assert!(matches!(
			StacksPrivateKey::from_slice(&[1; 31]),
			Err(StacksError::InvalidKeyLength {
				kind: "private",
				length: 31
			})
		));

		let mut bytes = [1; 33];
		bytes[32] = 0x02;

		assert!(StacksPrivateKey::from_slice(&bytes).is_err());
	}

	#[test]
	fn should_reject_bad_public_key_lengths() {
		assert!(matches!(
			StacksPublicKey::from_slice(&[2; 34]),
			Err(StacksError::InvalidKeyLength {
				kind: "public",
				length: 34
			})
		));
	}

	#[test]
	fn should_accept_prefixed_hex() {
		let key = StacksPublicKey::from_hex(format!("0x{}", PUBLIC_KEY_HEX));

		assert!(key.is_ok());
	}

	#[test]
	fn should_recover_signing_key() {
		let private_key = StacksPrivateKey::random();
		let message = [7; 32];

		let signature = private_key.sign(&message).unwrap();
		let recovered =
			StacksPublicKey::recover(&message, &signature, true).unwrap();

		assert_eq!(recovered, private_key.public_key());
	}
}
