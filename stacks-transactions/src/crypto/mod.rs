//! Hashing primitives and secp256k1 keys used by Stacks.
pub use bdk::bitcoin::secp256k1;
use serde::{Deserialize, Serialize};

use crate::{StacksError, StacksResult};

/// Hash160 digest
pub mod hash160;
pub mod keys;
/// SHA-256 and double SHA-256 digests
pub mod sha256;
/// SHA-512/256 digest
pub mod sha512;
pub mod signature;

pub use hash160::Hash160Hasher;
pub use keys::{PublicKeyEncoding, StacksPrivateKey, StacksPublicKey};
pub use sha256::{DoubleSha256Hasher, Sha256Hasher};
pub use sha512::Sha512Trunc256Hasher;
pub use signature::MessageSignature;

const CHECKSUM_LENGTH: usize = 4;

#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct Hex(String);

/// A fixed width digest
pub trait Hashing<const LENGTH: usize>: Clone + Sized {
	/// Hashes the data
	fn hash(data: &[u8]) -> Self;
	/// Wraps an existing digest
	fn from_array(bytes: [u8; LENGTH]) -> Self;
	/// Digest bytes
	fn as_bytes(&self) -> &[u8];

	/// Wraps an existing digest given as a slice of exactly LENGTH bytes
	fn from_bytes(bytes: &[u8]) -> StacksResult<Self> {
		Ok(Self::from_array(bytes.try_into()?))
	}

	/// Hashes anything byte-like
	fn new(value: impl AsRef<[u8]>) -> Self {
		Self::hash(value.as_ref())
	}

	/// The all-zero digest
	fn zeroes() -> Self {
		Self::from_array([0; LENGTH])
	}

	/// First 4 bytes of the digest
	fn checksum(&self) -> [u8; CHECKSUM_LENGTH] {
		let mut buffer = [0; CHECKSUM_LENGTH];
		buffer.copy_from_slice(&self.as_bytes()[..CHECKSUM_LENGTH]);

		buffer
	}

	/// Parses a hex encoded digest
	fn from_hex(data: impl AsRef<str>) -> StacksResult<Self> {
		Self::from_bytes(&hex::decode(data.as_ref().as_bytes())?)
	}

	/// Lowercase hex encoding of the digest
	fn to_hex(&self) -> String {
		hex::encode(self.as_bytes())
	}
}

/// Generic wrapper giving every digest the same conversions
#[derive(
	Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord,
	Hash,
)]
#[serde(try_from = "Hex")]
#[serde(into = "Hex")]
#[serde(bound = "")]
pub struct Hasher<T, const LENGTH: usize>(T)
where
	T: Hashing<LENGTH>;

impl<T, const LENGTH: usize> Hashing<LENGTH> for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	fn hash(data: &[u8]) -> Self {
		Self(T::hash(data))
	}

	fn from_array(bytes: [u8; LENGTH]) -> Self {
		Self(T::from_array(bytes))
	}

	fn as_bytes(&self) -> &[u8] {
		T::as_bytes(&self.0)
	}
}

impl<T, const LENGTH: usize> AsRef<[u8]> for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	fn as_ref(&self) -> &[u8] {
		self.as_bytes()
	}
}

impl<T, const LENGTH: usize> TryFrom<&[u8]> for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	type Error = StacksError;

	fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
		Self::from_bytes(value)
	}
}

impl<T, const LENGTH: usize> From<[u8; LENGTH]> for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	fn from(value: [u8; LENGTH]) -> Self {
		Self::from_array(value)
	}
}

impl<T, const LENGTH: usize> Default for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	fn default() -> Self {
		Self::zeroes()
	}
}

impl<T, const LENGTH: usize> std::fmt::Display for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

// From conversion is fallible for this type
#[allow(clippy::from_over_into)]
impl<T, const LENGTH: usize> Into<Hex> for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	fn into(self) -> Hex {
		Hex(self.to_hex())
	}
}

impl<T, const LENGTH: usize> TryFrom<Hex> for Hasher<T, LENGTH>
where
	T: Hashing<LENGTH>,
{
	type Error = StacksError;

	fn try_from(value: Hex) -> Result<Self, Self::Error> {
		Self::from_bytes(&hex::decode(value.0)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_serialize_hashers_as_hex_strings() {
		let hash = Sha256Hasher::new("Hello world");
		let json = serde_json::to_string(&hash).unwrap();

		assert_eq!(
			json,
			"\"64ec88ca00b268e5ba1a35678a1b5316d212f4f366b2477232534a8aeca37f3c\""
		);
		assert_eq!(serde_json::from_str::<Sha256Hasher>(&json).unwrap(), hash);
	}

	#[test]
	fn should_reject_wrong_length_digests() {
		assert!(Hash160Hasher::from_bytes(&[0; 19]).is_err());
		assert!(Hash160Hasher::from_hex("00").is_err());
	}

	#[test]
	fn should_default_to_zeroes() {
		assert_eq!(Sha512Trunc256Hasher::default().as_bytes(), &[0; 32]);
	}
}
