use sha2::{Digest, Sha512_256};

use crate::crypto::{Hasher, Hashing};

pub(crate) const SHA512_256_LENGTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// SHA-512/256 hashing type, the digest behind transaction ids and sighashes
pub struct Sha512Trunc256Hashing([u8; SHA512_256_LENGTH]);

impl Hashing<SHA512_256_LENGTH> for Sha512Trunc256Hashing {
	fn hash(data: &[u8]) -> Self {
		Self(Sha512_256::digest(data).into())
	}

	fn from_array(bytes: [u8; SHA512_256_LENGTH]) -> Self {
		Self(bytes)
	}

	fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

/// SHA-512/256 hasher type
pub type Sha512Trunc256Hasher =
	Hasher<Sha512Trunc256Hashing, SHA512_256_LENGTH>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_sha512_256_hash_correctly() {
		// FIPS 180-4 example for "abc"
		let expected_hash_hex =
			"53048e2681941ef99b2e29b76b4c7dabe4c2d0c634fc6d46e0e2f13107e7af23";

		assert_eq!(Sha512Trunc256Hasher::new("abc").to_hex(), expected_hash_hex);
	}

	#[test]
	fn should_change_digest_when_input_changes() {
		assert_ne!(
			Sha512Trunc256Hasher::new([0, 1, 2]),
			Sha512Trunc256Hasher::new([0, 1, 3])
		);
	}
}
