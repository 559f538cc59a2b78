use ripemd::{Digest, Ripemd160};

use super::sha256::Sha256Hasher;
use crate::crypto::{Hasher, Hashing};

pub(crate) const HASH160_LENGTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Hash160 hash type
pub struct Hash160Hashing([u8; HASH160_LENGTH]);

impl Hashing<HASH160_LENGTH> for Hash160Hashing {
	fn hash(data: &[u8]) -> Self {
		Self(Ripemd160::digest(Sha256Hasher::new(data)).into())
	}

	fn from_array(bytes: [u8; HASH160_LENGTH]) -> Self {
		Self(bytes)
	}

	fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

/// Hash160 hasher type
pub type Hash160Hasher = Hasher<Hash160Hashing, HASH160_LENGTH>;
