//! Length prefixed strings whose content is validated on construction.
//!
//! Each kind fixes its prefix width and maximum length. Decoding checks the
//! declared length against the maximum before reading the content.

use std::{
	borrow::Borrow,
	fmt,
	io::{self, Read, Write},
	ops::Deref,
	str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
	codec::{
		invalid_data, read_bytes, read_length_prefix, write_length_prefix,
		Codec,
	},
	StacksError, StacksResult,
};

pub mod clarity_name;
pub mod contract_name;
pub mod stacks_string;

pub use clarity_name::ClarityName;
pub use contract_name::ContractName;
pub use stacks_string::StacksString;

/// Specifies how to validate a string for a type
pub trait Validate:
	fmt::Debug + Clone + PartialEq + Eq + PartialOrd + Ord + std::hash::Hash
{
	/// Error returned for invalid content
	const ERR_MSG: &'static str;
	/// Width of the length prefix on the wire, 1 or 4 bytes
	const PREFIX_BYTES: usize;
	/// Maximum content length in bytes
	const MAX_LENGTH: usize;

	/// Validate string
	fn validate(text: &str) -> bool;

	/// Create type from valid string
	fn create(text: &str) -> Self;

	/// Return a reference to the valid string
	fn as_str(&self) -> &str;

	/// Validates the length and content, then creates the type
	fn new(text: impl AsRef<str>) -> StacksResult<Self> {
		let text = text.as_ref();

		if text.len() <= Self::MAX_LENGTH && Self::validate(text) {
			Ok(Self::create(text))
		} else {
			Err(StacksError::InvalidArguments(Self::ERR_MSG))
		}
	}
}

/// Validated string of some type
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValidatedString<T: Validate>(T);

impl<T: Validate> ValidatedString<T> {
	/// Validates and wraps the text
	pub fn new(text: impl AsRef<str>) -> StacksResult<Self> {
		Ok(Self(T::new(text)?))
	}

	/// Returns the content
	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl<T: Validate> Codec for ValidatedString<T> {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		let bytes = self.as_str().as_bytes();

		write_length_prefix(dest, T::PREFIX_BYTES, bytes.len())?;
		dest.write_all(bytes)
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let length = read_length_prefix(data, T::PREFIX_BYTES)?;

		if length > T::MAX_LENGTH {
			return Err(invalid_data(format!(
				"string length {} exceeds maximum {}",
				length,
				T::MAX_LENGTH
			)));
		}

		let text = String::from_utf8(read_bytes(data, length)?)
			.map_err(|err| invalid_data(err.to_string()))?;

		Self::new(&text).map_err(|err| invalid_data(err.to_string()))
	}
}

impl<T: Validate> Serialize for ValidatedString<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(self.as_str())
	}
}

impl<'de, T: Validate> Deserialize<'de> for ValidatedString<T> {
	fn deserialize<D: Deserializer<'de>>(
		deserializer: D,
	) -> Result<Self, D::Error> {
		let text = String::deserialize(deserializer)?;

		Self::new(text).map_err(de::Error::custom)
	}
}

impl<T: Validate> TryFrom<&str> for ValidatedString<T> {
	type Error = StacksError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl<T: Validate> TryFrom<String> for ValidatedString<T> {
	type Error = StacksError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl<T: Validate> From<ValidatedString<T>> for String {
	fn from(value: ValidatedString<T>) -> Self {
		value.as_str().to_string()
	}
}

impl<T: Validate> FromStr for ValidatedString<T> {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl<T: Validate> fmt::Display for ValidatedString<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl<T: Validate> AsRef<str> for ValidatedString<T> {
	fn as_ref(&self) -> &str {
		self.0.as_str()
	}
}

impl<T: Validate> Deref for ValidatedString<T> {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		self.0.as_str()
	}
}

impl<T: Validate> Borrow<str> for ValidatedString<T> {
	fn borrow(&self) -> &str {
		self.0.as_str()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_prefix_names_with_one_byte() {
		let name = ClarityName::new("transfer").unwrap();
		let bytes = name.serialize_to_vec().unwrap();

		assert_eq!(bytes[0], 8);
		assert_eq!(&bytes[1..], b"transfer");
		assert_eq!(ClarityName::deserialize_from_slice(&bytes).unwrap(), name);
	}

	#[test]
	fn should_prefix_code_bodies_with_four_bytes() {
		let code = StacksString::new("(define-public (f) (ok u1))").unwrap();
		let bytes = code.serialize_to_vec().unwrap();

		assert_eq!(&bytes[..4], &[0, 0, 0, 27]);
		assert_eq!(StacksString::deserialize_from_slice(&bytes).unwrap(), code);
	}

	#[test]
	fn should_reject_declared_length_over_maximum() {
		// 41 byte declared length with no content behind it
		let result = ContractName::deserialize_from_slice(&[41]);

		match result {
			Err(StacksError::DeserializationError(message)) => {
				assert!(message.contains("exceeds maximum"))
			}
			other => panic!("Expected length error, got {:?}", other),
		}
	}

	#[test]
	fn should_reject_truncated_content() {
		assert!(ClarityName::deserialize_from_slice(&[5, b'a', b'b']).is_err());
	}

	#[test]
	fn should_reject_invalid_content_on_decode() {
		assert!(ClarityName::deserialize_from_slice(&[2, b'1', b'a']).is_err());
	}

	#[test]
	fn should_serialize_as_plain_strings() {
		let name = ContractName::new("my-contract").unwrap();
		let json = serde_json::to_string(&name).unwrap();

		assert_eq!(json, "\"my-contract\"");
		assert_eq!(serde_json::from_str::<ContractName>(&json).unwrap(), name);
		assert!(serde_json::from_str::<ContractName>("\"1bad\"").is_err());
	}
}
