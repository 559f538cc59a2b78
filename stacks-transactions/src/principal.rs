//! Clarity principals: a standard address, or an address qualified with a
//! contract name.

use std::{
	fmt,
	io::{self, Read, Write},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
	address::StacksAddress,
	codec::{invalid_data, read_u8, Codec},
	validated_strings::ContractName,
	StacksError,
};

/// Clarity type tag of a standard principal
pub(crate) const STANDARD_PRINCIPAL_TAG: u8 = 0x05;
/// Clarity type tag of a contract principal
pub(crate) const CONTRACT_PRINCIPAL_TAG: u8 = 0x06;

/// A principal in its Clarity form
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PrincipalData {
	/// A plain address
	Standard(StacksAddress),
	/// An address qualified with a contract name
	Contract(StacksAddress, ContractName),
}

impl PrincipalData {
	/// Address of the principal
	pub fn address(&self) -> &StacksAddress {
		match self {
			Self::Standard(address) | Self::Contract(address, _) => address,
		}
	}

	/// Contract name of a contract principal
	pub fn contract_name(&self) -> Option<&ContractName> {
		match self {
			Self::Standard(_) => None,
			Self::Contract(_, name) => Some(name),
		}
	}

	pub(crate) fn codec_deserialize_tagged<R: Read>(
		tag: u8,
		data: &mut R,
	) -> io::Result<Self> {
		match tag {
			STANDARD_PRINCIPAL_TAG => {
				Ok(Self::Standard(StacksAddress::codec_deserialize(data)?))
			}
			CONTRACT_PRINCIPAL_TAG => Ok(Self::Contract(
				StacksAddress::codec_deserialize(data)?,
				ContractName::codec_deserialize(data)?,
			)),
			other => Err(invalid_data(format!(
				"expected a principal, got Clarity type {:#04x}",
				other
			))),
		}
	}
}

/// Principals encode with their Clarity type tag
impl Codec for PrincipalData {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		match self {
			Self::Standard(address) => {
				dest.write_all(&[STANDARD_PRINCIPAL_TAG])?;
				address.codec_serialize(dest)
			}
			Self::Contract(address, name) => {
				dest.write_all(&[CONTRACT_PRINCIPAL_TAG])?;
				address.codec_serialize(dest)?;
				name.codec_serialize(dest)
			}
		}
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;

		Self::codec_deserialize_tagged(tag, data)
	}
}

impl From<StacksAddress> for PrincipalData {
	fn from(address: StacksAddress) -> Self {
		Self::Standard(address)
	}
}

impl fmt::Display for PrincipalData {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Standard(address) => write!(f, "{}", address),
			Self::Contract(address, name) => write!(f, "{}.{}", address, name),
		}
	}
}

impl FromStr for PrincipalData {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.split_once('.') {
			Some((address, name)) => {
				Ok(Self::Contract(address.parse()?, name.parse()?))
			}
			None => Ok(Self::Standard(s.parse()?)),
		}
	}
}

impl TryFrom<String> for PrincipalData {
	type Error = StacksError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<PrincipalData> for String {
	fn from(value: PrincipalData) -> Self {
		value.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADDRESS: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";

	#[test]
	fn should_parse_standard_and_contract_principals() {
		let standard: PrincipalData = ADDRESS.parse().unwrap();
		let contract: PrincipalData =
			format!("{}.hello-world", ADDRESS).parse().unwrap();

		assert!(matches!(standard, PrincipalData::Standard(_)));
		assert_eq!(contract.contract_name().unwrap().as_str(), "hello-world");
		assert_eq!(contract.to_string(), format!("{}.hello-world", ADDRESS));
	}

	#[test]
	fn should_encode_with_clarity_tags() {
		let contract: PrincipalData =
			format!("{}.a", ADDRESS).parse().unwrap();
		let bytes = contract.serialize_to_vec().unwrap();

		assert_eq!(bytes[0], CONTRACT_PRINCIPAL_TAG);
		assert_eq!(bytes.len(), 1 + 21 + 1 + 1);
		assert_eq!(
			PrincipalData::deserialize_from_slice(&bytes).unwrap(),
			contract
		);
	}

	#[test]
	fn should_reject_non_principal_tags() {
		let mut bytes = vec![0x01];
		bytes.extend_from_slice(&[0; 16]);

		assert!(PrincipalData::deserialize_from_slice(&bytes).is_err());
	}

	#[test]
	fn should_reject_invalid_contract_name() {
		assert!(format!("{}.9bad", ADDRESS).parse::<PrincipalData>().is_err());
	}
}
