/*!
Post-conditions: declared constraints on the assets a transaction moves
*/

use std::{
	fmt,
	io::{self, Read, Write},
	str::FromStr,
};

use serde::{Deserialize, Serialize};
use strum::FromRepr;

use crate::{
	address::StacksAddress,
	clarity::value::ClarityValue,
	codec::{invalid_data, read_u64, read_u8, Codec},
	validated_strings::{ClarityName, ContractName},
	StacksError,
};

/// How strictly post-conditions bind asset movements
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
	Default,
)]
pub enum PostConditionMode {
	/// Movements without a post-condition are allowed
	Allow = 0x01,
	/// Movements without a post-condition abort the transaction
	#[default]
	Deny = 0x02,
}

/// Comparison applied to a fungible amount
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FungibleConditionCode {
	/// Sent exactly the amount
	Equal = 0x01,
	/// Sent more than the amount
	Greater = 0x02,
	/// Sent at least the amount
	GreaterEqual = 0x03,
	/// Sent less than the amount
	Less = 0x04,
	/// Sent at most the amount
	LessEqual = 0x05,
}

/// Ownership outcome of a non-fungible asset
#[repr(u8)]
#[derive(
	FromRepr, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum NonFungibleConditionCode {
	/// The principal no longer owns the asset
	DoesNotOwn = 0x10,
	/// The principal still owns the asset
	Owns = 0x11,
}

#[repr(u8)]
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
	Stx = 0x00,
	Fungible = 0x01,
	NonFungible = 0x02,
}

#[repr(u8)]
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
enum PrincipalTag {
	Origin = 0x01,
	Standard = 0x02,
	Contract = 0x03,
}

/// The principal a post-condition constrains
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostConditionPrincipal {
	/// The transaction origin
	Origin,
	/// A standard address
	Standard(StacksAddress),
	/// A contract
	Contract(StacksAddress, ContractName),
}

impl Codec for PostConditionPrincipal {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		match self {
			Self::Origin => dest.write_all(&[PrincipalTag::Origin as u8]),
			Self::Standard(address) => {
				dest.write_all(&[PrincipalTag::Standard as u8])?;
				address.codec_serialize(dest)
			}
			Self::Contract(address, name) => {
				dest.write_all(&[PrincipalTag::Contract as u8])?;
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

		match PrincipalTag::from_repr(tag) {
			Some(PrincipalTag::Origin) => Ok(Self::Origin),
			Some(PrincipalTag::Standard) => {
				Ok(Self::Standard(StacksAddress::codec_deserialize(data)?))
			}
			Some(PrincipalTag::Contract) => Ok(Self::Contract(
				StacksAddress::codec_deserialize(data)?,
				ContractName::codec_deserialize(data)?,
			)),
			None => Err(invalid_data(format!(
				"unknown post-condition principal {:#04x}",
				tag
			))),
		}
	}
}

/// A fully qualified token identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
	/// Address of the contract defining the asset
	pub contract_address: StacksAddress,
	/// Name of the contract defining the asset
	pub contract_name: ContractName,
	/// Asset name within the contract
	pub asset_name: ClarityName,
}

impl AssetInfo {
	/// Creates an asset descriptor
	pub fn new(
		contract_address: StacksAddress,
		contract_name: ContractName,
		asset_name: ClarityName,
	) -> Self {
		Self {
			contract_address,
			contract_name,
			asset_name,
		}
	}
}

impl Codec for AssetInfo {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		self.contract_address.codec_serialize(dest)?;
		self.contract_name.codec_serialize(dest)?;
		self.asset_name.codec_serialize(dest)
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		Ok(Self {
			contract_address: StacksAddress::codec_deserialize(data)?,
			contract_name: ContractName::codec_deserialize(data)?,
			asset_name: ClarityName::codec_deserialize(data)?,
		})
	}
}

/// Renders as `address.contract::asset`
impl fmt::Display for AssetInfo {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}.{}::{}",
			self.contract_address, self.contract_name, self.asset_name
		)
	}
}

impl FromStr for AssetInfo {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (contract, asset_name) = s.split_once("::").ok_or(
			StacksError::InvalidArguments(
				"Asset identifiers have the form address.contract::asset",
			),
		)?;
		let (address, contract_name) = contract.split_once('.').ok_or(
			StacksError::InvalidArguments(
				"Asset identifiers have the form address.contract::asset",
			),
		)?;

		Ok(Self::new(
			address.parse()?,
			contract_name.parse()?,
			asset_name.parse()?,
		))
	}
}

/// A constraint on the assets a transaction moves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCondition {
	/// Constrains the STX sent by a principal
	Stx {
		/// Sending principal
		principal: PostConditionPrincipal,
		/// Amount comparison
		condition_code: FungibleConditionCode,
		/// Amount in micro-STX
		amount: u64,
	},
	/// Constrains a fungible token amount sent by a principal
	Fungible {
		/// Sending principal
		principal: PostConditionPrincipal,
		/// Token
		asset_info: AssetInfo,
		/// Amount comparison
		condition_code: FungibleConditionCode,
		/// Token amount
		amount: u64,
	},
	/// Constrains the ownership of one non-fungible asset
	NonFungible {
		/// Owning principal
		principal: PostConditionPrincipal,
		/// Token class
		asset_info: AssetInfo,
		/// Asset identifier
		asset_name: ClarityValue,
		/// Ownership outcome
		condition_code: NonFungibleConditionCode,
	},
}

impl PostCondition {
	/// STX condition on a standard address
	pub fn standard_stx(
		address: StacksAddress,
		condition_code: FungibleConditionCode,
		amount: u64,
	) -> Self {
		Self::Stx {
			principal: PostConditionPrincipal::Standard(address),
			condition_code,
			amount,
		}
	}

	/// STX condition on a contract
	pub fn contract_stx(
		address: StacksAddress,
		contract_name: ContractName,
		condition_code: FungibleConditionCode,
		amount: u64,
	) -> Self {
		Self::Stx {
			principal: PostConditionPrincipal::Contract(address, contract_name),
			condition_code,
			amount,
		}
	}

	/// Fungible token condition on a standard address
	pub fn standard_fungible(
		address: StacksAddress,
		condition_code: FungibleConditionCode,
		amount: u64,
		asset_info: AssetInfo,
	) -> Self {
		Self::Fungible {
			principal: PostConditionPrincipal::Standard(address),
			asset_info,
			condition_code,
			amount,
		}
	}

	/// Fungible token condition on a contract
	pub fn contract_fungible(
		address: StacksAddress,
		contract_name: ContractName,
		condition_code: FungibleConditionCode,
		amount: u64,
		asset_info: AssetInfo,
	) -> Self {
		Self::Fungible {
			principal: PostConditionPrincipal::Contract(address, contract_name),
			asset_info,
			condition_code,
			amount,
		}
	}

	/// Non-fungible condition on a standard address
	pub fn standard_non_fungible(
		address: StacksAddress,
		condition_code: NonFungibleConditionCode,
		asset_info: AssetInfo,
		asset_name: ClarityValue,
	) -> Self {
		Self::NonFungible {
			principal: PostConditionPrincipal::Standard(address),
			asset_info,
			asset_name,
			condition_code,
		}
	}

	/// Non-fungible condition on a contract
	pub fn contract_non_fungible(
		address: StacksAddress,
		contract_name: ContractName,
		condition_code: NonFungibleConditionCode,
		asset_info: AssetInfo,
		asset_name: ClarityValue,
	) -> Self {
		Self::NonFungible {
			principal: PostConditionPrincipal::Contract(address, contract_name),
			asset_info,
			asset_name,
			condition_code,
		}
	}

	fn asset_kind(&self) -> AssetKind {
		match self {
			Self::Stx { .. } => AssetKind::Stx,
			Self::Fungible { .. } => AssetKind::Fungible,
			Self::NonFungible { .. } => AssetKind::NonFungible,
		}
	}
}

impl Codec for PostCondition {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		dest.write_all(&[self.asset_kind() as u8])?;

		match self {
			Self::Stx {
				principal,
				condition_code,
				amount,
			} => {
				principal.codec_serialize(dest)?;
				dest.write_all(&[*condition_code as u8])?;
				dest.write_all(&amount.to_be_bytes())
			}
			Self::Fungible {
				principal,
				asset_info,
				condition_code,
				amount,
			} => {
				principal.codec_serialize(dest)?;
				asset_info.codec_serialize(dest)?;
				dest.write_all(&[*condition_code as u8])?;
				dest.write_all(&amount.to_be_bytes())
			}
			Self::NonFungible {
				principal,
				asset_info,
				asset_name,
				condition_code,
			} => {
				principal.codec_serialize(dest)?;
				asset_info.codec_serialize(dest)?;
				asset_name.codec_serialize(dest)?;
				dest.write_all(&[*condition_code as u8])
			}
		}
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let tag = read_u8(data)?;
		let kind = AssetKind::from_repr(tag).ok_or_else(|| {
			invalid_data(format!("unknown post-condition type {:#04x}", tag))
		})?;

		let principal = PostConditionPrincipal::codec_deserialize(data)?;

		match kind {
			AssetKind::Stx => Ok(Self::Stx {
				principal,
				condition_code: read_fungible_code(data)?,
				amount: read_u64(data)?,
			}),
			AssetKind::Fungible => Ok(Self::Fungible {
				principal,
				asset_info: AssetInfo::codec_deserialize(data)?,
				condition_code: read_fungible_code(data)?,
				amount: read_u64(data)?,
			}),
			AssetKind::NonFungible => {
				let asset_info = AssetInfo::codec_deserialize(data)?;
				let asset_name = ClarityValue::codec_deserialize(data)?;
				let code = read_u8(data)?;
				let condition_code = NonFungibleConditionCode::from_repr(code)
					.ok_or_else(|| {
						invalid_data(format!(
							"unknown non-fungible condition code {:#04x}",
							code
						))
					})?;

				Ok(Self::NonFungible {
					principal,
					asset_info,
					asset_name,
					condition_code,
				})
			}
		}
	}
}

fn read_fungible_code<R: Read>(
	data: &mut R,
) -> io::Result<FungibleConditionCode> {
	let code = read_u8(data)?;

	FungibleConditionCode::from_repr(code).ok_or_else(|| {
		invalid_data(format!("unknown fungible condition code {:#04x}", code))
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const ADDRESS: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";

	fn address() -> StacksAddress {
		ADDRESS.parse().unwrap()
	}

	fn asset() -> AssetInfo {
		format!("{}.token::coin", ADDRESS).parse().unwrap()
	}

	fn round_trip(condition: &PostCondition) -> Vec<u8> {
		let bytes = condition.serialize_to_vec().unwrap();
		let decoded = PostCondition::deserialize_from_slice(&bytes).unwrap();

		assert_eq!(&decoded, condition);
		assert_eq!(decoded.serialize_to_vec().unwrap(), bytes);

		bytes
	}

	#[test]
	fn should_round_trip_stx_condition() {
		let bytes = round_trip(&PostCondition::standard_stx(
			address(),
			FungibleConditionCode::LessEqual,
			1_000,
		));

		assert_eq!(bytes[0], 0x00);
		assert_eq!(bytes[1], 0x02);
		assert_eq!(bytes[23], 0x05);
		assert_eq!(bytes.len(), 1 + 1 + 21 + 1 + 8);
	}

	#[test]
	fn should_round_trip_fungible_conditions() {
		round_trip(&PostCondition::standard_fungible(
			address(),
			FungibleConditionCode::Equal,
			10,
			asset(),
		));
		round_trip(&PostCondition::contract_fungible(
			address(),
			"vault".parse().unwrap(),
			FungibleConditionCode::Greater,
			10,
			asset(),
		));
	}

	#[test]
	fn should_put_non_fungible_code_last() {
		let bytes = round_trip(&PostCondition::contract_non_fungible(
			address(),
			"vault".parse().unwrap(),
			NonFungibleConditionCode::DoesNotOwn,
			asset(),
			ClarityValue::UInt(1),
		));

		assert_eq!(bytes[0], 0x02);
		assert_eq!(*bytes.last().unwrap(), 0x10);
	}

	#[test]
	fn should_round_trip_origin_principal() {
		let bytes = round_trip(&PostCondition::Stx {
			principal: PostConditionPrincipal::Origin,
			condition_code: FungibleConditionCode::GreaterEqual,
			amount: 1,
		});

		assert_eq!(&bytes[..3], &[0x00, 0x01, 0x03]);
	}

	#[test]
	fn should_reject_unknown_condition_codes() {
		let mut bytes = PostCondition::standard_stx(
			address(),
			FungibleConditionCode::Equal,
			1,
		)
		.serialize_to_vec()
		.unwrap();
		bytes[23] = 0x06;

		assert!(PostCondition::deserialize_from_slice(&bytes).is_err());

		bytes[23] = 0x01;
		bytes[1] = 0x04;

		assert!(PostCondition::deserialize_from_slice(&bytes).is_err());
	}

	#[test]
	fn should_parse_asset_identifiers() {
		let asset = asset();

		assert_eq!(asset.asset_name.as_str(), "coin");
		assert_eq!(asset.to_string(), format!("{}.token::coin", ADDRESS));
		assert!("no-separator".parse::<AssetInfo>().is_err());
	}
}
