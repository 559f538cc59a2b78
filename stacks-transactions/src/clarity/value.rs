//! The Clarity value model and its consensus encoding.

use std::{
	collections::BTreeMap,
	fmt,
	io::{self, Read, Write},
};

use strum::FromRepr;

use crate::{
	codec::{
		invalid_data, read_array, read_bytes, read_u32, read_u8,
		write_length_prefix, Codec,
	},
	principal::PrincipalData,
	validated_strings::{ClarityName, ContractName},
	StacksError, StacksResult,
};

/// Deepest nesting of optionals, responses, lists and tuples accepted when
/// decoding
pub const MAX_VALUE_DEPTH: usize = 32;

/// Clarity type tags
#[repr(u8)]
#[derive(FromRepr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClarityType {
	/// 128 bit signed integer
	Int = 0x00,
	/// 128 bit unsigned integer
	UInt = 0x01,
	/// Byte buffer
	Buffer = 0x02,
	/// Boolean true
	BoolTrue = 0x03,
	/// Boolean false
	BoolFalse = 0x04,
	/// Standard principal
	PrincipalStandard = 0x05,
	/// Contract principal
	PrincipalContract = 0x06,
	/// Ok response
	ResponseOk = 0x07,
	/// Err response
	ResponseErr = 0x08,
	/// Empty optional
	OptionalNone = 0x09,
	/// Filled optional
	OptionalSome = 0x0a,
	/// List
	List = 0x0b,
	/// Tuple
	Tuple = 0x0c,
	/// ASCII string
	StringAscii = 0x0d,
	/// UTF-8 string
	StringUtf8 = 0x0e,
}

/// A Clarity value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
	/// Signed integer
	Int(i128),
	/// Unsigned integer
	UInt(u128),
	/// Boolean
	Bool(bool),
	/// Byte buffer
	Buffer(Vec<u8>),
	/// ASCII string
	StringAscii(String),
	/// UTF-8 string
	StringUtf8(String),
	/// Standard or contract principal
	Principal(PrincipalData),
	/// `none`
	OptionalNone,
	/// `(some value)`
	OptionalSome(Box<ClarityValue>),
	/// `(ok value)`
	ResponseOk(Box<ClarityValue>),
	/// `(err value)`
	ResponseErr(Box<ClarityValue>),
	/// List of values
	List(Vec<ClarityValue>),
	/// Tuple, keys kept sorted
	Tuple(BTreeMap<ClarityName, ClarityValue>),
}

impl ClarityValue {
	/// `(some value)`
	pub fn some(value: ClarityValue) -> Self {
		Self::OptionalSome(Box::new(value))
	}

	/// `(ok value)`
	pub fn ok(value: ClarityValue) -> Self {
		Self::ResponseOk(Box::new(value))
	}

	/// `(err value)`
	pub fn err(value: ClarityValue) -> Self {
		Self::ResponseErr(Box::new(value))
	}

	/// ASCII string, rejecting non ASCII text
	pub fn string_ascii(text: impl Into<String>) -> StacksResult<Self> {
		let text = text.into();

		if !text.is_ascii() {
			return Err(StacksError::InvalidArguments(
				"string-ascii values must be ASCII",
			));
		}

		Ok(Self::StringAscii(text))
	}

	/// UTF-8 string
	pub fn string_utf8(text: impl Into<String>) -> Self {
		Self::StringUtf8(text.into())
	}

	/// Standard principal from a c32 address
	pub fn standard_principal(address: &str) -> StacksResult<Self> {
		Ok(Self::Principal(PrincipalData::Standard(address.parse()?)))
	}

	/// Contract principal from a c32 address and contract name
	pub fn contract_principal(
		address: &str,
		contract_name: &str,
	) -> StacksResult<Self> {
		Ok(Self::Principal(PrincipalData::Contract(
			address.parse()?,
			ContractName::new(contract_name)?,
		)))
	}

	/// Tuple from name and value pairs with distinct names
	pub fn tuple<N: AsRef<str>>(
		entries: impl IntoIterator<Item = (N, ClarityValue)>,
	) -> StacksResult<Self> {
		let mut tuple = BTreeMap::new();

		for (name, value) in entries {
			if tuple.insert(ClarityName::new(name)?, value).is_some() {
				return Err(StacksError::InvalidArguments(
					"Tuple keys must be unique",
				));
			}
		}

		Ok(Self::Tuple(tuple))
	}

	/// Type tag of the value
	pub fn clarity_type(&self) -> ClarityType {
		match self {
			Self::Int(_) => ClarityType::Int,
			Self::UInt(_) => ClarityType::UInt,
			Self::Bool(true) => ClarityType::BoolTrue,
			Self::Bool(false) => ClarityType::BoolFalse,
			Self::Buffer(_) => ClarityType::Buffer,
			Self::StringAscii(_) => ClarityType::StringAscii,
			Self::StringUtf8(_) => ClarityType::StringUtf8,
			Self::Principal(PrincipalData::Standard(_)) => {
				ClarityType::PrincipalStandard
			}
			Self::Principal(PrincipalData::Contract(_, _)) => {
				ClarityType::PrincipalContract
			}
			Self::OptionalNone => ClarityType::OptionalNone,
			Self::OptionalSome(_) => ClarityType::OptionalSome,
			Self::ResponseOk(_) => ClarityType::ResponseOk,
			Self::ResponseErr(_) => ClarityType::ResponseErr,
			Self::List(_) => ClarityType::List,
			Self::Tuple(_) => ClarityType::Tuple,
		}
	}

	/// Encodes the value as lowercase hex, the form nodes return
	pub fn to_hex(&self) -> StacksResult<String> {
		Ok(format!("0x{}", hex::encode(self.serialize_to_vec()?)))
	}

	/// Decodes a hex encoded value, with or without a `0x` prefix
	pub fn from_hex(data: impl AsRef<str>) -> StacksResult<Self> {
		let data = data.as_ref();
		let bytes = hex::decode(data.strip_prefix("0x").unwrap_or(data))?;

		Self::deserialize_from_slice(&bytes)
	}

	fn deserialize_with_depth<R: Read>(
		data: &mut R,
		depth: usize,
	) -> io::Result<Self> {
		if depth > MAX_VALUE_DEPTH {
			return Err(invalid_data(format!(
				"Clarity value nesting exceeds {}",
				MAX_VALUE_DEPTH
			)));
		}

		let tag = read_u8(data)?;
		let clarity_type = ClarityType::from_repr(tag).ok_or_else(|| {
			invalid_data(format!("unknown Clarity type {:#04x}", tag))
		})?;

		let value = match clarity_type {
			ClarityType::Int => Self::Int(i128::from_be_bytes(read_array(data)?)),
			ClarityType::UInt => {
				Self::UInt(u128::from_be_bytes(read_array(data)?))
			}
			ClarityType::BoolTrue => Self::Bool(true),
			ClarityType::BoolFalse => Self::Bool(false),
			ClarityType::Buffer => {
				let length = read_u32(data)? as usize;
				Self::Buffer(read_bytes(data, length)?)
			}
			ClarityType::StringAscii => {
				let length = read_u32(data)? as usize;
				let bytes = read_bytes(data, length)?;

				if !bytes.is_ascii() {
					return Err(invalid_data("string-ascii contains non ASCII"));
				}

				Self::StringAscii(
					String::from_utf8(bytes)
						.map_err(|err| invalid_data(err.to_string()))?,
				)
			}
			ClarityType::StringUtf8 => {
				let length = read_u32(data)? as usize;

				Self::StringUtf8(
					String::from_utf8(read_bytes(data, length)?)
						.map_err(|err| invalid_data(err.to_string()))?,
				)
			}
			ClarityType::PrincipalStandard | ClarityType::PrincipalContract => {
				Self::Principal(PrincipalData::codec_deserialize_tagged(
					tag, data,
				)?)
			}
			ClarityType::OptionalNone => Self::OptionalNone,
			ClarityType::OptionalSome => {
				Self::some(Self::deserialize_with_depth(data, depth + 1)?)
			}
			ClarityType::ResponseOk => {
				Self::ok(Self::deserialize_with_depth(data, depth + 1)?)
			}
			ClarityType::ResponseErr => {
				Self::err(Self::deserialize_with_depth(data, depth + 1)?)
			}
			ClarityType::List => {
				let count = read_u32(data)?;

				let mut items = vec![];
				for _ in 0..count {
					items.push(Self::deserialize_with_depth(data, depth + 1)?);
				}

				Self::List(items)
			}
			ClarityType::Tuple => {
				let count = read_u32(data)?;

				let mut tuple = BTreeMap::new();
				for _ in 0..count {
					let name = ClarityName::codec_deserialize(data)?;
					let value = Self::deserialize_with_depth(data, depth + 1)?;

					if tuple.insert(name.clone(), value).is_some() {
						return Err(invalid_data(format!(
							"duplicate tuple key {}",
							name
						)));
					}
				}

				Self::Tuple(tuple)
			}
		};

		Ok(value)
	}

	fn serialize_with_depth<W: Write>(
		&self,
		dest: &mut W,
		depth: usize,
	) -> io::Result<()> {
		if depth > MAX_VALUE_DEPTH {
			return Err(invalid_data(format!(
				"Clarity value nesting exceeds {}",
				MAX_VALUE_DEPTH
			)));
		}

		match self {
			Self::Principal(principal) => return principal.codec_serialize(dest),
			_ => dest.write_all(&[self.clarity_type() as u8])?,
		}

		match self {
			Self::Int(value) => dest.write_all(&value.to_be_bytes()),
			Self::UInt(value) => dest.write_all(&value.to_be_bytes()),
			Self::Bool(_) | Self::OptionalNone | Self::Principal(_) => Ok(()),
			Self::Buffer(bytes) => {
				write_length_prefix(dest, 4, bytes.len())?;
				dest.write_all(bytes)
			}
			Self::StringAscii(text) => {
				if !text.is_ascii() {
					return Err(invalid_data("string-ascii contains non ASCII"));
				}

				write_length_prefix(dest, 4, text.len())?;
				dest.write_all(text.as_bytes())
			}
			Self::StringUtf8(text) => {
				write_length_prefix(dest, 4, text.len())?;
				dest.write_all(text.as_bytes())
			}
			Self::OptionalSome(value)
			| Self::ResponseOk(value)
			| Self::ResponseErr(value) => {
				value.serialize_with_depth(dest, depth + 1)
			}
			Self::List(items) => {
				write_length_prefix(dest, 4, items.len())?;

				for item in items {
					item.serialize_with_depth(dest, depth + 1)?;
				}

				Ok(())
			}
			Self::Tuple(tuple) => {
				write_length_prefix(dest, 4, tuple.len())?;

				for (name, value) in tuple {
					name.codec_serialize(dest)?;
					value.serialize_with_depth(dest, depth + 1)?;
				}

				Ok(())
			}
		}
	}
}

impl Codec for ClarityValue {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		self.serialize_with_depth(dest, 0)
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		Self::deserialize_with_depth(data, 0)
	}
}

/// Clarity source representation
impl fmt::Display for ClarityValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(value) => write!(f, "{}", value),
			Self::UInt(value) => write!(f, "u{}", value),
			Self::Bool(value) => write!(f, "{}", value),
			Self::Buffer(bytes) => write!(f, "0x{}", hex::encode(bytes)),
			Self::StringAscii(text) => write!(f, "{}", quoted(text)),
			Self::StringUtf8(text) => write!(f, "u{}", quoted(text)),
			Self::Principal(principal) => write!(f, "{}", principal),
			Self::OptionalNone => write!(f, "none"),
			Self::OptionalSome(value) => write!(f, "(some {})", value),
			Self::ResponseOk(value) => write!(f, "(ok {})", value),
			Self::ResponseErr(value) => write!(f, "(err {})", value),
			Self::List(items) => {
				write!(f, "(list")?;
				for item in items {
					write!(f, " {}", item)?;
				}
				write!(f, ")")
			}
			Self::Tuple(tuple) => {
				write!(f, "(tuple")?;
				for (name, value) in tuple {
					write!(f, " ({} {})", name, value)?;
				}
				write!(f, ")")
			}
		}
	}
}

fn quoted(text: &str) -> String {
	serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

impl From<i128> for ClarityValue {
	fn from(value: i128) -> Self {
		Self::Int(value)
	}
}

impl From<u128> for ClarityValue {
	fn from(value: u128) -> Self {
		Self::UInt(value)
	}
}

impl From<bool> for ClarityValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<PrincipalData> for ClarityValue {
	fn from(value: PrincipalData) -> Self {
		Self::Principal(value)
	}
}

impl From<Option<ClarityValue>> for ClarityValue {
	fn from(value: Option<ClarityValue>) -> Self {
		match value {
			Some(value) => Self::some(value),
			None => Self::OptionalNone,
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::{thread_rng, Rng};

	use super::*;

	const ADDRESS: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";

	#[test]
	fn should_encode_integers_as_16_bytes() {
		assert_eq!(
			ClarityValue::UInt(1).to_hex().unwrap(),
			"0x0100000000000000000000000000000001"
		);
		assert_eq!(
			ClarityValue::Int(-1).to_hex().unwrap(),
			"0x00ffffffffffffffffffffffffffffffff"
		);
	}

	#[test]
	fn should_encode_booleans_and_none_as_tags() {
		assert_eq!(ClarityValue::Bool(true).serialize_to_vec().unwrap(), [3]);
		assert_eq!(ClarityValue::Bool(false).serialize_to_vec().unwrap(), [4]);
		assert_eq!(ClarityValue::OptionalNone.serialize_to_vec().unwrap(), [9]);
	}

	#[test]
	fn should_sort_tuple_keys() {
		let tuple = ClarityValue::tuple([
			("b", ClarityValue::UInt(2)),
			("a", ClarityValue::UInt(1)),
		])
		.unwrap();
		let bytes = tuple.serialize_to_vec().unwrap();

		assert_eq!(&bytes[..5], &[0x0c, 0, 0, 0, 2]);
		assert_eq!(&bytes[5..7], &[1, b'a']);
		assert_eq!(tuple.to_string(), "(tuple (a u1) (b u2))");
	}

	#[test]
	fn should_round_trip_nested_values() {
		let value = ClarityValue::ok(ClarityValue::List(vec![
			ClarityValue::some(ClarityValue::Buffer(vec![1, 2, 3])),
			ClarityValue::OptionalNone,
			ClarityValue::tuple([
				("owner", ClarityValue::standard_principal(ADDRESS).unwrap()),
				(
					"token",
					ClarityValue::contract_principal(ADDRESS, "token").unwrap(),
				),
				("memo", ClarityValue::string_ascii("hi").unwrap()),
				("name", ClarityValue::string_utf8("café")),
			])
			.unwrap(),
			ClarityValue::err(ClarityValue::Int(-42)),
		]));

		let bytes = value.serialize_to_vec().unwrap();

		assert_eq!(ClarityValue::deserialize_from_slice(&bytes).unwrap(), value);
	}

	#[test]
	fn should_round_trip_random_integers() {
		let mut rng = thread_rng();

		for _ in 0..100 {
			let int = ClarityValue::Int(rng.gen());
			let uint = ClarityValue::UInt(rng.gen());

			for value in [int, uint] {
				let hex = value.to_hex().unwrap();
				assert_eq!(ClarityValue::from_hex(hex).unwrap(), value);
			}
		}
	}

	#[test]
	fn should_display_clarity_repr() {
		assert_eq!(ClarityValue::UInt(10).to_string(), "u10");
		assert_eq!(ClarityValue::Int(-10).to_string(), "-10");
		assert_eq!(ClarityValue::Buffer(vec![0xab]).to_string(), "0xab");
		assert_eq!(
			ClarityValue::string_ascii("say \"hi\"").unwrap().to_string(),
			"\"say \\\"hi\\\"\""
		);
		assert_eq!(ClarityValue::string_utf8("hé").to_string(), "u\"hé\"");
		assert_eq!(
			ClarityValue::some(ClarityValue::Bool(true)).to_string(),
			"(some true)"
		);
		assert_eq!(
			ClarityValue::List(vec![ClarityValue::UInt(1), ClarityValue::UInt(2)])
				.to_string(),
			"(list u1 u2)"
		);
		assert_eq!(
			ClarityValue::contract_principal(ADDRESS, "pox")
				.unwrap()
				.to_string(),
			format!("{}.pox", ADDRESS)
		);
	}

	#[test]
	fn should_reject_unknown_tag() {
		assert!(ClarityValue::deserialize_from_slice(&[0x0f]).is_err());
	}

	#[test]
	fn should_reject_non_ascii_string_ascii() {
		assert!(ClarityValue::string_ascii("é").is_err());
		assert!(ClarityValue::deserialize_from_slice(&[
			0x0d, 0, 0, 0, 2, 0xc3, 0xa9
		])
		.is_err());
	}

	#[test]
	fn should_reject_invalid_utf8() {
		assert!(ClarityValue::deserialize_from_slice(&[0x0e, 0, 0, 0, 1, 0xff])
			.is_err());
	}

	#[test]
	fn should_reject_duplicate_tuple_keys() {
		let bytes = [
			0x0c, 0, 0, 0, 2, 1, b'a', 0x03, 1, b'a', 0x04,
		];

		assert!(ClarityValue::deserialize_from_slice(&bytes).is_err());
	}

	#[test]
	fn should_refuse_duplicate_tuple_names() {
		let result = ClarityValue::tuple([
			("a", ClarityValue::UInt(1)),
			("a", ClarityValue::UInt(2)),
		]);

		assert!(matches!(result, Err(StacksError::InvalidArguments(_))));
	}

	#[test]
	fn should_refuse_encoding_non_ascii_string_ascii() {
		let value = ClarityValue::StringAscii("é".to_string());

		assert!(matches!(
			value.serialize_to_vec(),
			Err(StacksError::SerializationError(_))
		));
	}

	#[test]
	fn should_refuse_encoding_excessive_nesting() {
		let nest = |depth: usize| {
			(0..depth).fold(ClarityValue::OptionalNone, |value, _| {
				ClarityValue::some(value)
			})
		};

		assert!(nest(MAX_VALUE_DEPTH + 1).serialize_to_vec().is_err());

		let bytes = nest(MAX_VALUE_DEPTH).serialize_to_vec().unwrap();
		assert!(ClarityValue::deserialize_from_slice(&bytes).is_ok());
	}

	#[test]
	fn should_reject_excessive_nesting() {
		let mut bytes = vec![0x0a; MAX_VALUE_DEPTH + 1];
		bytes.push(0x09);

		assert!(ClarityValue::deserialize_from_slice(&bytes).is_err());

		let mut bytes = vec![0x0a; MAX_VALUE_DEPTH];
		bytes.push(0x09);

		assert!(ClarityValue::deserialize_from_slice(&bytes).is_ok());
	}

	#[test]
	fn should_reject_truncated_buffer() {
		assert!(ClarityValue::deserialize_from_slice(&[0x02, 0, 0, 0, 4, 1])
			.is_err());
	}
}
