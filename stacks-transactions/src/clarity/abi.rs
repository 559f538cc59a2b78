//! Contract interfaces and structural matching of values against them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
	clarity::value::ClarityValue, principal::PrincipalData,
	transaction::payload::ContractCallPayload, StacksError, StacksResult,
};

/// A type in a contract interface
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ClarityAbiType {
	/// `int`
	#[serde(rename = "int128")]
	Int128,
	/// `uint`
	#[serde(rename = "uint128")]
	UInt128,
	/// `bool`
	#[serde(rename = "bool")]
	Bool,
	/// `principal`
	#[serde(rename = "principal")]
	Principal,
	/// A trait reference, satisfied by contract principals
	#[serde(rename = "trait_reference")]
	TraitReference,
	/// The type of `none`
	#[serde(rename = "none")]
	None,
	/// `(buff length)`
	#[serde(rename = "buffer")]
	Buffer {
		/// Maximum length in bytes
		length: u32,
	},
	/// `(string-ascii length)`
	#[serde(rename = "string-ascii")]
	StringAscii {
		/// Maximum length in characters
		length: u32,
	},
	/// `(string-utf8 length)`
	#[serde(rename = "string-utf8")]
	StringUtf8 {
		/// Maximum length in characters
		length: u32,
	},
	/// `(response ok error)`
	#[serde(rename = "response")]
	Response {
		/// Ok arm
		ok: Box<ClarityAbiType>,
		/// Err arm
		error: Box<ClarityAbiType>,
	},
	/// `(optional type)`
	#[serde(rename = "optional")]
	Optional(Box<ClarityAbiType>),
	/// `(tuple (name type) ...)`
	#[serde(rename = "tuple")]
	Tuple(Vec<ClarityAbiTupleEntry>),
	/// `(list length type)`
	#[serde(rename = "list")]
	List {
		/// Element type
		#[serde(rename = "type")]
		item_type: Box<ClarityAbiType>,
		/// Maximum element count
		length: u32,
	},
}

/// A named tuple member type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiTupleEntry {
	/// Member name
	pub name: String,
	/// Member type
	#[serde(rename = "type")]
	pub entry_type: ClarityAbiType,
}

/// Clarity source type notation
impl fmt::Display for ClarityAbiType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int128 => write!(f, "int"),
			Self::UInt128 => write!(f, "uint"),
			Self::Bool => write!(f, "bool"),
			Self::Principal => write!(f, "principal"),
			Self::TraitReference => write!(f, "trait_reference"),
			Self::None => write!(f, "none"),
			Self::Buffer { length } => write!(f, "(buff {})", length),
			Self::StringAscii { length } => {
				write!(f, "(string-ascii {})", length)
			}
			Self::StringUtf8 { length } => write!(f, "(string-utf8 {})", length),
			Self::Response { ok, error } => {
				write!(f, "(response {} {})", ok, error)
			}
			Self::Optional(inner) => write!(f, "(optional {})", inner),
			Self::Tuple(entries) => {
				write!(f, "(tuple")?;
				for entry in entries {
					write!(f, " ({} {})", entry.name, entry.entry_type)?;
				}
				write!(f, ")")
			}
			Self::List { item_type, length } => {
				write!(f, "(list {} {})", length, item_type)
			}
		}
	}
}

/// Function visibility
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FunctionAccess {
	/// Callable in transactions
	Public,
	/// Callable without a transaction
	ReadOnly,
	/// Internal to the contract
	Private,
}

/// A function argument
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiFunctionArg {
	/// Argument name
	pub name: String,
	/// Argument type
	#[serde(rename = "type")]
	pub arg_type: ClarityAbiType,
}

/// Return type wrapper
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiFunctionOutputs {
	/// Return type
	#[serde(rename = "type")]
	pub output_type: ClarityAbiType,
}

/// A contract function
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiFunction {
	/// Function name
	pub name: String,
	/// Function visibility
	pub access: FunctionAccess,
	/// Ordered arguments
	pub args: Vec<ClarityAbiFunctionArg>,
	/// Return type
	pub outputs: ClarityAbiFunctionOutputs,
}

/// A data variable or constant
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiVariable {
	/// Variable name
	pub name: String,
	/// `variable` or `constant`
	pub access: String,
	/// Variable type
	#[serde(rename = "type")]
	pub variable_type: ClarityAbiType,
}

/// A data map
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiMap {
	/// Map name
	pub name: String,
	/// Key type
	pub key: ClarityAbiType,
	/// Value type
	pub value: ClarityAbiType,
}

/// A fungible token definition
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiFungibleToken {
	/// Token name
	pub name: String,
}

/// A non-fungible token definition
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClarityAbiNonFungibleToken {
	/// Token name
	pub name: String,
	/// Asset identifier type
	#[serde(rename = "type")]
	pub token_type: ClarityAbiType,
}

/// The published interface of a contract
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractAbi {
	/// Functions
	pub functions: Vec<ClarityAbiFunction>,
	/// Data variables and constants
	#[serde(default)]
	pub variables: Vec<ClarityAbiVariable>,
	/// Data maps
	#[serde(default)]
	pub maps: Vec<ClarityAbiMap>,
	/// Fungible tokens
	#[serde(default)]
	pub fungible_tokens: Vec<ClarityAbiFungibleToken>,
	/// Non-fungible tokens
	#[serde(default)]
	pub non_fungible_tokens: Vec<ClarityAbiNonFungibleToken>,
}

impl ContractAbi {
	/// Finds the single function with the given name
	pub fn function(&self, name: &str) -> StacksResult<&ClarityAbiFunction> {
		let mut matches = self.functions.iter().filter(|f| f.name == name);

		match (matches.next(), matches.next()) {
			(Some(function), None) => Ok(function),
			(None, _) => Err(StacksError::AbiError(format!(
				"ABI doesn't contain a function with the name {}",
				name
			))),
			(Some(_), Some(_)) => Err(StacksError::AbiError(format!(
				"Malformed ABI. Contains multiple functions with the name {}",
				name
			))),
		}
	}
}

/// Returns true when the value inhabits the interface type.
///
/// Tuples may carry keys the type does not declare.
pub fn match_type(value: &ClarityValue, abi_type: &ClarityAbiType) -> bool {
	use ClarityAbiType as T;

	match (value, abi_type) {
		(ClarityValue::Bool(_), T::Bool)
		| (ClarityValue::Int(_), T::Int128)
		| (ClarityValue::UInt(_), T::UInt128)
		| (ClarityValue::OptionalNone, T::None | T::Optional(_))
		| (
			ClarityValue::Principal(PrincipalData::Standard(_)),
			T::Principal,
		)
		| (
			ClarityValue::Principal(PrincipalData::Contract(_, _)),
			T::Principal | T::TraitReference,
		) => true,
		(ClarityValue::Buffer(bytes), T::Buffer { length }) => {
			bytes.len() <= *length as usize
		}
		(ClarityValue::StringAscii(text), T::StringAscii { length }) => {
			text.len() <= *length as usize
		}
		(ClarityValue::StringUtf8(text), T::StringUtf8 { length }) => {
			text.chars().count() <= *length as usize
		}
		(ClarityValue::OptionalSome(inner), T::Optional(inner_type)) => {
			match_type(inner, inner_type)
		}
		(ClarityValue::ResponseOk(inner), T::Response { ok, .. }) => {
			match_type(inner, ok)
		}
		(ClarityValue::ResponseErr(inner), T::Response { error, .. }) => {
			match_type(inner, error)
		}
		(ClarityValue::List(items), T::List { item_type, length }) => {
			items.len() <= *length as usize
				&& items.iter().all(|item| match_type(item, item_type))
		}
		(ClarityValue::Tuple(tuple), T::Tuple(entries)) => {
			entries.iter().all(|entry| {
				tuple
					.get(entry.name.as_str())
					.map(|member| match_type(member, &entry.entry_type))
					.unwrap_or(false)
			})
		}
		_ => false,
	}
}

/// Type notation of a value, as reported in validation errors
pub fn value_type_string(value: &ClarityValue) -> String {
	match value {
		ClarityValue::Bool(_) => "bool".to_string(),
		ClarityValue::Int(_) => "int".to_string(),
		ClarityValue::UInt(_) => "uint".to_string(),
		ClarityValue::Buffer(bytes) => format!("(buff {})", bytes.len()),
		ClarityValue::StringAscii(text) => {
			format!("(string-ascii {})", text.len())
		}
		ClarityValue::StringUtf8(text) => {
			format!("(string-utf8 {})", text.len())
		}
		ClarityValue::Principal(_) => "principal".to_string(),
		ClarityValue::OptionalNone => "(optional none)".to_string(),
		ClarityValue::OptionalSome(inner) => {
			format!("(optional {})", value_type_string(inner))
		}
		ClarityValue::ResponseOk(inner) => {
			format!("(response {} UnknownType)", value_type_string(inner))
		}
		ClarityValue::ResponseErr(inner) => {
			format!("(response UnknownType {})", value_type_string(inner))
		}
		ClarityValue::List(items) => format!(
			"(list {} {})",
			items.len(),
			items
				.first()
				.map(value_type_string)
				.unwrap_or_else(|| "UnknownType".to_string())
		),
		ClarityValue::Tuple(tuple) => format!(
			"(tuple {})",
			tuple
				.iter()
				.map(|(name, member)| {
					format!("({} {})", name, value_type_string(member))
				})
				.collect::<Vec<_>>()
				.join(" ")
		),
	}
}

/// Checks a contract call against the interface of the called contract
pub fn validate_contract_call(
	payload: &ContractCallPayload,
	abi: &ContractAbi,
) -> StacksResult<()> {
	let function_name = payload.function_name.as_str();
	let function = abi.function(function_name)?;

	if payload.function_args.len() != function.args.len() {
		return Err(StacksError::ArgumentCountMismatch {
			function: function_name.to_string(),
			expected: function.args.len(),
			actual: payload.function_args.len(),
		});
	}

	for (index, (value, arg)) in payload
		.function_args
		.iter()
		.zip(function.args.iter())
		.enumerate()
	{
		if !match_type(value, &arg.arg_type) {
			return Err(StacksError::ValidationError {
				function: function_name.to_string(),
				index: index + 1,
				expected: arg.arg_type.to_string(),
				actual: value_type_string(value),
			});
		}
	}

	Ok(())
}

/// Parses command line input into a value of a primitive interface type
pub fn parse_to_clarity_value(
	input: &str,
	abi_type: &ClarityAbiType,
) -> StacksResult<ClarityValue> {
	match abi_type {
		ClarityAbiType::UInt128 => {
			Ok(ClarityValue::UInt(input.parse().map_err(|_| {
				StacksError::InvalidData(format!("Invalid uint value: {}", input))
			})?))
		}
		ClarityAbiType::Int128 => {
			Ok(ClarityValue::Int(input.parse().map_err(|_| {
				StacksError::InvalidData(format!("Invalid int value: {}", input))
			})?))
		}
		ClarityAbiType::Bool => match input.to_lowercase().as_str() {
			"true" => Ok(ClarityValue::Bool(true)),
			"false" => Ok(ClarityValue::Bool(false)),
			_ => Err(StacksError::InvalidData(format!(
				"Invalid bool value: {}",
				input
			))),
		},
		ClarityAbiType::Principal => {
			Ok(ClarityValue::Principal(input.parse()?))
		}
		ClarityAbiType::Buffer { length } => {
			if input.len() > *length as usize {
				return Err(StacksError::InvalidData(format!(
					"Input exceeds specified buffer length limit of {}",
					length
				)));
			}

			Ok(ClarityValue::Buffer(input.as_bytes().to_vec()))
		}
		ClarityAbiType::StringAscii { length } => {
			if input.len() > *length as usize {
				return Err(StacksError::InvalidData(format!(
					"Input exceeds specified length limit of {}",
					length
				)));
			}

			ClarityValue::string_ascii(input)
		}
		ClarityAbiType::StringUtf8 { length } => {
			if input.chars().count() > *length as usize {
				return Err(StacksError::InvalidData(format!(
					"Input exceeds specified length limit of {}",
					length
				)));
			}

			Ok(ClarityValue::string_utf8(input))
		}
		other => Err(StacksError::InvalidData(format!(
			"Contract function contains unsupported Clarity ABI type: {}",
			other
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use crate::validated_strings::{ClarityName, ContractName};

	const ADDRESS: &str = "SP3FGQ8Z7JY9BWYZ5WM53E0M9NK7WHJF0691NZ159";

	const ABI_JSON: &str = r#"{
		"functions": [
			{
				"name": "transfer",
				"access": "public",
				"args": [
					{ "name": "amount", "type": "uint128" },
					{ "name": "flag", "type": "bool" }
				],
				"outputs": {
					"type": { "response": { "ok": "bool", "error": "uint128" } }
				}
			},
			{
				"name": "register",
				"access": "public",
				"args": [
					{ "name": "name", "type": { "buffer": { "length": 4 } } },
					{
						"name": "details",
						"type": {
							"tuple": [
								{ "name": "owner", "type": "principal" },
								{ "name": "tags", "type": { "list": { "type": { "string-ascii": { "length": 8 } }, "length": 2 } } }
							]
						}
					},
					{ "name": "referrer", "type": { "optional": "trait_reference" } }
				],
				"outputs": { "type": "bool" }
			},
			{
				"name": "duplicate",
				"access": "read_only",
				"args": [],
				"outputs": { "type": "bool" }
			},
			{
				"name": "duplicate",
				"access": "private",
				"args": [],
				"outputs": { "type": "bool" }
			}
		],
		"variables": [],
		"maps": [],
		"fungible_tokens": [],
		"non_fungible_tokens": [],
		"epoch": "Epoch24",
		"clarity_version": "Clarity2"
	}"#;

	fn abi() -> ContractAbi {
		serde_json::from_str(ABI_JSON).unwrap()
	}

	fn call(function: &str, args: Vec<ClarityValue>) -> ContractCallPayload {
		ContractCallPayload {
			contract_address: ADDRESS.parse().unwrap(),
			contract_name: ContractName::new("test").unwrap(),
			function_name: ClarityName::new(function).unwrap(),
			function_args: args,
		}
	}

	fn details(tags: Vec<&str>) -> ClarityValue {
		ClarityValue::tuple([
			("owner", ClarityValue::standard_principal(ADDRESS).unwrap()),
			(
				"tags",
				ClarityValue::List(
					tags.into_iter()
						.map(|tag| ClarityValue::string_ascii(tag).unwrap())
						.collect(),
				),
			),
			("extra", ClarityValue::UInt(0)),
		])
		.unwrap()
	}

	#[test]
	fn should_parse_node_abi_json() {
		let abi = abi();
		let function = abi.function("transfer").unwrap();

		assert_eq!(function.access, FunctionAccess::Public);
		assert_eq!(
			function.outputs.output_type.to_string(),
			"(response bool uint)"
		);
		assert_eq!(
			abi.function("register").unwrap().args[1].arg_type.to_string(),
			"(tuple (owner principal) (tags (list 2 (string-ascii 8))))"
		);
	}

	#[test]
	fn should_accept_matching_call() {
		let payload =
			call("transfer", vec![ClarityValue::UInt(1), ClarityValue::Bool(true)]);

		assert!(validate_contract_call(&payload, &abi()).is_ok());
	}

	#[test]
	fn should_name_both_types_on_mismatch() {
		let payload =
			call("transfer", vec![ClarityValue::Int(1), ClarityValue::Bool(true)]);

		let err = validate_contract_call(&payload, &abi()).unwrap_err();

		assert_eq!(
			err.to_string(),
			"Clarity function `transfer` expects argument 1 to be of type uint, not int"
		);
	}

	#[test]
	fn should_reject_wrong_argument_count() {
		let payload = call("transfer", vec![ClarityValue::UInt(1)]);

		assert_eq!(
			validate_contract_call(&payload, &abi()).unwrap_err().to_string(),
			"Clarity function `transfer` expects 2 argument(s) but received 1"
		);
	}

	#[test]
	fn should_reject_missing_and_duplicate_functions() {
		let missing = validate_contract_call(&call("nope", vec![]), &abi());
		let duplicate = validate_contract_call(&call("duplicate", vec![]), &abi());

		assert!(matches!(missing, Err(StacksError::AbiError(_))));
		assert!(
			matches!(duplicate, Err(StacksError::AbiError(message)) if message.starts_with("Malformed ABI"))
		);
	}

	#[test]
	fn should_match_nested_types_with_extra_tuple_keys() {
		let payload = call(
			"register",
			vec![
				ClarityValue::Buffer(vec![1, 2, 3, 4]),
				details(vec!["a", "b"]),
				ClarityValue::some(
					ClarityValue::contract_principal(ADDRESS, "trait-impl")
						.unwrap(),
				),
			],
		);

		assert!(validate_contract_call(&payload, &abi()).is_ok());
	}

	#[test]
	fn should_enforce_length_bounds() {
		let payload = call(
			"register",
			vec![
				ClarityValue::Buffer(vec![1, 2, 3, 4]),
				details(vec!["a", "b", "c"]),
				ClarityValue::OptionalNone,
			],
		);

		match validate_contract_call(&payload, &abi()) {
			Err(StacksError::ValidationError { index, actual, .. }) => {
				assert_eq!(index, 2);
				assert_eq!(
					actual,
					"(tuple (extra uint) (owner principal) (tags (list 3 (string-ascii 1))))"
				);
			}
			other => panic!("Expected validation error, got {:?}", other),
		}

		assert!(!match_type(
			&ClarityValue::Buffer(vec![0; 5]),
			&ClarityAbiType::Buffer { length: 4 }
		));
	}

	#[test]
	fn should_match_principals_and_optionals() {
		let standard = ClarityValue::standard_principal(ADDRESS).unwrap();
		let contract = ClarityValue::contract_principal(ADDRESS, "c").unwrap();

		assert!(match_type(&standard, &ClarityAbiType::Principal));
		assert!(!match_type(&standard, &ClarityAbiType::TraitReference));
		assert!(match_type(&contract, &ClarityAbiType::TraitReference));
		assert!(match_type(&ClarityValue::OptionalNone, &ClarityAbiType::None));
		assert!(!match_type(
			&ClarityValue::some(ClarityValue::UInt(1)),
			&ClarityAbiType::Optional(Box::new(ClarityAbiType::Int128))
		));
	}

	#[test]
	fn should_describe_value_types() {
		assert_eq!(
			value_type_string(&ClarityValue::err(ClarityValue::UInt(1))),
			"(response UnknownType uint)"
		);
		assert_eq!(
			value_type_string(&ClarityValue::List(vec![])),
			"(list 0 UnknownType)"
		);
		assert_eq!(
			value_type_string(&ClarityValue::OptionalNone),
			"(optional none)"
		);
	}

	#[test]
	fn should_parse_cli_input() {
		assert_eq!(
			parse_to_clarity_value("42", &ClarityAbiType::UInt128).unwrap(),
			ClarityValue::UInt(42)
		);
		assert_eq!(
			parse_to_clarity_value("TRUE", &ClarityAbiType::Bool).unwrap(),
			ClarityValue::Bool(true)
		);
		assert_eq!(
			parse_to_clarity_value(
				&format!("{}.pox", ADDRESS),
				&ClarityAbiType::Principal
			)
			.unwrap(),
			ClarityValue::contract_principal(ADDRESS, "pox").unwrap()
		);
		assert!(parse_to_clarity_value(
			"hello",
			&ClarityAbiType::Buffer { length: 4 }
		)
		.is_err());
		assert!(parse_to_clarity_value(
			"1",
			&ClarityAbiType::Optional(Box::new(ClarityAbiType::UInt128))
		)
		.is_err());
		assert!(parse_to_clarity_value("-1", &ClarityAbiType::UInt128).is_err());
	}
}
