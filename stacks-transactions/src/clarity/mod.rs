//! Clarity values and contract interfaces.
//!
//! Values are consumed and produced as typed data only, there is no
//! evaluator.

pub mod abi;
pub mod value;

pub use abi::{
	match_type, parse_to_clarity_value, validate_contract_call,
	ClarityAbiFunction, ClarityAbiType, ContractAbi,
};
pub use value::{ClarityType, ClarityValue};
