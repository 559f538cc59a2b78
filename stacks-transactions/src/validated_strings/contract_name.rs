/*!
Contract name type and parsing
*/
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Validate, ValidatedString};

/// Minimum contract name length
pub const CONTRACT_MIN_NAME_LENGTH: usize = 1;
/// Maximum contract name length
pub const CONTRACT_MAX_NAME_LENGTH: usize = 40;

/// Regex for contract names
pub static CONTRACT_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
	Regex::new(&format!(
		"^[a-zA-Z]([a-zA-Z0-9]|[-_]){{{},{}}}$|^__transient$",
		CONTRACT_MIN_NAME_LENGTH - 1,
		CONTRACT_MAX_NAME_LENGTH - 1
	))
	.unwrap()
});

/// Contract name type
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub struct ValidContractName(String);

impl Validate for ValidContractName {
	const ERR_MSG: &'static str = "Contract name not valid";
	const PREFIX_BYTES: usize = 1;
	const MAX_LENGTH: usize = CONTRACT_MAX_NAME_LENGTH;

	fn validate(text: &str) -> bool {
		(CONTRACT_MIN_NAME_LENGTH..=CONTRACT_MAX_NAME_LENGTH)
			.contains(&text.len())
			&& CONTRACT_NAME_REGEX.is_match(text)
	}

	fn create(text: &str) -> Self {
		Self(text.to_string())
	}

	fn as_str(&self) -> &str {
		&self.0
	}
}

/// Contract name
pub type ContractName = ValidatedString<ValidContractName>;
