/*!
Clarity name type and parsing
*/
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Validate, ValidatedString};

/// Maximum Clarity name length
pub const CLARITY_MAX_NAME_LENGTH: usize = 128;

/// Regex for Clarity names
pub static CLARITY_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
	Regex::new("^[a-zA-Z]([a-zA-Z0-9]|[-_!?+<>=/*])*$|^[-+=/*]$|^[<>]=?$")
		.unwrap()
});

/// Clarity name type, used for functions, assets and tuple keys
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub struct ValidClarityName(String);

impl Validate for ValidClarityName {
	const ERR_MSG: &'static str = "Clarity name not valid";
	const PREFIX_BYTES: usize = 1;
	const MAX_LENGTH: usize = CLARITY_MAX_NAME_LENGTH;

	fn validate(text: &str) -> bool {
		!text.is_empty() && CLARITY_NAME_REGEX.is_match(text)
	}

	fn create(text: &str) -> Self {
		Self(text.to_string())
	}

	fn as_str(&self) -> &str {
		&self.0
	}
}

/// Clarity name
pub type ClarityName = ValidatedString<ValidClarityName>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn should_accept_clarity_names() {
		for name in ["transfer", "get-balance?", "set!", "+", "<=", ">", "a-b_c"]
		{
			assert!(ClarityName::new(name).is_ok(), "{}", name);
		}
	}

	#[test]
	fn should_reject_invalid_clarity_names() {
		for name in ["", "1abc", "has space", "ünicode", "<>"] {
			assert!(ClarityName::new(name).is_err(), "{}", name);
		}

		assert!(ClarityName::new("a".repeat(129)).is_err());
		assert!(ClarityName::new("a".repeat(128)).is_ok());
	}
}
