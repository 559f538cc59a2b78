/*!
Contract code body type
*/
use super::{Validate, ValidatedString};

/// Maximum code body length
pub const MAX_CODE_BODY_LENGTH: usize = 100_000;

/// Validated contract code body
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub struct ValidStacksString(String);

impl Validate for ValidStacksString {
	const ERR_MSG: &'static str = "Code body must be ASCII";
	const PREFIX_BYTES: usize = 4;
	const MAX_LENGTH: usize = MAX_CODE_BODY_LENGTH;

	fn validate(text: &str) -> bool {
		text.is_ascii()
	}

	fn create(text: &str) -> Self {
		Self(text.to_string())
	}

	fn as_str(&self) -> &str {
		&self.0
	}
}

/// Contract code body
pub type StacksString = ValidatedString<ValidStacksString>;
