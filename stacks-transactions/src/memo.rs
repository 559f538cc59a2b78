//! Token transfer memo, a fixed 34 byte field on the wire.

use std::{
	fmt,
	io::{self, Read, Write},
};

use serde::{Deserialize, Serialize};

use crate::{
	codec::{invalid_data, read_array, Codec},
	StacksError, StacksResult,
};

/// Width of the memo field
pub const MEMO_LENGTH: usize = 34;

/// Free text attached to a token transfer.
///
/// Content is at most 34 bytes and holds no zero byte. Encoding pads it
/// with zeros and decoding keeps the bytes before the first zero.
#[derive(
	Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "Vec<u8>")]
pub struct MemoString(Vec<u8>);

impl MemoString {
	/// Creates a memo from at most 34 non-zero bytes
	pub fn new(content: impl AsRef<[u8]>) -> StacksResult<Self> {
		let content = content.as_ref();

		if content.len() > MEMO_LENGTH {
			return Err(StacksError::InvalidMemoLength(content.len()));
		}

		if content.contains(&0) {
			return Err(StacksError::InvalidArguments(
				"Memo cannot contain zero bytes",
			));
		}

		Ok(Self(content.to_vec()))
	}

	/// Memo content without padding
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}
}

impl fmt::Display for MemoString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", String::from_utf8_lossy(&self.0))
	}
}

impl TryFrom<Vec<u8>> for MemoString {
	type Error = StacksError;

	fn try_from(content: Vec<u8>) -> Result<Self, Self::Error> {
		Self::new(content)
	}
}

impl std::str::FromStr for MemoString {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

impl Codec for MemoString {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		let mut buffer = [0; MEMO_LENGTH];
		buffer
			.get_mut(..self.0.len())
			.ok_or_else(|| {
				invalid_data(format!("memo of {} bytes", self.0.len()))
			})?
			.copy_from_slice(&self.0);

		dest.write_all(&buffer)
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized,
	{
		let buffer: [u8; MEMO_LENGTH] = read_array(data)?;
		let end = buffer
			.iter()
			.position(|byte| *byte == 0)
			.unwrap_or(MEMO_LENGTH);

		Ok(Self(buffer[..end].to_vec()))
	}
}
