//! Consensus byte codec shared by every wire structure.
//!
//! Implementors write and read themselves through [std::io] buffers.
//! Structural problems are raised as [io::Error]s with
//! [io::ErrorKind::InvalidData] and converted into [StacksError]s at the
//! public boundary.

use std::io::{self, Read, Write};

use crate::{StacksError, StacksResult};

/// A trait for types with an exact consensus byte representation
pub trait Codec {
	/// Writes the value to a buffer.
	///
	/// # ⚠️ Do not use directly
	///
	/// Use [Codec::serialize] instead, which converts errors into
	/// [StacksError]s.
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()>;

	/// Reads a value from a buffer.
	///
	/// # ⚠️ Do not use directly
	///
	/// Use [Codec::deserialize] instead, which converts errors into
	/// [StacksError]s.
	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self>
	where
		Self: Sized;

	/// Serializes the value into the provided writable buffer
	fn serialize<W: Write>(&self, dest: &mut W) -> StacksResult<()> {
		self.codec_serialize(dest).map_err(serialization_error)
	}

	/// Deserializes a value from the provided readable buffer
	fn deserialize<R: Read>(data: &mut R) -> StacksResult<Self>
	where
		Self: Sized,
	{
		Self::codec_deserialize(data).map_err(deserialization_error)
	}

	/// Serializes the value into a new byte vector
	fn serialize_to_vec(&self) -> StacksResult<Vec<u8>> {
		let mut buffer = vec![];
		self.serialize(&mut buffer)?;

		Ok(buffer)
	}

	/// Deserializes a value that must span the whole slice
	fn deserialize_from_slice(bytes: &[u8]) -> StacksResult<Self>
	where
		Self: Sized,
	{
		let mut cursor = io::Cursor::new(bytes);
		let value = Self::deserialize(&mut cursor)?;

		let consumed = cursor.position() as usize;
		if consumed != bytes.len() {
			return Err(StacksError::DeserializationError(format!(
				"{} trailing bytes after value",
				bytes.len() - consumed
			)));
		}

		Ok(value)
	}
}

/// A length prefixed list with a 4 byte big-endian element count
impl<T: Codec> Codec for Vec<T> {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		write_length_prefix(dest, 4, self.len())?;

		for item in self {
			item.codec_serialize(dest)?;
		}

		Ok(())
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self> {
		let count = read_u32(data)?;

		// No preallocation: the count is untrusted until the items are read
		let mut items = vec![];
		for _ in 0..count {
			items.push(T::codec_deserialize(data)?);
		}

		Ok(items)
	}
}

fn serialization_error(err: io::Error) -> StacksError {
	match err.kind() {
		io::ErrorKind::Unsupported => {
			StacksError::UnsupportedOperation(err.to_string())
		}
		_ => StacksError::SerializationError(err.to_string()),
	}
}

fn deserialization_error(err: io::Error) -> StacksError {
	match err.kind() {
		io::ErrorKind::Unsupported => {
			StacksError::UnsupportedOperation(err.to_string())
		}
		_ => StacksError::DeserializationError(err.to_string()),
	}
}

pub(crate) fn invalid_data(message: impl Into<String>) -> io::Error {
	io::Error::new(io::ErrorKind::InvalidData, message.into())
}

pub(crate) fn unsupported(message: impl Into<String>) -> io::Error {
	io::Error::new(io::ErrorKind::Unsupported, message.into())
}

pub(crate) fn read_array<R: Read, const N: usize>(
	data: &mut R,
) -> io::Result<[u8; N]> {
	let mut buffer = [0; N];
	data.read_exact(&mut buffer)?;

	Ok(buffer)
}

pub(crate) fn read_u8<R: Read>(data: &mut R) -> io::Result<u8> {
	Ok(read_array::<_, 1>(data)?[0])
}

pub(crate) fn read_u16<R: Read>(data: &mut R) -> io::Result<u16> {
	Ok(u16::from_be_bytes(read_array(data)?))
}

pub(crate) fn read_u32<R: Read>(data: &mut R) -> io::Result<u32> {
	Ok(u32::from_be_bytes(read_array(data)?))
}

pub(crate) fn read_u64<R: Read>(data: &mut R) -> io::Result<u64> {
	Ok(u64::from_be_bytes(read_array(data)?))
}

pub(crate) fn read_bytes<R: Read>(
	data: &mut R,
	length: usize,
) -> io::Result<Vec<u8>> {
	let mut buffer = vec![];
	let read = data.take(length as u64).read_to_end(&mut buffer)?;

	if read != length {
		return Err(io::Error::new(
			io::ErrorKind::UnexpectedEof,
			format!("expected {} bytes, got {}", length, read),
		));
	}

	Ok(buffer)
}

/// Writes a 1 or 4 byte big-endian length prefix
pub(crate) fn write_length_prefix<W: Write>(
	dest: &mut W,
	prefix_bytes: usize,
	length: usize,
) -> io::Result<()> {
	match prefix_bytes {
		1 => {
			let length = u8::try_from(length).map_err(|_| {
				invalid_data(format!("length {} exceeds 1 byte prefix", length))
			})?;
			dest.write_all(&[length])
		}
		4 => {
			let length = u32::try_from(length).map_err(|_| {
				invalid_data(format!("length {} exceeds 4 byte prefix", length))
			})?;
			dest.write_all(&length.to_be_bytes())
		}
		other => Err(invalid_data(format!(
			"unsupported length prefix width {}",
			other
		))),
	}
}

/// Reads a 1 or 4 byte big-endian length prefix
pub(crate) fn read_length_prefix<R: Read>(
	data: &mut R,
	prefix_bytes: usize,
) -> io::Result<usize> {
	match prefix_bytes {
		1 => Ok(read_u8(data)? as usize),
		4 => Ok(read_u32(data)? as usize),
		other => Err(invalid_data(format!(
			"unsupported length prefix width {}",
			other
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Debug, PartialEq)]
	struct Byte(u8);

	impl Codec for Byte {
		fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
			dest.write_all(&[self.0])
		}

		fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self> {
			Ok(Self(read_u8(data)?))
		}
	}

	#[test]
	fn should_prefix_lists_with_4_byte_count() {
		let list = vec![Byte(7), Byte(8)];

		assert_eq!(list.serialize_to_vec().unwrap(), vec![0, 0, 0, 2, 7, 8]);
	}

	#[test]
	fn should_reject_truncated_list() {
		let result = Vec::<Byte>::deserialize_from_slice(&[0, 0, 0, 3, 7, 8]);

		assert!(matches!(result, Err(StacksError::DeserializationError(_))));
	}

	#[test]
	fn should_reject_trailing_bytes() {
		let result = Vec::<Byte>::deserialize_from_slice(&[0, 0, 0, 1, 7, 8]);

		assert!(matches!(result, Err(StacksError::DeserializationError(_))));
	}

	#[test]
	fn should_reject_oversized_one_byte_prefix() {
		let mut buffer = vec![];

		assert!(write_length_prefix(&mut buffer, 1, 256).is_err());
		assert!(write_length_prefix(&mut buffer, 1, 255).is_ok());
	}

	#[test]
	fn should_fail_reading_short_buffers() {
		let mut data = io::Cursor::new(vec![1, 2, 3]);

		assert!(read_bytes(&mut data, 4).is_err());
	}
}
