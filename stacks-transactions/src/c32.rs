//! Crockford base32 encoding with the Stacks c32check extension.
//!
//! Decoding is case insensitive and maps the visually ambiguous
//! characters `O`, `I` and `L` onto `0`, `1` and `1`.

use crate::crypto::{DoubleSha256Hasher, Hashing};

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const CHECKSUM_LENGTH: usize = 4;
const MAX_ADDRESS_LENGTH: usize = 128;

/// C32 encoding and decoding errors
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
pub enum C32Error {
	/// Invalid C32 string.
	#[error("Invalid C32 string")]
	InvalidC32,
	/// Invalid character.
	#[error("Invalid C32 character: {0}")]
	InvalidChar(char),
	/// Invalid checksum.
	#[error("Invalid C32 checksum - expected {0:?}, got {1:?}")]
	InvalidChecksum([u8; CHECKSUM_LENGTH], Vec<u8>),
	/// Invalid C32 address.
	#[error("Invalid C32 address: {0}")]
	InvalidAddress(String),
	/// Invalid C32 address version.
	#[error("Invalid C32 address version: {0}")]
	InvalidAddressVersion(u8),
}

fn c32_digit(byte: u8) -> Option<u8> {
	let normalized = match byte.to_ascii_uppercase() {
		b'O' => b'0',
		b'I' | b'L' => b'1',
		other => other,
	};

	C32_ALPHABET
		.iter()
		.position(|symbol| *symbol == normalized)
		.map(|position| position as u8)
}

/// Encodes bytes as c32, one `0` per leading zero byte
pub fn encode(data: impl AsRef<[u8]>) -> String {
	let data = data.as_ref();

	let mut encoded = Vec::with_capacity((data.len() * 8 + 4) / 5);
	let mut buffer = 0u32;
	let mut bits = 0;

	for byte in data.iter().rev() {
		buffer |= (*byte as u32) << bits;
		bits += 8;

		while bits >= 5 {
			encoded.push(C32_ALPHABET[(buffer & 0x1F) as usize]);
			buffer >>= 5;
			bits -= 5;
		}
	}

	if bits > 0 {
		encoded.push(C32_ALPHABET[(buffer & 0x1F) as usize]);
	}

	while encoded.last() == Some(&C32_ALPHABET[0]) {
		encoded.pop();
	}

	let leading_zeros = data.iter().take_while(|byte| **byte == 0).count();
	encoded.extend(std::iter::repeat(C32_ALPHABET[0]).take(leading_zeros));

	encoded.reverse();

	encoded.into_iter().map(char::from).collect()
}

/// Decodes a c32 string
pub fn decode(input: impl AsRef<str>) -> Result<Vec<u8>, C32Error> {
	let input = input.as_ref();

	if !input.is_ascii() {
		return Err(C32Error::InvalidC32);
	}

	let digits = input
		.bytes()
		.map(|byte| c32_digit(byte).ok_or(C32Error::InvalidChar(byte as char)))
		.collect::<Result<Vec<u8>, _>>()?;

	let mut decoded = Vec::with_capacity(digits.len() * 5 / 8 + 1);
	let mut carry = 0u16;
	let mut carry_bits = 0;

	for digit in digits.iter().rev() {
		carry |= (*digit as u16) << carry_bits;
		carry_bits += 5;

		if carry_bits >= 8 {
			decoded.push((carry & 0xFF) as u8);
			carry >>= 8;
			carry_bits -= 8;
		}
	}

	if carry_bits > 0 {
		decoded.push((carry & 0xFF) as u8);
	}

	while decoded.last() == Some(&0) {
		decoded.pop();
	}

	let leading_zeros = digits.iter().take_while(|digit| **digit == 0).count();
	decoded.extend(std::iter::repeat(0).take(leading_zeros));

	decoded.reverse();

	Ok(decoded)
}

fn checksum(version: u8, data: &[u8]) -> [u8; CHECKSUM_LENGTH] {
	let mut buffer = vec![version];
	buffer.extend_from_slice(data);

	DoubleSha256Hasher::new(&buffer).checksum()
}

/// Encodes a version and payload as c32check, without the `S` prefix
pub fn version_check_encode(
	version: u8,
	data: impl AsRef<[u8]>,
) -> Result<String, C32Error> {
	if version as usize >= C32_ALPHABET.len() {
		return Err(C32Error::InvalidAddressVersion(version));
	}

	let data = data.as_ref();

	let mut buffer = data.to_vec();
	buffer.extend_from_slice(&checksum(version, data));

	let mut encoded = String::with_capacity(buffer.len() * 2);
	encoded.push(C32_ALPHABET[version as usize] as char);
	encoded.push_str(&encode(&buffer));

	Ok(encoded)
}

/// Decodes a c32check string into its version and payload
pub fn version_check_decode(
	input: impl AsRef<str>,
) -> Result<(u8, Vec<u8>), C32Error> {
	let input = input.as_ref();

	if !input.is_ascii() || input.len() < 2 {
		return Err(C32Error::InvalidC32);
	}

	let (version, data) = input.split_at(1);

	let version = match decode(version)?.as_slice() {
		[version] => *version,
		_ => return Err(C32Error::InvalidC32),
	};

	let decoded = decode(data)?;

	if decoded.len() < CHECKSUM_LENGTH {
		return Err(C32Error::InvalidC32);
	}

	let (bytes, expected_checksum) =
		decoded.split_at(decoded.len() - CHECKSUM_LENGTH);

	let computed_checksum = checksum(version, bytes);

	if computed_checksum != expected_checksum {
		return Err(C32Error::InvalidChecksum(
			computed_checksum,
			expected_checksum.to_vec(),
		));
	}

	Ok((version, bytes.to_vec()))
}

/// Encodes a Stacks address from a version below 32 and its hash
pub fn encode_address(version: u8, hash: &[u8]) -> Result<String, C32Error> {
	Ok(format!("S{}", version_check_encode(version, hash)?))
}

/// Decodes a Stacks address into its version byte and hash bytes
pub fn decode_address(
	address: impl AsRef<str>,
) -> Result<(u8, Vec<u8>), C32Error> {
	let address = address.as_ref();

	if !address.starts_with('S')
		|| address.len() <= 5
		|| address.len() > MAX_ADDRESS_LENGTH
	{
		return Err(C32Error::InvalidAddress(address.to_string()));
	}

	version_check_decode(&address[1..])
}

#[cfg(test)]
mod tests {
	use rand::{thread_rng, Rng, RngCore};
	use strum::IntoEnumIterator;

	use super::*;
	use crate::address::AddressVersion;

	#[test]
	fn should_encode_c32() {
		let input = vec![1, 2, 3, 4, 6, 1, 2, 6, 2, 3, 6, 9, 4, 0, 0];

		assert_eq!(encode(input), "41061060410C0G30R4G8000");
	}

	#[test]
	fn should_keep_leading_zero_bytes() {
		let input = vec![0, 0, 1];
		let encoded = encode(&input);

		assert_eq!(encoded, "001");
		assert_eq!(decode(encoded).unwrap(), input);
	}

	#[test]
	fn should_decode_ambiguous_characters() {
		assert_eq!(
			decode("41061060410c0g30r4g8ooo").unwrap(),
			decode("41061060410C0G30R4G8000").unwrap()
		);
		assert_eq!(decode("I").unwrap(), decode("1").unwrap());
		assert_eq!(decode("l").unwrap(), decode("1").unwrap());
	}

	#[test]
	fn should_reject_invalid_characters() {
		assert_eq!(decode("U"), Err(C32Error::InvalidChar('U')));
		assert_eq!(decode("é"), Err(C32Error::InvalidC32));
	}

	#[test]
	fn should_round_trip_randomized_input() {
		let mut rng = thread_rng();

		for _ in 0..1_000 {
			let len = rng.gen_range(0..=40);
			let mut input = vec![0u8; len];
			rng.fill_bytes(&mut input);

			assert_eq!(decode(encode(&input)).unwrap(), input);
		}
	}

	#[test]
	fn should_round_trip_randomized_addresses() {
		let mut rng = thread_rng();

		for _ in 0..1_000 {
			let bytes = rng.gen::<[u8; 20]>();

			for version in AddressVersion::iter() {
				let encoded = encode_address(version as u8, &bytes).unwrap();
				let (decoded_version, decoded) =
					decode_address(encoded).unwrap();

				assert_eq!(decoded, bytes);
				assert_eq!(decoded_version, version as u8);
			}
		}
	}

	#[test]
	fn should_agree_with_version_check_encode() {
		let bytes = [7; 20];
		let address =
			encode_address(AddressVersion::TestnetSingleSig as u8, &bytes)
				.unwrap();
		let check =
			version_check_encode(AddressVersion::TestnetSingleSig as u8, bytes)
				.unwrap();

		assert_eq!(address, format!("S{}", check));
		assert_eq!(version_check_decode(check).unwrap(), (26, bytes.to_vec()));
	}

	#[test]
	fn should_reject_bad_checksum() {
		let address = "SPR4FMGJCD78NF4FRGPM621CW1KHNFEG0HSRDSPJ";

		assert!(matches!(
			decode_address(address),
			Err(C32Error::InvalidChecksum(_, _))
		));
	}

	#[test]
	fn should_decode_any_single_digit_version() {
		let check = version_check_encode(0, [1; 20]).unwrap();

		assert_eq!(
			decode_address(format!("S{}", check)).unwrap(),
			(0, vec![1; 20])
		);
		assert_eq!(
			encode_address(32, &[1; 20]),
			Err(C32Error::InvalidAddressVersion(32))
		);
	}
}
