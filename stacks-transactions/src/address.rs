use std::{
	fmt,
	io::{self, Read, Write},
	str::FromStr,
};

use bdk::bitcoin::blockdata::{
	opcodes::all::OP_CHECKMULTISIG,
	script::{Builder, Script},
};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, FromRepr};

use crate::{
	c32::{decode_address, encode_address},
	codec::{invalid_data, read_array, read_u8, Codec},
	crypto::{
		hash160::{Hash160Hasher, HASH160_LENGTH},
		sha256::Sha256Hasher,
		Hashing, StacksPublicKey,
	},
	Network, StacksError, StacksResult,
};

/// Highest address version byte plus one, the width of one c32 digit
pub const ADDRESS_VERSION_LIMIT: u8 = 32;

/// Standard stacks address versions
#[repr(u8)]
#[derive(FromRepr, EnumIter, PartialEq, Eq, Copy, Clone, Debug, Hash)]
pub enum AddressVersion {
	/// Mainnet single sig address version
	MainnetSingleSig = 22,
	/// Mainnet multi sig address version
	MainnetMultiSig = 20,
	/// Testnet single sig address version
	TestnetSingleSig = 26,
	/// Testnet multi sig address version
	TestnetMultiSig = 21,
}

impl AddressVersion {
	/// Single sig address version of a network
	pub fn single_sig(network: Network) -> Self {
		match network {
			Network::Mainnet => Self::MainnetSingleSig,
			Network::Testnet => Self::TestnetSingleSig,
		}
	}

	/// Multi sig address version of a network
	pub fn multi_sig(network: Network) -> Self {
		match network {
			Network::Mainnet => Self::MainnetMultiSig,
			Network::Testnet => Self::TestnetMultiSig,
		}
	}

	/// Network the version belongs to
	pub fn network(self) -> Network {
		match self {
			Self::MainnetSingleSig | Self::MainnetMultiSig => Network::Mainnet,
			Self::TestnetSingleSig | Self::TestnetMultiSig => Network::Testnet,
		}
	}
}

impl TryFrom<u8> for AddressVersion {
	type Error = StacksError;

	fn try_from(value: u8) -> StacksResult<Self> {
		AddressVersion::from_repr(value)
			.ok_or(StacksError::InvalidAddressVersion(value))
	}
}

/// How the address hash commits to the signer public keys
#[repr(u8)]
#[derive(
	FromRepr, EnumIter, Serialize, Deserialize, PartialEq, Eq, Copy, Clone,
	Debug, Hash,
)]
pub enum AddressHashMode {
	/// Hash160 of a single public key
	P2PKH = 0x00,
	/// Hash160 of a multisig redeem script
	P2SH = 0x01,
	/// Hash160 of a segwit v0 key hash program
	P2WPKH = 0x02,
	/// Hash160 of a segwit v0 script hash program
	P2WSH = 0x03,
}

impl AddressHashMode {
	/// Returns true for script based modes
	pub fn is_multi_sig(self) -> bool {
		matches!(self, Self::P2SH | Self::P2WSH)
	}

	/// Address version an address with this mode uses on a network
	pub fn address_version(self, network: Network) -> AddressVersion {
		match self {
			Self::P2PKH => AddressVersion::single_sig(network),
			_ => AddressVersion::multi_sig(network),
		}
	}
}

/// A Stacks address.
///
/// Any version byte below 32 is carried, so principals with a
/// non-standard version still decode. [AddressVersion] names the four
/// versions wallets produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StacksAddress {
	version: u8,
	hash: Hash160Hasher,
}

impl StacksAddress {
	/// Create a new Stacks address from the given version and hash
	pub fn new(version: AddressVersion, hash: Hash160Hasher) -> Self {
		Self {
			version: version as u8,
			hash,
		}
	}

	/// Create a Stacks address from a raw version byte
	pub fn from_version_byte(
		version: u8,
		hash: Hash160Hasher,
	) -> StacksResult<Self> {
		if version >= ADDRESS_VERSION_LIMIT {
			return Err(StacksError::InvalidAddressVersion(version));
		}

		Ok(Self { version, hash })
	}

	/// Get the address version byte
	pub fn version(&self) -> u8 {
		self.version
	}

	/// Get the address version if it is one of the standard versions
	pub fn address_version(&self) -> Option<AddressVersion> {
		AddressVersion::from_repr(self.version)
	}

	/// Get the address hash
	pub fn hash(&self) -> &Hash160Hasher {
		&self.hash
	}

	/// Create a new Stacks address with a pay-2-public-key-hash
	pub fn p2pkh(version: AddressVersion, key: &StacksPublicKey) -> Self {
		Self::new(version, hash_p2pkh(key))
	}

	/// Create a new Stacks address with a pay-2-script-hash
	pub fn p2sh<'a>(
		version: AddressVersion,
		keys: impl IntoIterator<Item = &'a StacksPublicKey>,
		signature_threshold: usize,
	) -> Self {
		Self::new(version, hash_p2sh(keys, signature_threshold))
	}

	/// Create a new Stacks address with a pay-2-witness-public-key-hash
	pub fn p2wpkh(version: AddressVersion, key: &StacksPublicKey) -> Self {
		Self::new(version, hash_p2wpkh(key))
	}

	/// Create a new Stacks address with a pay-2-witness-script-hash
	pub fn p2wsh<'a>(
		version: AddressVersion,
		keys: impl IntoIterator<Item = &'a StacksPublicKey>,
		signature_threshold: usize,
	) -> Self {
		Self::new(version, hash_p2wsh(keys, signature_threshold))
	}

	/// Derives the address committing to the keys under the hash mode.
	///
	/// Single key modes take exactly one key and a threshold of one.
	/// Segwit modes only accept compressed keys.
	pub fn from_public_keys(
		version: AddressVersion,
		hash_mode: AddressHashMode,
		signature_threshold: usize,
		keys: &[StacksPublicKey],
	) -> StacksResult<Self> {
		if keys.is_empty() {
			return Err(StacksError::InvalidArguments(
				"At least one public key is required",
			));
		}

		if signature_threshold == 0 || signature_threshold > keys.len() {
			return Err(StacksError::InvalidArguments(
				"Signature threshold must be between 1 and the key count",
			));
		}

		if matches!(hash_mode, AddressHashMode::P2WPKH | AddressHashMode::P2WSH)
			&& keys.iter().any(|key| !key.compressed())
		{
			return Err(StacksError::InvalidArguments(
				"Segwit hash modes require compressed public keys",
			));
		}

		match hash_mode {
			AddressHashMode::P2PKH | AddressHashMode::P2WPKH
				if keys.len() != 1 =>
			{
				Err(StacksError::InvalidArguments(
					"Single key hash modes take exactly one public key",
				))
			}
			AddressHashMode::P2PKH => Ok(Self::p2pkh(version, &keys[0])),
			AddressHashMode::P2WPKH => Ok(Self::p2wpkh(version, &keys[0])),
			AddressHashMode::P2SH => {
				Ok(Self::p2sh(version, keys, signature_threshold))
			}
			AddressHashMode::P2WSH => {
				Ok(Self::p2wsh(version, keys, signature_threshold))
			}
		}
	}
}

impl Codec for StacksAddress {
	fn codec_serialize<W: Write>(&self, dest: &mut W) -> io::Result<()> {
		dest.write_all(&[self.version])?;
		dest.write_all(self.hash.as_ref())
	}

	fn codec_deserialize<R: Read>(data: &mut R) -> io::Result<Self> {
		let version = read_u8(data)?;
		if version >= ADDRESS_VERSION_LIMIT {
			return Err(invalid_data(format!(
				"address version {} out of range",
				version
			)));
		}

		let hash = Hash160Hasher::from(read_array::<_, HASH160_LENGTH>(data)?);

		Ok(Self { version, hash })
	}
}

impl From<StacksAddress> for String {
	fn from(address: StacksAddress) -> Self {
		address.to_string()
	}
}

impl TryFrom<&str> for StacksAddress {
	type Error = StacksError;

	fn try_from(address: &str) -> Result<Self, Self::Error> {
		let (version, hash_bytes) = decode_address(address)?;

		if hash_bytes.len() != HASH160_LENGTH {
			return Err(StacksError::InvalidArguments(
				"Invalid hash length for address",
			));
		}

		Self::from_version_byte(version, Hash160Hasher::from_bytes(&hash_bytes)?)
	}
}

impl TryFrom<String> for StacksAddress {
	type Error = StacksError;

	fn try_from(address: String) -> Result<Self, Self::Error> {
		Self::try_from(address.as_str())
	}
}

impl FromStr for StacksAddress {
	type Err = StacksError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::try_from(s)
	}
}

impl fmt::Display for StacksAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let address = encode_address(self.version, self.hash.as_ref())
			.map_err(|_| fmt::Error)?;

		write!(f, "{}", address)
	}
}

fn multisig_script<'a>(
	pub_keys: impl IntoIterator<Item = &'a StacksPublicKey>,
	signature_threshold: usize,
) -> Script {
	let mut builder = Builder::new().push_int(signature_threshold as i64);
	let mut key_counter = 0;

	for key in pub_keys {
		builder = builder.push_slice(&key.to_bytes());
		key_counter += 1;
	}

	builder
		.push_int(key_counter)
		.push_opcode(OP_CHECKMULTISIG)
		.into_script()
}

fn segwit_program(hash: &[u8]) -> Hash160Hasher {
	let mut program = Vec::with_capacity(hash.len() + 2);
	program.push(0);
	program.push(hash.len() as u8);
	program.extend_from_slice(hash);

	Hash160Hasher::new(&program)
}

fn hash_p2pkh(key: &StacksPublicKey) -> Hash160Hasher {
	Hash160Hasher::new(key.to_bytes())
}

fn hash_p2sh<'a>(
	pub_keys: impl IntoIterator<Item = &'a StacksPublicKey>,
	signature_threshold: usize,
) -> Hash160Hasher {
	Hash160Hasher::new(multisig_script(pub_keys, signature_threshold).as_bytes())
}

fn hash_p2wpkh(key: &StacksPublicKey) -> Hash160Hasher {
	segwit_program(Hash160Hasher::new(key.to_bytes_compressed()).as_ref())
}

fn hash_p2wsh<'a>(
	pub_keys: impl IntoIterator<Item = &'a StacksPublicKey>,
	signature_threshold: usize,
) -> Hash160Hasher {
	let script = multisig_script(pub_keys, signature_threshold);

	segwit_program(Sha256Hasher::new(script.as_bytes()).as_ref())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn public_key(hex: &str) -> StacksPublicKey {
		StacksPublicKey::from_hex(hex).unwrap()
	}

	fn hash(hex: &str) -> Hash160Hasher {
		Hash160Hasher::from_hex(hex).unwrap()
	}

	#[test]
	fn should_correctly_hash_p2pkh() {
		let pk = public_key(
			"03556902f83defc6c63a7eb56a2d8ee4baee109f2126aac41e4f9e3a0835f34bc5",
		);

		assert_eq!(
			hash_p2pkh(&pk),
			hash("d24206d58967c61b6b302eb14cd254a8ae7e761a")
		);
	}

	#[test]
	fn should_correctly_hash_p2sh() {
		let pk = public_key(
			"028cac21ac93bf697dc31da79e11aad8d285b2e2e81bcfc8de982179c6d468d339",
		);

		assert_eq!(
			hash_p2sh(&[pk], 1),
			hash("fc1058076c56333d7d2d9fbb936aefa632c0e7a8")
		);
	}

	#[test]
	fn should_correctly_hash_p2sh_2_keys() {
		let pk1 = public_key(
			"0325a1b9799db9852ee1c99280b20695b1889eff7ec0352d634912818d02f91f84",
		);
		let pk2 = public_key(
			"0279d7abd36d41d51e225efbbc8376a257051cecdf8b47eaffeb49b77547bc3bff",
		);

		assert_eq!(
			hash_p2sh(&[pk1, pk2], 2),
			hash("073503b6e6ef916e4ab40f31abc83217c271d917")
		);
	}

	#[test]
	fn should_correctly_hash_p2wsh() {
		let pk = public_key(
			"027cf49417052b14d73c3da78ec3c0c859380b19a4971fd8c63ded9037455dd84c",
		);

		assert_eq!(
			hash_p2wsh(&[pk], 1),
			hash("599623097df78a0e962108bfb0f1f78ef1d15f57")
		);
	}

	#[test]
	fn should_correctly_hash_p2wsh_2_keys() {
		let pk1 = public_key(
			"037c6e4c27b3d39ab73c2cd2fdd2ea34cec3d9b6881a2a4a17e42fcafb6b64c3aa",
		);
		let pk2 = public_key(
			"03a544a1d3fb4238d5841647100c53e371a1d72f027857899256f0c754cf266491",
		);

		assert_eq!(
			hash_p2wsh(&[pk1, pk2], 2),
			hash("d5f3ddac2358f61088d951aead20c270a045d46d")
		);
	}

	#[test]
	fn should_correctly_hash_p2wpkh() {
		let pk = public_key(
			"03528351fc1494c66b67e0857fd571e1de37985dd0cae987dbe71c47d2bc7a7712",
		);

		assert_eq!(
			hash_p2wpkh(&pk),
			hash("3bb7c80b72757b4bc94bd3cb09171500fb72b4ac")
		);
	}

	#[test]
	fn should_hash_uncompressed_keys_in_their_own_encoding() {
		let pk = public_key(
			"03556902f83defc6c63a7eb56a2d8ee4baee109f2126aac41e4f9e3a0835f34bc5",
		);
		let uncompressed = pk.with_compression(false);

		assert_ne!(hash_p2pkh(&pk), hash_p2pkh(&uncompressed));
		assert_eq!(
			hash_p2pkh(&uncompressed),
			Hash160Hasher::new(uncompressed.to_bytes())
		);
	}

	#[test]
	fn should_create_correct_address_from_public_key() {
		let addr = StacksAddress::p2pkh(
			AddressVersion::MainnetSingleSig,
			&public_key(
				"02e2ce887c1f1654936fbb7d4036749da5e7b9b64af406e1f3535c8f4336de1c6e",
			),
		);

		assert_eq!(addr.to_string(), "SPR4FMGJCD78NF4FRGPM621CW1KHNFEG0HSRDSPK");
	}

	#[test]
	fn should_create_correct_address_from_c32_encoded_string() {
		let expected_hash = hash_p2pkh(&public_key(
			"02e2ce887c1f1654936fbb7d4036749da5e7b9b64af406e1f3535c8f4336de1c6e",
		));

		let addr: StacksAddress =
			"SPR4FMGJCD78NF4FRGPM621CW1KHNFEG0HSRDSPK".parse().unwrap();

		assert_eq!(addr.hash(), &expected_hash);
		assert_eq!(addr.version(), 22);
		assert_eq!(addr.address_version(), Some(AddressVersion::MainnetSingleSig));
	}

	#[test]
	fn should_derive_testnet_address_of_known_key() {
		let addr = StacksAddress::from_public_keys(
			AddressVersion::TestnetSingleSig,
			AddressHashMode::P2PKH,
			1,
			&[public_key(
				"0390a5cac7c33fda49f70bc1b0866fa0ba7a9440d9de647fecb8132ceb76a94dfa",
			)],
		)
		.unwrap();

		assert_eq!(addr.to_string(), "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
	}

	#[test]
	fn should_reject_invalid_key_sets() {
		let pk = public_key(
			"03556902f83defc6c63a7eb56a2d8ee4baee109f2126aac41e4f9e3a0835f34bc5",
		);
		let version = AddressVersion::MainnetMultiSig;

		assert!(StacksAddress::from_public_keys(
			version,
			AddressHashMode::P2PKH,
			1,
			&[pk, pk]
		)
		.is_err());
		assert!(StacksAddress::from_public_keys(
			version,
			AddressHashMode::P2SH,
			3,
			&[pk, pk]
		)
		.is_err());
		assert!(StacksAddress::from_public_keys(
			version,
			AddressHashMode::P2WSH,
			1,
			&[pk.with_compression(false)]
		)
		.is_err());
	}

	#[test]
	fn should_encode_address_as_21_bytes() {
		let addr: StacksAddress =
			"SPR4FMGJCD78NF4FRGPM621CW1KHNFEG0HSRDSPK".parse().unwrap();
		let bytes = addr.serialize_to_vec().unwrap();

		assert_eq!(bytes.len(), 21);
		assert_eq!(bytes[0], 22);
		assert_eq!(StacksAddress::deserialize_from_slice(&bytes).unwrap(), addr);
	}

	#[test]
	fn should_reject_out_of_range_version_byte() {
		let mut bytes = vec![0x20];
		bytes.extend_from_slice(&[0; 20]);

		assert!(matches!(
			StacksAddress::deserialize_from_slice(&bytes),
			Err(StacksError::DeserializationError(_))
		));
		assert!(matches!(
			StacksAddress::from_version_byte(32, Hash160Hasher::zeroes()),
			Err(StacksError::InvalidAddressVersion(32))
		));
	}

	#[test]
	fn should_carry_non_standard_version_bytes() {
		let mut bytes = vec![0x01];
		bytes.extend_from_slice(&[7; 20]);

		let addr = StacksAddress::deserialize_from_slice(&bytes).unwrap();

		assert_eq!(addr.version(), 1);
		assert_eq!(addr.address_version(), None);
		assert_eq!(addr.serialize_to_vec().unwrap(), bytes);

		let parsed: StacksAddress = addr.to_string().parse().unwrap();
		assert_eq!(parsed, addr);
	}

	#[test]
	fn should_serialize_as_c32_string() {
		let addr: StacksAddress =
			"SPR4FMGJCD78NF4FRGPM621CW1KHNFEG0HSRDSPK".parse().unwrap();

		assert_eq!(
			serde_json::to_string(&addr).unwrap(),
			"\"SPR4FMGJCD78NF4FRGPM621CW1KHNFEG0HSRDSPK\""
		);
	}
}
