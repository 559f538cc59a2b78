//! Deterministic Stacks keys from a BIP-39 mnemonic.

use std::str::FromStr;

use bdk::{
	bitcoin::{
		util::bip32::{DerivationPath, ExtendedPrivKey},
		Network as BitcoinNetwork,
	},
	keys::bip39::Mnemonic,
};
use rand::random;

use crate::{
	address::{AddressVersion, StacksAddress},
	crypto::{keys::SECP256K1, StacksPrivateKey, StacksPublicKey},
	Network, StacksResult,
};

/// Computes Stacks derivation paths
pub fn stacks_derivation_path(index: u32) -> StacksResult<DerivationPath> {
	Ok(DerivationPath::from_str(&format!(
		"m/44'/5757'/0'/0/{}",
		index
	))?)
}

/// A mnemonic and the master key derived from it
#[derive(Debug, Clone)]
pub struct Wallet {
	master_key: ExtendedPrivKey,
	mnemonic: Mnemonic,
}

impl Wallet {
	/// Restores a wallet from a mnemonic phrase
	pub fn new(mnemonic: impl AsRef<str>) -> StacksResult<Self> {
		let mnemonic = Mnemonic::from_str(mnemonic.as_ref())?;

		// Bitcoin network is irrelevant for extended private keys
		let master_key = ExtendedPrivKey::new_master(
			BitcoinNetwork::Bitcoin,
			&mnemonic.to_seed(""),
		)?;

		Ok(Self {
			master_key,
			mnemonic,
		})
	}

	/// Creates a wallet from 256 bits of fresh entropy
	pub fn random() -> StacksResult<Self> {
		let entropy: [u8; 32] = random();
		let mnemonic = Mnemonic::from_entropy(&entropy)?;

		Self::new(mnemonic.to_string())
	}

	/// Mnemonic phrase of the wallet
	pub fn mnemonic(&self) -> String {
		self.mnemonic.to_string()
	}

	/// Account credentials at an index
	pub fn credentials(
		&self,
		network: Network,
		index: u32,
	) -> StacksResult<Credentials> {
		let path = stacks_derivation_path(index)?;
		let derived = self.master_key.derive_priv(&SECP256K1, &path)?;

		Ok(Credentials {
			network,
			index,
			private_key: StacksPrivateKey::new(derived.private_key),
		})
	}
}

/// Signing key and address of one account
#[derive(Debug, Clone)]
pub struct Credentials {
	network: Network,
	index: u32,
	private_key: StacksPrivateKey,
}

impl Credentials {
	/// Network of the address
	pub fn network(&self) -> Network {
		self.network
	}

	/// Account index
	pub fn index(&self) -> u32 {
		self.index
	}

	/// Compressed signing key
	pub fn private_key(&self) -> &StacksPrivateKey {
		&self.private_key
	}

	/// Compressed public key
	pub fn public_key(&self) -> StacksPublicKey {
		self.private_key.public_key()
	}

	/// P2PKH address
	pub fn address(&self) -> StacksAddress {
		StacksAddress::p2pkh(
			AddressVersion::single_sig(self.network),
			&self.public_key(),
		)
	}
}
