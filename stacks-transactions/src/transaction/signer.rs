/*!
Incremental signing of a transaction.

A [TransactionSigner] owns one transaction and the running sighash. Origin
signatures come first, then sponsor signatures; the signer enforces that
order and the signature thresholds.
*/

use tracing::trace;

use crate::{
	crypto::{StacksPrivateKey, StacksPublicKey},
	transaction::{
		auth::{AuthType, Authorization, Sighash, SpendingCondition},
		Transaction,
	},
	StacksError, StacksResult,
};

/// Drives the sighash protocol over an owned transaction
#[derive(Debug)]
pub struct TransactionSigner {
	transaction: Transaction,
	sighash: Sighash,
	origin_done: bool,
}

impl TransactionSigner {
	/// Begins signing the origin.
	///
	/// Signatures already present in a multi signature origin are replayed.
	/// Fails when the origin already carries every required signature.
	pub fn new(transaction: Transaction) -> StacksResult<Self> {
		let origin = transaction.auth.origin();

		if let SpendingCondition::MultiSig(condition) = origin {
			if origin.num_signatures() >= condition.signatures_required as usize
			{
				return Err(StacksError::SigningError(
					"Origin already has all required signatures".to_string(),
				));
			}
		}

		let initial = transaction.initial_sighash()?;
		let sighash = origin.replay(&initial, AuthType::Standard)?;

		trace!("Starting origin signing at {}", sighash);

		Ok(Self {
			transaction,
			sighash,
			origin_done: false,
		})
	}

	/// Begins signing the sponsor of a signed sponsored transaction
	pub fn sponsor(
		mut transaction: Transaction,
		sponsor: SpendingCondition,
	) -> StacksResult<Self> {
		if !matches!(transaction.auth, Authorization::Sponsored(_, _)) {
			return Err(StacksError::SigningError(
				"Cannot add sponsor to non-sponsored transaction".to_string(),
			));
		}

		transaction.set_sponsor(sponsor)?;
		let sighash = transaction.verify_origin()?;

		trace!("Starting sponsor signing at {}", sighash);

		Ok(Self {
			transaction,
			sighash,
			origin_done: true,
		})
	}

	/// Picks up a partially signed transaction where it was left.
	///
	/// A sponsored transaction whose origin verifies continues with the
	/// sponsor, replaying the sponsor signatures already present.
	pub fn resume(transaction: Transaction) -> StacksResult<Self> {
		let sponsor = match transaction.auth.sponsor() {
			Some(sponsor) if transaction.verify_origin().is_ok() => {
				sponsor.clone()
			}
			_ => return Self::new(transaction),
		};

		if sponsor.num_signatures() >= sponsor.signatures_required() as usize {
			return Err(StacksError::SigningError(
				"Sponsor already has all required signatures".to_string(),
			));
		}

		let origin_sighash = transaction.verify_origin()?;
		let sighash = sponsor.replay(&origin_sighash, AuthType::Sponsored)?;

		trace!("Resuming sponsor signing at {}", sighash);

		Ok(Self {
			transaction,
			sighash,
			origin_done: true,
		})
	}

	/// Signs the origin with the next key
	pub fn sign_origin(
		&mut self,
		private_key: &StacksPrivateKey,
	) -> StacksResult<()> {
		if self.origin_done {
			return Err(StacksError::SigningError(
				"Cannot sign origin after sponsor key".to_string(),
			));
		}

		let origin = self.transaction.auth.origin();
		if let SpendingCondition::MultiSig(condition) = origin {
			if origin.num_signatures() >= condition.signatures_required as usize
			{
				return Err(StacksError::SigningError(
					"Origin would have too many signatures".to_string(),
				));
			}
		}

		self.sighash =
			self.transaction.sign_next_origin(&self.sighash, private_key)?;

		Ok(())
	}

	/// Appends the next non-signing origin key
	pub fn append_origin(
		&mut self,
		public_key: StacksPublicKey,
	) -> StacksResult<()> {
		if self.origin_done {
			return Err(StacksError::SigningError(
				"Cannot append public key to origin after sponsor key"
					.to_string(),
			));
		}

		self.transaction.append_origin_public_key(public_key)
	}

	/// Signs the sponsor with the next key
	pub fn sign_sponsor(
		&mut self,
		private_key: &StacksPrivateKey,
	) -> StacksResult<()> {
		let sponsor = self.transaction.auth.sponsor().ok_or_else(|| {
			StacksError::SigningError(
				"Cannot sponsor sign a non-sponsored transaction".to_string(),
			)
		})?;

		if let SpendingCondition::MultiSig(condition) = sponsor {
			if sponsor.num_signatures()
				>= condition.signatures_required as usize
			{
				return Err(StacksError::SigningError(
					"Sponsor would have too many signatures".to_string(),
				));
			}
		}

		self.sighash =
			self.transaction.sign_next_sponsor(&self.sighash, private_key)?;
		self.origin_done = true;

		Ok(())
	}

	/// Appends the next non-signing sponsor key
	pub fn append_sponsor(
		&mut self,
		public_key: StacksPublicKey,
	) -> StacksResult<()> {
		self.transaction.append_sponsor_public_key(public_key)?;
		self.origin_done = true;

		Ok(())
	}

	/// Transaction signed so far
	pub fn transaction(&self) -> &Transaction {
		&self.transaction
	}

	/// Releases the transaction
	pub fn into_transaction(self) -> Transaction {
		self.transaction
	}

	/// Running sighash
	pub fn sighash(&self) -> &Sighash {
		&self.sighash
	}
}
