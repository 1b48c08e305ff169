use std::path::{Path, PathBuf};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store;
use crate::types::{self, Id, Time};

/// One committed movement of funds on an account's ledger
///
/// Records are append-only; nothing ever edits or deletes one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
	#[serde(rename = "transaction_id")]
	pub id: Id,
	pub account_id: Id,
	#[serde(rename = "type")]
	pub transaction_type: Type,
	#[serde(with = "crate::store::decimal_str")]
	pub amount: BigDecimal,
	#[serde(rename = "timestamp")]
	pub created_at: Time,
	/// The opposite account of a transfer, empty for everything else
	pub related_account_id: Option<Id>,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Type {
	Deposit,
	Withdrawal,
	TransferIn,
	TransferOut,
}

pub struct NewTransaction<'a> {
	pub account_id: &'a Id,
	pub transaction_type: Type,
	pub amount: &'a BigDecimal,
	pub related_account_id: Option<&'a Id>,
}

/// Data store implementation for the append-only transactions file
pub struct Repo {
	path: PathBuf,
}

impl Repo {
	pub fn open(path: impl Into<PathBuf>) -> Self {
		Repo { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Assign an id and append one immutable record
	pub fn create(&self, new_transaction: NewTransaction) -> store::Result<Transaction> {
		let transaction = Transaction {
			id: Id::new_v4(),
			account_id: *new_transaction.account_id,
			transaction_type: new_transaction.transaction_type,
			amount: new_transaction.amount.clone(),
			created_at: types::now(),
			related_account_id: new_transaction.related_account_id.copied(),
		};
		store::append_row(&self.path, &transaction)?;
		Ok(transaction)
	}

	/// All transactions touching the account, in the order they were written
	pub fn find_for_account(&self, account_id: &Id) -> store::Result<Vec<Transaction>> {
		let rows: Vec<Transaction> = store::read_rows(&self.path)?;
		Ok(rows.into_iter().filter(|t| t.account_id == *account_id).collect())
	}
}
