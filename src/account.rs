use std::cell::RefCell;
use std::path::{Path, PathBuf};

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store;
use crate::types::Id;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
	#[serde(rename = "account_id")]
	pub id: Id,
	pub owner_name: String,
	pub password_hash: String,
	#[serde(with = "crate::store::decimal_str")]
	pub balance: BigDecimal,
	pub status: AccountStatus,
}

impl Account {
	pub fn is_active(&self) -> bool {
		self.status == AccountStatus::Active
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
	Active,
	Frozen,
	Closed,
}

pub struct NewAccount<'a> {
	pub owner_name: &'a str,
	pub password_hash: &'a str,
}

/// Data store implementation for operating on accounts in the accounts file
pub struct Repo {
	path: PathBuf,
	accounts: RefCell<Vec<Account>>,
}

impl Repo {
	/// Open the accounts store, loading any existing records
	pub fn open(path: impl Into<PathBuf>) -> store::Result<Self> {
		let path = path.into();
		let accounts = store::read_rows(&path)?;
		Ok(Repo {
			path,
			accounts: RefCell::new(accounts),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn create(&self, new_account: NewAccount) -> store::Result<Account> {
		let account = Account {
			id: Id::new_v4(),
			owner_name: new_account.owner_name.to_owned(),
			password_hash: new_account.password_hash.to_owned(),
			balance: BigDecimal::zero(),
			status: AccountStatus::Active,
		};

		let mut accounts = self.accounts.borrow_mut();
		if accounts.iter().any(|a| a.id == account.id) {
			return Err(store::Error::RecordAlreadyExists);
		}
		accounts.push(account.clone());
		store::write_rows(&self.path, accounts.as_slice())?;

		Ok(account)
	}

	pub fn find_by_id(&self, id: &Id) -> store::Result<Account> {
		self.accounts
			.borrow()
			.iter()
			.find(|a| a.id == *id)
			.cloned()
			.ok_or(store::Error::RecordNotFound)
	}

	pub fn list(&self) -> Vec<Account> {
		self.accounts.borrow().clone()
	}

	/// Persist the full record, overwriting the stored account with the same id
	pub fn update(&self, account: &Account) -> store::Result<Account> {
		let mut accounts = self.accounts.borrow_mut();
		let stored = accounts
			.iter_mut()
			.find(|a| a.id == account.id)
			.ok_or(store::Error::RecordNotFound)?;
		*stored = account.clone();
		store::write_rows(&self.path, accounts.as_slice())?;
		Ok(account.clone())
	}

	pub fn increment(&self, id: &Id, amount: &BigDecimal) -> store::Result<Account> {
		self.transact(id, amount)
	}

	pub fn decrement(&self, id: &Id, amount: &BigDecimal) -> store::Result<Account> {
		let neg = -amount;
		self.transact(id, &neg)
	}

	/// Move funds between two accounts, writing both legs in one file write
	pub fn transfer(&self, from: &Id, to: &Id, amount: &BigDecimal) -> store::Result<(Account, Account)> {
		let mut accounts = self.accounts.borrow_mut();
		let from_pos = accounts
			.iter()
			.position(|a| a.id == *from)
			.ok_or(store::Error::RecordNotFound)?;
		let to_pos = accounts
			.iter()
			.position(|a| a.id == *to)
			.ok_or(store::Error::RecordNotFound)?;

		accounts[from_pos].balance = &accounts[from_pos].balance - amount;
		accounts[to_pos].balance = &accounts[to_pos].balance + amount;
		store::write_rows(&self.path, accounts.as_slice())?;

		Ok((accounts[from_pos].clone(), accounts[to_pos].clone()))
	}

	pub fn set_status(&self, id: &Id, status: AccountStatus) -> store::Result<Account> {
		let mut accounts = self.accounts.borrow_mut();
		let account = accounts
			.iter_mut()
			.find(|a| a.id == *id)
			.ok_or(store::Error::RecordNotFound)?;
		account.status = status;
		let account = account.clone();
		store::write_rows(&self.path, accounts.as_slice())?;
		Ok(account)
	}

	fn transact(&self, id: &Id, amount: &BigDecimal) -> store::Result<Account> {
		let mut accounts = self.accounts.borrow_mut();
		let account = accounts
			.iter_mut()
			.find(|a| a.id == *id)
			.ok_or(store::Error::RecordNotFound)?;
		account.balance = &account.balance + amount;
		let account = account.clone();
		store::write_rows(&self.path, accounts.as_slice())?;
		Ok(account)
	}
}
