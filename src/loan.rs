use std::cell::RefCell;
use std::path::{Path, PathBuf};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::store;
use crate::types::{self, Id, Time};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
	#[serde(rename = "loan_id")]
	pub id: Id,
	pub account_id: Id,
	#[serde(with = "crate::store::decimal_str")]
	pub principal: BigDecimal,
	// balance = principal - payments made so far
	#[serde(rename = "outstanding_balance", with = "crate::store::decimal_str")]
	pub balance: BigDecimal,
	pub status: LoanStatus,
	pub created_at: Time,
}

impl Loan {
	pub fn is_paid_off(&self) -> bool {
		self.status == LoanStatus::PaidOff
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, EnumString, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
	Active,
	PaidOff,
}

pub struct NewLoan<'a> {
	pub account_id: &'a Id,
	pub principal: &'a BigDecimal,
}

/// Data store implementation for operating on loans in the loans file
pub struct Repo {
	path: PathBuf,
	loans: RefCell<Vec<Loan>>,
}

impl Repo {
	pub fn open(path: impl Into<PathBuf>) -> store::Result<Self> {
		let path = path.into();
		let loans = store::read_rows(&path)?;
		Ok(Repo {
			path,
			loans: RefCell::new(loans),
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn create(&self, new_loan: NewLoan) -> store::Result<Loan> {
		let loan = Loan {
			id: Id::new_v4(),
			account_id: *new_loan.account_id,
			principal: new_loan.principal.clone(),
			balance: new_loan.principal.clone(),
			status: LoanStatus::Active,
			created_at: types::now(),
		};

		let mut loans = self.loans.borrow_mut();
		if loans.iter().any(|l| l.id == loan.id) {
			return Err(store::Error::RecordAlreadyExists);
		}
		loans.push(loan.clone());
		store::write_rows(&self.path, loans.as_slice())?;

		Ok(loan)
	}

	pub fn find_by_id(&self, id: &Id) -> store::Result<Loan> {
		self.loans
			.borrow()
			.iter()
			.find(|l| l.id == *id)
			.cloned()
			.ok_or(store::Error::RecordNotFound)
	}

	pub fn find_for_account(&self, account_id: &Id) -> Vec<Loan> {
		self.loans
			.borrow()
			.iter()
			.filter(|l| l.account_id == *account_id)
			.cloned()
			.collect()
	}

	pub fn update(&self, loan: &Loan) -> store::Result<Loan> {
		let mut loans = self.loans.borrow_mut();
		let stored = loans
			.iter_mut()
			.find(|l| l.id == loan.id)
			.ok_or(store::Error::RecordNotFound)?;
		*stored = loan.clone();
		store::write_rows(&self.path, loans.as_slice())?;
		Ok(loan.clone())
	}

	/// Reduce the outstanding balance by a payment amount
	pub fn decrement(&self, id: &Id, amount: &BigDecimal) -> store::Result<Loan> {
		let mut loans = self.loans.borrow_mut();
		let loan = loans
			.iter_mut()
			.find(|l| l.id == *id)
			.ok_or(store::Error::RecordNotFound)?;
		loan.balance = &loan.balance - amount;
		let loan = loan.clone();
		store::write_rows(&self.path, loans.as_slice())?;
		Ok(loan)
	}

	pub fn set_status(&self, id: &Id, status: LoanStatus) -> store::Result<Loan> {
		let mut loans = self.loans.borrow_mut();
		let loan = loans
			.iter_mut()
			.find(|l| l.id == *id)
			.ok_or(store::Error::RecordNotFound)?;
		loan.status = status;
		let loan = loan.clone();
		store::write_rows(&self.path, loans.as_slice())?;
		Ok(loan)
	}
}

#[cfg(test)]
mod tests {
	use bigdecimal::Zero;

	use crate::testutil::Fixture;

	use super::*;

	#[test]
	fn create_loan() {
		let f = Fixture::new();
		let repo = f.loan_repo();
		let account_id = Id::new_v4();
		let principal = BigDecimal::from(1000);

		let loan = repo
			.create(NewLoan {
				account_id: &account_id,
				principal: &principal,
			})
			.unwrap();

		assert_eq!(loan.principal, principal);
		assert_eq!(loan.balance, principal);
		assert_eq!(loan.status, LoanStatus::Active);

		let reloaded = Repo::open(f.config.loans_file()).unwrap();
		assert_eq!(reloaded.find_by_id(&loan.id).unwrap(), loan);
	}

	#[test]
	fn decrement_balance_to_zero() {
		let f = Fixture::new();
		let repo = f.loan_repo();
		let account_id = Id::new_v4();
		let principal = BigDecimal::from(300);

		let loan = repo
			.create(NewLoan {
				account_id: &account_id,
				principal: &principal,
			})
			.unwrap();

		let loan = repo.decrement(&loan.id, &BigDecimal::from(300)).unwrap();
		assert!(loan.balance.is_zero());
	}
}
