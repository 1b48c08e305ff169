use bigdecimal::{BigDecimal, Zero};
use log::warn;

use crate::account::{self, Account, AccountStatus, NewAccount};
use crate::audit;
use crate::loan::{self, Loan, LoanStatus, NewLoan};
use crate::password;
use crate::transaction::{self, NewTransaction, Transaction, Type};
use crate::types::Id;

use super::error::{Error, ErrorKind};

pub type Result<T> = std::result::Result<T, Error>;

/// Service for performing banking operations
///
/// Owns every invariant the stores do not: amounts are positive, balances
/// never go negative, frozen and closed accounts reject mutation, and each
/// committed mutation leaves exactly one ledger record and one audit entry
pub struct Service<'a> {
	account_repo: &'a account::Repo,
	transaction_repo: &'a transaction::Repo,
	loan_repo: &'a loan::Repo,
	audit: &'a audit::Log,
}

/// Parameter object for creating a new Service
pub struct NewService<'a> {
	pub account_repo: &'a account::Repo,
	pub transaction_repo: &'a transaction::Repo,
	pub loan_repo: &'a loan::Repo,
	pub audit: &'a audit::Log,
}

impl<'a> Service<'a> {
	pub fn new(v: NewService<'a>) -> Self {
		Service {
			account_repo: v.account_repo,
			transaction_repo: v.transaction_repo,
			loan_repo: v.loan_repo,
			audit: v.audit,
		}
	}

	/// Open a new account with a zero balance
	///
	/// # Arguments
	/// * `owner_name` - display name of the account holder
	/// * `password` - plaintext password, stored only as a one-way hash
	pub fn register(&self, owner_name: &str, password: &str) -> Result<Account> {
		let result = self
			.account_repo
			.create(NewAccount {
				owner_name,
				password_hash: &password::hash(password),
			})
			.map_err(Error::from);
		self.record(owner_name, "register", String::new(), &result);
		result
	}

	/// Check an account holder's password
	pub fn authenticate(&self, account_id: &Id, password: &str) -> Result<Account> {
		let result = self.authenticate_inner(account_id, password);
		self.record(&account_id.to_string(), "login", String::new(), &result);
		result
	}

	fn authenticate_inner(&self, account_id: &Id, password: &str) -> Result<Account> {
		let account = self.account_repo.find_by_id(account_id)?;
		if !password::verify(password, &account.password_hash) {
			return Err(Error::new(ErrorKind::AuthenticationFailed));
		}
		Ok(account)
	}

	pub fn account(&self, account_id: &Id) -> Result<Account> {
		self.account_repo.find_by_id(account_id).map_err(Into::into)
	}

	/// Deposit funds to an account
	///
	/// # Arguments
	/// * `account_id` - account the funds belong to
	/// * `amount` - amount deposited
	pub fn deposit(&self, account_id: &Id, amount: &BigDecimal) -> Result<Account> {
		let result = self.deposit_inner(account_id, amount);
		self.record(&account_id.to_string(), "deposit", format!("amount={}", amount), &result);
		result
	}

	fn deposit_inner(&self, account_id: &Id, amount: &BigDecimal) -> Result<Account> {
		require_positive(amount)?;
		let account = self.account_repo.find_by_id(account_id)?;
		require_active(&account)?;

		self.transaction_repo.create(NewTransaction {
			account_id,
			transaction_type: Type::Deposit,
			amount,
			related_account_id: None,
		})?;
		let account = self.account_repo.increment(account_id, amount)?;
		Ok(account)
	}

	/// Withdraw funds from an account
	///
	/// # Arguments
	/// * `account_id` - account the funds belong to
	/// * `amount` - amount withdrawn
	pub fn withdraw(&self, account_id: &Id, amount: &BigDecimal) -> Result<Account> {
		let result = self.withdraw_inner(account_id, amount);
		self.record(&account_id.to_string(), "withdraw", format!("amount={}", amount), &result);
		result
	}

	fn withdraw_inner(&self, account_id: &Id, amount: &BigDecimal) -> Result<Account> {
		require_positive(amount)?;
		let account = self.account_repo.find_by_id(account_id)?;
		require_active(&account)?;
		if account.balance.lt(amount) {
			return Err(Error::new(ErrorKind::InadequateFunds));
		}

		self.transaction_repo.create(NewTransaction {
			account_id,
			transaction_type: Type::Withdrawal,
			amount,
			related_account_id: None,
		})?;
		let account = self.account_repo.decrement(account_id, amount)?;

		// invalid balance check
		assert!(
			account.balance >= BigDecimal::zero(),
			"invalid state: account balance should never be negative"
		);
		Ok(account)
	}

	/// Transfer funds from account to account
	///
	/// Every precondition for both legs is checked before anything is
	/// written, so a failed transfer changes neither account
	///
	/// # Arguments
	/// * `from_id` - account the funds leave
	/// * `to_id` - account the funds arrive at
	/// * `amount` - amount transferred
	pub fn transfer(&self, from_id: &Id, to_id: &Id, amount: &BigDecimal) -> Result<(Account, Account)> {
		let result = self.transfer_inner(from_id, to_id, amount);
		match &result {
			Ok(_) => {
				self.append_audit(
					&from_id.to_string(),
					"transfer_out",
					&format!("to={} amount={} ok", to_id, amount),
				);
				self.append_audit(
					&to_id.to_string(),
					"transfer_in",
					&format!("from={} amount={} ok", from_id, amount),
				);
			}
			Err(e) => self.append_audit(
				&from_id.to_string(),
				"transfer",
				&format!("to={} amount={} failed: {}", to_id, amount, e),
			),
		}
		result
	}

	fn transfer_inner(&self, from_id: &Id, to_id: &Id, amount: &BigDecimal) -> Result<(Account, Account)> {
		require_positive(amount)?;
		let from = self.account_repo.find_by_id(from_id)?;
		require_active(&from)?;
		let to = self.account_repo.find_by_id(to_id)?;
		require_active(&to)?;
		if from.balance.lt(amount) {
			return Err(Error::new(ErrorKind::InadequateFunds));
		}

		self.transaction_repo.create(NewTransaction {
			account_id: from_id,
			transaction_type: Type::TransferOut,
			amount,
			related_account_id: Some(to_id),
		})?;
		self.transaction_repo.create(NewTransaction {
			account_id: to_id,
			transaction_type: Type::TransferIn,
			amount,
			related_account_id: Some(from_id),
		})?;
		let (from, to) = self.account_repo.transfer(from_id, to_id, amount)?;

		// invalid balance check
		assert!(
			from.balance >= BigDecimal::zero(),
			"invalid state: account balance should never be negative"
		);
		Ok((from, to))
	}

	/// Issue a loan and disburse the principal to the account
	///
	/// # Arguments
	/// * `account_id` - borrower's account, credited with the principal
	/// * `principal` - amount borrowed
	pub fn apply_loan(&self, account_id: &Id, principal: &BigDecimal) -> Result<Loan> {
		let result = self.apply_loan_inner(account_id, principal);
		self.record(
			&account_id.to_string(),
			"apply_loan",
			format!("principal={} disbursement", principal),
			&result,
		);
		result
	}

	fn apply_loan_inner(&self, account_id: &Id, principal: &BigDecimal) -> Result<Loan> {
		require_positive(principal)?;
		let account = self.account_repo.find_by_id(account_id)?;
		require_active(&account)?;

		let loan = self.loan_repo.create(NewLoan { account_id, principal })?;
		// loan proceeds land on the account as a deposit
		self.transaction_repo.create(NewTransaction {
			account_id,
			transaction_type: Type::Deposit,
			amount: principal,
			related_account_id: None,
		})?;
		self.account_repo.increment(account_id, principal)?;
		Ok(loan)
	}

	/// Pay down a loan from the borrower's account
	///
	/// The payment is capped at the outstanding balance; the loan flips to
	/// paid off the moment the balance reaches zero
	///
	/// # Arguments
	/// * `loan_id` - loan the payment applies to
	/// * `amount` - amount offered as payment
	pub fn pay_loan(&self, loan_id: &Id, amount: &BigDecimal) -> Result<Loan> {
		let actor = match self.loan_repo.find_by_id(loan_id) {
			Ok(loan) => loan.account_id.to_string(),
			Err(_) => loan_id.to_string(),
		};
		let result = self.pay_loan_inner(loan_id, amount);
		self.record(&actor, "pay_loan", format!("loan={} amount={} loan_payment", loan_id, amount), &result);
		result
	}

	fn pay_loan_inner(&self, loan_id: &Id, amount: &BigDecimal) -> Result<Loan> {
		require_positive(amount)?;
		let loan = self.loan_repo.find_by_id(loan_id)?;
		if loan.is_paid_off() {
			return Err(Error::new(ErrorKind::LoanAlreadyPaid));
		}
		let account = self.account_repo.find_by_id(&loan.account_id)?;
		require_active(&account)?;
		if account.balance.lt(amount) {
			return Err(Error::new(ErrorKind::InadequateFunds));
		}

		// never collect more than is owed
		let payment = if amount.gt(&loan.balance) {
			loan.balance.clone()
		} else {
			amount.clone()
		};

		self.transaction_repo.create(NewTransaction {
			account_id: &loan.account_id,
			transaction_type: Type::Withdrawal,
			amount: &payment,
			related_account_id: None,
		})?;
		self.account_repo.decrement(&loan.account_id, &payment)?;
		let mut loan = self.loan_repo.decrement(loan_id, &payment)?;

		if loan.balance.is_zero() {
			loan = self.loan_repo.set_status(loan_id, LoanStatus::PaidOff)?;
		}

		// invalid balance check
		assert!(
			loan.balance >= BigDecimal::zero(),
			"invalid state: loan balance should never be negative"
		);
		Ok(loan)
	}

	/// All transactions affecting the account, in chronological order
	pub fn statement(&self, account_id: &Id) -> Result<Vec<Transaction>> {
		self.account_repo.find_by_id(account_id)?;
		self.transaction_repo.find_for_account(account_id).map_err(Into::into)
	}

	pub fn loans(&self, account_id: &Id) -> Result<Vec<Loan>> {
		self.account_repo.find_by_id(account_id)?;
		Ok(self.loan_repo.find_for_account(account_id))
	}

	/// Change the holder's name and/or password, leaving the balance alone
	pub fn update_details(
		&self,
		account_id: &Id,
		owner_name: Option<&str>,
		password: Option<&str>,
	) -> Result<Account> {
		let result = self.update_details_inner(account_id, owner_name, password);
		self.record(&account_id.to_string(), "update_details", String::new(), &result);
		result
	}

	fn update_details_inner(
		&self,
		account_id: &Id,
		owner_name: Option<&str>,
		password: Option<&str>,
	) -> Result<Account> {
		let mut account = self.account_repo.find_by_id(account_id)?;
		if account.status == AccountStatus::Closed {
			return Err(Error::new(ErrorKind::AccountNotActive));
		}
		if let Some(name) = owner_name {
			account.owner_name = name.to_owned();
		}
		if let Some(pw) = password {
			account.password_hash = password::hash(pw);
		}
		self.account_repo.update(&account).map_err(Into::into)
	}

	/// Close an account that has been emptied first
	pub fn close_account(&self, account_id: &Id) -> Result<Account> {
		let result = self.close_account_inner(account_id);
		self.record(&account_id.to_string(), "close_account", String::new(), &result);
		result
	}

	fn close_account_inner(&self, account_id: &Id) -> Result<Account> {
		let account = self.account_repo.find_by_id(account_id)?;
		require_active(&account)?;
		if !account.balance.is_zero() {
			return Err(Error::new(ErrorKind::NonZeroBalance));
		}
		self.account_repo
			.set_status(account_id, AccountStatus::Closed)
			.map_err(Into::into)
	}

	fn record<T>(&self, actor: &str, action: &str, context: String, result: &Result<T>) {
		let outcome = match result {
			Ok(_) => "ok".to_owned(),
			Err(e) => format!("failed: {}", e),
		};
		let detail = if context.is_empty() {
			outcome
		} else {
			format!("{} {}", context, outcome)
		};
		self.append_audit(actor, action, &detail);
	}

	fn append_audit(&self, actor: &str, action: &str, detail: &str) {
		if let Err(e) = self.audit.append(actor, action, detail) {
			warn!("audit append failed for {}: {}", action, e);
		}
	}
}

fn require_positive(amount: &BigDecimal) -> Result<()> {
	if amount <= &BigDecimal::zero() {
		return Err(Error::new(ErrorKind::InvalidAmount));
	}
	Ok(())
}

fn require_active(account: &Account) -> Result<()> {
	if !account.is_active() {
		return Err(Error::new(ErrorKind::AccountNotActive));
	}
	Ok(())
}
