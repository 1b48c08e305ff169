use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use bigdecimal::{BigDecimal, Zero};
use log::warn;

use crate::account::{self, Account, AccountStatus};
use crate::audit;
use crate::password;
use crate::store;
use crate::types::Id;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur while performing an administrative operation
#[derive(Debug, PartialEq)]
pub struct Error {
	kind: ErrorKind,
}

impl Error {
	pub fn new(kind: ErrorKind) -> Error {
		Error { kind }
	}

	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}
}

/// The kind of an error that can occur.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
	Store(store::Error),
	AuthenticationFailed,
	InvalidStatus(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			ErrorKind::Store(e) => write!(f, "store error: {}", e),
			ErrorKind::AuthenticationFailed => write!(f, "authentication failed"),
			ErrorKind::InvalidStatus(msg) => write!(f, "invalid account status: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<store::Error> for Error {
	fn from(e: store::Error) -> Self {
		Error::new(ErrorKind::Store(e))
	}
}

/// Administrator usernames and password hashes, kept apart from the
/// account namespace in their own JSON file
pub struct Credentials {
	path: PathBuf,
	by_username: BTreeMap<String, String>,
}

impl Credentials {
	pub fn open(path: impl Into<PathBuf>) -> store::Result<Self> {
		let path = path.into();
		let by_username = if path.exists() {
			let raw = fs::read_to_string(&path)?;
			serde_json::from_str(&raw).map_err(|e| store::Error::Malformed(e.to_string()))?
		} else {
			BTreeMap::new()
		};
		Ok(Credentials { path, by_username })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn is_empty(&self) -> bool {
		self.by_username.is_empty()
	}

	pub fn verify(&self, username: &str, password: &str) -> bool {
		match self.by_username.get(username) {
			Some(hashed) => password::verify(password, hashed),
			None => false,
		}
	}

	/// Add or replace an administrator
	pub fn insert(&mut self, username: &str, password: &str) -> store::Result<()> {
		self.by_username
			.insert(username.to_owned(), password::hash(password));
		let raw = serde_json::to_string_pretty(&self.by_username)
			.map_err(|e| store::Error::Malformed(e.to_string()))?;
		let tmp = self.path.with_extension("tmp");
		fs::write(&tmp, raw)?;
		fs::rename(&tmp, &self.path)?;
		Ok(())
	}
}

/// Proof of a successful administrator login
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
	pub username: String,
}

/// Service for administrative operations
pub struct Service<'a> {
	credentials: &'a Credentials,
	account_repo: &'a account::Repo,
	audit: &'a audit::Log,
}

impl<'a> Service<'a> {
	pub fn new(credentials: &'a Credentials, account_repo: &'a account::Repo, audit: &'a audit::Log) -> Self {
		Service {
			credentials,
			account_repo,
			audit,
		}
	}

	/// Authenticate an administrator
	///
	/// Failures are audited with the attempted username, never the password
	pub fn login(&self, username: &str, password: &str) -> Result<Session> {
		if !self.credentials.verify(username, password) {
			self.append_audit(username, "admin_login", "failed: authentication failed");
			return Err(Error::new(ErrorKind::AuthenticationFailed));
		}
		self.append_audit(username, "admin_login", "ok");
		Ok(Session {
			username: username.to_owned(),
		})
	}

	/// Bar an account from balance-mutating operations
	pub fn freeze(&self, session: &Session, account_id: &Id) -> Result<Account> {
		let result = self.set_frozen(account_id, true);
		self.record(session, "freeze", account_id, &result);
		result
	}

	/// Lift a freeze placed by [`Service::freeze`]
	pub fn unfreeze(&self, session: &Session, account_id: &Id) -> Result<Account> {
		let result = self.set_frozen(account_id, false);
		self.record(session, "unfreeze", account_id, &result);
		result
	}

	fn set_frozen(&self, account_id: &Id, frozen: bool) -> Result<Account> {
		let account = self.account_repo.find_by_id(account_id)?;
		let (expected, next) = if frozen {
			(AccountStatus::Active, AccountStatus::Frozen)
		} else {
			(AccountStatus::Frozen, AccountStatus::Active)
		};
		if account.status != expected {
			let msg = format!("cannot go from {} to {}", account.status, next);
			return Err(Error::new(ErrorKind::InvalidStatus(msg)));
		}
		self.account_repo.set_status(account_id, next).map_err(Into::into)
	}

	/// Every account on file, with the bank-wide total balance
	pub fn accounts(&self) -> (Vec<Account>, BigDecimal) {
		let accounts = self.account_repo.list();
		let total = accounts
			.iter()
			.fold(BigDecimal::zero(), |sum, a| sum + &a.balance);
		(accounts, total)
	}

	/// Read the audit trail
	pub fn audit_log(&self, filter: &audit::Filter) -> Result<Vec<audit::Entry>> {
		self.audit.entries(filter).map_err(Into::into)
	}

	fn record<T>(&self, session: &Session, action: &str, account_id: &Id, result: &Result<T>) {
		let detail = match result {
			Ok(_) => format!("account={} ok", account_id),
			Err(e) => format!("account={} failed: {}", account_id, e),
		};
		self.append_audit(&session.username, action, &detail);
	}

	fn append_audit(&self, username: &str, action: &str, detail: &str) {
		let actor = format!("admin:{}", username);
		if let Err(e) = self.audit.append(&actor, action, detail) {
			warn!("audit append failed for {}: {}", action, e);
		}
	}
}
