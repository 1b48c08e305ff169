use std::fmt;

use crate::store;

/// An error that can occur while performing a banking operation
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
	InvalidAmount,
	InadequateFunds,
	AccountNotActive,
	NonZeroBalance,
	LoanAlreadyPaid,
	AuthenticationFailed,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.kind {
			ErrorKind::Store(e) => write!(f, "store error: {}", e),
			ErrorKind::InvalidAmount => write!(f, "amount must be greater than zero"),
			ErrorKind::InadequateFunds => write!(f, "not enough funds in account"),
			ErrorKind::AccountNotActive => write!(f, "account is frozen or closed"),
			ErrorKind::NonZeroBalance => write!(f, "account balance must be zero first"),
			ErrorKind::LoanAlreadyPaid => write!(f, "loan is already paid off"),
			ErrorKind::AuthenticationFailed => write!(f, "authentication failed"),
		}
	}
}

impl std::error::Error for Error {}

impl From<store::Error> for Error {
	fn from(e: store::Error) -> Self {
		Error::new(ErrorKind::Store(e))
	}
}
