use tempfile::TempDir;

use crate::account::{self, Account, NewAccount};
use crate::audit;
use crate::config::Config;
use crate::loan;
use crate::transaction;

/// Test fixture owning a throwaway data directory
///
/// Every store opened through it reads and writes under the same temp dir,
/// which is removed when the fixture drops
pub struct Fixture {
	pub config: Config,
	// held for its Drop
	_dir: TempDir,
}

impl Fixture {
	pub fn new() -> Self {
		let dir = TempDir::new().expect("create temp data dir");
		let config = Config::new(dir.path());
		Fixture { config, _dir: dir }
	}

	pub fn account_repo(&self) -> account::Repo {
		account::Repo::open(self.config.accounts_file()).expect("open accounts store")
	}

	pub fn transaction_repo(&self) -> transaction::Repo {
		transaction::Repo::open(self.config.transactions_file())
	}

	pub fn loan_repo(&self) -> loan::Repo {
		loan::Repo::open(self.config.loans_file()).expect("open loans store")
	}

	pub fn audit_log(&self) -> audit::Log {
		audit::Log::open(self.config.audit_log_file())
	}

	pub fn account(&self, repo: &account::Repo, owner_name: &str) -> Account {
		repo.create(NewAccount {
			owner_name,
			password_hash: &crate::password::hash("secret"),
		})
		.expect("create account")
	}
}
