use tempfile::TempDir;

use teller::account::{self, NewAccount};
use teller::audit;
use teller::loan;
use teller::password;
use teller::transaction;
use teller::{Account, BankService, Config, NewBankService};

pub struct TestUsers {}

impl TestUsers {
	pub const NAME_BOB: &'static str = "Bob Roberts";
	pub const NAME_LUCY: &'static str = "Lucy Luke";
	pub const PASSWORD: &'static str = "secret";
}

pub struct Fixture {
	pub config: Config,
	// keeps the temp data dir alive for the duration of the test
	_dir: TempDir,
}

impl Fixture {
	pub fn new() -> Self {
		let dir = TempDir::new().expect("create temp data dir");
		let config = Config::new(dir.path());
		Fixture { config, _dir: dir }
	}
}

pub struct Suite {
	pub account_repo: account::Repo,
	pub transaction_repo: transaction::Repo,
	pub loan_repo: loan::Repo,
	pub audit: audit::Log,
}

impl Suite {
	pub fn setup(fixture: &Fixture) -> Self {
		Suite {
			account_repo: account::Repo::open(fixture.config.accounts_file()).expect("open accounts store"),
			transaction_repo: transaction::Repo::open(fixture.config.transactions_file()),
			loan_repo: loan::Repo::open(fixture.config.loans_file()).expect("open loans store"),
			audit: audit::Log::open(fixture.config.audit_log_file()),
		}
	}

	pub fn bank_service(&self) -> BankService {
		BankService::new(NewBankService {
			account_repo: &self.account_repo,
			transaction_repo: &self.transaction_repo,
			loan_repo: &self.loan_repo,
			audit: &self.audit,
		})
	}

	pub fn account(&self, owner_name: &str) -> Account {
		self.account_repo
			.create(NewAccount {
				owner_name,
				password_hash: &password::hash(TestUsers::PASSWORD),
			})
			.expect("create account")
	}

	pub fn bob(&self) -> Account {
		self.account(TestUsers::NAME_BOB)
	}

	pub fn lucy(&self) -> Account {
		self.account(TestUsers::NAME_LUCY)
	}
}

#[test]
fn test_suite_setup() {
	let fixture = Fixture::new();
	let _suite = Suite::setup(&fixture);
}
