use std::fs;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::mpsc;

use bigdecimal::BigDecimal;
use log::{info, warn};

use teller::account::Repo as AccountRepo;
use teller::admin::{self, Credentials};
use teller::audit::{Filter, Log};
use teller::backup::Manager;
use teller::loan::Repo as LoanRepo;
use teller::transaction::Repo as TransactionRepo;
use teller::{BankService, Config, Id, NewBankService};

fn main() {
	pretty_env_logger::init();

	let config = Config::from_env();
	if let Err(e) = fs::create_dir_all(&config.data_dir) {
		eprintln!("cannot create data directory {}: {}", config.data_dir.display(), e);
		std::process::exit(1);
	}

	let account_repo = match AccountRepo::open(config.accounts_file()) {
		Ok(repo) => repo,
		Err(e) => {
			eprintln!("cannot open accounts store: {}", e);
			std::process::exit(1);
		}
	};
	let transaction_repo = TransactionRepo::open(config.transactions_file());
	let loan_repo = match LoanRepo::open(config.loans_file()) {
		Ok(repo) => repo,
		Err(e) => {
			eprintln!("cannot open loans store: {}", e);
			std::process::exit(1);
		}
	};
	let audit = Log::open(config.audit_log_file());
	let mut credentials = match Credentials::open(config.admins_file()) {
		Ok(c) => c,
		Err(e) => {
			eprintln!("cannot open admin credentials: {}", e);
			std::process::exit(1);
		}
	};
	if credentials.is_empty() {
		println!("No administrator on file yet; creating one.");
		let username = prompt("admin username: ");
		let password = prompt_password("admin password: ");
		if let Err(e) = credentials.insert(&username, &password) {
			eprintln!("cannot save admin credentials: {}", e);
			std::process::exit(1);
		}
	}

	let (_backup_thread, backup_errors) = Manager::new(&config).spawn(config.backup_interval);
	info!(
		"backups every {} minutes into {}",
		config.backup_interval.as_secs() / 60,
		config.backup_dir().display()
	);

	let bank = BankService::new(NewBankService {
		account_repo: &account_repo,
		transaction_repo: &transaction_repo,
		loan_repo: &loan_repo,
		audit: &audit,
	});
	let admin = admin::Service::new(&credentials, &account_repo, &audit);

	run_menu(&bank, &admin, &backup_errors);
}

fn run_menu(bank: &BankService, admin: &admin::Service, backup_errors: &mpsc::Receiver<teller::store::Error>) {
	let mut user: Option<Id> = None;
	let mut admin_session: Option<admin::Session> = None;

	loop {
		while let Ok(e) = backup_errors.try_recv() {
			warn!("backup problem reported: {}", e);
		}

		println!();
		println!("--- Teller ---");
		println!(" 1. register          7. transfer");
		println!(" 2. login             8. statement");
		println!(" 3. logout            9. apply for loan");
		println!(" 4. balance          10. pay loan");
		println!(" 5. deposit          11. update details");
		println!(" 6. withdraw         12. close account");
		println!("13. admin login      16. list accounts");
		println!("14. freeze account   17. view audit log");
		println!("15. unfreeze account  0. quit");

		match prompt("choice: ").as_str() {
			"1" => {
				let name = prompt("owner name: ");
				let password = prompt_password("password: ");
				match bank.register(&name, &password) {
					Ok(account) => println!("account created: {}", account.id),
					Err(e) => println!("error: {}", e),
				}
			}
			"2" => match read_id("account id: ") {
				Some(id) => {
					let password = prompt_password("password: ");
					match bank.authenticate(&id, &password) {
						Ok(account) => {
							println!("welcome, {}", account.owner_name);
							user = Some(account.id);
						}
						Err(e) => println!("error: {}", e),
					}
				}
				None => println!("error: not a valid id"),
			},
			"3" => {
				user = None;
				println!("logged out");
			}
			"4" => with_user(&user, |id| match bank.account(id) {
				Ok(account) => println!("balance: {}", account.balance),
				Err(e) => println!("error: {}", e),
			}),
			"5" => with_user(&user, |id| match read_amount("amount: ") {
				Some(amount) => match bank.deposit(id, &amount) {
					Ok(account) => println!("balance: {}", account.balance),
					Err(e) => println!("error: {}", e),
				},
				None => println!("error: not a valid amount"),
			}),
			"6" => with_user(&user, |id| match read_amount("amount: ") {
				Some(amount) => match bank.withdraw(id, &amount) {
					Ok(account) => println!("balance: {}", account.balance),
					Err(e) => println!("error: {}", e),
				},
				None => println!("error: not a valid amount"),
			}),
			"7" => with_user(&user, |id| {
				let to = match read_id("destination account id: ") {
					Some(to) => to,
					None => return println!("error: not a valid id"),
				};
				match read_amount("amount: ") {
					Some(amount) => match bank.transfer(id, &to, &amount) {
						Ok((from, _)) => println!("balance: {}", from.balance),
						Err(e) => println!("error: {}", e),
					},
					None => println!("error: not a valid amount"),
				}
			}),
			"8" => with_user(&user, |id| match bank.statement(id) {
				Ok(transactions) => {
					for t in &transactions {
						let related = t
							.related_account_id
							.map(|r| format!(" ({})", r))
							.unwrap_or_default();
						println!("{}  {:<12} {}{}", t.created_at.to_rfc3339(), t.transaction_type, t.amount, related);
					}
					println!("{} transaction(s)", transactions.len());
				}
				Err(e) => println!("error: {}", e),
			}),
			"9" => with_user(&user, |id| match read_amount("principal: ") {
				Some(principal) => match bank.apply_loan(id, &principal) {
					Ok(loan) => println!("loan issued: {} outstanding {}", loan.id, loan.balance),
					Err(e) => println!("error: {}", e),
				},
				None => println!("error: not a valid amount"),
			}),
			"10" => with_user(&user, |id| {
				match bank.loans(id) {
					Ok(loans) => {
						for l in &loans {
							println!("{}  outstanding {}  {}", l.id, l.balance, l.status);
						}
					}
					Err(e) => return println!("error: {}", e),
				}
				let loan_id = match read_id("loan id: ") {
					Some(loan_id) => loan_id,
					None => return println!("error: not a valid id"),
				};
				match read_amount("amount: ") {
					Some(amount) => match bank.pay_loan(&loan_id, &amount) {
						Ok(loan) => println!("outstanding: {} ({})", loan.balance, loan.status),
						Err(e) => println!("error: {}", e),
					},
					None => println!("error: not a valid amount"),
				}
			}),
			"11" => with_user(&user, |id| {
				let name = prompt("new owner name (blank to keep): ");
				let password = prompt_password("new password (blank to keep): ");
				let name = if name.is_empty() { None } else { Some(name.as_str()) };
				let password = if password.is_empty() { None } else { Some(password.as_str()) };
				match bank.update_details(id, name, password) {
					Ok(_) => println!("details updated"),
					Err(e) => println!("error: {}", e),
				}
			}),
			"12" => {
				if let Some(id) = user {
					match bank.close_account(&id) {
						Ok(_) => {
							println!("account closed");
							user = None;
						}
						Err(e) => println!("error: {}", e),
					}
				} else {
					println!("log in first");
				}
			}
			"13" => {
				let username = prompt("admin username: ");
				let password = prompt_password("admin password: ");
				match admin.login(&username, &password) {
					Ok(session) => {
						println!("admin session open for {}", session.username);
						admin_session = Some(session);
					}
					Err(e) => println!("error: {}", e),
				}
			}
			"14" => with_admin(&admin_session, |session| match read_id("account id: ") {
				Some(id) => match admin.freeze(session, &id) {
					Ok(account) => println!("account {} is now {}", account.id, account.status),
					Err(e) => println!("error: {}", e),
				},
				None => println!("error: not a valid id"),
			}),
			"15" => with_admin(&admin_session, |session| match read_id("account id: ") {
				Some(id) => match admin.unfreeze(session, &id) {
					Ok(account) => println!("account {} is now {}", account.id, account.status),
					Err(e) => println!("error: {}", e),
				},
				None => println!("error: not a valid id"),
			}),
			"16" => with_admin(&admin_session, |_| {
				let (accounts, total) = admin.accounts();
				println!("{:<38} {:<10} {:<8} owner", "account", "balance", "status");
				for a in &accounts {
					println!("{:<38} {:<10} {:<8} {}", a.id, a.balance, a.status, a.owner_name);
				}
				println!("total held by the bank: {}", total);
			}),
			"17" => with_admin(&admin_session, |_| {
				let actor = prompt("filter by actor (blank for all): ");
				let action = prompt("filter by action (blank for all): ");
				let filter = Filter {
					actor: if actor.is_empty() { None } else { Some(actor) },
					action: if action.is_empty() { None } else { Some(action) },
				};
				match admin.audit_log(&filter) {
					Ok(entries) => {
						for e in &entries {
							println!("{} | {} | {} | {}", e.timestamp.to_rfc3339(), e.actor, e.action, e.detail);
						}
						println!("{} entries", entries.len());
					}
					Err(e) => println!("error: {}", e),
				}
			}),
			"0" => {
				println!("goodbye");
				return;
			}
			other => println!("error: invalid choice {:?}", other),
		}
	}
}

fn with_user(user: &Option<Id>, f: impl FnOnce(&Id)) {
	match user {
		Some(id) => f(id),
		None => println!("log in first"),
	}
}

fn with_admin(session: &Option<admin::Session>, f: impl FnOnce(&admin::Session)) {
	match session {
		Some(session) => f(session),
		None => println!("admin login first"),
	}
}

fn prompt(label: &str) -> String {
	print!("{}", label);
	io::stdout().flush().ok();
	let mut line = String::new();
	io::stdin().read_line(&mut line).unwrap_or(0);
	line.trim().to_owned()
}

fn prompt_password(label: &str) -> String {
	rpassword::prompt_password(label).unwrap_or_default()
}

fn read_id(label: &str) -> Option<Id> {
	Id::parse_str(&prompt(label)).ok()
}

fn read_amount(label: &str) -> Option<BigDecimal> {
	BigDecimal::from_str(&prompt(label)).ok()
}
