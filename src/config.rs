use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

const ACCOUNTS_FILE: &str = "accounts.csv";
const TRANSACTIONS_FILE: &str = "transactions.csv";
const LOANS_FILE: &str = "loans.csv";
const ADMINS_FILE: &str = "admins.json";
const AUDIT_LOG_FILE: &str = "audit.log";
const BACKUP_DIR: &str = "backups";
const DEFAULT_BACKUP_INTERVAL_MINUTES: u64 = 60;

/// Where the store files live and how often they are backed up
#[derive(Debug, Clone)]
pub struct Config {
	pub data_dir: PathBuf,
	pub backup_interval: Duration,
}

impl Config {
	pub fn new(data_dir: impl Into<PathBuf>) -> Self {
		Config {
			data_dir: data_dir.into(),
			backup_interval: Duration::from_secs(DEFAULT_BACKUP_INTERVAL_MINUTES * 60),
		}
	}

	/// Build a config from the environment
	///
	/// `TELLER_DATA_DIR` names the data directory (default `./data`);
	/// `TELLER_BACKUP_INTERVAL_MINUTES` overrides the backup interval.
	/// Loads a `.env` file from the working directory when present.
	pub fn from_env() -> Self {
		dotenv::dotenv().ok();

		let data_dir = env::var("TELLER_DATA_DIR").unwrap_or_else(|_| "data".to_owned());
		let mut config = Config::new(data_dir);

		if let Ok(raw) = env::var("TELLER_BACKUP_INTERVAL_MINUTES") {
			match raw.parse::<u64>() {
				Ok(minutes) if minutes > 0 => {
					config.backup_interval = Duration::from_secs(minutes * 60);
				}
				_ => warn!(
					"ignoring invalid TELLER_BACKUP_INTERVAL_MINUTES={:?}, keeping {} minutes",
					raw,
					config.backup_interval.as_secs() / 60
				),
			}
		}
		config
	}

	pub fn accounts_file(&self) -> PathBuf {
		self.data_dir.join(ACCOUNTS_FILE)
	}

	pub fn transactions_file(&self) -> PathBuf {
		self.data_dir.join(TRANSACTIONS_FILE)
	}

	pub fn loans_file(&self) -> PathBuf {
		self.data_dir.join(LOANS_FILE)
	}

	pub fn admins_file(&self) -> PathBuf {
		self.data_dir.join(ADMINS_FILE)
	}

	pub fn audit_log_file(&self) -> PathBuf {
		self.data_dir.join(AUDIT_LOG_FILE)
	}

	pub fn backup_dir(&self) -> PathBuf {
		self.data_dir.join(BACKUP_DIR)
	}
}
