use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use log::{error, info};

use crate::config::Config;
use crate::store;

/// Takes timestamped snapshots of the store files
///
/// Backup failures are reported, never fatal to the running session
pub struct Manager {
	files: Vec<PathBuf>,
	backup_dir: PathBuf,
}

impl Manager {
	pub fn new(config: &Config) -> Self {
		Manager {
			files: vec![
				config.accounts_file(),
				config.transactions_file(),
				config.loans_file(),
			],
			backup_dir: config.backup_dir(),
		}
	}

	/// Copy the current store files into a new timestamp-named directory
	///
	/// Store files that do not exist yet are simply not part of the snapshot
	pub fn run_backup(&self) -> store::Result<PathBuf> {
		let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
		let snapshot_dir = self.backup_dir.join(stamp);
		fs::create_dir_all(&snapshot_dir)?;

		for file in &self.files {
			if !file.exists() {
				continue;
			}
			let name = file
				.file_name()
				.ok_or_else(|| store::Error::Io(format!("store file has no name: {}", file.display())))?;
			fs::copy(file, snapshot_dir.join(name))?;
		}

		info!("backup written to {}", snapshot_dir.display());
		Ok(snapshot_dir)
	}

	/// Run backups on an interval in a background thread
	///
	/// Failures are forwarded over the returned channel instead of being
	/// raised into the interactive session
	pub fn spawn(self, interval: Duration) -> (thread::JoinHandle<()>, mpsc::Receiver<store::Error>) {
		let (sender, receiver) = mpsc::channel();
		let handle = thread::spawn(move || loop {
			thread::sleep(interval);
			if let Err(e) = self.run_backup() {
				error!("periodic backup failed: {}", e);
				if sender.send(e).is_err() {
					// nobody is listening anymore
					return;
				}
			}
		});
		(handle, receiver)
	}
}

#[cfg(test)]
mod tests {
	use bigdecimal::BigDecimal;

	use crate::account::NewAccount;
	use crate::testutil::Fixture;

	use super::*;

	#[test]
	fn snapshot_matches_live_store() {
		let f = Fixture::new();
		let accounts = f.account_repo();
		let account = accounts
			.create(NewAccount {
				owner_name: "Bob Roberts",
				password_hash: "feed",
			})
			.unwrap();
		accounts.increment(&account.id, &BigDecimal::from(125)).unwrap();

		let manager = Manager::new(&f.config);
		let snapshot_dir = manager.run_backup().unwrap();

		let copied = crate::account::Repo::open(snapshot_dir.join("accounts.csv")).unwrap();
		let got = copied.find_by_id(&account.id).unwrap();
		assert_eq!(got.balance, BigDecimal::from(125));
	}

	#[test]
	fn missing_store_files_are_skipped() {
		let f = Fixture::new();
		let manager = Manager::new(&f.config);
		let snapshot_dir = manager.run_backup().unwrap();

		assert!(snapshot_dir.exists());
		assert!(!snapshot_dir.join("accounts.csv").exists());
	}
}
