use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::warn;

use crate::store;
use crate::types::{self, Time};

/// One line of the audit trail
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
	pub timestamp: Time,
	pub actor: String,
	pub action: String,
	pub detail: String,
}

/// Criteria for narrowing an audit trail read
#[derive(Debug, Default)]
pub struct Filter {
	pub actor: Option<String>,
	pub action: Option<String>,
}

impl Filter {
	fn matches(&self, entry: &Entry) -> bool {
		if let Some(actor) = &self.actor {
			if entry.actor != *actor {
				return false;
			}
		}
		if let Some(action) = &self.action {
			if entry.action != *action {
				return false;
			}
		}
		true
	}
}

/// Append-only audit trail
///
/// Every attempted action gets one line, success or failure:
/// `timestamp | actor | action | detail`
pub struct Log {
	path: PathBuf,
}

impl Log {
	pub fn open(path: impl Into<PathBuf>) -> Self {
		Log { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn append(&self, actor: &str, action: &str, detail: &str) -> store::Result<()> {
		let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
		writeln!(
			file,
			"{} | {} | {} | {}",
			types::now().to_rfc3339(),
			actor,
			action,
			detail
		)?;
		Ok(())
	}

	/// Read the trail back in written order
	///
	/// Lines that fail to parse are reported and skipped rather than
	/// poisoning the whole read
	pub fn entries(&self, filter: &Filter) -> store::Result<Vec<Entry>> {
		if !self.path.exists() {
			return Ok(Vec::new());
		}
		let raw = std::fs::read_to_string(&self.path)?;
		let mut entries = Vec::new();
		for line in raw.lines() {
			match parse_line(line) {
				Some(entry) => {
					if filter.matches(&entry) {
						entries.push(entry);
					}
				}
				None => warn!("skipping malformed audit line: {}", line),
			}
		}
		Ok(entries)
	}
}

fn parse_line(line: &str) -> Option<Entry> {
	let mut parts = line.splitn(4, " | ");
	let timestamp = DateTime::parse_from_rfc3339(parts.next()?)
		.ok()?
		.with_timezone(&Utc);
	Some(Entry {
		timestamp,
		actor: parts.next()?.to_owned(),
		action: parts.next()?.to_owned(),
		detail: parts.next()?.to_owned(),
	})
}

#[cfg(test)]
mod tests {
	use crate::testutil::Fixture;

	use super::*;

	#[test]
	fn append_and_read_back() {
		let f = Fixture::new();
		let log = f.audit_log();

		log.append("bob", "deposit", "amount=100 ok").unwrap();
		log.append("admin:root", "freeze", "account=abc ok").unwrap();

		let got = log.entries(&Filter::default()).unwrap();
		assert_eq!(got.len(), 2);
		assert_eq!(got[0].actor, "bob");
		assert_eq!(got[0].action, "deposit");
		assert_eq!(got[0].detail, "amount=100 ok");
		assert_eq!(got[1].actor, "admin:root");
	}

	#[test]
	fn filter_by_actor_and_action() {
		let f = Fixture::new();
		let log = f.audit_log();

		log.append("bob", "deposit", "ok").unwrap();
		log.append("lucy", "deposit", "ok").unwrap();
		log.append("bob", "withdraw", "ok").unwrap();

		let bob_only = log
			.entries(&Filter {
				actor: Some("bob".to_owned()),
				action: None,
			})
			.unwrap();
		assert_eq!(bob_only.len(), 2);

		let bob_deposits = log
			.entries(&Filter {
				actor: Some("bob".to_owned()),
				action: Some("deposit".to_owned()),
			})
			.unwrap();
		assert_eq!(bob_deposits.len(), 1);
	}

	#[test]
	fn detail_may_contain_separator() {
		let f = Fixture::new();
		let log = f.audit_log();

		log.append("bob", "transfer", "to=x | amount=5").unwrap();
		let got = log.entries(&Filter::default()).unwrap();
		assert_eq!(got[0].detail, "to=x | amount=5");
	}

	#[test]
	fn missing_file_is_empty_trail() {
		let f = Fixture::new();
		let log = f.audit_log();
		assert!(log.entries(&Filter::default()).unwrap().is_empty());
	}
}
