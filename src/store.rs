use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Error that can occur when operating on a backing store file
#[derive(Debug, PartialEq)]
pub enum Error {
	RecordAlreadyExists,
	RecordNotFound,
	Io(String),
	Malformed(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::RecordAlreadyExists => write!(f, "record violates a unique constraint"),
			Error::RecordNotFound => write!(f, "record does not exist"),
			Error::Io(e) => write!(f, "store file error: {}", e),
			Error::Malformed(e) => write!(f, "malformed store record: {}", e),
		}
	}
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
	fn from(e: std::io::Error) -> Self {
		Error::Io(e.to_string())
	}
}

impl From<csv::Error> for Error {
	fn from(e: csv::Error) -> Self {
		Error::Malformed(e.to_string())
	}
}

/// Read every row of a CSV store file
///
/// A store file that does not exist yet is an empty store
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
	if !path.exists() {
		return Ok(Vec::new());
	}
	let mut reader = csv::Reader::from_path(path)?;
	let mut rows = Vec::new();
	for row in reader.deserialize() {
		rows.push(row?);
	}
	Ok(rows)
}

/// Rewrite a CSV store file with the given rows
///
/// Writes to a sibling temp file first and renames it over the live file,
/// so a failed write never truncates existing state
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
	if rows.is_empty() {
		// absent file and empty store are the same thing
		if path.exists() {
			fs::remove_file(path)?;
		}
		return Ok(());
	}
	let tmp = path.with_extension("tmp");
	{
		let mut writer = csv::Writer::from_path(&tmp)?;
		for row in rows {
			writer.serialize(row)?;
		}
		writer.flush().map_err(Error::from)?;
	}
	fs::rename(&tmp, path)?;
	Ok(())
}

/// Append a single row to a CSV store file
///
/// The header row is written only when the file is created
pub fn append_row<T: Serialize>(path: &Path, row: &T) -> Result<()> {
	let write_header = !path.exists();
	let file: File = OpenOptions::new().create(true).append(true).open(path)?;
	let mut writer = csv::WriterBuilder::new()
		.has_headers(write_header)
		.from_writer(file);
	writer.serialize(row)?;
	writer.flush().map_err(Error::from)?;
	Ok(())
}

/// Serde helpers keeping decimal amounts as exact strings in the files
///
/// Going through the default float path would round the values
pub mod decimal_str {
	use std::str::FromStr;

	use bigdecimal::BigDecimal;
	use serde::{Deserialize, Deserializer, Serializer};

	pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(value)
	}

	pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
		let raw = String::deserialize(deserializer)?;
		BigDecimal::from_str(&raw).map_err(serde::de::Error::custom)
	}
}
