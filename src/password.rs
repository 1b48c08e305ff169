use sha2::{Digest, Sha256};

/// One-way hash of a password
///
/// Plaintext is never stored, recovered, or written to the audit trail
pub fn hash(password: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(password.as_bytes());
	hex::encode(hasher.finalize())
}

pub fn verify(password: &str, hashed: &str) -> bool {
	hash(password) == hashed
}
