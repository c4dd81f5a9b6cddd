//! One-way digest for refresh-token storage.

use sha2::{Digest, Sha256};

/// Lowercase-hex SHA-256 of a token.
///
/// The raw refresh token never touches the store; only this digest is
/// persisted, and an incoming token is compared by recomputing it.
pub fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write as _;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
