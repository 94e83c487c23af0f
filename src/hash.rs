use sha2::{Digest, Sha256};

use crate::constants::pages::PAGE_FILE_EXTENSION;

/// Lowercase hex SHA-256 digest of `value`'s UTF-8 bytes.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Content-addressed filename holding the page named `page_key`.
pub fn page_file_name(page_key: &str) -> String {
    format!("{}.{PAGE_FILE_EXTENSION}", sha256_hex(page_key))
}
