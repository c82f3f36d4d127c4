use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

use crate::content_type::ContentType;

pub const TOKEN_LEN: usize = 16;

/// Random token plus the extension for `content_type`.
///
/// An unrecognized label yields a name with no extension; validate with
/// [`crate::content_type::is_allowed`] first.
pub fn generate_filename(content_type: &str) -> String {
    let ext = ContentType::parse(content_type)
        .map(ContentType::extension)
        .unwrap_or("");
    format!("{}{ext}", random_token())
}

/// Names an asset by the SHA-256 of its bytes, so identical uploads share a name.
pub fn content_addressed_filename(bytes: &[u8], content_type: ContentType) -> String {
    format!("{}{}", compute_hash(bytes), content_type.extension())
}

pub fn compute_hash(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    let digest = hasher.finalize();
    hex::encode(digest)
}

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
