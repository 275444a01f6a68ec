//! Source content digests (versioned).
//!
//! `metadata.content_hash` identifies the exact SQL source a compilation run
//! was built from. It depends only on the bytes of the SQL file, so two runs
//! over byte-identical input agree and any edit to the source changes it.
//!
//! - algorithm: **SHA-256**
//! - input: the UTF-8 bytes of the SQL file as-read
//! - output: `"sha256:<64 lowercase hex digits>"`

use sha2::{Digest, Sha256};

/// Prefix used in serialized content hashes.
pub const CONTENT_HASH_V1_PREFIX: &str = "sha256:";

/// Compute the v1 content hash for arbitrary bytes.
pub fn content_hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();

    let mut out = String::with_capacity(CONTENT_HASH_V1_PREFIX.len() + 64);
    out.push_str(CONTENT_HASH_V1_PREFIX);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Compute the v1 content hash for a SQL source file.
pub fn content_hash_v1(text: &str) -> String {
    content_hash_bytes(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_has_expected_prefix_and_width() {
        let h = content_hash_v1("CREATE TABLE t (id INT);");
        assert!(h.starts_with(CONTENT_HASH_V1_PREFIX));
        assert_eq!(h.len(), CONTENT_HASH_V1_PREFIX.len() + 64);
    }

    #[test]
    fn hash_of_empty_input_is_known_value() {
        assert_eq!(
            content_hash_v1(""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_changes_when_source_changes() {
        assert_ne!(content_hash_v1("a"), content_hash_v1("a "));
        assert_eq!(content_hash_v1("same"), content_hash_v1("same"));
    }
}
