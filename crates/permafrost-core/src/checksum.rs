//! Content checksums for freeze snapshots.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// SHA-256 hex digest of a file's full byte content.
///
/// Deterministic across platforms and runs: identical bytes always produce
/// the identical 64-character lowercase digest. No side effects; an
/// unreadable file propagates its I/O error.
pub fn checksum_file(path: &Path) -> Result<String, io::Error> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let digest = hex::encode(hasher.finalize());
    debug!("checksum of {} is {digest}", path.display());
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, "").unwrap();
        assert_eq!(
            checksum_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_content_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            checksum_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn identical_content_yields_identical_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "alpha==1.0\nbeta==2.0\n").unwrap();
        fs::write(&b, "alpha==1.0\nbeta==2.0\n").unwrap();
        assert_eq!(checksum_file(&a).unwrap(), checksum_file(&b).unwrap());
    }

    #[test]
    fn single_byte_change_flips_the_digest() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::write(&a, "alpha==1.0\n").unwrap();
        fs::write(&b, "alpha==1.1\n").unwrap();
        assert_ne!(checksum_file(&a).unwrap(), checksum_file(&b).unwrap());
    }

    #[test]
    fn missing_file_propagates_the_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(checksum_file(&dir.path().join("absent")).is_err());
    }
}
