//! Content hashing for change detection.

use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a file's bytes, streamed so large documents do
/// not load into memory.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_known_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("hello.txt");
        fs::write(&path, "hello world").unwrap();

        assert_eq!(
            sha256_file(&path).unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_same_bytes_same_digest() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "identical content").unwrap();
        fs::write(&b, "identical content").unwrap();

        assert_eq!(sha256_file(&a).unwrap(), sha256_file(&b).unwrap());
    }

    #[test]
    fn test_changed_bytes_change_digest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.txt");

        fs::write(&path, "version one").unwrap();
        let before = sha256_file(&path).unwrap();

        fs::write(&path, "version two").unwrap();
        let after = sha256_file(&path).unwrap();

        assert_ne!(before, after);
    }

    #[test]
    fn test_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        assert!(sha256_file(&temp.path().join("gone.txt")).is_err());
    }
}
