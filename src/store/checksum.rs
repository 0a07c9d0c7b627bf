//! SHA-256 checksums for published release files.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Write `<file>.sha` holding the hex SHA-256 of `path`.
///
/// Hashing runs on the blocking pool so large tarballs don't stall the
/// runtime. Returns the path of the checksum file.
pub async fn generate_checksum(path: &Path) -> io::Result<PathBuf> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let digest = sha256_file(&path)?;
        let mut sha_path = path.clone().into_os_string();
        sha_path.push(".sha");
        let sha_path = PathBuf::from(sha_path);
        std::fs::write(&sha_path, format!("{digest}\n"))?;
        log::info!("Checksum {} written to {}", digest, sha_path.display());
        Ok(sha_path)
    })
    .await
    .map_err(io::Error::other)?
}

fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checksum_file_sits_next_to_release() {
        let dir = tempfile::tempdir().unwrap();
        let release = dir.path().join("yugaware-1.0-abc.tar.gz");
        std::fs::write(&release, b"hello world").unwrap();

        let sha_path = generate_checksum(&release).await.unwrap();
        assert_eq!(sha_path, dir.path().join("yugaware-1.0-abc.tar.gz.sha"));
        assert_eq!(
            std::fs::read_to_string(sha_path).unwrap().trim(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(generate_checksum(&dir.path().join("absent")).await.is_err());
    }
}
