//! Content-addressed object storage for uploaded photos
//!
//! Files are keyed by their SHA-256 hash and laid out two levels deep:
//! hash "abcd1234..." lives at "objects/ab/cd/abcd1234...".

use crate::error::{AppError, Result};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Content-addressed blob store
#[derive(Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Blob store initialized at: {:?}", self.root);
        Ok(())
    }

    /// Store bytes, returning their hash. Identical uploads share one file.
    pub async fn write(&self, data: &[u8]) -> Result<String> {
        let hash = hash_bytes(data);
        let path = self.get_path(&hash)?;

        if fs::try_exists(&path).await? {
            tracing::debug!("Blob already exists: {}", hash);
            return Ok(hash);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write-then-rename so readers never see a partial file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        fs::rename(temp_path, &path).await?;

        tracing::debug!("Wrote blob: {} ({} bytes)", hash, data.len());

        Ok(hash)
    }

    pub async fn read(&self, hash: &str) -> Result<Vec<u8>> {
        let path = self.get_path(hash)?;

        if !fs::try_exists(&path).await? {
            return Err(AppError::NotFound(format!("Blob not found: {}", hash)));
        }

        let data = fs::read(&path).await?;
        tracing::debug!("Read blob: {} ({} bytes)", hash, data.len());

        Ok(data)
    }

    pub async fn exists(&self, hash: &str) -> Result<bool> {
        match self.get_path(hash) {
            Ok(path) => Ok(fs::try_exists(&path).await?),
            Err(_) => Ok(false),
        }
    }

    /// Delete a blob; deleting a missing blob is a no-op
    pub async fn delete(&self, hash: &str) -> Result<()> {
        let path = self.get_path(hash)?;

        if !fs::try_exists(&path).await? {
            return Ok(());
        }

        fs::remove_file(&path).await?;
        tracing::debug!("Deleted blob: {}", hash);

        Ok(())
    }

    /// Resolve the on-disk path, refusing anything that is not a hash.
    /// Hashes arrive from URLs, so this is also the traversal guard.
    fn get_path(&self, hash: &str) -> Result<PathBuf> {
        if !is_valid_hash(hash) {
            return Err(AppError::BlobStore(format!("Invalid blob hash: {:?}", hash)));
        }
        Ok(self.root.join(&hash[0..2]).join(&hash[2..4]).join(hash))
    }
}

/// SHA-256 of the data as lowercase hex
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

fn is_valid_hash(hash: &str) -> bool {
    hash.len() == 64 && hash.chars().all(|c| c.is_ascii_hexdigit())
}
