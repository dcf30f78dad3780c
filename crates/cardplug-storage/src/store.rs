#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::whitelist::Whitelist;
use cardplug_core::constants::TEMP_FILE_SUFFIX;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Durable home of the whitelist.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// so implementations are used through generics rather than trait objects.
pub trait WhitelistStore: Send + Sync {
    /// Read the durable set.
    ///
    /// Never fails: missing or unreadable storage yields an empty whitelist
    /// and malformed entries are skipped, each reported through logging.
    async fn load(&self) -> Whitelist;

    /// Read the durable set again while running.
    ///
    /// Unlike [`load`](Self::load), unreadable storage is an error, so the
    /// caller can keep the set it already holds.
    async fn reload(&self) -> StorageResult<Whitelist>;

    /// Replace the durable set with `whitelist`.
    ///
    /// Readers observe either the previous or the new contents, never a mix.
    async fn save(&self, whitelist: &Whitelist) -> StorageResult<()>;
}

/// Whitelist kept in a newline-delimited text file.
#[derive(Debug, Clone)]
pub struct FileWhitelistStore {
    path: PathBuf,
}

impl FileWhitelistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file written before the atomic rename (`whitelist.txt.tmp`).
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".");
        name.push(TEMP_FILE_SUFFIX);
        self.path.with_file_name(name)
    }

    /// Read the file, distinguishing an absent file from a corrupt one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupt` if the file exists but cannot be read
    /// or is not valid UTF-8. Malformed lines are not errors; they are logged
    /// and skipped.
    pub async fn read(&self) -> StorageResult<Whitelist> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No whitelist file, starting empty");
                return Ok(Whitelist::new());
            }
            Err(e) => return Err(StorageError::corrupt(&self.path, e.to_string())),
        };

        let text = String::from_utf8(bytes)
            .map_err(|e| StorageError::corrupt(&self.path, e.to_string()))?;

        let (whitelist, skipped) = Whitelist::parse(&text);
        for entry in &skipped {
            warn!(
                path = %self.path.display(),
                line = entry.line,
                content = %entry.content,
                "Skipping malformed whitelist entry"
            );
        }

        Ok(whitelist)
    }
}

impl WhitelistStore for FileWhitelistStore {
    async fn load(&self) -> Whitelist {
        match self.read().await {
            Ok(whitelist) => {
                debug!(path = %self.path.display(), cards = whitelist.len(), "Whitelist loaded");
                whitelist
            }
            Err(e) => {
                warn!(error = %e, "Whitelist unreadable, treating as empty");
                Whitelist::new()
            }
        }
    }

    async fn reload(&self) -> StorageResult<Whitelist> {
        self.read().await
    }

    async fn save(&self, whitelist: &Whitelist) -> StorageResult<()> {
        let temp_path = self.temp_path();
        let persist = |e: std::io::Error| StorageError::persistence(&self.path, e);

        let mut file = tokio::fs::File::create(&temp_path).await.map_err(persist)?;
        file.write_all(whitelist.render().as_bytes())
            .await
            .map_err(persist)?;
        file.sync_all().await.map_err(persist)?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(persist(e));
        }

        debug!(path = %self.path.display(), cards = whitelist.len(), "Whitelist saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_is_sibling() {
        let store = FileWhitelistStore::new("/var/lib/cardplug/whitelist.txt");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/var/lib/cardplug/whitelist.txt.tmp")
        );
    }
}
