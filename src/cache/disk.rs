//! Filesystem-backed cache store

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

use crate::cache::CacheLocation;
use crate::error::{MuninnError, Result};
use crate::traits::CacheStore;

/// Cache store rooted at one directory on the local filesystem.
///
/// Entries are plain files; recency comes straight from the filesystem
/// modification time. Writes to different locations are independent;
/// concurrent writes to the same location are last-writer-wins.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Open a store rooted at `root`, creating the directory if missing.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove entries under the root.
    ///
    /// With an extension filter, walks the whole tree and removes the
    /// files whose extension matches. Without one, removes every
    /// top-level entry wholesale. Returns the number of removed items.
    pub async fn wipe(&self, extension: Option<&str>) -> Result<usize> {
        let mut removed = 0;
        match extension {
            None => {
                let mut entries = fs::read_dir(&self.root).await?;
                while let Some(entry) = entries.next_entry().await? {
                    let path = entry.path();
                    if entry.file_type().await?.is_dir() {
                        fs::remove_dir_all(&path).await?;
                    } else {
                        fs::remove_file(&path).await?;
                    }
                    removed += 1;
                }
            }
            Some(extension) => {
                let mut pending = vec![self.root.clone()];
                while let Some(dir) = pending.pop() {
                    let mut entries = fs::read_dir(&dir).await?;
                    while let Some(entry) = entries.next_entry().await? {
                        let path = entry.path();
                        if entry.file_type().await?.is_dir() {
                            pending.push(path);
                        } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                            fs::remove_file(&path).await?;
                            removed += 1;
                        }
                    }
                }
            }
        }
        Ok(removed)
    }

    /// List the files directly inside a subdirectory of the root,
    /// skipping hidden entries.
    pub async fn list(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let target = self.guarded(dir.as_ref())?;
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&target).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            if entry.file_type().await?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Absolute path under the root, refusing anything that would step
    /// outside it.
    fn guarded(&self, relative: &Path) -> Result<PathBuf> {
        let escapes = relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir));
        if escapes {
            return Err(MuninnError::Location(relative.display().to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn write(&self, location: &CacheLocation, bytes: &[u8]) -> Result<()> {
        let path = self.guarded(location.as_path())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn read(&self, location: &CacheLocation) -> Result<Option<Vec<u8>>> {
        let path = self.guarded(location.as_path())?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn modified_at(&self, location: &CacheLocation) -> Result<Option<SystemTime>> {
        let path = self.guarded(location.as_path())?;
        match fs::metadata(&path).await {
            Ok(metadata) => Ok(Some(metadata.modified()?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        let target = self.guarded(path)?;
        fs::create_dir_all(&target).await?;
        Ok(())
    }
}

/// Store used when the real cache directory cannot be created.
///
/// Every read misses and every write is accepted and discarded. The
/// engine keeps working network-only and the retry queue holds its
/// state in memory for the life of the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl CacheStore for NullStore {
    async fn write(&self, _location: &CacheLocation, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn read(&self, _location: &CacheLocation) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn modified_at(&self, _location: &CacheLocation) -> Result<Option<SystemTime>> {
        Ok(None)
    }

    async fn ensure_dir(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
