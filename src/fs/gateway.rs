//! Boundaries between the tree and the disk.
//!
//! The store never reads the filesystem itself; it goes through these traits.
//! `LocalGateway` is the tokio-backed implementation used by the app.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::fs::node::DirEntry;
use crate::fs::path;

/// Default name for files created from the tree.
pub const DEFAULT_NEW_FILE_NAME: &str = "untitled.md";
/// Default name for directories created from the tree.
pub const DEFAULT_NEW_DIRECTORY_NAME: &str = "untitled";
/// Give up deduping a name after this many attempts.
const MAX_DEDUPE_ATTEMPTS: usize = 1000;

/// One-level directory listing.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// List the immediate children of `dir`. Fails if `dir` does not exist
    /// or is not a directory.
    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>>;
}

/// Disk mutations. Each returns the canonical path it produced, which may
/// differ from the requested one when the name had to be deduped.
#[async_trait]
pub trait MutationGateway: Send + Sync {
    async fn create_file(&self, parent: &str) -> Result<String>;
    async fn create_directory(&self, parent: &str) -> Result<String>;
    async fn rename(&self, from: &str, to: &str) -> Result<String>;
    async fn delete_file(&self, target: &str) -> Result<()>;
    async fn delete_directory(&self, target: &str) -> Result<()>;
}

/// `name` with a ` (n)` suffix placed before the extension.
///
/// `untitled.md` → `untitled (1).md`; dotfiles and extensionless names get
/// the suffix at the end.
pub fn deduped_name(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{name} ({n})"),
    }
}

/// Gateway backed by the local filesystem through `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalGateway {
    new_file_name: String,
    new_directory_name: String,
}

impl Default for LocalGateway {
    fn default() -> Self {
        Self::new(DEFAULT_NEW_FILE_NAME, DEFAULT_NEW_DIRECTORY_NAME)
    }
}

impl LocalGateway {
    pub fn new(new_file_name: &str, new_directory_name: &str) -> Self {
        Self {
            new_file_name: new_file_name.to_string(),
            new_directory_name: new_directory_name.to_string(),
        }
    }

    /// First path in `dir` named `name`, `name (1)`, `name (2)`, … that does
    /// not exist yet.
    async fn unique_path(dir: &Path, name: &str) -> Result<PathBuf> {
        let candidate = dir.join(name);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        for i in 1..=MAX_DEDUPE_ATTEMPTS {
            let candidate = dir.join(deduped_name(name, i));
            if !tokio::fs::try_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", name, dir.display()),
        )
        .into())
    }
}

fn to_tree_path(p: &Path) -> String {
    path::normalize(&p.to_string_lossy())
}

#[async_trait]
impl DirectoryGateway for LocalGateway {
    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let mut read_dir = tokio::fs::read_dir(dir).await?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let entry_path = entry.path();
            // Follow symlinks for the kind; broken links list as files.
            let is_directory = tokio::fs::metadata(&entry_path)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path: to_tree_path(&entry_path),
                is_directory,
            });
        }
        debug!(dir, count = entries.len(), "listed directory");
        Ok(entries)
    }
}

#[async_trait]
impl MutationGateway for LocalGateway {
    async fn create_file(&self, parent: &str) -> Result<String> {
        let target = Self::unique_path(Path::new(parent), &self.new_file_name).await?;
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        debug!(path = %target.display(), "created file");
        Ok(to_tree_path(&target))
    }

    async fn create_directory(&self, parent: &str) -> Result<String> {
        let target = Self::unique_path(Path::new(parent), &self.new_directory_name).await?;
        tokio::fs::create_dir(&target).await?;
        debug!(path = %target.display(), "created directory");
        Ok(to_tree_path(&target))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<String> {
        if path::normalize(from) == path::normalize(to) {
            return Ok(path::normalize(to));
        }
        let requested = Path::new(to);
        let (Some(dir), Some(name)) = (requested.parent(), requested.file_name()) else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{to} has no file name"),
            )
            .into());
        };
        let target = Self::unique_path(dir, &name.to_string_lossy()).await?;
        tokio::fs::rename(from, &target).await?;
        debug!(from, to = %target.display(), "renamed");
        Ok(to_tree_path(&target))
    }

    async fn delete_file(&self, target: &str) -> Result<()> {
        tokio::fs::remove_file(target).await?;
        debug!(path = target, "deleted file");
        Ok(())
    }

    async fn delete_directory(&self, target: &str) -> Result<()> {
        tokio::fs::remove_dir_all(target).await?;
        debug!(path = target, "deleted directory");
        Ok(())
    }
}
