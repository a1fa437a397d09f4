//! In-memory gateway for exercising the tree without a disk.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::fs::gateway::{
    deduped_name, DirectoryGateway, MutationGateway, DEFAULT_NEW_DIRECTORY_NAME,
    DEFAULT_NEW_FILE_NAME,
};
use crate::fs::node::DirEntry;
use crate::fs::path;

/// A fake filesystem: path → is_directory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    entries: Mutex<BTreeMap<String, bool>>,
    failing: Mutex<HashSet<String>>,
    failing_lists: Mutex<HashSet<String>>,
}

fn io_error(kind: std::io::ErrorKind, msg: String) -> crate::error::AppError {
    std::io::Error::new(kind, msg).into()
}

impl MemoryGateway {
    pub fn new(root: &str) -> Self {
        let gateway = Self::default();
        gateway.insert(root, true);
        gateway
    }

    pub fn with_file(self, p: &str) -> Self {
        self.insert(p, false);
        self
    }

    pub fn with_dir(self, p: &str) -> Self {
        self.insert(p, true);
        self
    }

    fn insert(&self, p: &str, is_directory: bool) {
        self.entries
            .lock()
            .unwrap()
            .insert(path::normalize(p), is_directory);
    }

    /// Make every operation touching `p` fail with permission denied.
    pub fn fail_on(&self, p: &str) {
        self.failing.lock().unwrap().insert(path::normalize(p));
    }

    /// Make only listings of `p` fail; mutations inside it still succeed.
    pub fn fail_list_on(&self, p: &str) {
        self.failing_lists.lock().unwrap().insert(path::normalize(p));
    }

    pub fn exists(&self, p: &str) -> bool {
        self.entries.lock().unwrap().contains_key(p)
    }

    fn check(&self, p: &str) -> Result<()> {
        if self.failing.lock().unwrap().contains(p) {
            return Err(io_error(
                std::io::ErrorKind::PermissionDenied,
                format!("permission denied: {p}"),
            ));
        }
        Ok(())
    }

    fn unique(&self, dir: &str, name: &str) -> String {
        let entries = self.entries.lock().unwrap();
        let candidate = path::join(dir, name);
        if !entries.contains_key(&candidate) {
            return candidate;
        }
        (1..)
            .map(|i| path::join(dir, &deduped_name(name, i)))
            .find(|candidate| !entries.contains_key(candidate))
            .unwrap_or(candidate)
    }

    fn require_dir(&self, p: &str) -> Result<()> {
        match self.entries.lock().unwrap().get(p) {
            Some(true) => Ok(()),
            Some(false) => Err(io_error(
                std::io::ErrorKind::Other,
                format!("not a directory: {p}"),
            )),
            None => Err(io_error(
                std::io::ErrorKind::NotFound,
                format!("no such directory: {p}"),
            )),
        }
    }
}

#[async_trait]
impl DirectoryGateway for MemoryGateway {
    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        self.check(dir)?;
        if self.failing_lists.lock().unwrap().contains(dir) {
            return Err(io_error(
                std::io::ErrorKind::Other,
                format!("listing failed: {dir}"),
            ));
        }
        self.require_dir(dir)?;
        let entries = self.entries.lock().unwrap();
        // Reverse order so callers cannot rely on listing order.
        Ok(entries
            .iter()
            .rev()
            .filter(|(p, _)| p.as_str() != dir && path::parent_directory_path(p) == dir)
            .map(|(p, is_directory)| DirEntry {
                name: path::last_segment(p).to_string(),
                path: p.clone(),
                is_directory: *is_directory,
            })
            .collect())
    }
}

#[async_trait]
impl MutationGateway for MemoryGateway {
    async fn create_file(&self, parent: &str) -> Result<String> {
        self.check(parent)?;
        self.require_dir(parent)?;
        let created = self.unique(parent, DEFAULT_NEW_FILE_NAME);
        self.insert(&created, false);
        Ok(created)
    }

    async fn create_directory(&self, parent: &str) -> Result<String> {
        self.check(parent)?;
        self.require_dir(parent)?;
        let created = self.unique(parent, DEFAULT_NEW_DIRECTORY_NAME);
        self.insert(&created, true);
        Ok(created)
    }

    async fn rename(&self, from: &str, to: &str) -> Result<String> {
        self.check(from)?;
        if !self.exists(from) {
            return Err(io_error(
                std::io::ErrorKind::NotFound,
                format!("no such entry: {from}"),
            ));
        }
        if from == to {
            return Ok(to.to_string());
        }
        let target = self.unique(&path::parent_directory_path(to), path::last_segment(to));
        let mut entries = self.entries.lock().unwrap();
        let moved: Vec<(String, bool)> = entries
            .iter()
            .filter(|(p, _)| path::is_within(p, from))
            .map(|(p, d)| (p.clone(), *d))
            .collect();
        for (old, is_directory) in moved {
            entries.remove(&old);
            let suffix = path::relative_to(&old, from).unwrap_or("");
            entries.insert(format!("{target}{suffix}"), is_directory);
        }
        Ok(target)
    }

    async fn delete_file(&self, target: &str) -> Result<()> {
        self.check(target)?;
        match self.entries.lock().unwrap().remove(target) {
            Some(_) => Ok(()),
            None => Err(io_error(
                std::io::ErrorKind::NotFound,
                format!("no such file: {target}"),
            )),
        }
    }

    async fn delete_directory(&self, target: &str) -> Result<()> {
        self.check(target)?;
        self.require_dir(target)?;
        self.entries
            .lock()
            .unwrap()
            .retain(|p, _| !path::is_within(p, target));
        Ok(())
    }
}
