// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed credential store.
//!
//! All entries live in one JSON object on disk. Writes go to a sibling temp
//! file that is renamed over the original, so a reader sees either the old or
//! the new map, never a mix.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::CredentialStore;
use crate::error::StoreError;

type Entries = BTreeMap<String, String>;

/// Durable store at a fixed path.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open (or prepare) a store at `path`, creating parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tracing::debug!(path = %path.display(), "Credential store opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the store file with `.tmp` appended to the full name.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn read_entries(&self) -> Result<Entries, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Entries::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StoreError> {
        if entries.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, json).await?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let entries = self.read_entries().await?;
        Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    async fn set_many(&self, new_entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        for (key, value) in new_entries {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        self.write_entries(&entries).await
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}
