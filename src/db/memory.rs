// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory credential store for tests and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::CredentialStore;
use crate::error::StoreError;

/// Non-durable store backed by a map behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError> {
        let map = self.entries.read().await;
        Ok(keys.iter().map(|key| map.get(*key).cloned()).collect())
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        let mut map = self.entries.write().await;
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut map = self.entries.write().await;
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}
