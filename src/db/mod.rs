//! Credential persistence.
//!
//! A plain string key/value store plus typed helpers that read and write the
//! three credential fields as one record.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::CredentialRecord;

/// Credential key names as constants.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "strava_token";
    pub const REFRESH_TOKEN: &str = "strava_refresh_token";
    /// Unix seconds, stored as a decimal string
    pub const EXPIRES_AT: &str = "strava_token_expiration";

    pub const ALL: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, EXPIRES_AT];
}

/// Durable string key/value storage.
///
/// Values are opaque; callers own the schema. The batch operations must be
/// atomic with respect to concurrent readers.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_many(&[key]).await?.pop().flatten())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value)]).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.delete_many(&[key]).await
    }

    /// Read several entries from one consistent snapshot, in `keys` order.
    async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StoreError>;

    /// Write several entries at once.
    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    /// Remove several entries at once. Missing keys are not an error.
    async fn delete_many(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// Load the full credential record.
///
/// Returns `None` unless all three fields are present and the expiry parses;
/// a partial record is never returned.
pub async fn load_credentials(
    store: &dyn CredentialStore,
) -> Result<Option<CredentialRecord>, StoreError> {
    let mut values = store.get_many(&keys::ALL).await?.into_iter();
    let access_token = values.next().flatten();
    let refresh_token = values.next().flatten();
    let expires_at = values.next().flatten();

    match (access_token, refresh_token, expires_at) {
        (Some(access_token), Some(refresh_token), Some(expires_at)) => {
            match expires_at.trim().parse::<i64>() {
                Ok(expires_at) => Ok(Some(CredentialRecord {
                    access_token,
                    refresh_token,
                    expires_at,
                })),
                Err(_) => {
                    tracing::warn!(value = %expires_at, "Stored token expiry is not an integer");
                    Ok(None)
                }
            }
        }
        (None, None, None) => Ok(None),
        _ => {
            tracing::warn!("Partial credential record in store, treating as absent");
            Ok(None)
        }
    }
}

/// Persist the full credential record in one batch.
pub async fn save_credentials(
    store: &dyn CredentialStore,
    record: &CredentialRecord,
) -> Result<(), StoreError> {
    let expires_at = record.expires_at.to_string();
    store
        .set_many(&[
            (keys::ACCESS_TOKEN, record.access_token.as_str()),
            (keys::REFRESH_TOKEN, record.refresh_token.as_str()),
            (keys::EXPIRES_AT, expires_at.as_str()),
        ])
        .await
}

/// Remove every credential field.
pub async fn clear_credentials(store: &dyn CredentialStore) -> Result<(), StoreError> {
    store.delete_many(&keys::ALL).await
}
