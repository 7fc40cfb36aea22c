//! Repository for login/role entries under `usuarios/`.

use serde_json::Value;

use ipa_core::account::UserAccountEntry;
use ipa_core::paths::{email_account_key, user_path, USERS_ROOT};

use crate::store::{get_children, get_typed, set_typed, RecordStore, StoreError};

pub struct UserRepo;

impl UserRepo {
    /// All accounts, ordered by key.
    pub async fn list(store: &dyn RecordStore) -> Result<Vec<(String, UserAccountEntry)>, StoreError> {
        get_children(store, USERS_ROOT).await
    }

    pub async fn find_by_key(
        store: &dyn RecordStore,
        key: &str,
    ) -> Result<Option<UserAccountEntry>, StoreError> {
        get_typed(store, &user_path(key)).await
    }

    /// `None` as well when the email does not map to a usable key.
    pub async fn find_by_email(
        store: &dyn RecordStore,
        email: &str,
    ) -> Result<Option<UserAccountEntry>, StoreError> {
        match email_account_key(email) {
            Some(key) => Self::find_by_key(store, &key).await,
            None => Ok(None),
        }
    }

    /// Write an entry under the key derived from its email.
    pub async fn save(store: &dyn RecordStore, entry: &UserAccountEntry) -> Result<String, StoreError> {
        let key = entry.key();
        Self::put(store, &key, entry).await?;
        Ok(key)
    }

    /// Overwrite the entry stored under `key`.
    pub async fn put(
        store: &dyn RecordStore,
        key: &str,
        entry: &UserAccountEntry,
    ) -> Result<(), StoreError> {
        set_typed(store, &user_path(key), entry).await
    }

    /// Set only the role field. Returns `false` if the entry does not exist.
    pub async fn set_role(store: &dyn RecordStore, key: &str, role: &str) -> Result<bool, StoreError> {
        if Self::find_by_key(store, key).await?.is_none() {
            return Ok(false);
        }
        let path = format!("{}/rol", user_path(key));
        store.set(&path, Value::from(role)).await?;
        Ok(true)
    }

    /// Delete an entry. Returns `false` if it did not exist.
    pub async fn delete(store: &dyn RecordStore, key: &str) -> Result<bool, StoreError> {
        let path = user_path(key);
        if store.get(&path).await?.is_none() {
            return Ok(false);
        }
        store.remove(&path).await?;
        Ok(true)
    }
}
