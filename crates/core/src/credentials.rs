// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Account and device credentials.
//!
//! Credentials are created once during first-run registration. The secret
//! and device id are issued by the relay and do not change afterwards
//! unless the relay demands re-registration. Storage goes through the
//! [`CredentialStore`] key/value interface; the shipped backend is a flat
//! TOML file saved on every write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};

/// Store key for the account email.
pub const KEY_EMAIL: &str = "email";
/// Store key for the relay-issued account secret.
pub const KEY_SECRET: &str = "secret";
/// Store key for the relay-issued device id.
pub const KEY_DEVICE_ID: &str = "device_id";
/// Store key for the device name chosen at registration.
pub const KEY_DEVICE_NAME: &str = "device_name";

/// Key/value interface over credential storage.
///
/// The storage engine behind it is opaque to the rest of the system.
pub trait CredentialStore {
    /// Returns true if the key is present.
    fn has(&self, key: &str) -> bool;

    /// Returns the value for the key, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets a key, persisting immediately.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes every key, persisting immediately.
    fn clear(&mut self) -> Result<()>;
}

/// Account and device identity issued by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email used for login.
    pub email: String,
    /// Account secret issued by the relay at login.
    pub secret: String,
    /// Device id issued by the relay at registration.
    pub device_id: String,
    /// Device name chosen at registration.
    pub device_name: String,
}

impl Credentials {
    /// Loads complete credentials from the store.
    ///
    /// Returns `None` when any of the four keys is missing - the caller
    /// should run first-time registration in that case.
    pub fn load(store: &dyn CredentialStore) -> Option<Credentials> {
        Some(Credentials {
            email: store.get(KEY_EMAIL)?,
            secret: store.get(KEY_SECRET)?,
            device_id: store.get(KEY_DEVICE_ID)?,
            device_name: store.get(KEY_DEVICE_NAME)?,
        })
    }

    /// Writes all four keys to the store.
    pub fn save(&self, store: &mut dyn CredentialStore) -> Result<()> {
        store.set(KEY_EMAIL, &self.email)?;
        store.set(KEY_SECRET, &self.secret)?;
        store.set(KEY_DEVICE_ID, &self.device_id)?;
        store.set(KEY_DEVICE_NAME, &self.device_name)?;
        Ok(())
    }
}

/// Cheaply cloneable handle over the credentials of the running session.
///
/// The session manager mutates the device id when the relay re-registers
/// the device; everything else takes a read-only snapshot per operation.
#[derive(Clone)]
pub struct SharedCredentials(Arc<RwLock<Credentials>>);

impl SharedCredentials {
    /// Wraps credentials for sharing across tasks.
    pub fn new(credentials: Credentials) -> Self {
        SharedCredentials(Arc::new(RwLock::new(credentials)))
    }

    /// Returns a point-in-time copy of the credentials.
    pub fn snapshot(&self) -> Credentials {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replaces the device id after a successful re-registration.
    pub fn set_device_id(&self, device_id: &str) {
        let mut creds = self.0.write().unwrap_or_else(|e| e.into_inner());
        creds.device_id = device_id.to_string();
    }
}

/// TOML-file-backed credential store.
///
/// The file is a flat string table; every mutation rewrites it in full.
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at the given path, creating an empty one if the
    /// file does not exist yet.
    pub fn open(path: &Path) -> Result<Self> {
        let values = match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| Error::CredentialStore(format!("failed to parse store: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(FileStore {
            path: path.to_path_buf(),
            values,
        })
    }

    /// The path backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.values)
            .map_err(|e| Error::CredentialStore(format!("failed to serialize store: {}", e)))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn clear(&mut self) -> Result<()> {
        self.values.clear();
        self.persist()
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
