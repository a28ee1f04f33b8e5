// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for po-core operations.

use thiserror::Error;

/// All possible errors that can occur in po-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("credential store error: {0}")]
    CredentialStore(String),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("ledger error: {0}")]
    Ledger(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for po-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
