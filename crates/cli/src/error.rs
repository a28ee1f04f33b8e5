// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the pover binary.

use thiserror::Error;

use crate::relay::RelayError;

/// All possible errors surfaced by the CLI layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] po_core::Error),

    #[error("relay error: {0}")]
    Relay(#[from] RelayError),

    #[error("config error: {0}")]
    Config(String),

    #[error(
        "not registered yet\n  hint: run with --email <address> --device-name <name> and the account password in $PUSHOVER_PASSWORD"
    )]
    NotRegistered,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
