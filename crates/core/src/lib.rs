// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! po-core: Shared library for the pover push client
//!
//! This crate provides the message model, push-stream control frames,
//! credential storage, and the dedup ledger used by the `pover` binary.

pub mod credentials;
pub mod error;
pub mod frame;
pub mod ledger;
pub mod message;

pub use credentials::{CredentialStore, Credentials, FileStore, SharedCredentials};
pub use error::{Error, Result};
pub use frame::{login_frame, ControlFrame};
pub use ledger::{Ledger, SqliteLedger};
pub use message::{highest_id, Message};
