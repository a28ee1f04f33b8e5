// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for CLI error formatting.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::Error;
use crate::relay::RelayError;

#[test]
fn test_relay_error_display() {
    let err: Error = RelayError::Auth("bad password".to_string()).into();
    assert_eq!(
        err.to_string(),
        "relay error: authentication rejected: bad password"
    );
}

#[test]
fn test_not_registered_carries_hint() {
    let err = Error::NotRegistered;
    assert!(err.to_string().contains("--email"));
    assert!(err.to_string().contains("PUSHOVER_PASSWORD"));
}

#[test]
fn test_core_error_passthrough() {
    let err: Error = po_core::Error::MissingCredential("secret").into();
    assert_eq!(err.to_string(), "missing credential: secret");
}
