// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The push message model.
//!
//! Messages arrive as JSON from the relay's REST surface and are immutable
//! once received. Dedup identity is the (body, receipt timestamp) pair, not
//! the server id; the relay's id is used only for acknowledgment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A push message fetched from the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Server-issued identifier, increasing per device. Acknowledgment target.
    pub id: i64,
    /// Optional title supplied by the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Message body.
    pub message: String,
    /// Receipt timestamp issued by the relay (epoch seconds on the wire).
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
}

impl Message {
    /// The identity used by the dedup ledger.
    ///
    /// Two fetches of the same message carry the same body and relay
    /// timestamp even when the relay reissues ids, so the pair is the
    /// stable key.
    pub fn dedup_key(&self) -> (&str, DateTime<Utc>) {
        (&self.message, self.date)
    }
}

/// The highest server id in a batch, or `None` for an empty batch.
///
/// Acknowledging anything lower would let the relay discard messages the
/// client has not processed yet.
pub fn highest_id(messages: &[Message]) -> Option<i64> {
    messages.iter().map(|m| m.id).max()
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
