// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared mock collaborators for sync and session tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use po_core::{Credentials, Ledger, Message, SharedCredentials};

use crate::notify::Notifier;
use crate::relay::{RegisterOutcome, Relay, RelayError, RelayResult};

/// Create a test message with the given id, body, and epoch timestamp.
pub fn make_message(id: i64, body: &str, epoch_secs: i64) -> Message {
    Message {
        id,
        title: None,
        message: body.to_string(),
        date: Utc.timestamp_opt(epoch_secs, 0).unwrap(),
    }
}

/// Create test credentials shared the way the real wiring shares them.
pub fn make_creds() -> SharedCredentials {
    SharedCredentials::new(Credentials {
        email: "user@example.com".to_string(),
        secret: "s3cret".to_string(),
        device_id: "dev123".to_string(),
        device_name: "workstation".to_string(),
    })
}

/// Mock relay REST client.
///
/// Fetches pop batches from a queue (empty queue means an empty batch);
/// every call is recorded for assertions.
#[derive(Default)]
pub struct MockRelay {
    /// Batches returned by successive fetches.
    batches: Mutex<VecDeque<Vec<Message>>>,
    /// Number of fetch calls made.
    pub fetch_calls: AtomicU32,
    /// Recorded acknowledge calls as (secret, device_id, highest_id).
    pub acks: Mutex<Vec<(String, String, i64)>>,
    /// Recorded register calls as (secret, name).
    pub register_calls: Mutex<Vec<(String, String)>>,
    /// Outcome of the next register calls; `None` means rejection.
    pub register_outcome: Mutex<Option<RegisterOutcome>>,
    /// When set, fetches fail.
    pub fail_fetch: AtomicBool,
    /// When set, the relay declines acknowledgments (status 0).
    pub decline_acks: AtomicBool,
}

impl MockRelay {
    pub fn new() -> Self {
        MockRelay::default()
    }

    /// Queue a batch to be returned by the next fetch.
    pub fn queue_batch(&self, batch: Vec<Message>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn fetch_count(&self) -> u32 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn acks(&self) -> Vec<(String, String, i64)> {
        self.acks.lock().unwrap().clone()
    }

    pub fn register_calls(&self) -> Vec<(String, String)> {
        self.register_calls.lock().unwrap().clone()
    }

    pub fn set_register_outcome(&self, outcome: Option<RegisterOutcome>) {
        *self.register_outcome.lock().unwrap() = outcome;
    }
}

impl Relay for MockRelay {
    fn login(
        &self,
        _email: &str,
        _password: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<String>> + Send + '_>> {
        Box::pin(async move { Ok("s3cret".to_string()) })
    }

    fn register_device(
        &self,
        secret: &str,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<RegisterOutcome>> + Send + '_>> {
        let secret = secret.to_string();
        let name = name.to_string();
        Box::pin(async move {
            self.register_calls.lock().unwrap().push((secret, name));
            match self.register_outcome.lock().unwrap().clone() {
                Some(outcome) => Ok(outcome),
                None => Err(RelayError::Registration("mock rejection".to_string())),
            }
        })
    }

    fn fetch_messages(
        &self,
        _secret: &str,
        _device_id: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<Vec<Message>>> + Send + '_>> {
        Box::pin(async move {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(RelayError::Request("mock fetch failure".to_string()));
            }
            Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
        })
    }

    fn acknowledge(
        &self,
        secret: &str,
        device_id: &str,
        highest_id: i64,
    ) -> Pin<Box<dyn Future<Output = RelayResult<bool>> + Send + '_>> {
        let secret = secret.to_string();
        let device_id = device_id.to_string();
        Box::pin(async move {
            self.acks
                .lock()
                .unwrap()
                .push((secret, device_id, highest_id));
            Ok(!self.decline_acks.load(Ordering::SeqCst))
        })
    }
}

/// In-memory mock ledger keyed like the real one.
#[derive(Default)]
pub struct MockLedger {
    seen: Mutex<HashSet<(String, i64)>>,
    /// Number of insert calls made.
    pub insert_calls: AtomicU32,
    /// When set, inserts fail (lookups still work).
    pub fail_inserts: AtomicBool,
    /// When set, existence lookups fail.
    pub fail_lookups: AtomicBool,
}

impl MockLedger {
    pub fn new() -> Self {
        MockLedger::default()
    }

    /// Pre-populate an identity as already seen.
    pub fn mark_seen(&self, body: &str, received_at: DateTime<Utc>) {
        self.seen
            .lock()
            .unwrap()
            .insert((body.to_string(), received_at.timestamp()));
    }

    pub fn insert_count(&self) -> u32 {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

impl Ledger for MockLedger {
    fn exists(&self, body: &str, received_at: DateTime<Utc>) -> po_core::Result<bool> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(po_core::Error::Ledger("mock lookup failure".to_string()));
        }
        Ok(self
            .seen
            .lock()
            .unwrap()
            .contains(&(body.to_string(), received_at.timestamp())))
    }

    fn insert(&self, message: &Message) -> po_core::Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(po_core::Error::Ledger("mock insert failure".to_string()));
        }
        self.seen
            .lock()
            .unwrap()
            .insert((message.message.clone(), message.date.timestamp()));
        Ok(())
    }
}

/// Notifier that records what it was asked to show.
#[derive(Default)]
pub struct MockNotifier {
    shown: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        MockNotifier::default()
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, title: &str, body: &str) {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}
