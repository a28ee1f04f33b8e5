// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The fetch -> dedupe -> persist -> notify -> acknowledge pipeline.
//!
//! Triggered by a `!` control frame, and optionally once at startup to
//! catch messages that arrived while the client was offline. Nothing in a
//! run is allowed to kill the process: a failed fetch is logged and the
//! next signal retries, a failed persist still notifies, and a failed
//! acknowledgment self-corrects on the next cycle.

use std::sync::Arc;

use tracing::{debug, info, warn};

use po_core::{highest_id, Ledger, SharedCredentials};

use crate::notify::Notifier;
use crate::relay::{Relay, RelayError};

/// Title used when the sender supplied none.
const DEFAULT_TITLE: &str = "Pushover Notification";

/// Result of one reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Messages in the fetched batch.
    pub fetched: usize,
    /// Messages that were new (persisted and notified).
    pub fresh: usize,
    /// Highest id sent to the acknowledgment endpoint, if the batch was
    /// non-empty.
    pub acknowledged: Option<i64>,
}

/// Reconciles pending relay messages with the local ledger.
pub struct SyncPipeline {
    /// Relay REST client.
    relay: Arc<dyn Relay>,
    /// Dedup ledger.
    ledger: Arc<dyn Ledger>,
    /// Notification sink.
    notifier: Arc<dyn Notifier>,
    /// Credentials of the running session.
    creds: SharedCredentials,
}

impl SyncPipeline {
    /// Create a pipeline over the injected collaborators.
    pub fn new(
        relay: Arc<dyn Relay>,
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        creds: SharedCredentials,
    ) -> Self {
        SyncPipeline {
            relay,
            ledger,
            notifier,
            creds,
        }
    }

    /// Run one cycle, logging instead of propagating failure.
    ///
    /// This is the entry point the session manager spawns; it must never
    /// panic or return an error into the read loop.
    pub async fn run(&self) {
        match self.sync_once().await {
            Ok(outcome) if outcome.fresh > 0 => {
                info!(
                    "delivered {} new of {} fetched messages",
                    outcome.fresh, outcome.fetched
                );
            }
            Ok(outcome) => {
                debug!("no new messages ({} fetched)", outcome.fetched);
            }
            Err(e) => {
                warn!("sync failed: {}", e);
            }
        }
    }

    /// Run one cycle and report what happened.
    ///
    /// Only the fetch can fail the cycle; every later step degrades to a
    /// log line. Acknowledgment always targets the highest id of the
    /// whole batch, duplicates included, so the relay prunes everything
    /// it handed over.
    pub async fn sync_once(&self) -> Result<SyncOutcome, RelayError> {
        let creds = self.creds.snapshot();

        let batch = self
            .relay
            .fetch_messages(&creds.secret, &creds.device_id)
            .await?;
        let fetched = batch.len();

        let mut fresh = 0;
        for msg in &batch {
            let (body, received_at) = msg.dedup_key();
            let seen = match self.ledger.exists(body, received_at) {
                Ok(seen) => seen,
                Err(e) => {
                    // Favor delivery: an unreadable ledger must not
                    // swallow a message.
                    warn!("ledger lookup failed, treating message {} as unseen: {}", msg.id, e);
                    false
                }
            };
            if seen {
                debug!("skipping already-seen message {}", msg.id);
                continue;
            }

            // Persist before notifying; a failed write still notifies and
            // the message may be re-delivered on a later fetch.
            if let Err(e) = self.ledger.insert(msg) {
                warn!("failed to persist message {}: {}", msg.id, e);
            }

            let title = match &msg.title {
                Some(title) => format!("Pushover: {}", title),
                None => DEFAULT_TITLE.to_string(),
            };
            self.notifier.notify(&title, &msg.message);
            fresh += 1;
        }

        let acknowledged = match highest_id(&batch) {
            Some(id) => {
                match self.relay.acknowledge(&creds.secret, &creds.device_id, id).await {
                    Ok(true) => debug!("acknowledged up to message {}", id),
                    Ok(false) => warn!("relay declined acknowledgment of {}", id),
                    Err(e) => warn!("acknowledgment of {} failed: {}", id, e),
                }
                Some(id)
            }
            None => None,
        };

        Ok(SyncOutcome {
            fetched,
            fresh,
            acknowledged,
        })
    }
}
