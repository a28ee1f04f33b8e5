// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session management for the streaming push connection.
//!
//! The session manager owns the one live connection to the relay and
//! drives the connect / authenticate / reconnect state machine:
//!
//! ```text
//! Disconnected -> Connecting -> Authenticating -> Live
//!       ^                                          |
//!       +----------- Reconnecting <----------------+
//! ```
//!
//! Once `Live`, decoded control frames dispatch to liveness bookkeeping,
//! the sync pipeline, an immediate reconnect, or device re-registration.
//! No frame - and no failure - terminates the process; the reconnect loop
//! is the universal recovery path.

mod manager;
mod transport;

pub use manager::{SessionConfig, SessionEnd, SessionManager, SessionState, SharedStore};
pub use transport::{Transport, TransportError, WebSocketTransport};


#[cfg(test)]
mod transport_tests;
