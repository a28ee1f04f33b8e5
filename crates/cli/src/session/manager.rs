// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The session state machine.
//!
//! Owns the single live connection and everything that can happen to it:
//! transport drops, relay-requested resets, and re-authentication demands.
//! All collaborators (transport, relay client, credential store, pipeline)
//! are injected at construction; nothing else in the process holds a
//! reference to the active connection.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use po_core::credentials::KEY_DEVICE_ID;
use po_core::{login_frame, ControlFrame, CredentialStore, SharedCredentials};

use super::transport::{Transport, WebSocketTransport};
use crate::relay::{RegisterOutcome, Relay};
use crate::sync::SyncPipeline;

/// Handle to the credential store shared with the session manager.
pub type SharedStore = Arc<Mutex<dyn CredentialStore + Send>>;

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// URL of the relay's streaming push endpoint.
    pub push_url: String,
    /// Initial delay for reconnect backoff (milliseconds).
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnect attempts (seconds).
    pub max_delay_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            push_url: "wss://client.pushover.net/push".to_string(),
            initial_delay_ms: 1_000,
            max_delay_secs: 30,
        }
    }
}

/// State of the streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not connected.
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Stream open, login frame being sent.
    Authenticating,
    /// Authenticated stream, reading control frames.
    Live,
    /// Re-establishing after a drop.
    Reconnecting { attempt: u32 },
}

/// Why a live session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The relay sent `R`; reconnect immediately, no backoff.
    Reset,
    /// The transport failed or the stream closed; reconnect with backoff.
    Dropped,
}

/// Drives the streaming connection to the relay.
pub struct SessionManager<T: Transport = WebSocketTransport> {
    /// Configuration.
    config: SessionConfig,
    /// Transport layer. The only live connection handle in the process.
    transport: T,
    /// Connection state.
    state: SessionState,
    /// Relay REST client, used for device re-registration.
    relay: Arc<dyn Relay>,
    /// Credential store, written when re-registration issues a new id.
    store: SharedStore,
    /// Credentials of the running session.
    creds: SharedCredentials,
    /// Pipeline spawned on each new-data signal.
    pipeline: Arc<SyncPipeline>,
    /// When the relay last showed a sign of life.
    last_seen: Option<Instant>,
}

impl SessionManager<WebSocketTransport> {
    /// Create a session manager with the default WebSocket transport.
    pub fn new(
        config: SessionConfig,
        relay: Arc<dyn Relay>,
        store: SharedStore,
        creds: SharedCredentials,
        pipeline: Arc<SyncPipeline>,
    ) -> Self {
        Self::with_transport(config, WebSocketTransport::new(), relay, store, creds, pipeline)
    }
}

impl<T: Transport> SessionManager<T> {
    /// Create a session manager with a custom transport (for testing).
    pub fn with_transport(
        config: SessionConfig,
        transport: T,
        relay: Arc<dyn Relay>,
        store: SharedStore,
        creds: SharedCredentials,
        pipeline: Arc<SyncPipeline>,
    ) -> Self {
        SessionManager {
            config,
            transport,
            state: SessionState::Disconnected,
            relay,
            store,
            creds,
            pipeline,
            last_seen: None,
        }
    }

    /// Get the current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// When the relay last showed a sign of life on the stream.
    pub fn last_seen(&self) -> Option<Instant> {
        self.last_seen
    }

    /// Run the session forever.
    ///
    /// Every exit path from a live session loops back into a new
    /// connection attempt; only process shutdown stops the machine.
    pub async fn run(&mut self) {
        loop {
            match self.run_once().await {
                SessionEnd::Reset => {
                    info!("relay requested reset, reconnecting");
                }
                SessionEnd::Dropped => {
                    debug!("connection dropped, reconnecting");
                }
            }
        }
    }

    /// Run a single connection cycle: connect, authenticate, read frames
    /// until the session ends, then tear the connection down.
    pub async fn run_once(&mut self) -> SessionEnd {
        self.connect_with_backoff().await;
        self.authenticate().await;

        let end = self.read_frames().await;

        // Terminate the old connection before the caller opens a new one;
        // the relay forbids two live streams per device.
        self.state = SessionState::Disconnected;
        let _ = self.transport.disconnect().await;
        end
    }

    /// Connect with exponential backoff, retrying until it succeeds.
    ///
    /// The first attempt carries no delay, so a relay-requested reset
    /// reconnects immediately.
    pub async fn connect_with_backoff(&mut self) {
        let mut attempt: u32 = 0;
        let mut delay_ms = self.config.initial_delay_ms;

        loop {
            attempt += 1;
            self.state = if attempt == 1 {
                SessionState::Connecting
            } else {
                SessionState::Reconnecting { attempt }
            };

            match self.transport.connect(&self.config.push_url).await {
                Ok(()) => return,
                Err(e) => {
                    warn!("connect attempt {} failed: {}", attempt, e);
                    self.state = SessionState::Disconnected;
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = std::cmp::min(delay_ms * 2, self.config.max_delay_secs * 1000);
                }
            }
        }
    }

    /// Send the login frame for the stream that just opened.
    ///
    /// A rejected send is logged as an authentication failure but does not
    /// close the stream; the relay closes it if the login truly failed,
    /// and the reconnect loop takes over from there.
    pub async fn authenticate(&mut self) {
        self.state = SessionState::Authenticating;

        let creds = self.creds.snapshot();
        let frame = login_frame(&creds.device_id, &creds.secret);
        match self.transport.send_raw(frame).await {
            Ok(()) => debug!("login frame sent for device {}", creds.device_id),
            Err(e) => error!("login not acknowledged: {}", e),
        }

        self.state = SessionState::Live;
    }

    /// Read and dispatch control frames until the session ends.
    async fn read_frames(&mut self) -> SessionEnd {
        loop {
            match self.transport.recv().await {
                Ok(Some(frame)) => {
                    if let Some(end) = self.handle_frame(frame).await {
                        return end;
                    }
                }
                Ok(None) => {
                    debug!("push stream closed by relay");
                    return SessionEnd::Dropped;
                }
                Err(e) => {
                    warn!("push stream error: {}", e);
                    return SessionEnd::Dropped;
                }
            }
        }
    }

    /// Dispatch one decoded control frame.
    ///
    /// Returns `Some` when the frame ends the current session.
    pub(crate) async fn handle_frame(&mut self, frame: ControlFrame) -> Option<SessionEnd> {
        match frame {
            ControlFrame::KeepAlive => {
                self.last_seen = Some(Instant::now());
                trace!("keepalive");
                None
            }
            ControlFrame::NewData => {
                self.last_seen = Some(Instant::now());
                debug!("new data signal");
                // Fire-and-forget: the read loop never waits on the
                // pipeline, and back-to-back signals may overlap.
                let pipeline = Arc::clone(&self.pipeline);
                tokio::spawn(async move { pipeline.run().await });
                None
            }
            ControlFrame::Reset => {
                self.last_seen = Some(Instant::now());
                Some(SessionEnd::Reset)
            }
            ControlFrame::Reauth => {
                self.last_seen = Some(Instant::now());
                info!("relay requested device re-registration");
                self.reregister().await;
                None
            }
            ControlFrame::Info(text) => {
                self.last_seen = Some(Instant::now());
                debug!("informational frame: {}", text);
                None
            }
        }
    }

    /// Re-register the device after an `E` frame.
    ///
    /// A name conflict means the registration already exists and is
    /// success. Any other failure leaves the session live with the old
    /// device id - degraded, not fatal.
    async fn reregister(&mut self) {
        let creds = self.creds.snapshot();
        match self
            .relay
            .register_device(&creds.secret, &creds.device_name)
            .await
        {
            Ok(RegisterOutcome::Registered(device_id)) => {
                info!("device re-registered, new id {}", device_id);
                self.creds.set_device_id(&device_id);
                let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
                if let Err(e) = store.set(KEY_DEVICE_ID, &device_id) {
                    warn!("failed to persist new device id: {}", e);
                }
            }
            Ok(RegisterOutcome::AlreadyRegistered) => {
                debug!("device name already registered, keeping current id");
            }
            Err(e) => {
                warn!("device re-registration failed: {}", e);
            }
        }
    }
}
