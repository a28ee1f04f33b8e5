// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the transport module.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use po_core::ControlFrame;

use super::transport::{Transport, TransportError, TransportResult};

/// Shared view into a [`MockTransport`]'s state, usable after the
/// transport has been moved into a session manager.
#[derive(Clone, Default)]
pub struct MockProbe {
    /// Frames that will be returned by recv().
    incoming: Arc<Mutex<VecDeque<ControlFrame>>>,
    /// Raw frames that were sent via send_raw().
    outgoing: Arc<Mutex<Vec<String>>>,
    /// Successful connects.
    connects: Arc<AtomicU32>,
    /// Disconnects of a live connection.
    disconnects: Arc<AtomicU32>,
    /// Connects issued while a connection was still live.
    overlapping_connects: Arc<AtomicU32>,
    /// Remaining connects that should fail.
    fail_connects: Arc<AtomicU32>,
    /// Whether sends should fail.
    fail_sends: Arc<AtomicBool>,
}

impl MockProbe {
    /// Add a frame that will be returned by recv().
    pub fn queue_incoming(&self, frame: ControlFrame) {
        self.incoming.lock().unwrap().push_back(frame);
    }

    /// Get all raw frames that were sent.
    pub fn sent(&self) -> Vec<String> {
        self.outgoing.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn overlapping_connect_count(&self) -> u32 {
        self.overlapping_connects.load(Ordering::SeqCst)
    }

    /// Make the next `n` connects fail.
    pub fn fail_next_connects(&self, n: u32) {
        self.fail_connects.store(n, Ordering::SeqCst);
    }

    /// Set whether sends fail.
    pub fn set_send_fail(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }
}

/// Mock transport for testing without real sockets.
#[derive(Default)]
pub struct MockTransport {
    connected: bool,
    probe: MockProbe,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    /// A handle onto this transport's recorded state.
    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl Transport for MockTransport {
    fn connect(
        &mut self,
        _url: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<()>> + Send + '_>>
    {
        Box::pin(async move {
            let remaining = self.probe.fail_connects.load(Ordering::SeqCst);
            if remaining > 0 {
                self.probe
                    .fail_connects
                    .store(remaining - 1, Ordering::SeqCst);
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            if self.connected {
                self.probe
                    .overlapping_connects
                    .fetch_add(1, Ordering::SeqCst);
            }
            self.connected = true;
            self.probe.connects.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn disconnect(
        &mut self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<()>> + Send + '_>>
    {
        Box::pin(async move {
            if self.connected {
                self.probe.disconnects.fetch_add(1, Ordering::SeqCst);
            }
            self.connected = false;
            Ok(())
        })
    }

    fn send_raw(
        &mut self,
        frame: String,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = TransportResult<()>> + Send + '_>>
    {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            if self.probe.fail_sends.load(Ordering::SeqCst) {
                return Err(TransportError::SendFailed("mock send failure".into()));
            }
            self.probe.outgoing.lock().unwrap().push(frame);
            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = TransportResult<Option<ControlFrame>>> + Send + '_>,
    > {
        Box::pin(async move {
            if !self.connected {
                return Err(TransportError::ConnectionClosed);
            }
            match self.probe.incoming.lock().unwrap().pop_front() {
                Some(frame) => Ok(Some(frame)),
                None => {
                    // Queue exhausted: behave like a closed stream
                    self.connected = false;
                    Ok(None)
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[tokio::test]
async fn test_mock_transport_connect_disconnect() {
    let mut transport = MockTransport::new();
    assert!(!transport.is_connected());

    transport.connect("wss://localhost:1234").await.unwrap();
    assert!(transport.is_connected());

    transport.disconnect().await.unwrap();
    assert!(!transport.is_connected());
    assert_eq!(transport.probe().connect_count(), 1);
    assert_eq!(transport.probe().disconnect_count(), 1);
}

#[tokio::test]
async fn test_mock_transport_send_recv() {
    let mut transport = MockTransport::new();
    let probe = transport.probe();
    transport.connect("wss://localhost:1234").await.unwrap();

    transport
        .send_raw("login:dev:secret\n".to_string())
        .await
        .unwrap();
    assert_eq!(probe.sent(), vec!["login:dev:secret\n".to_string()]);

    probe.queue_incoming(ControlFrame::KeepAlive);
    let received = transport.recv().await.unwrap();
    assert_eq!(received, Some(ControlFrame::KeepAlive));

    // Exhausted queue reads as a closed stream
    let received = transport.recv().await.unwrap();
    assert_eq!(received, None);
    assert!(!transport.is_connected());
}

#[tokio::test]
async fn test_mock_transport_connect_fail() {
    let mut transport = MockTransport::new();
    transport.probe().fail_next_connects(1);

    let result = transport.connect("wss://localhost:1234").await;
    assert!(result.is_err());
    assert!(!transport.is_connected());

    // Next attempt succeeds
    transport.connect("wss://localhost:1234").await.unwrap();
    assert!(transport.is_connected());
}

#[tokio::test]
async fn test_mock_transport_send_when_disconnected() {
    let mut transport = MockTransport::new();
    let result = transport.send_raw("login:dev:secret\n".to_string()).await;
    assert!(matches!(result, Err(TransportError::ConnectionClosed)));
}
