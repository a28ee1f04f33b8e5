// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Control frames for the push stream.
//!
//! The relay speaks in single-character text frames once a stream is open.
//! Frames are decoded into [`ControlFrame`] exactly once, at the transport
//! boundary; nothing downstream compares raw characters.

/// A decoded control frame received over the streaming connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlFrame {
    /// `#` - keepalive; liveness bookkeeping only.
    KeepAlive,
    /// `!` - new messages are waiting on the relay.
    NewData,
    /// `R` - the relay requests a fresh connection.
    Reset,
    /// `E` - the relay requests device re-registration.
    Reauth,
    /// Anything else - informational payload, logged and ignored.
    Info(String),
}

impl ControlFrame {
    /// Decodes a raw frame payload.
    pub fn decode(raw: &str) -> Self {
        match raw {
            "#" => ControlFrame::KeepAlive,
            "!" => ControlFrame::NewData,
            "R" => ControlFrame::Reset,
            "E" => ControlFrame::Reauth,
            other => ControlFrame::Info(other.to_string()),
        }
    }
}

/// Formats the login frame sent immediately after the stream opens.
pub fn login_frame(device_id: &str, secret: &str) -> String {
    format!("login:{device_id}:{secret}\n")
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
