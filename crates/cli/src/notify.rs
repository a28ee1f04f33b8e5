// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Message notification rendering.
//!
//! The [`Notifier`] is fire-and-forget: rendering failures are never
//! surfaced to the pipeline. The shipped implementation emits terminal
//! escape sequences (BEL plus OSC 9 / OSC 777 / OSC 99) so desktop
//! notifications work across iTerm2, VTE terminals, and kitty without a
//! platform-specific renderer.

use std::io::{self, Write};

/// Renders a message to the user. Best-effort, no acknowledgment.
pub trait Notifier: Send + Sync {
    /// Shows the message. Failures are swallowed by the implementation.
    fn notify(&self, title: &str, body: &str);
}

/// Terminal-escape-sequence notifier.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, body: &str) {
        let mut stdout = io::stdout();

        // BEL - universal terminal bell
        let _ = stdout.write_all(b"\x07");

        // OSC 9 (iTerm2): ESC ] 9 ; message BEL
        let osc9 = format!("\x1b]9;{}\x07", escape_osc(body));
        let _ = stdout.write_all(osc9.as_bytes());

        // OSC 777 (Konsole/VTE): ESC ] 777 ; notify ; title ; message BEL
        let osc777 = format!(
            "\x1b]777;notify;{};{}\x07",
            escape_osc(title),
            escape_osc(body)
        );
        let _ = stdout.write_all(osc777.as_bytes());

        // OSC 99 (kitty): title and body payloads, ST-terminated
        let osc99 = format!(
            "\x1b]99;i=1:d=0:p=title;{}\x1b\\\x1b]99;i=1:d=0:p=body;{}\x1b\\",
            escape_osc(title),
            escape_osc(body)
        );
        let _ = stdout.write_all(osc99.as_bytes());

        let _ = stdout.flush();
    }
}

/// Strips characters that would terminate or corrupt an OSC sequence.
fn escape_osc(s: &str) -> String {
    s.replace('\x07', "")
        .replace('\x1b', "")
        .replace('\n', " ")
        .replace('\r', "")
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
