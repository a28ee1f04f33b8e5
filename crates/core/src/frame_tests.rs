// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for control-frame decoding.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::{login_frame, ControlFrame};

#[test]
fn test_decode_keepalive() {
    assert_eq!(ControlFrame::decode("#"), ControlFrame::KeepAlive);
}

#[test]
fn test_decode_new_data() {
    assert_eq!(ControlFrame::decode("!"), ControlFrame::NewData);
}

#[test]
fn test_decode_reset() {
    assert_eq!(ControlFrame::decode("R"), ControlFrame::Reset);
}

#[test]
fn test_decode_reauth() {
    assert_eq!(ControlFrame::decode("E"), ControlFrame::Reauth);
}

#[test]
fn test_decode_other_payload_is_info() {
    assert_eq!(
        ControlFrame::decode("service notice"),
        ControlFrame::Info("service notice".to_string())
    );
    // A lowercase 'r' is not a reset
    assert_eq!(
        ControlFrame::decode("r"),
        ControlFrame::Info("r".to_string())
    );
}

#[test]
fn test_decode_empty_payload_is_info() {
    assert_eq!(ControlFrame::decode(""), ControlFrame::Info(String::new()));
}

#[test]
fn test_login_frame_format() {
    assert_eq!(login_frame("dev123", "s3cret"), "login:dev123:s3cret\n");
}
