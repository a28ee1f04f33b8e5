// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface definition.

use clap::Parser;
use std::path::PathBuf;

/// pover: desktop client for the Pushover push relay
#[derive(Parser, Debug)]
#[command(name = "pover")]
#[command(about = "Receives push messages over a streaming connection and surfaces them as desktop notifications")]
pub struct Cli {
    /// Override the config directory
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Account email, used once for first-run registration
    #[arg(long)]
    pub email: Option<String>,

    /// Device name to register with the relay on first run
    #[arg(long)]
    pub device_name: Option<String>,

    /// Clear stored credentials and exit (requires --yes)
    #[arg(long)]
    pub reset: bool,

    /// Confirm destructive operations
    #[arg(long)]
    pub yes: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
