// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! povrs - Library behind the `pover` push client.
//!
//! The binary keeps a streaming connection to a push relay, reconciles
//! pending messages against a local dedup ledger, surfaces new ones as
//! desktop notifications, and acknowledges delivery so the relay can
//! prune its queue.
//!
//! # Main Components
//!
//! - [`session::SessionManager`] - owns the one live connection and the
//!   connect/authenticate/reconnect state machine
//! - [`sync::SyncPipeline`] - the fetch -> dedupe -> persist -> notify ->
//!   acknowledge sequence behind each new-data signal
//! - [`relay::HttpRelay`] - stateless REST adapter for login, device
//!   registration, message fetch, and acknowledgment
//! - [`Config`] - relay endpoints and reconnect tuning

use std::sync::{Arc, Mutex};

use tracing::info;

use po_core::{Credentials, CredentialStore, FileStore, Ledger, SharedCredentials, SqliteLedger};

mod cli;

pub mod config;
pub mod error;
pub mod notify;
pub mod relay;
pub mod session;
pub mod sync;

pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};

use config::{LEDGER_FILE_NAME, STORE_FILE_NAME};
use notify::{Notifier, TerminalNotifier};
use relay::{HttpRelay, RegisterOutcome, Relay};
use session::{SessionConfig, SessionManager, SharedStore};
use sync::SyncPipeline;

/// Environment variable holding the account password for first-run
/// registration.
const PASSWORD_ENV: &str = "PUSHOVER_PASSWORD";

/// Run the client until interrupted.
pub async fn run(cli: Cli) -> Result<()> {
    let config_dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => config::default_config_dir()?,
    };
    let config = Config::load(&config_dir)?;
    info!("using config at {}", config_dir.display());

    let mut store = FileStore::open(&config_dir.join(STORE_FILE_NAME))?;

    if cli.reset {
        if !cli.yes {
            return Err(Error::Config(
                "pass --yes to confirm clearing stored credentials; remember to also delete the device from the relay dashboard"
                    .to_string(),
            ));
        }
        store.clear()?;
        info!("credentials cleared");
        return Ok(());
    }

    let relay: Arc<dyn Relay> = Arc::new(HttpRelay::new(config.api_url.clone()));

    let credentials = match Credentials::load(&store) {
        Some(credentials) => credentials,
        None => register(relay.as_ref(), &mut store, &cli).await?,
    };

    let ledger: Arc<dyn Ledger> = Arc::new(SqliteLedger::open(&config_dir.join(LEDGER_FILE_NAME))?);
    let notifier: Arc<dyn Notifier> = Arc::new(TerminalNotifier);
    let creds = SharedCredentials::new(credentials);
    let store: SharedStore = Arc::new(Mutex::new(store));

    let pipeline = Arc::new(SyncPipeline::new(
        Arc::clone(&relay),
        Arc::clone(&ledger),
        Arc::clone(&notifier),
        creds.clone(),
    ));

    if config.sync_on_startup {
        // Catch up on messages that arrived while the client was offline
        pipeline.run().await;
    }

    let session_config = SessionConfig {
        push_url: config.push_url.clone(),
        initial_delay_ms: config.reconnect_initial_delay_ms,
        max_delay_secs: config.reconnect_max_delay_secs,
    };
    let mut manager = SessionManager::new(session_config, relay, store, creds, pipeline);

    tokio::select! {
        _ = manager.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}

/// First-run registration: exchange the password for an account secret,
/// register the device, and persist the resulting identity.
async fn register(relay: &dyn Relay, store: &mut FileStore, cli: &Cli) -> Result<Credentials> {
    let (Some(email), Some(device_name)) = (cli.email.clone(), cli.device_name.clone()) else {
        return Err(Error::NotRegistered);
    };
    let Ok(password) = std::env::var(PASSWORD_ENV) else {
        return Err(Error::NotRegistered);
    };

    info!("logging in as {}", email);
    let secret = relay.login(&email, &password).await?;

    info!("registering device {}", device_name);
    let device_id = match relay.register_device(&secret, &device_name).await? {
        RegisterOutcome::Registered(id) => id,
        RegisterOutcome::AlreadyRegistered => {
            // No prior identity exists locally, so a conflict here is not
            // recoverable by reuse - the name belongs to another client.
            return Err(Error::Config(format!(
                "device name '{}' is already registered to this account; pick another name or delete it from the relay dashboard",
                device_name
            )));
        }
    };

    let credentials = Credentials {
        email,
        secret,
        device_id,
        device_name,
    };
    credentials.save(store)?;
    info!("device registered with id {}", credentials.device_id);

    Ok(credentials)
}
