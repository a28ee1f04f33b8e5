// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Relay REST client.
//!
//! A stateless request/response adapter over the relay's HTTP surface:
//! account login, device registration, pending-message fetch, and
//! highest-id acknowledgment. The [`Relay`] trait is the seam the session
//! manager and sync pipeline are built against; [`HttpRelay`] is the
//! production implementation.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

use po_core::Message;

/// Error type for relay REST operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Request could not be completed (transport, DNS, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// The relay rejected the login.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The relay rejected the device registration for a reason other than
    /// a name conflict.
    #[error("registration rejected: {0}")]
    Registration(String),

    /// Response body did not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result type for relay REST operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Outcome of a device registration call.
///
/// Registration is idempotent: a name conflict means the device already
/// exists on the relay and the current identity stays valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The relay issued a new device id.
    Registered(String),
    /// The device name was already registered; keep the existing id.
    AlreadyRegistered,
}

/// Request/response operations against the relay's REST surface.
///
/// Implementations hold no session state; every call carries the secret
/// and device id it needs.
pub trait Relay: Send + Sync {
    /// Exchange account email and password for an account secret.
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<String>> + Send + '_>>;

    /// Register (or re-register) this device under the given name.
    fn register_device(
        &self,
        secret: &str,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<RegisterOutcome>> + Send + '_>>;

    /// Fetch all pending messages for the device, in relay order.
    fn fetch_messages(
        &self,
        secret: &str,
        device_id: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<Vec<Message>>> + Send + '_>>;

    /// Tell the relay the highest message id received, so it can prune its
    /// queue. Returns false when the relay declines.
    fn acknowledge(
        &self,
        secret: &str,
        device_id: &str,
        highest_id: i64,
    ) -> Pin<Box<dyn Future<Output = RelayResult<bool>> + Send + '_>>;
}

/// The relay reports a registration name conflict with this message.
const NAME_TAKEN: &str = "has already been taken";

/// Platform tag sent at device registration.
const PLATFORM_TAG: &str = "O";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    status: i64,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl LoginResponse {
    fn into_secret(self) -> RelayResult<String> {
        if self.status == 1 {
            self.secret.ok_or_else(|| {
                RelayError::MalformedResponse("login response missing secret".to_string())
            })
        } else if self.errors.is_empty() {
            Err(RelayError::Auth("login rejected".to_string()))
        } else {
            Err(RelayError::Auth(self.errors.join(", ")))
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RegisterErrors {
    #[serde(default)]
    name: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterResponse {
    status: i64,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    errors: Option<RegisterErrors>,
}

impl RegisterResponse {
    fn into_outcome(self) -> RelayResult<RegisterOutcome> {
        if self.status == 1 {
            return self.id.map(RegisterOutcome::Registered).ok_or_else(|| {
                RelayError::MalformedResponse("register response missing id".to_string())
            });
        }
        let errors = self.errors.unwrap_or_default();
        if errors.name.iter().any(|e| e == NAME_TAKEN) {
            Ok(RegisterOutcome::AlreadyRegistered)
        } else if errors.name.is_empty() {
            Err(RelayError::Registration("registration rejected".to_string()))
        } else {
            Err(RelayError::Registration(errors.name.join(", ")))
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    status: i64,
    #[serde(default)]
    messages: Vec<Message>,
}

impl MessagesResponse {
    fn into_messages(self) -> RelayResult<Vec<Message>> {
        if self.status == 1 {
            Ok(self.messages)
        } else {
            Err(RelayError::Request("message fetch rejected".to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: i64,
}

/// HTTP implementation of [`Relay`] over reqwest.
pub struct HttpRelay {
    http: reqwest::Client,
    api_url: String,
}

impl HttpRelay {
    /// Creates a client against the given API base URL (no trailing slash).
    pub fn new(api_url: impl Into<String>) -> Self {
        HttpRelay {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }
}

impl Relay for HttpRelay {
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<String>> + Send + '_>> {
        let email = email.to_string();
        let password = password.to_string();
        Box::pin(async move {
            let url = format!("{}/users/login.json", self.api_url);
            let resp = self
                .http
                .post(&url)
                .form(&[("email", email.as_str()), ("password", password.as_str())])
                .send()
                .await
                .map_err(|e| RelayError::Request(e.to_string()))?;

            let body: LoginResponse = resp
                .json()
                .await
                .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
            body.into_secret()
        })
    }

    fn register_device(
        &self,
        secret: &str,
        name: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<RegisterOutcome>> + Send + '_>> {
        let secret = secret.to_string();
        let name = name.to_string();
        Box::pin(async move {
            let url = format!("{}/devices.json", self.api_url);
            let resp = self
                .http
                .post(&url)
                .form(&[
                    ("secret", secret.as_str()),
                    ("name", name.as_str()),
                    ("os", PLATFORM_TAG),
                ])
                .send()
                .await
                .map_err(|e| RelayError::Request(e.to_string()))?;

            let body: RegisterResponse = resp
                .json()
                .await
                .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
            body.into_outcome()
        })
    }

    fn fetch_messages(
        &self,
        secret: &str,
        device_id: &str,
    ) -> Pin<Box<dyn Future<Output = RelayResult<Vec<Message>>> + Send + '_>> {
        let secret = secret.to_string();
        let device_id = device_id.to_string();
        Box::pin(async move {
            let url = format!("{}/messages.json", self.api_url);
            let resp = self
                .http
                .get(&url)
                .query(&[("secret", secret.as_str()), ("device_id", device_id.as_str())])
                .send()
                .await
                .map_err(|e| RelayError::Request(e.to_string()))?;

            let body: MessagesResponse = resp
                .json()
                .await
                .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
            body.into_messages()
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
            let url = format!(
                "{}/devices/{}/update_highest_message.json",
                self.api_url, device_id
            );
            let highest = highest_id.to_string();
            let resp = self
                .http
                .post(&url)
                .form(&[("secret", secret.as_str()), ("message", highest.as_str())])
                .send()
                .await
                .map_err(|e| RelayError::Request(e.to_string()))?;

            let body: StatusResponse = resp
                .json()
                .await
                .map_err(|e| RelayError::MalformedResponse(e.to_string()))?;
            Ok(body.status == 1)
        })
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
