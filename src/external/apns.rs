//! Apple push protocol client boundary.
//!
//! The binary-framed APNs connection (frame layout, TLS socket, identifier
//! bookkeeping) lives in an external protocol client; this module defines
//! the interface the dispatch layer drives it through. A fresh client is
//! opened per push and discarded afterwards.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::error::AppResult;

/// Message object handed to the protocol client, which serializes it into
/// the binary notification frame (identifier, expiry, token, JSON payload).
#[derive(Debug, Clone, PartialEq)]
pub struct ApnsMessage {
    /// Alert text shown to the user
    pub text: String,
    /// Notification sound name
    pub sound: Option<String>,
    /// Badge count for the app icon
    pub badge: Option<u32>,
    /// Custom payload properties placed beside the `aps` dictionary
    pub custom: HashMap<String, String>,
}

/// A recipient the client refused to accept (malformed device token).
#[derive(Debug, Clone, Error)]
#[error("recipient rejected: {reason}")]
pub struct ApnsRecipientError {
    pub reason: String,
}

/// One delivery failure reported by the gateway after a send, keyed by the
/// notification identifier the client assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApnsDeliveryError {
    pub identifier: u32,
    pub status_code: u8,
    pub description: String,
}

/// Stateful binary-protocol client session.
///
/// Call order is `add_recipient`* → `connect` → `send` → `disconnect`;
/// `delivery_errors` is only meaningful after a completed `send`.
#[async_trait]
pub trait ApnsClient: Send {
    /// Registers a recipient device token for the next send.
    ///
    /// # Errors
    /// Rejects malformed tokens. Rejection concerns this recipient only; the
    /// session stays usable for further recipients.
    fn add_recipient(&mut self, endpoint: &str) -> Result<(), ApnsRecipientError>;

    /// Opens the gateway connection.
    async fn connect(&mut self) -> anyhow::Result<()>;

    /// Sends `message` to every registered recipient.
    async fn send(&mut self, message: &ApnsMessage) -> anyhow::Result<()>;

    /// Closes the connection. Never fails; safe to call after any outcome.
    async fn disconnect(&mut self);

    /// Delivery errors the gateway reported for the last send, in
    /// gateway-reported order.
    fn delivery_errors(&self) -> Vec<ApnsDeliveryError>;
}

/// Opens protocol client sessions; injected into the Apple provider so the
/// certificate/environment wiring stays with the client library.
pub trait ApnsClientFactory: Send + Sync {
    /// Opens a fresh, unconnected client session.
    ///
    /// # Errors
    /// Fails when the client cannot be constructed at all (missing or
    /// unreadable certificate).
    fn open(&self) -> AppResult<Box<dyn ApnsClient>>;
}
