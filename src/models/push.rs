//! Core value types shared by every push gateway.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

/// Per-endpoint outcome of one dispatch attempt.
///
/// Every gateway classifier terminates in exactly one of these five values;
/// callers treat the value as final for that attempt and decide themselves
/// whether a new dispatch is worth trying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStatus {
    /// The gateway accepted the notification for this endpoint
    Success,
    /// Permanent failure; retrying the same request will fail again
    Error,
    /// Transient gateway condition; a later retry may succeed
    TemporaryError,
    /// The endpoint itself was rejected (expired, malformed, unregistered)
    InvalidEndpoint,
    /// The gateway reply carried no usable signal for this endpoint
    Unknown,
}

/// Supported push gateways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Gcm,
    Apns,
    Blackberry,
}

impl Gateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gateway::Gcm => "gcm",
            Gateway::Apns => "apns",
            Gateway::Blackberry => "blackberry",
        }
    }
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gateway-agnostic notification content.
///
/// Each provider turns this into its own wire payload (JSON body for GCM,
/// message object for the APNs client, JSON data part for PAP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    /// Message title/subject (optional for some gateways)
    pub title: Option<String>,
    /// Message body/content (required)
    pub body: String,
    /// Notification sound name
    pub sound: Option<String>,
    /// Badge count for the app icon
    pub badge: Option<u32>,
    /// Whether to request high-priority delivery
    #[serde(default)]
    pub high_priority: bool,
    /// Additional key/value payload data
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl PushMessage {
    /// Creates a message with just a body; remaining fields use defaults.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
            sound: None,
            badge: None,
            high_priority: false,
            data: HashMap::new(),
        }
    }
}

/// One dispatch call: an ordered endpoint list plus the message to deliver.
///
/// The request is immutable once built, so a provider instance holds no
/// per-call state and is safely reusable across sequential calls. Endpoint
/// order is the correlation key between endpoints and positional gateway
/// results and is preserved end to end.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    endpoints: Vec<String>,
    message: PushMessage,
}

impl DispatchRequest {
    /// Builds a request, validating the endpoint list.
    ///
    /// # Errors
    /// Returns a validation error when the list is empty or any endpoint is
    /// an empty string. Endpoint contents are otherwise opaque.
    pub fn new(endpoints: Vec<String>, message: PushMessage) -> AppResult<Self> {
        if endpoints.is_empty() {
            return Err(AppError::Validation {
                field: "endpoints".to_string(),
                reason: "At least one endpoint is required".to_string(),
            });
        }
        if endpoints.iter().any(|e| e.is_empty()) {
            return Err(AppError::Validation {
                field: "endpoints".to_string(),
                reason: "Endpoints must be non-empty strings".to_string(),
            });
        }
        Ok(Self { endpoints, message })
    }

    /// Convenience constructor for a single endpoint.
    pub fn single(endpoint: impl Into<String>, message: PushMessage) -> AppResult<Self> {
        Self::new(vec![endpoint.into()], message)
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn message(&self) -> &PushMessage {
        &self.message
    }
}
