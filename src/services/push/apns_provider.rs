//! Apple push provider implementation.
//!
//! Drives one protocol-client session per push: register recipients,
//! connect, send, disconnect, then classify the gateway's delivery error
//! list. Recipient registration failures are collected per endpoint and
//! never abort the remaining recipients.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::provider::PushProvider;
use crate::config::ApnsConfig;
use crate::error::AppResult;
use crate::external::apns::{ApnsClientFactory, ApnsDeliveryError, ApnsMessage};
use crate::models::{DispatchRequest, PushMessage, PushResponse, PushStatus};

/// Apple push provider
///
/// The binary wire protocol lives behind the injected client factory; this
/// provider owns recipient bookkeeping and outcome classification.
pub struct ApnsProvider {
    config: ApnsConfig,
    factory: Arc<dyn ApnsClientFactory>,
}

impl ApnsProvider {
    /// Creates a new Apple provider with configuration and client factory
    pub fn new(config: ApnsConfig, factory: Arc<dyn ApnsClientFactory>) -> Self {
        Self { config, factory }
    }

    /// Builds the client message object from the gateway-agnostic content.
    fn build_message(&self, message: &PushMessage) -> ApnsMessage {
        let text = match &message.title {
            Some(title) => format!("{}: {}", title, message.body),
            None => message.body.clone(),
        };
        ApnsMessage {
            text,
            sound: message
                .sound
                .clone()
                .or_else(|| Some(self.config.default_sound.clone())),
            badge: message.badge,
            custom: message.data.clone(),
        }
    }
}

#[async_trait]
impl PushProvider for ApnsProvider {
    async fn push(&self, request: &DispatchRequest) -> AppResult<PushResponse> {
        let mut client = match self.factory.open() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Could not open gateway client");
                return Ok(PushResponse::uniform(
                    request.endpoints(),
                    PushStatus::Error,
                ));
            }
        };

        // Register every endpoint; a rejected recipient is recorded and the
        // loop continues unconditionally.
        let mut statuses: HashMap<String, PushStatus> = HashMap::new();
        let mut accepted: Vec<&String> = Vec::new();
        for endpoint in request.endpoints() {
            match client.add_recipient(endpoint) {
                Ok(()) => accepted.push(endpoint),
                Err(e) => {
                    warn!(endpoint = %endpoint, error = %e, "Recipient rejected");
                    statuses.insert(endpoint.clone(), PushStatus::InvalidEndpoint);
                }
            }
        }
        if accepted.is_empty() {
            return Ok(PushResponse::from_statuses(statuses));
        }

        let message = self.build_message(request.message());

        if let Err(e) = client.connect().await {
            warn!(error = %e, "Could not connect to gateway");
            mark_accepted(&mut statuses, &accepted, PushStatus::Error);
            return Ok(PushResponse::from_statuses(statuses));
        }

        let sent = client.send(&message).await;
        client.disconnect().await;

        if let Err(e) = sent {
            warn!(error = %e, "Could not send notification");
            mark_accepted(&mut statuses, &accepted, PushStatus::Error);
            return Ok(PushResponse::from_statuses(statuses));
        }

        let errors = client.delivery_errors();
        match errors.first() {
            None => mark_accepted(&mut statuses, &accepted, PushStatus::Success),
            Some(first) => {
                let status = classify_status_code(first.status_code);
                for endpoint in &accepted {
                    log_delivery_error(endpoint, first, status);
                    statuses.insert((*endpoint).clone(), status);
                }
            }
        }

        Ok(PushResponse::from_statuses(statuses))
    }

    fn name(&self) -> &'static str {
        "apns"
    }
}

fn mark_accepted(
    statuses: &mut HashMap<String, PushStatus>,
    accepted: &[&String],
    status: PushStatus,
) {
    for endpoint in accepted {
        statuses.insert((*endpoint).clone(), status);
    }
}

fn log_delivery_error(endpoint: &str, error: &ApnsDeliveryError, status: PushStatus) {
    match status {
        PushStatus::InvalidEndpoint | PushStatus::TemporaryError | PushStatus::Unknown => {
            warn!(
                endpoint = %endpoint,
                code = error.status_code,
                description = %error.description,
                "Notification not delivered"
            );
        }
        _ => {}
    }
}

/// Binary-interface status codes, per the gateway's published table.
/// Anything not listed defaults to `Unknown`.
fn classify_status_code(code: u8) -> PushStatus {
    match code {
        // bad-token conditions
        2 | 5 | 8 => PushStatus::InvalidEndpoint,
        // transient processing conditions
        1 | 10 => PushStatus::TemporaryError,
        // recognized failures without a more specific mapping
        0 | 3 | 4 | 6 | 7 => PushStatus::Error,
        _ => PushStatus::Unknown,
    }
}
