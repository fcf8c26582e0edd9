//! Google Cloud Messaging (legacy HTTP) provider implementation.
//!
//! Sends one multicast POST per endpoint chunk and zips the positional
//! `results` array of the JSON reply back onto the chunk's endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use super::provider::PushProvider;
use crate::config::GcmConfig;
use crate::error::{AppError, AppResult};
use crate::external::transport::{HttpReply, HttpTransport};
use crate::models::{DispatchRequest, PushMessage, PushResponse, PushStatus};

/// Wire reply of one multicast request.
#[derive(Debug, Deserialize)]
struct GcmReply {
    results: Option<Vec<GcmResult>>,
}

/// Positional per-endpoint result inside a reply.
#[derive(Debug, Deserialize)]
struct GcmResult {
    message_id: Option<String>,
    error: Option<String>,
}

/// GCM push provider
///
/// Splits the endpoint list into chunks no larger than the gateway's
/// multicast limit, issues one POST per chunk through the injected
/// transport, and classifies each chunk's reply independently — a failed
/// chunk never aborts the remaining ones.
pub struct GcmProvider {
    config: GcmConfig,
    transport: Arc<dyn HttpTransport>,
}

impl GcmProvider {
    /// Creates a new GCM provider with configuration and transport
    pub fn new(config: GcmConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn request_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                "Authorization".to_string(),
                format!("key={}", self.config.api_key),
            ),
            (
                "Content-Type".to_string(),
                "application/json".to_string(),
            ),
        ])
    }

    /// Builds the multicast request body for one endpoint chunk.
    fn build_request_body(&self, message: &PushMessage, chunk: &[String]) -> serde_json::Value {
        let mut notification = json!({ "body": message.body });
        if let Some(title) = &message.title {
            notification["title"] = json!(title);
        }
        if let Some(sound) = &message.sound {
            notification["sound"] = json!(sound);
        }
        if let Some(badge) = message.badge {
            notification["badge"] = json!(badge.to_string());
        }

        let mut body = json!({
            "registration_ids": chunk,
            "priority": if message.high_priority { "high" } else { "normal" },
            "notification": notification,
        });
        if !message.data.is_empty() {
            body["data"] = json!(message.data);
        }
        body
    }

    /// Maps one chunk's raw reply onto per-endpoint statuses.
    ///
    /// The HTTP status code is checked before any body parsing; only a 200
    /// reply gets its JSON inspected.
    fn classify_chunk(&self, reply: &HttpReply, chunk: &[String]) -> HashMap<String, PushStatus> {
        match reply.status {
            200 => {}
            401 => {
                warn!("Error with authentication");
                return uniform(chunk, PushStatus::Error);
            }
            400 => {
                warn!(body = %reply.body, "Invalid JSON");
                return uniform(chunk, PushStatus::Error);
            }
            status if (500..600).contains(&status) => {
                warn!(status, "Internal error");
                return uniform(chunk, PushStatus::TemporaryError);
            }
            status => {
                warn!(status, "Unknown error");
                return uniform(chunk, PushStatus::Unknown);
            }
        }

        let results = match serde_json::from_str::<GcmReply>(&reply.body) {
            Ok(GcmReply {
                results: Some(results),
            }) => results,
            _ => {
                warn!("Unknown error");
                return uniform(chunk, PushStatus::Unknown);
            }
        };

        // Positional correlation: results[i] answers for chunk[i]. Endpoints
        // past the result count get no entry and resolve Unknown later;
        // surplus results are ignored.
        let mut statuses = HashMap::new();
        for (endpoint, result) in chunk.iter().zip(results.iter()) {
            statuses.insert(endpoint.clone(), classify_result(endpoint, result));
        }
        statuses
    }
}

#[async_trait]
impl PushProvider for GcmProvider {
    async fn push(&self, request: &DispatchRequest) -> AppResult<PushResponse> {
        let batch_size = self.config.batch_size.max(1);
        let headers = self.request_headers();
        let mut parts = Vec::new();

        for chunk in request.endpoints().chunks(batch_size) {
            let body = self.build_request_body(request.message(), chunk);
            let body = serde_json::to_vec(&body).map_err(|e| AppError::Internal {
                source: e.into(),
            })?;

            let statuses = match self.transport.post(&self.config.api_url, &headers, body).await {
                Ok(reply) => self.classify_chunk(&reply, chunk),
                Err(e) => {
                    warn!(error = %e, "Gateway unreachable");
                    uniform(chunk, PushStatus::Error)
                }
            };
            parts.push(PushResponse::from_statuses(statuses));
        }

        Ok(PushResponse::aggregate(parts))
    }

    fn name(&self) -> &'static str {
        "gcm"
    }
}

fn uniform(chunk: &[String], status: PushStatus) -> HashMap<String, PushStatus> {
    chunk.iter().map(|e| (e.clone(), status)).collect()
}

fn classify_result(endpoint: &str, result: &GcmResult) -> PushStatus {
    let Some(error) = result.error.as_deref() else {
        if result.message_id.is_some() {
            return PushStatus::Success;
        }
        warn!(endpoint = %endpoint, "Unknown error");
        return PushStatus::Unknown;
    };

    let status = classify_error(error);
    warn!(endpoint = %endpoint, error = %error, description = describe_error(error), "Endpoint not delivered");
    status
}

/// Pure lookup from a gateway error string to the shared status.
fn classify_error(error: &str) -> PushStatus {
    match error {
        "MissingRegistration" | "InvalidRegistration" | "NotRegistered"
        | "InvalidPackageName" | "MismatchSenderId" => PushStatus::InvalidEndpoint,
        "MessageTooBig" | "InvalidDataKey" | "InvalidTtl" => PushStatus::Error,
        "Unavailable" | "InternalServerError" | "DeviceMessageRateExceeded"
        | "TopicsMessageRateExceeded" => PushStatus::TemporaryError,
        _ => PushStatus::Unknown,
    }
}

fn describe_error(error: &str) -> &'static str {
    match error {
        "MissingRegistration" => "no registration token was supplied",
        "InvalidRegistration" => "the registration token is malformed",
        "NotRegistered" => "the device is no longer registered",
        "InvalidPackageName" => "the package name does not match the token",
        "MismatchSenderId" => "the sender is not permitted for this token",
        "MessageTooBig" => "the payload exceeds the maximum size",
        "InvalidDataKey" => "a payload key collides with a reserved word",
        "InvalidTtl" => "the time-to-live value is invalid",
        "Unavailable" => "the gateway timed out",
        "InternalServerError" => "the gateway reported an internal error",
        "DeviceMessageRateExceeded" => "message rate for this device exceeded",
        "TopicsMessageRateExceeded" => "message rate for this topic exceeded",
        _ => "unrecognized gateway error",
    }
}
