//! HTTP transport seam for the push gateway providers.
//!
//! Providers never talk to reqwest directly; they go through [`HttpTransport`]
//! so tests can script gateway replies without a network.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;

/// Raw reply from a gateway: the HTTP status code plus the unparsed body.
///
/// Classification decides from the status code first, so the body is kept
/// as-is and only parsed when the code calls for it.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Synchronous-per-call HTTP transport.
///
/// One `post` call is one gateway interaction; the future resolves only when
/// the full reply (or the transport failure) is in. Implementations must be
/// `Send + Sync` so one transport value serves every provider.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `body` to `url` with the given headers and returns the raw reply.
    ///
    /// # Errors
    /// Fails only when no HTTP reply was obtained at all (connection refused,
    /// timeout, TLS failure). Non-2xx replies are returned as `Ok` — mapping
    /// them to outcomes is the classifier's job.
    async fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: Vec<u8>,
    ) -> AppResult<HttpReply>;
}

/// Production transport over the shared [`HTTP_CLIENT`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        body: Vec<u8>,
    ) -> AppResult<HttpReply> {
        let mut request = HTTP_CLIENT.post(url).body(body);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| AppError::Gateway {
            gateway: url.to_string(),
            message: format!("request failed: {}", e),
            source: Some(e.into()),
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| AppError::Gateway {
            gateway: url.to_string(),
            message: format!("failed to read reply body: {}", e),
            source: Some(e.into()),
        })?;

        Ok(HttpReply { status, body })
    }
}
