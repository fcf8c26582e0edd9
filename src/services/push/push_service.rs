//! Push service for gateway routing.
//!
//! Owns one provider per configured gateway and dispatches requests to the
//! right one based on the target gateway kind.

use std::sync::Arc;

use super::apns_provider::ApnsProvider;
use super::blackberry_provider::BlackberryProvider;
use super::gcm_provider::GcmProvider;
use super::provider::PushProvider;
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::external::apns::ApnsClientFactory;
use crate::external::transport::HttpTransport;
use crate::models::{DispatchRequest, Gateway, PushResponse};

/// Push service handling gateway selection and dispatch
pub struct PushService {
    gcm: Option<GcmProvider>,
    apns: Option<ApnsProvider>,
    blackberry: Option<BlackberryProvider>,
}

impl PushService {
    /// Creates a PushService from settings, instantiating a provider for
    /// every gateway enabled in the configuration.
    ///
    /// # Arguments
    /// * `settings` - Loaded application settings
    /// * `transport` - HTTP transport shared by the HTTP-based gateways
    /// * `apns_factory` - Factory opening Apple protocol client sessions
    pub fn new(
        settings: &Settings,
        transport: Arc<dyn HttpTransport>,
        apns_factory: Arc<dyn ApnsClientFactory>,
    ) -> Self {
        Self {
            gcm: settings
                .gcm
                .enabled
                .then(|| GcmProvider::new(settings.gcm.clone(), transport.clone())),
            apns: settings
                .apns
                .enabled
                .then(|| ApnsProvider::new(settings.apns.clone(), apns_factory)),
            blackberry: settings
                .blackberry
                .enabled
                .then(|| BlackberryProvider::new(settings.blackberry.clone(), transport)),
        }
    }

    /// Dispatches a request through the given gateway.
    ///
    /// # Errors
    /// Returns `BadRequest` when the gateway is not enabled in the
    /// configuration. Gateway-side failures never surface here; they are
    /// classified into the response.
    pub async fn dispatch(
        &self,
        gateway: Gateway,
        request: &DispatchRequest,
    ) -> AppResult<PushResponse> {
        match gateway {
            Gateway::Gcm => self.provider_or_err(&self.gcm, gateway)?.push(request).await,
            Gateway::Apns => {
                self.provider_or_err(&self.apns, gateway)?
                    .push(request)
                    .await
            }
            Gateway::Blackberry => {
                self.provider_or_err(&self.blackberry, gateway)?
                    .push(request)
                    .await
            }
        }
    }

    fn provider_or_err<'a, P: PushProvider>(
        &self,
        provider: &'a Option<P>,
        gateway: Gateway,
    ) -> AppResult<&'a P> {
        provider.as_ref().ok_or_else(|| AppError::BadRequest {
            message: format!("Gateway {} is not enabled", gateway),
        })
    }
}
