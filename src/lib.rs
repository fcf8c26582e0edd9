//! Pushgate Library
//!
//! Multi-gateway mobile push notification dispatch: one message, N device
//! endpoints, per-endpoint outcome classification across Google (GCM HTTP),
//! Apple (binary protocol client) and BlackBerry (PAP) gateways.

pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod services;

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
