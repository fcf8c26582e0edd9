//! Boundaries to the outside world: the shared HTTP client, the transport
//! seam the gateway providers dispatch through, and the Apple protocol
//! client interface.

pub mod apns;
pub mod client;
pub mod transport;
