//! Domain models for the push dispatch system.

mod push;
mod response;

pub use push::{DispatchRequest, Gateway, PushMessage, PushStatus};
pub use response::PushResponse;
